use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::panels::Dashboard;

pub const PAGE_TITLE: &str = "California Healthcare Dashboard";

// Use standard terminal colors
const COLOR_KEY: Color = Color::Cyan;
const COLOR_DANGER: Color = Color::LightRed;

pub fn render_title_bar(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let data = dashboard.datasets();
    let failed = dashboard.failures().len();

    let mut spans = vec![
        Span::styled(
            PAGE_TITLE,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Hospitals: ", Style::default().fg(Color::Gray)),
        Span::styled(data.hospital.len().to_string(), Style::default().fg(Color::White)),
        Span::raw(" | "),
        Span::styled("Counties: ", Style::default().fg(Color::Gray)),
        Span::styled(data.county_level.len().to_string(), Style::default().fg(Color::White)),
        Span::raw("  "),
    ];

    if failed > 0 {
        spans.push(Span::styled(
            "ERROR: ",
            Style::default().fg(COLOR_DANGER).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{} panel(s) cannot be drawn", failed),
            Style::default().fg(COLOR_DANGER),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_help_bar(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(Line::from(vec![
        Span::styled("[q]", Style::default().fg(COLOR_KEY)),
        Span::raw(" quit  "),
        Span::styled("[Tab]", Style::default().fg(COLOR_KEY)),
        Span::raw(" focus  "),
        Span::styled("[z]", Style::default().fg(COLOR_KEY)),
        Span::raw(" zoom  "),
        Span::styled("[n/p]", Style::default().fg(COLOR_KEY)),
        Span::raw(" inspect  "),
        Span::styled("[h/l]", Style::default().fg(COLOR_KEY)),
        Span::raw(" move handle  "),
        Span::styled("[j/k/s]", Style::default().fg(COLOR_KEY)),
        Span::raw(" low/high/swap handle  "),
        Span::styled("[x]", Style::default().fg(COLOR_KEY)),
        Span::raw(" log scale  "),
        Span::styled("[r]", Style::default().fg(COLOR_KEY)),
        Span::raw(" reset"),
    ]))
    .style(Style::default().fg(Color::DarkGray));

    frame.render_widget(help, area);
}
