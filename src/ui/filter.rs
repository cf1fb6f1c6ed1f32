use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::filter::{CapExpRange, FilterControl, Handle, CAP_EXP_MAX};
use crate::ui::format::format_grouped;

const COLOR_ACTIVE: Color = Color::Yellow;
const COLOR_TRACK: Color = Color::DarkGray;
const COLOR_SELECTED: Color = Color::Cyan;

/// Rows the control needs, borders included.
pub const FILTER_CONTROL_HEIGHT: u16 = 5;

/// Columns of the low and high handles on a track `width` cells wide.
pub fn handle_columns(range: CapExpRange, width: u16) -> (u16, u16) {
    let last = width.saturating_sub(1) as u64;
    let col = |v: u64| (v * last / CAP_EXP_MAX) as u16;
    (col(range.low()), col(range.high()))
}

fn track(control: &FilterControl, width: u16) -> Line<'static> {
    let (lo, hi) = handle_columns(control.range(), width);
    let handle_style = |handle: Handle| {
        if control.active() == handle {
            Style::default().fg(COLOR_ACTIVE).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_SELECTED)
        }
    };

    let spans = (0..width)
        .map(|col| {
            if col == lo {
                Span::styled("●", handle_style(Handle::Low))
            } else if col == hi {
                Span::styled("●", handle_style(Handle::High))
            } else if col > lo && col < hi {
                Span::styled("━", Style::default().fg(COLOR_SELECTED))
            } else {
                Span::styled("─", Style::default().fg(COLOR_TRACK))
            }
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

pub fn render_filter_control(frame: &mut Frame, area: Rect, control: &FilterControl) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Filter ")
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);

    let range = control.range();
    let bound_style = |handle: Handle| {
        if control.active() == handle {
            Style::default().fg(COLOR_ACTIVE).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        }
    };

    let checkbox = if control.log_x() { "[x]" } else { "[ ]" };

    let lines = vec![
        Line::from(vec![
            Span::styled("Capital Expenditure Range  ", Style::default().fg(Color::Gray)),
            Span::styled(format_grouped(range.low()), bound_style(Handle::Low)),
            Span::raw(" - "),
            Span::styled(format_grouped(range.high()), bound_style(Handle::High)),
        ]),
        track(control, inner.width),
        Line::from(vec![
            Span::styled(checkbox, Style::default().fg(COLOR_SELECTED)),
            Span::raw(" Log Scale for X-Axis (CAP_EXP)"),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
