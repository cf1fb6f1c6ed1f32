use ratatui::{
    layout::{Direction, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap,
    },
    Frame,
};

use crate::error::ColumnError;
use crate::panels::{BarView, HistogramView, PanelBody, PanelView, ScatterView};
use crate::schema::ChartSpec;
use crate::ui::format::format_compact;

const COLOR_TITLE: Color = Color::Cyan;
const COLOR_FOCUS: Color = Color::Yellow;
const COLOR_POINT: Color = Color::Cyan;
const COLOR_BAR: Color = Color::Green;
const COLOR_DANGER: Color = Color::LightRed;

/// Draw one panel: its block, then the chart (or its column error) inside.
pub fn render_panel(
    frame: &mut Frame,
    area: Rect,
    view: &PanelView,
    focused: bool,
    cursor: Option<usize>,
) {
    let spec = view.id.spec();
    let border = if focused {
        Style::default().fg(COLOR_FOCUS)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", spec.title))
        .title_style(Style::default().fg(COLOR_TITLE).add_modifier(Modifier::BOLD));

    match &view.body {
        Ok(PanelBody::Scatter(s)) => render_scatter(frame, area, block, spec, s, cursor),
        Ok(PanelBody::Histogram(h)) => render_histogram(frame, area, block, spec, h),
        Ok(PanelBody::Bars(b)) => render_bars(frame, area, block, spec, b),
        Err(e) => render_error(frame, area, block, e),
    }
}

/// Data extent padded by 5% on each side. Empty input gives [0, 1].
pub fn axis_bounds(values: impl IntoIterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if min > max {
        return [0.0, 1.0];
    }

    let span = max - min;
    let pad = if span > 0.0 {
        span * 0.05
    } else if min != 0.0 {
        min.abs() * 0.05
    } else {
        1.0
    };
    [min - pad, max + pad]
}

fn axis_labels(bounds: [f64; 2], log: bool) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .into_iter()
        .map(|v| {
            let shown = if log { 10f64.powf(v) } else { v };
            Span::from(format_compact(shown))
        })
        .collect()
}

fn render_scatter(
    frame: &mut Frame,
    area: Rect,
    mut block: Block,
    spec: &ChartSpec,
    view: &ScatterView,
    cursor: Option<usize>,
) {
    let data = view.plotted();
    let x_bounds = axis_bounds(data.iter().map(|(x, _)| *x));
    let y_bounds = axis_bounds(data.iter().map(|(_, y)| *y));

    let selected: Vec<(f64, f64)> = cursor
        .and_then(|i| view.points.get(i))
        .and_then(|p| view.display_x(p.x).map(|x| (x, p.y)))
        .into_iter()
        .collect();

    if data.is_empty() {
        let note = if spec.log_x_toggle { " no rows in range " } else { " no data " };
        block = block.title_bottom(Line::from(note).style(Style::default().fg(Color::DarkGray)));
    } else if let Some(p) = cursor.and_then(|i| view.points.get(i)) {
        let label = p.label.as_deref().unwrap_or("point");
        block = block.title_bottom(Line::from(vec![
            Span::styled(format!(" {} ", label), Style::default().fg(COLOR_FOCUS)),
            Span::raw(format!("({}, {}) ", format_compact(p.x), format_compact(p.y))),
        ]));
    }

    let mut datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(COLOR_POINT))
        .data(&data)];
    if !selected.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(COLOR_FOCUS))
                .data(&selected),
        );
    }

    let x_title = if spec.log_x_toggle && view.log_x {
        format!("{} (log)", spec.x_label)
    } else {
        spec.x_label.to_string()
    };

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(x_title)
                .style(Style::default().fg(Color::Gray))
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds, view.log_x)),
        )
        .y_axis(
            Axis::default()
                .title(spec.y_label)
                .style(Style::default().fg(Color::Gray))
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds, false)),
        );

    frame.render_widget(chart, area);
}

fn render_histogram(
    frame: &mut Frame,
    area: Rect,
    block: Block,
    spec: &ChartSpec,
    view: &HistogramView,
) {
    let block = match (view.bins.first(), view.bins.last()) {
        (Some(first), Some(last)) => block.title_bottom(format!(
            " {}: {} .. {} | y: {} ",
            spec.x_label,
            format_compact(first.start),
            format_compact(last.end),
            spec.y_label
        )),
        _ => block.title_bottom(" no data "),
    };

    let inner_width = block.inner(area).width as usize;
    let bar_width = (inner_width / view.bins.len().max(1)).max(1) as u16;

    let bars: Vec<Bar> = view
        .bins
        .iter()
        .map(|b| Bar::default().value(b.count).text_value(String::new()))
        .collect();

    let chart = BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(0)
        .bar_style(Style::default().fg(COLOR_BAR))
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn render_bars(frame: &mut Frame, area: Rect, block: Block, spec: &ChartSpec, view: &BarView) {
    let block = block.title_bottom(format!(" {} by {} ", spec.x_label, spec.y_label));

    let bars: Vec<Bar> = view
        .bars
        .iter()
        .map(|(name, value)| {
            Bar::default()
                .label(Line::from(name.clone()))
                .value((*value).max(0.0) as u64)
                .text_value(format_compact(*value))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(COLOR_BAR))
        .value_style(Style::default().fg(Color::Black).bg(COLOR_BAR))
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn render_error(frame: &mut Frame, area: Rect, block: Block, error: &ColumnError) {
    let text = Paragraph::new(Line::from(vec![
        Span::styled("ERROR: ", Style::default().fg(COLOR_DANGER).add_modifier(Modifier::BOLD)),
        Span::styled(error.to_string(), Style::default().fg(COLOR_DANGER)),
    ]))
    .wrap(Wrap { trim: true })
    .block(block);

    frame.render_widget(text, area);
}
