use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset as ChartDataset, GraphType,
        LegendPosition, Paragraph,
    },
    Frame,
};

use crate::adapters::{age_bars, month_axis_labels, monthly_bars, sector_bars, yearly_lines};
use crate::app::App;
use crate::map::Overlay;
use crate::state::Widget;
use crate::ui::map_widget::{rgb, tier_color, MapWidget};
use crate::ui::ACCENT;

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(columns[1]);

    render_choropleth(frame, app, left[0]);
    render_yearly(frame, app, left[1]);
    render_bars(frame, app, Widget::Monthly, right[0]);
    render_bars(frame, app, Widget::Sector, right[1]);
    render_bars(frame, app, Widget::Age, right[2]);
}

/// Widget frame; the focused widget gets the accent border and its active
/// filters in the title
fn widget_block(app: &App, widget: Widget, extra: Option<String>) -> Block<'static> {
    let focused = app.focus == widget;
    let border = if focused { ACCENT } else { Color::DarkGray };
    let mut title = format!(" {} ", widget.title());
    if widget.uses_year() {
        title.push_str(&format!("· {} ", app.analytics.year()));
    }
    if let Some(extra) = extra {
        title.push_str(&format!("· {extra} "));
    }
    let filters = filter_summary(app, widget);
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(if focused { Color::White } else { Color::Gray })
                .add_modifier(Modifier::BOLD),
        ));
    if !filters.is_empty() {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {filters} "),
            Style::default().fg(Color::DarkGray),
        )));
    }
    block
}

fn filter_summary(app: &App, widget: Widget) -> String {
    let criteria = app.analytics.criteria(widget);
    let mut parts: Vec<String> = [&criteria.gender, &criteria.sector, &criteria.city]
        .into_iter()
        .flatten()
        .cloned()
        .collect();
    if let Some(start) = criteria.date_start {
        parts.push(format!("≥ {}", start.format("%d.%m.%Y")));
    }
    if let Some(end) = criteria.date_end {
        parts.push(format!("≤ {}", end.format("%d.%m.%Y")));
    }
    parts.join(", ")
}

fn bar_chart<'a>(bars: &'a [Bar<'a>], inner: Rect, horizontal: bool) -> BarChart<'a> {
    let chart = BarChart::default().data(BarGroup::default().bars(bars)).bar_gap(1);
    if horizontal {
        return chart.direction(Direction::Horizontal).bar_width(1);
    }
    let n = bars.len().max(1) as u16;
    let width = (inner.width.saturating_sub(n) / n).clamp(1, 12);
    chart.bar_width(width)
}

fn render_bars(frame: &mut Frame, app: &App, widget: Widget, area: Rect) {
    let points = match widget {
        Widget::Monthly => monthly_bars(&app.analytics.monthly()),
        Widget::Sector => sector_bars(&app.analytics.sectors()),
        Widget::Age => age_bars(&app.analytics.ages()),
        Widget::Choropleth | Widget::Yearly => return,
    };
    let total: u64 = points.iter().map(|p| p.value).sum();
    let block = widget_block(app, widget, Some(format!("{total} kayıt")));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if points.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("Veri yok", Style::default().fg(Color::DarkGray))),
            inner,
        );
        return;
    }

    let horizontal = widget == Widget::Sector;
    let bars: Vec<Bar> = points
        .iter()
        .map(|p| {
            Bar::default()
                .value(p.value)
                .label(Line::from(p.label.clone()))
                .style(Style::default().fg(rgb(p.color)))
                .value_style(Style::default().fg(Color::White).bg(rgb(p.color)))
        })
        .collect();
    frame.render_widget(bar_chart(&bars, inner, horizontal), inner);
}

fn render_yearly(frame: &mut Frame, app: &App, area: Rect) {
    let lines = yearly_lines(&app.analytics.yearly());
    let block = widget_block(app, Widget::Yearly, None);
    if lines.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(Span::styled("Veri yok", Style::default().fg(Color::DarkGray))),
            inner,
        );
        return;
    }

    let max = lines
        .iter()
        .flat_map(|l| l.points.iter().map(|&(_, y)| y))
        .fold(1.0_f64, f64::max);
    let datasets: Vec<ChartDataset> = lines
        .iter()
        .map(|line| {
            ChartDataset::default()
                .name(line.year.to_string())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(rgb(line.color)))
                .data(&line.points)
        })
        .collect();
    let months = month_axis_labels();
    let x_labels: Vec<Span> = [0usize, 3, 6, 9, 11]
        .iter()
        .map(|&m| Span::raw(months[m].chars().take(3).collect::<String>()))
        .collect();
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", max / 2.0)),
        Span::raw(format!("{max:.0}")),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .legend_position(Some(LegendPosition::TopLeft))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, 11.0])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, max])
                .labels(y_labels),
        );
    frame.render_widget(chart, area);
}

fn render_choropleth(frame: &mut Frame, app: &mut App, area: Rect) {
    let hover = app
        .hover
        .as_ref()
        .map(|(name, count)| format!("{name}: {count}"));
    let block = widget_block(app, Widget::Choropleth, hover);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    app.set_choropleth_area(chunks[0]);
    let choropleth = app.choropleth();
    let layers = app.renderer.render(
        chunks[0].width as usize,
        chunks[0].height as usize,
        &app.choropleth_viewport,
        &Overlay::Choropleth(&choropleth.tiers),
    );
    frame.render_widget(MapWidget::new(layers), chunks[0]);

    let mut legend = Vec::new();
    for entry in choropleth.scale.legend() {
        legend.push(Span::styled("■ ", Style::default().fg(tier_color(entry.tier))));
        legend.push(Span::styled(
            format!("{}  ", entry.label),
            Style::default().fg(Color::Gray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(legend)), chunks[1]);
}
