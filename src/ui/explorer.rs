use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table,
    },
    Frame,
};

use crate::adapters::{Popup, TABLE_HEADERS};
use crate::app::{App, Mode};
use crate::map::Overlay;
use crate::state::View;
use crate::ui::map_widget::{rgb, MapWidget};
use crate::ui::{centered_rect, ACCENT};

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    render_filter_summary(frame, app, chunks[0]);
    match app.explorer.view() {
        View::Map => render_map(frame, app, chunks[1]),
        View::Table => render_table(frame, app, chunks[1]),
    }
}

fn render_filter_summary(frame: &mut Frame, app: &App, area: Rect) {
    let criteria = app.explorer.criteria();
    let dim = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);
    let mut spans = vec![
        Span::styled(
            format!(" {} kayıt ", app.explorer.filtered_indices().len()),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
    ];
    if app.explorer.options().year_filter {
        spans.push(Span::styled("Yıl: ", dim));
        spans.push(Span::styled(format!("{} ", criteria.year), value));
    }
    let optional = [
        ("Cinsiyet", criteria.gender.as_deref()),
        ("Sektör", criteria.sector.as_deref()),
        ("Şehir", criteria.city.as_deref()),
    ];
    for (label, v) in optional {
        if let Some(v) = v {
            spans.push(Span::styled(format!("{label}: "), dim));
            spans.push(Span::styled(format!("{v} "), value));
        }
    }
    if criteria.age.has_input() {
        let (min, max) = criteria.age.bounds();
        spans.push(Span::styled("Yaş: ", dim));
        spans.push(Span::styled(format!("{min}-{max} "), value));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_map(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Harita ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    app.set_map_area(inner);
    let clusters = app.clusters();
    let layers = app.renderer.render(
        inner.width as usize,
        inner.height as usize,
        &app.viewport,
        &Overlay::Markers(&clusters),
    );
    frame.render_widget(MapWidget::new(layers).cursor(app.map_cursor()), inner);

    if let Some((_, popup)) = &app.popup {
        render_popup(frame, popup, inner);
    }
}

fn render_popup(frame: &mut Frame, popup: &Popup, map: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let row = |name: &'static str, value: &str| {
        Line::from(vec![
            Span::styled(format!("{name:<7}"), label),
            Span::raw(value.to_string()),
        ])
    };
    let lines = vec![
        Line::from(Span::styled(
            popup.name.clone(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        row("Tarih", &popup.date),
        row("Şehir", &popup.city),
        row("Yaş", &popup.age),
        row("Sektör", &popup.sector),
        row("Neden", &popup.cause),
        Line::from(Span::styled("Enter: profil  Esc: kapat", label)),
    ];

    let width = 44.min(map.width);
    let height = (lines.len() as u16 + 2).min(map.height);
    let area = Rect::new(
        map.x + map.width - width,
        map.y + map.height - height,
        width,
        height,
    );
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT)),
        ),
        area,
    );
}

fn render_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let searching = matches!(app.mode, Mode::Search);
    let cursor = if searching { "▏" } else { "" };
    let search = Line::from(vec![
        Span::styled(" Ara: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}{cursor}", app.explorer.search()),
            Style::default().fg(if searching { Color::Yellow } else { Color::White }),
        ),
    ]);
    frame.render_widget(Paragraph::new(search), chunks[0]);

    let rows = app.table_rows();
    let header = Row::new(TABLE_HEADERS.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
    }))
    .style(Style::default().bg(rgb("#2c3e50")));
    let body = rows
        .iter()
        .map(|row| Row::new(row.cells.iter().map(|c| Cell::from(c.as_str()))));
    let widths = [
        Constraint::Percentage(18),
        Constraint::Length(11),
        Constraint::Percentage(12),
        Constraint::Percentage(12),
        Constraint::Percentage(16),
        Constraint::Fill(1),
    ];
    let table = Table::new(body, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Tablo · {} ", rows.len())),
        )
        .row_highlight_style(Style::default().bg(ACCENT).fg(Color::White));

    if rows.is_empty() {
        frame.render_widget(table, chunks[1]);
        let message = Paragraph::new(Span::styled(
            "Kayıt bulunamadı.",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(message, centered_rect(chunks[1], 20, 1));
        return;
    }
    frame.render_stateful_widget(table, chunks[1], &mut app.table);

    let visible = chunks[1].height.saturating_sub(3) as usize;
    let mut scrollbar_state = ScrollbarState::new(rows.len())
        .position(app.table.selected().unwrap_or(0))
        .viewport_content_length(visible);
    let scrollbar =
        Scrollbar::new(ScrollbarOrientation::VerticalRight).thumb_style(Style::default().fg(ACCENT));
    frame.render_stateful_widget(scrollbar, chunks[1], &mut scrollbar_state);
}
