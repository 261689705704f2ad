use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::FormTarget;
use crate::state::FilterForm;
use crate::ui::{centered_rect, ACCENT};

/// Modal filter panel drawn over the current page
pub fn render(frame: &mut Frame, target: FormTarget, form: &FilterForm, error: Option<&str>, area: Rect) {
    let title = match target {
        FormTarget::Explorer => " Filtreler ".to_string(),
        FormTarget::Widget(widget) => format!(" {} · Filtreler ", widget.title()),
    };

    let mut lines: Vec<Line> = Vec::new();
    for (idx, field) in form.fields().iter().enumerate() {
        let focused = idx == form.focus();
        let value = match (field.control.is_select(), field.value.is_empty()) {
            (true, true) => "◀ Tümü ▶".to_string(),
            (true, false) => format!("◀ {} ▶", field.value),
            (false, _) if focused => format!("{}▏", field.value),
            (false, _) => field.value.clone(),
        };
        let marker = if focused { "› " } else { "  " };
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(ACCENT)),
            Span::styled(format!("{:<12}", field.control.label()), Style::default().fg(Color::Gray)),
            Span::styled(value, style),
        ]));
    }
    lines.push(Line::default());
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))));
    }
    lines.push(Line::from(Span::styled(
        "↑↓ alan  ←→ seçenek  Enter uygula  Del temizle  Esc iptal",
        Style::default().fg(Color::DarkGray),
    )));

    let height = lines.len() as u16 + 2;
    let popup = centered_rect(area, 62, height);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))),
        ),
        popup,
    );
}
