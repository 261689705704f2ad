use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::adapters::profile::NO_MESSAGES;
use crate::adapters::ProfileCard;
use crate::app::App;
use crate::state::ProfileState;
use crate::ui::{centered_rect, ACCENT};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    match &app.profile {
        Some(ProfileState::Found(card)) => render_card(frame, card, area),
        Some(state) => render_message(frame, state.message().unwrap_or_default(), area),
        None => render_message(frame, crate::state::profile::MISSING_ID_MESSAGE, area),
    }
}

fn render_message(frame: &mut Frame, message: &str, area: Rect) {
    let text = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    )))
    .centered();
    frame.render_widget(text, centered_rect(area, 60, 1));
}

fn field<'a>(label: &'a str, value: &str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<16}"), Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), Style::default().fg(Color::White)),
    ])
}

fn render_card(frame: &mut Frame, card: &ProfileCard, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let mut lines = vec![
        Line::from(Span::styled(
            card.name.clone(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        field("Tarih", &card.date),
        field("Şehir", &card.city),
        field("İlçe", &card.district),
        field("Yaş", &card.age),
        field("Cinsiyet", &card.gender),
        field("Sektör", &card.sector),
        field("Şirket", &card.company),
        field("Ölüm nedeni", &card.cause),
    ];
    if card.multi_victim {
        lines.push(Line::from(Span::styled(
            "Bu olayda birden fazla işçi hayatını kaybetti.",
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Detaylar", Style::default().add_modifier(Modifier::BOLD))));
    lines.push(Line::from(card.details.clone()));
    lines.push(Line::default());
    if let Some(source) = &card.source {
        lines.push(field("Kaynak", source));
    }
    if let Some(image) = &card.image {
        lines.push(field("Görsel", image));
    }
    if let Some((lat, lon)) = card.coords {
        lines.push(field("Konum", &format!("{lat:.4}, {lon:.4}")));
    }

    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", card.title)),
        );
    frame.render_widget(details, columns[0]);

    let mut messages: Vec<Line> = Vec::new();
    if card.messages.is_empty() {
        messages.push(Line::from(Span::styled(
            NO_MESSAGES,
            Style::default().fg(Color::DarkGray),
        )));
    }
    for message in &card.messages {
        messages.push(Line::from(vec![
            Span::styled(
                message.name.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", message.date), Style::default().fg(Color::DarkGray)),
        ]));
        messages.push(Line::from(message.text.clone()));
        messages.push(Line::default());
    }
    let panel = Paragraph::new(messages)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Anma Mesajları "),
        );
    frame.render_widget(panel, columns[1]);
}
