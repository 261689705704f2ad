mod analytics;
mod explorer;
mod form;
pub mod map_widget;
mod profile;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Mode, Page};
use crate::state::View;

pub const ACCENT: Color = Color::Rgb(0xc4, 0x1e, 0x3a);

/// `width x height` rectangle centred in `area`, clipped to it
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let banner = app.load_error();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(u16::from(banner.is_some())),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    if let Some(banner) = banner {
        let line = Line::from(Span::styled(
            format!(" Veri yüklenirken bir hata oluştu: {banner} "),
            Style::default().fg(Color::White).bg(Color::Red),
        ));
        frame.render_widget(Paragraph::new(line), chunks[1]);
    }

    match app.page {
        Page::Explorer => explorer::render(frame, app, chunks[2]),
        Page::Analytics => analytics::render(frame, app, chunks[2]),
        Page::Profile => profile::render(frame, app, chunks[2]),
    }

    if let Mode::Form {
        target,
        form,
        error,
    } = &app.mode
    {
        form::render(frame, *target, form, error.as_deref(), chunks[2]);
    }

    render_status_bar(frame, app, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(
                format!(" {label} "),
                Style::default().fg(Color::White).bg(ACCENT).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {label} "), Style::default().fg(Color::Gray))
        }
    };
    let on_explorer = app.page == Page::Explorer;
    let mut spans = vec![
        Span::styled(
            " Türkiye İş Cinayetleri Haritası ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("│", Style::default().fg(Color::DarkGray)),
        tab("1 Harita", on_explorer && app.explorer.view() == View::Map),
        tab("Tablo", on_explorer && app.explorer.view() == View::Table),
        tab("2 Analiz", app.page == Page::Analytics),
    ];
    if app.page == Page::Profile {
        spans.push(tab("Profil", true));
    }
    if on_explorer {
        spans.push(Span::styled(
            format!(" {}", app.explorer.fragment()),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let hints = match (&app.mode, app.page) {
        (Mode::Form { .. }, _) => "",
        (Mode::Search, _) => " yazın: ara  Enter/Esc: bitir",
        (Mode::Normal, Page::Explorer) => match app.explorer.view() {
            View::Map => " Tab:tablo f:filtre y:yıl r:sıfırla e:CSV ←↑↓→:kaydır +/-:yakınlaş 0:ülke o/L:katman [/]:geçmiş q:çık",
            View::Table => " Tab:harita /:ara ↑↓:seç Enter:profil f:filtre y:yıl r:sıfırla e:CSV [/]:geçmiş q:çık",
        },
        (Mode::Normal, Page::Analytics) => " Tab:grafik f:filtre r:sıfırla y/Y:yıl +/-:yakınlaş 1:harita q:çık",
        (Mode::Normal, Page::Profile) => " Esc:geri q:çık",
    };

    let mut spans = Vec::new();
    if app.page == Page::Explorer && app.explorer.view() == View::Map {
        spans.push(Span::styled(" Zoom: ", dim));
        spans.push(Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(" │ ", dim));
        spans.push(Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(" │", dim));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(format!(" {status} "), Style::default().fg(Color::Green)));
        spans.push(Span::styled("│", dim));
    }
    spans.push(Span::styled(hints, dim));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
