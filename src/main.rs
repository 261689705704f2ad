use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::{info, warn};

use isig_atlas::adapters::{export_to_dir, markers_geojson, sort_newest_first};
use isig_atlas::app::{App, Mode, Page, Startup};
use isig_atlas::config::{Cli, Command, ExportArgs, MarkersArgs};
use isig_atlas::data::{load_dataset, load_geography, Geography};
use isig_atlas::query::{self, YearSelection};
use isig_atlas::state::{ExplorerOptions, View};
use isig_atlas::{logging, ui};

fn main() -> Result<()> {
    let mut cli = Cli::parse();
    if cli.is_interactive() {
        logging::init_file(&cli.log_file)?;
    } else {
        logging::init_stderr();
    }

    match cli.command.take().unwrap_or_default() {
        Command::Export(args) => export(&cli, &args),
        Command::Markers(args) => write_markers(&cli, &args),
        command => interactive(&cli, startup(command)),
    }
}

fn startup(command: Command) -> Startup {
    let mut startup = Startup {
        page: Page::Explorer,
        fragment: View::Map.fragment().to_string(),
        options: ExplorerOptions::default(),
        explorer_year: YearSelection::All,
        analytics_year: YearSelection::All,
        profile_id: None,
        export_dir: ".".into(),
    };
    match command {
        Command::Explore(args) => {
            startup.fragment = args.fragment().to_string();
            startup.options = args.options();
            startup.explorer_year = args.year;
        }
        Command::Analytics(args) => {
            startup.page = Page::Analytics;
            startup.analytics_year = args.year;
        }
        Command::Profile(args) => {
            startup.page = Page::Profile;
            startup.profile_id = args.id;
        }
        Command::Export(_) | Command::Markers(_) => {}
    }
    startup
}

/// Headless CSV export of the filtered records
fn export(cli: &Cli, args: &ExportArgs) -> Result<()> {
    let dataset = load_dataset(&cli.data_source())
        .with_context(|| format!("failed to load dataset from {}", cli.data))?;
    let criteria = args.filters.criteria();
    let records = query::apply(dataset.records(), &criteria);
    let path = export_to_dir(
        &args.out_dir,
        Local::now().date_naive(),
        &criteria.age,
        &records,
    )?;
    info!(rows = records.len(), path = %path.display(), "CSV written");
    println!("{}", path.display());
    Ok(())
}

/// Headless GeoJSON of the filtered markers
fn write_markers(cli: &Cli, args: &MarkersArgs) -> Result<()> {
    let dataset = load_dataset(&cli.data_source())
        .with_context(|| format!("failed to load dataset from {}", cli.data))?;
    let records = query::apply(dataset.records(), &args.filters.criteria());
    let collection = markers_geojson(&sort_newest_first(&records));
    info!(features = collection.features.len(), "markers prepared");
    fs::write(&args.out, collection.to_string())
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    println!("{}", args.out.display());
    Ok(())
}

fn interactive(cli: &Cli, startup: Startup) -> Result<()> {
    let dataset = load_dataset(&cli.data_source());
    let geography = load_geography(&cli.geo_source()).unwrap_or_else(|err| {
        warn!(error = %err, "province geometry unavailable");
        Geography::default()
    });
    let mut app = App::new(dataset, geography, startup);

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &mut app);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }
    if matches!(app.mode, Mode::Form { .. }) {
        return handle_form_key(app, key);
    }
    if matches!(app.mode, Mode::Search) {
        return handle_search_key(app, key);
    }
    app.status = None;

    match key.code {
        KeyCode::Char('q') => return app.quit(),
        KeyCode::Char('1') => return app.go_to(Page::Explorer),
        KeyCode::Char('2') => return app.go_to(Page::Analytics),
        _ => {}
    }
    match app.page {
        Page::Explorer => handle_explorer_key(app, key),
        Page::Analytics => handle_analytics_key(app, key),
        Page::Profile => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Backspace) {
                app.close_profile();
            }
        }
    }
}

fn handle_explorer_key(app: &mut App, key: KeyEvent) {
    let view = app.explorer.view();
    match key.code {
        KeyCode::Tab => app.toggle_view(),
        KeyCode::Char('m') => app.switch_view(View::Map),
        KeyCode::Char('t') => app.switch_view(View::Table),
        KeyCode::Char('[') => app.history_back(),
        KeyCode::Char(']') => app.history_forward(),
        KeyCode::Left if key.modifiers.contains(KeyModifiers::ALT) => app.history_back(),
        KeyCode::Right if key.modifiers.contains(KeyModifiers::ALT) => app.history_forward(),
        KeyCode::Char('f') => app.open_form(),
        KeyCode::Char('r') => app.reset_explorer_filters(),
        KeyCode::Char('y') => app.cycle_explorer_year(1),
        KeyCode::Char('Y') => app.cycle_explorer_year(-1),
        KeyCode::Char('e') => app.export_csv(),
        KeyCode::Esc => {
            if !app.close_popup() {
                app.quit();
            }
        }
        _ if view == View::Table => match key.code {
            KeyCode::Char('/') => app.mode = Mode::Search,
            KeyCode::Up | KeyCode::Char('k') => app.select_row(-1),
            KeyCode::Down | KeyCode::Char('j') => app.select_row(1),
            KeyCode::PageUp => app.select_row(-10),
            KeyCode::PageDown => app.select_row(10),
            KeyCode::Enter => app.open_selected_row(),
            _ => {}
        },
        _ => handle_map_key(app, key),
    }
}

/// Pan, zoom and layer keys shared by both maps
fn handle_map_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),
        KeyCode::Char('0') => app.reset_view(),
        KeyCode::Char('o') => app.renderer.toggle_outlines(),
        KeyCode::Char('L') => app.renderer.toggle_labels(),
        KeyCode::Enter => app.open_popup_profile(),
        _ => {}
    }
}

fn handle_analytics_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => app.focus_widget(1),
        KeyCode::BackTab => app.focus_widget(-1),
        KeyCode::Char('f') => app.open_form(),
        KeyCode::Char('r') => app.reset_focused_widget(),
        KeyCode::Char('y') => app.cycle_analytics_year(1),
        KeyCode::Char('Y') => app.cycle_analytics_year(-1),
        KeyCode::Esc => app.quit(),
        _ => handle_map_key(app, key),
    }
}

fn handle_form_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_mode(),
        KeyCode::Enter => app.submit_form(),
        _ => {
            let Some(form) = app.form_mut() else {
                return;
            };
            match key.code {
                KeyCode::Up | KeyCode::BackTab => form.focus_prev(),
                KeyCode::Down | KeyCode::Tab => form.focus_next(),
                KeyCode::Left => form.cycle(-1),
                KeyCode::Right => form.cycle(1),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Delete => form.clear(),
                KeyCode::Char(c) => form.input(c),
                _ => {}
            }
        }
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.cancel_mode(),
        KeyCode::Backspace => app.search_backspace(),
        KeyCode::Char(c) => app.search_input(c),
        _ => {}
    }
}

/// Handle mouse events for panning, zooming and picking
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    if !matches!(app.mode, Mode::Normal) || app.page == Page::Profile {
        return;
    }
    if app.page == Page::Explorer && app.explorer.view() == View::Table {
        match mouse.kind {
            MouseEventKind::ScrollUp => app.select_row(-1),
            MouseEventKind::ScrollDown => app.select_row(1),
            _ => {}
        }
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => {
            app.click_map(mouse.column, mouse.row);
            app.begin_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}
