use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use ratatui::layout::Rect;
use ratatui::widgets::TableState;
use tracing::{error, info};

use crate::adapters::{Marker, Popup, TableRow};
use crate::data::{Dataset, Geography};
use crate::error::LoadError;
use crate::map::{cluster_markers, Cluster, MapRenderer, SpatialGrid, Viewport};
use crate::query::{province_counts, ChoroplethScale, Tier, YearSelection};
use crate::state::{
    AnalyticsState, Control, ExplorerOptions, ExplorerState, FilterForm, ProfileState, View,
    Widget,
};

/// Click tolerance around a marker, braille pixels
const PICK_RADIUS: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Explorer,
    Analytics,
    Profile,
}

/// Which criteria a filter form writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Explorer,
    Widget(Widget),
}

pub enum Mode {
    Normal,
    /// Typing into the table name search
    Search,
    Form {
        target: FormTarget,
        form: FilterForm,
        error: Option<String>,
    },
}

/// Initial page and options, from the command line
#[derive(Debug, Clone)]
pub struct Startup {
    pub page: Page,
    pub fragment: String,
    pub options: ExplorerOptions,
    pub explorer_year: YearSelection,
    pub analytics_year: YearSelection,
    pub profile_id: Option<String>,
    pub export_dir: PathBuf,
}

/// Province counts prepared for one frame of the choropleth
pub struct Choropleth {
    pub counts: HashMap<String, usize>,
    pub tiers: HashMap<String, Tier>,
    pub scale: ChoroplethScale,
}

/// Cell under the mouse to braille pixel inside `area`
fn cell_to_pixel(area: Option<Rect>, col: u16, row: u16) -> Option<(i32, i32)> {
    let area = area?;
    let inside = col >= area.x
        && col < area.x + area.width
        && row >= area.y
        && row < area.y + area.height;
    inside.then(|| {
        (
            (col - area.x) as i32 * 2 + 1,
            (row - area.y) as i32 * 4 + 2,
        )
    })
}

pub struct App {
    pub page: Page,
    return_page: Page,
    pub explorer: ExplorerState,
    pub analytics: AnalyticsState,
    pub profile: Option<ProfileState>,
    load_error: Option<LoadError>,
    pub renderer: MapRenderer,
    /// Explorer map view
    pub viewport: Viewport,
    /// Analytics province map view
    pub choropleth_viewport: Viewport,
    map_area: Option<Rect>,
    choropleth_area: Option<Rect>,
    pub markers: Vec<Marker>,
    /// Selected marker: record index and popup content
    pub popup: Option<(usize, Popup)>,
    pub table: TableState,
    pub focus: Widget,
    /// Province under the mouse on the choropleth, with its count
    pub hover: Option<(String, usize)>,
    pub mode: Mode,
    pub status: Option<String>,
    export_dir: PathBuf,
    pub should_quit: bool,
    last_mouse: Option<(u16, u16)>,
    mouse_pos: Option<(u16, u16)>,
}

impl App {
    pub fn new(dataset: Result<Dataset, LoadError>, geography: Geography, startup: Startup) -> Self {
        let (dataset, load_error) = match dataset {
            Ok(dataset) => (dataset, None),
            Err(err) => {
                error!(error = %err, "dataset failed to load");
                (Dataset::default(), Some(err))
            }
        };
        let dataset = Arc::new(dataset);

        let mut explorer = ExplorerState::new(dataset.clone(), startup.options, &startup.fragment);
        if startup.explorer_year.is_active() {
            explorer.set_year(startup.explorer_year);
        }
        let analytics = AnalyticsState::new(dataset, startup.analytics_year);

        let mut app = Self {
            page: startup.page,
            return_page: Page::Explorer,
            explorer,
            analytics,
            profile: None,
            load_error,
            renderer: MapRenderer::new(geography),
            viewport: Viewport::turkey(160, 96),
            choropleth_viewport: Viewport::turkey(120, 64),
            map_area: None,
            choropleth_area: None,
            markers: Vec::new(),
            popup: None,
            table: TableState::default(),
            focus: Widget::Monthly,
            hover: None,
            mode: Mode::Normal,
            status: None,
            export_dir: startup.export_dir,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
        };
        app.refresh_markers();
        if startup.page == Page::Profile {
            app.resolve_profile(startup.profile_id.as_deref());
            app.return_page = Page::Explorer;
        }
        app
    }

    /// Banner text when the dataset could not be loaded
    pub fn load_error(&self) -> Option<String> {
        self.load_error.as_ref().map(|e| e.to_string())
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(text.into());
    }

    /// Consume the explorer's map refresh signal
    pub fn tick(&mut self) {
        if self.explorer.take_map_refresh() {
            if let Some(area) = self.map_area {
                self.viewport.resize(area.width as usize * 2, area.height as usize * 4);
            }
            self.refresh_markers();
        }
    }

    fn refresh_markers(&mut self) {
        self.markers = self.explorer.markers();
        if let Some((idx, _)) = &self.popup {
            if !self.explorer.filtered_indices().contains(idx) {
                self.popup = None;
            }
        }
        self.table.select(None);
    }

    pub fn go_to(&mut self, page: Page) {
        if page == Page::Explorer && self.explorer.view() == View::Map {
            self.explorer.switch_view(View::Map);
        }
        self.page = page;
        self.mode = Mode::Normal;
    }

    // explorer

    pub fn switch_view(&mut self, view: View) {
        self.explorer.switch_view(view);
        self.popup = None;
    }

    pub fn toggle_view(&mut self) {
        self.switch_view(self.explorer.view().toggled());
    }

    pub fn history_back(&mut self) {
        if !self.explorer.back() {
            self.set_status("Geçmişin başındasınız");
        }
    }

    pub fn history_forward(&mut self) {
        if !self.explorer.forward() {
            self.set_status("Geçmişin sonundasınız");
        }
    }

    pub fn cycle_explorer_year(&mut self, delta: isize) {
        if !self.explorer.options().year_filter {
            return;
        }
        let next = self
            .explorer
            .dataset()
            .step_year(self.explorer.criteria().year, delta);
        self.explorer.set_year(next);
        self.refresh_markers();
    }

    pub fn reset_explorer_filters(&mut self) {
        self.explorer.reset_filters();
        self.refresh_markers();
        self.set_status("Filtreler sıfırlandı");
    }

    pub fn export_csv(&mut self) {
        let today = Local::now().date_naive();
        match self.explorer.export_csv(&self.export_dir, today) {
            Ok(path) => self.set_status(format!("CSV kaydedildi: {}", path.display())),
            Err(err) => {
                error!(error = %err, "CSV export failed");
                self.set_status(err.to_string());
            }
        }
    }

    pub fn table_rows(&self) -> Vec<TableRow> {
        self.explorer.table_rows()
    }

    pub fn select_row(&mut self, delta: isize) {
        let len = self.table_rows().len();
        if len == 0 {
            self.table.select(None);
            return;
        }
        let current = self.table.selected().unwrap_or(0) as isize;
        let next = if self.table.selected().is_none() {
            0
        } else {
            (current + delta).clamp(0, len as isize - 1)
        };
        self.table.select(Some(next as usize));
    }

    pub fn open_selected_row(&mut self) {
        let rows = self.table_rows();
        if let Some(row) = self.table.selected().and_then(|i| rows.get(i)) {
            self.open_profile(row.record);
        }
    }

    pub fn search_input(&mut self, c: char) {
        let mut term = self.explorer.search().to_string();
        term.push(c);
        self.explorer.set_search(&term);
        self.table.select(None);
    }

    pub fn search_backspace(&mut self) {
        let mut term = self.explorer.search().to_string();
        term.pop();
        self.explorer.set_search(&term);
        self.table.select(None);
    }

    // map

    pub fn set_map_area(&mut self, area: Rect) {
        self.map_area = Some(area);
        self.viewport.resize(area.width as usize * 2, area.height as usize * 4);
    }

    pub fn set_choropleth_area(&mut self, area: Rect) {
        self.choropleth_area = Some(area);
        self.choropleth_viewport
            .resize(area.width as usize * 2, area.height as usize * 4);
    }

    pub fn clusters(&self) -> Vec<Cluster> {
        cluster_markers(&self.markers, &self.viewport)
    }

    fn active_viewport(&mut self) -> &mut Viewport {
        match self.page {
            Page::Analytics => &mut self.choropleth_viewport,
            _ => &mut self.viewport,
        }
    }

    fn active_area(&self) -> Option<Rect> {
        match self.page {
            Page::Analytics => self.choropleth_area,
            _ => self.map_area,
        }
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.active_viewport().pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.active_viewport().zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.active_viewport().zoom_out();
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = cell_to_pixel(self.active_area(), col, row) {
            self.active_viewport().zoom_in_at(px, py);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = cell_to_pixel(self.active_area(), col, row) {
            self.active_viewport().zoom_out_at(px, py);
        }
    }

    pub fn reset_view(&mut self) {
        let viewport = self.active_viewport();
        let (width, height) = (viewport.width, viewport.height);
        *viewport = Viewport::turkey(width, height);
    }

    pub fn begin_drag(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
    }

    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            let dx = (last_col as i32 - col as i32) * 2;
            let dy = (last_row as i32 - row as i32) * 4;
            self.pan(dx, dy);
        }
        self.last_mouse = Some((col, row));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.hover_choropleth(col, row);
    }

    /// Mouse cell relative to the explorer map area
    pub fn map_cursor(&self) -> Option<(u16, u16)> {
        let area = self.map_area?;
        let (col, row) = self.mouse_pos?;
        let inside = col >= area.x
            && col < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        inside.then(|| (col - area.x, row - area.y))
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom / crate::map::TURKEY_ZOOM)
    }

    pub fn center_coords(&self) -> String {
        format!("{:.2}°N {:.2}°E", self.viewport.center_lat, self.viewport.center_lon)
    }

    /// Click on the explorer map: a single marker opens its popup, a
    /// cluster zooms in around itself
    pub fn click_map(&mut self, col: u16, row: u16) {
        if self.page != Page::Explorer || self.explorer.view() != View::Map {
            return;
        }
        let Some((px, py)) = cell_to_pixel(self.map_area, col, row) else {
            return;
        };

        let clusters = self.clusters();
        let mut grid = SpatialGrid::new(PICK_RADIUS * 2.0);
        for (idx, cluster) in clusters.iter().enumerate() {
            grid.insert(cluster.px as f64, cluster.py as f64, idx);
        }
        let Some(cluster) = grid
            .nearest(px as f64, py as f64, PICK_RADIUS)
            .and_then(|&idx| clusters.get(idx))
        else {
            self.popup = None;
            return;
        };

        if cluster.is_single() {
            let marker = cluster.members.first().and_then(|&m| self.markers.get(m));
            if let Some(marker) = marker {
                let record = marker.record;
                if let Some(r) = self.explorer.dataset().records().get(record) {
                    self.popup = Some((record, Popup::from_record(r)));
                }
            }
        } else {
            self.viewport.zoom_in_at(cluster.px, cluster.py);
            self.viewport.zoom_in_at(cluster.px, cluster.py);
        }
    }

    pub fn close_popup(&mut self) -> bool {
        self.popup.take().is_some()
    }

    pub fn open_popup_profile(&mut self) {
        if let Some((record, _)) = self.popup {
            self.open_profile(record);
        }
    }

    // analytics

    pub fn focus_widget(&mut self, delta: isize) {
        let pos = Widget::ALL.iter().position(|w| *w == self.focus).unwrap_or(0) as isize;
        let len = Widget::ALL.len() as isize;
        self.focus = Widget::ALL[(pos + delta).rem_euclid(len) as usize];
    }

    pub fn cycle_analytics_year(&mut self, delta: isize) {
        self.analytics.cycle_year(delta);
    }

    pub fn reset_focused_widget(&mut self) {
        self.analytics.reset_criteria(self.focus);
        self.set_status(format!("{}: filtreler sıfırlandı", self.focus.title()));
    }

    pub fn choropleth(&self) -> Choropleth {
        let (counts, scale) = self.analytics.city_counts();
        let tiers = province_counts(self.renderer.geography(), &counts, &scale)
            .into_iter()
            .map(|(name, _, tier)| (name, tier))
            .collect();
        Choropleth {
            counts,
            tiers,
            scale,
        }
    }

    /// Track the province under the mouse on the analytics map
    pub fn hover_choropleth(&mut self, col: u16, row: u16) {
        if self.page != Page::Analytics {
            return;
        }
        self.hover = cell_to_pixel(self.choropleth_area, col, row).and_then(|(px, py)| {
            let (lon, lat) = self.choropleth_viewport.unproject(px, py);
            let province = self.renderer.province_at(lon, lat)?;
            let (counts, _) = self.analytics.city_counts();
            let count = counts.get(&province.name).copied().unwrap_or(0);
            Some((province.name.clone(), count))
        });
    }

    // forms

    pub fn open_form(&mut self) {
        let cities = self.explorer.dataset().cities();
        let (target, form) = match self.page {
            Page::Explorer => (
                FormTarget::Explorer,
                FilterForm::new(&Control::EXPLORER, self.explorer.criteria(), cities),
            ),
            Page::Analytics => (
                FormTarget::Widget(self.focus),
                FilterForm::new(
                    self.focus.controls(),
                    self.analytics.criteria(self.focus),
                    cities,
                ),
            ),
            Page::Profile => return,
        };
        self.mode = Mode::Form {
            target,
            form,
            error: None,
        };
    }

    pub fn form_mut(&mut self) -> Option<&mut FilterForm> {
        match &mut self.mode {
            Mode::Form { form, .. } => Some(form),
            _ => None,
        }
    }

    /// Apply the open form; on invalid input the form stays open with the error
    pub fn submit_form(&mut self) {
        let Mode::Form { target, form, error } = &mut self.mode else {
            return;
        };
        let target = *target;
        let base = match target {
            FormTarget::Explorer => self.explorer.criteria().clone(),
            FormTarget::Widget(widget) => self.analytics.criteria(widget).clone(),
        };
        match form.to_criteria(&base) {
            Ok(criteria) => {
                self.mode = Mode::Normal;
                match target {
                    FormTarget::Explorer => {
                        self.explorer.set_criteria(criteria);
                        self.refresh_markers();
                        self.set_status(format!("{} kayıt", self.explorer.filtered_indices().len()));
                    }
                    FormTarget::Widget(widget) => self.analytics.set_criteria(widget, criteria),
                }
            }
            Err(message) => *error = Some(message),
        }
    }

    pub fn cancel_mode(&mut self) {
        self.mode = Mode::Normal;
    }

    // profile

    pub fn open_profile(&mut self, record: usize) {
        let id = self
            .explorer
            .dataset()
            .records()
            .get(record)
            .map(|r| r.id.clone());
        self.return_page = self.page;
        self.resolve_profile(id.as_deref());
        self.page = Page::Profile;
        self.mode = Mode::Normal;
    }

    fn resolve_profile(&mut self, id: Option<&str>) {
        let dataset = match &self.load_error {
            Some(err) => Err(err),
            None => Ok(self.explorer.dataset()),
        };
        let state = ProfileState::resolve(dataset, id);
        if let ProfileState::Found(card) = &state {
            info!(name = %card.name, "profile opened");
        }
        self.profile = Some(state);
    }

    pub fn close_profile(&mut self) {
        let page = self.return_page;
        self.go_to(page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;

    fn startup(page: Page) -> Startup {
        Startup {
            page,
            fragment: String::new(),
            options: ExplorerOptions::default(),
            explorer_year: YearSelection::All,
            analytics_year: YearSelection::All,
            profile_id: None,
            export_dir: PathBuf::from("."),
        }
    }

    fn dataset() -> Dataset {
        let mk = |id: &str, date: &str, lat: f64, lon: f64| Record {
            id: id.into(),
            person_name: Some(format!("İşçi {id}")),
            date: Some(date.into()),
            city: Some("Ankara".into()),
            coords: Some(vec![lat, lon]),
            ..Default::default()
        };
        Dataset::new(vec![
            mk("a", "01.01.2024", 39.93, 32.85),
            mk("b", "01.06.2025", 38.42, 27.14),
        ])
    }

    #[test]
    fn test_load_failure_shows_banner_and_profile_message() {
        let err = LoadError::Io {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let mut start = startup(Page::Profile);
        start.profile_id = Some("a".into());
        let app = App::new(Err(err), Geography::default(), start);
        assert!(app.load_error().is_some());
        assert_eq!(app.profile, Some(ProfileState::LoadFailed));
        assert!(app.markers.is_empty());
    }

    #[test]
    fn test_year_cycling_updates_markers() {
        let mut app = App::new(Ok(dataset()), Geography::default(), startup(Page::Explorer));
        assert_eq!(app.markers.len(), 2);
        app.cycle_explorer_year(1);
        assert_eq!(app.explorer.criteria().year, YearSelection::Year(2025));
        assert_eq!(app.markers.len(), 1);
        app.cycle_explorer_year(-1);
        assert_eq!(app.markers.len(), 2);
    }

    #[test]
    fn test_click_single_marker_opens_popup() {
        let mut app = App::new(Ok(dataset()), Geography::default(), startup(Page::Explorer));
        app.set_map_area(Rect::new(0, 0, 120, 30));
        let (px, py) = app.viewport.project(32.85, 39.93);
        app.click_map((px / 2) as u16, (py / 4) as u16);
        let (record, popup) = app.popup.clone().unwrap();
        assert_eq!(record, 0);
        assert_eq!(popup.name, "İşçi a");

        app.open_popup_profile();
        assert_eq!(app.page, Page::Profile);
        assert!(matches!(app.profile, Some(ProfileState::Found(_))));
        app.close_profile();
        assert_eq!(app.page, Page::Explorer);
    }

    #[test]
    fn test_form_submission_and_error() {
        let mut app = App::new(Ok(dataset()), Geography::default(), startup(Page::Explorer));
        app.open_form();
        {
            let form = app.form_mut().unwrap();
            form.focus_next();
            form.input('1');
        }
        app.submit_form();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.explorer.criteria().age.max, Some(1));
        // both records have unknown ages and the age filter is now active
        assert!(app.markers.is_empty());

        app.page = Page::Analytics;
        app.focus = Widget::Monthly;
        app.open_form();
        {
            let form = app.form_mut().unwrap();
            form.focus_next();
            form.focus_next();
            form.input('x');
            form.input('9');
        }
        app.submit_form();
        // `x` is rejected by the date control, leaving the incomplete `9`
        assert!(matches!(app.mode, Mode::Form { error: Some(_), .. }));
        assert!(app.analytics.criteria(Widget::Monthly).date_start.is_none());
    }
}
