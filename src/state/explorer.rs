use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::adapters::export::export_to_dir;
use crate::adapters::series::{self, Marker, TableRow};
use crate::data::{Dataset, Record};
use crate::error::ExportError;
use crate::query::{matching_indices, Criteria, YearSelection};
use crate::state::navigation::{Navigation, View};

/// Switches that distinguish the two historical variants of the map/table page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplorerOptions {
    /// Offer the year control
    pub year_filter: bool,
    /// Draw markers of workers under 18 in a separate colour
    pub highlight_children: bool,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            year_filter: true,
            highlight_children: true,
        }
    }
}

/// Controller of the map/table explorer.
///
/// Owns the criteria, the last filtered subset and the view history. All
/// writes go through the action methods, which re-run the filter engine.
pub struct ExplorerState {
    dataset: Arc<Dataset>,
    options: ExplorerOptions,
    criteria: Criteria,
    search: String,
    filtered: Vec<usize>,
    nav: Navigation,
    map_refresh: bool,
}

impl ExplorerState {
    pub fn new(dataset: Arc<Dataset>, options: ExplorerOptions, fragment: &str) -> Self {
        let nav = Navigation::new(fragment);
        let map_refresh = nav.view() == View::Map;
        let mut state = Self {
            dataset,
            options,
            criteria: Criteria::default(),
            search: String::new(),
            filtered: Vec::new(),
            nav,
            map_refresh,
        };
        state.refilter();
        state
    }

    fn refilter(&mut self) {
        self.filtered = matching_indices(self.dataset.records(), &self.criteria);
        debug!(
            matched = self.filtered.len(),
            total = self.dataset.len(),
            "explorer filters applied"
        );
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn options(&self) -> ExplorerOptions {
        self.options
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Replace the criteria. The name search lives in `set_search`, and the
    /// year is dropped when the year control is disabled.
    pub fn set_criteria(&mut self, mut criteria: Criteria) {
        criteria.name_query = None;
        if !self.options.year_filter {
            criteria.year = YearSelection::All;
        }
        self.criteria = criteria;
        self.refilter();
    }

    pub fn set_year(&mut self, year: YearSelection) {
        let criteria = Criteria {
            year,
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
    }

    pub fn reset_filters(&mut self) {
        self.criteria = Criteria::default();
        self.refilter();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    /// Records matching the criteria (ignores the table search)
    pub fn filtered(&self) -> Vec<&Record> {
        self.filtered
            .iter()
            .filter_map(|&idx| self.dataset.records().get(idx))
            .collect()
    }

    pub fn filtered_indices(&self) -> &[usize] {
        &self.filtered
    }

    /// Table rows: filtered, narrowed by the name search, newest first
    pub fn table_rows(&self) -> Vec<TableRow> {
        let search = Criteria {
            name_query: Some(self.search.clone()),
            ..Criteria::default()
        };
        let records = self.dataset.records();
        let mut visible: Vec<(usize, &Record)> = self
            .filtered
            .iter()
            .filter_map(|&idx| records.get(idx).map(|r| (idx, r)))
            .filter(|(_, r)| search.matches_name(r))
            .collect();
        // stable, so equal dates keep dataset order
        visible.sort_by_key(|(_, r)| Reverse(r.sort_date()));

        visible
            .into_iter()
            .map(|(idx, r)| series::table_row(idx, r))
            .collect()
    }

    /// Map markers for the filtered subset
    pub fn markers(&self) -> Vec<Marker> {
        let mut markers = series::markers(self.dataset.records(), &self.filtered);
        if !self.options.highlight_children {
            markers.iter_mut().for_each(|m| m.child = false);
        }
        markers
    }

    pub fn view(&self) -> View {
        self.nav.view()
    }

    pub fn fragment(&self) -> &str {
        self.nav.fragment()
    }

    /// Show `view`, recording it in the history if it changes the location
    pub fn switch_view(&mut self, view: View) {
        if !self.nav.navigate(view.fragment()) {
            debug!(fragment = view.fragment(), "view re-applied");
        }
        self.apply_view();
    }

    pub fn back(&mut self) -> bool {
        let moved = self.nav.back().is_some();
        if moved {
            self.apply_view();
        }
        moved
    }

    pub fn forward(&mut self) -> bool {
        let moved = self.nav.forward().is_some();
        if moved {
            self.apply_view();
        }
        moved
    }

    fn apply_view(&mut self) {
        if self.nav.view() == View::Map {
            self.map_refresh = true;
        }
    }

    /// One-shot signal that the map must re-measure itself
    pub fn take_map_refresh(&mut self) -> bool {
        std::mem::take(&mut self.map_refresh)
    }

    /// Export the filtered subset (not narrowed by the table search)
    pub fn export_csv(&self, dir: &Path, today: NaiveDate) -> Result<PathBuf, ExportError> {
        let path = export_to_dir(dir, today, &self.criteria.age, &self.filtered())?;
        info!(path = %path.display(), rows = self.filtered.len(), "CSV exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::AgeFilter;

    fn dataset() -> Arc<Dataset> {
        let mk = |id: &str, name: &str, date: &str, city: &str, age: Option<f64>| Record {
            id: id.into(),
            person_name: Some(name.into()),
            date: Some(date.into()),
            city: Some(city.into()),
            age,
            coords: Some(vec![39.0, 35.0]),
            ..Default::default()
        };
        Arc::new(Dataset::new(vec![
            mk("1", "Ayşe Demir", "01.02.2024", "Ankara", Some(16.0)),
            mk("2", "Mehmet Kaya", "10.05.2025", "İzmir", Some(40.0)),
            mk("3", "Ali Kaya", "03.03.2025", "Ankara", None),
        ]))
    }

    #[test]
    fn test_initial_state_shows_everything() {
        let state = ExplorerState::new(dataset(), ExplorerOptions::default(), "");
        assert_eq!(state.filtered().len(), 3);
        assert_eq!(state.view(), View::Map);
    }

    #[test]
    fn test_table_is_sorted_and_searchable() {
        let mut state = ExplorerState::new(dataset(), ExplorerOptions::default(), "#table");
        let ids: Vec<usize> = state.table_rows().iter().map(|r| r.record).collect();
        assert_eq!(ids, vec![1, 2, 0]);

        state.set_search("KAYA");
        let names: Vec<String> = state.table_rows().iter().map(|r| r.cells[0].clone()).collect();
        assert_eq!(names, vec!["Mehmet Kaya", "Ali Kaya"]);
        // search does not narrow the map or the export
        assert_eq!(state.filtered().len(), 3);
        assert_eq!(state.markers().len(), 3);
    }

    #[test]
    fn test_filters_and_reset() {
        let mut state = ExplorerState::new(dataset(), ExplorerOptions::default(), "");
        state.set_criteria(Criteria {
            city: Some("Ankara".into()),
            age: AgeFilter::new(Some(10), Some(20)),
            ..Default::default()
        });
        assert_eq!(state.filtered_indices(), &[0]);

        state.reset_filters();
        assert_eq!(state.filtered().len(), 3);
    }

    #[test]
    fn test_year_control_can_be_disabled() {
        let options = ExplorerOptions {
            year_filter: false,
            highlight_children: false,
        };
        let mut state = ExplorerState::new(dataset(), options, "");
        state.set_year(YearSelection::Year(2024));
        assert_eq!(state.criteria().year, YearSelection::All);
        assert_eq!(state.filtered().len(), 3);
        assert!(state.markers().iter().all(|m| !m.child));

        let mut with_year = ExplorerState::new(dataset(), ExplorerOptions::default(), "");
        with_year.set_year(YearSelection::Year(2024));
        assert_eq!(with_year.filtered_indices(), &[0]);
        assert!(with_year.markers()[0].child);
    }

    #[test]
    fn test_view_switch_raises_map_refresh() {
        let mut state = ExplorerState::new(dataset(), ExplorerOptions::default(), "#table");
        assert!(!state.take_map_refresh());

        state.switch_view(View::Map);
        assert_eq!(state.fragment(), "#map");
        assert!(state.take_map_refresh());
        assert!(!state.take_map_refresh());

        assert!(state.back());
        assert_eq!(state.view(), View::Table);
        assert!(state.forward());
        assert_eq!(state.view(), View::Map);
        assert!(state.take_map_refresh());
    }

    #[test]
    fn test_export_of_empty_selection_fails() {
        let mut state = ExplorerState::new(dataset(), ExplorerOptions::default(), "");
        state.set_criteria(Criteria {
            city: Some("Van".into()),
            ..Default::default()
        });
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(matches!(state.export_csv(dir.path(), today), Err(ExportError::Empty)));
    }
}
