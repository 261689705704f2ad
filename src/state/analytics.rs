use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::data::{Dataset, Record};
use crate::query::{self, ChoroplethScale, Criteria, MonthCount, YearSelection};
use crate::state::form::Control;

/// One chart on the analytics page, each with its own filter set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Widget {
    Monthly,
    Sector,
    Age,
    Choropleth,
    Yearly,
}

impl Widget {
    pub const ALL: [Widget; 5] = [
        Widget::Monthly,
        Widget::Sector,
        Widget::Age,
        Widget::Choropleth,
        Widget::Yearly,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Widget::Monthly => "Aylara Göre Dağılım",
            Widget::Sector => "Sektörlere Göre Dağılım",
            Widget::Age => "Yaş Gruplarına Göre Dağılım",
            Widget::Choropleth => "İllere Göre Dağılım",
            Widget::Yearly => "Yıllara Göre Karşılaştırma",
        }
    }

    /// Controls shown in this widget's filter form
    pub fn controls(self) -> &'static [Control] {
        use Control::*;
        match self {
            Widget::Monthly | Widget::Age | Widget::Choropleth => {
                &[Gender, Sector, DateStart, DateEnd]
            }
            Widget::Sector => &[Gender, DateStart, DateEnd],
            Widget::Yearly => &[Gender, Sector],
        }
    }

    /// The multi-year comparison ignores the page year
    pub fn uses_year(self) -> bool {
        self != Widget::Yearly
    }

    fn index(self) -> usize {
        match self {
            Widget::Monthly => 0,
            Widget::Sector => 1,
            Widget::Age => 2,
            Widget::Choropleth => 3,
            Widget::Yearly => 4,
        }
    }
}

/// Keep only the fields a widget's form can set
fn restrict(widget: Widget, criteria: Criteria) -> Criteria {
    let controls = widget.controls();
    let has = |c: Control| controls.contains(&c);
    Criteria {
        gender: criteria.gender.filter(|_| has(Control::Gender)),
        sector: criteria.sector.filter(|_| has(Control::Sector)),
        city: criteria.city.filter(|_| has(Control::City)),
        date_start: criteria.date_start.filter(|_| has(Control::DateStart)),
        date_end: criteria.date_end.filter(|_| has(Control::DateEnd)),
        ..Criteria::default()
    }
}

/// Controller of the analytics page: a page-level year plus independent
/// criteria per widget
pub struct AnalyticsState {
    dataset: Arc<Dataset>,
    year: YearSelection,
    criteria: [Criteria; 5],
}

impl AnalyticsState {
    pub fn new(dataset: Arc<Dataset>, year: YearSelection) -> Self {
        Self {
            dataset,
            year,
            criteria: Default::default(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn year(&self) -> YearSelection {
        self.year
    }

    /// Changing the year refreshes every year-dependent widget
    pub fn set_year(&mut self, year: YearSelection) {
        debug!(%year, "analytics year changed");
        self.year = year;
    }

    /// Step through the dataset's year options by `delta`, wrapping around
    pub fn cycle_year(&mut self, delta: isize) {
        let next = self.dataset.step_year(self.year, delta);
        self.set_year(next);
    }

    pub fn criteria(&self, widget: Widget) -> &Criteria {
        &self.criteria[widget.index()]
    }

    /// Replace one widget's filters; the other widgets are untouched
    pub fn set_criteria(&mut self, widget: Widget, criteria: Criteria) {
        self.criteria[widget.index()] = restrict(widget, criteria);
    }

    pub fn reset_criteria(&mut self, widget: Widget) {
        self.criteria[widget.index()] = Criteria::default();
    }

    /// The widget's filters combined with the page year where applicable
    pub fn effective(&self, widget: Widget) -> Criteria {
        let mut criteria = self.criteria(widget).clone();
        if widget.uses_year() {
            criteria.year = self.year;
        }
        criteria
    }

    fn subset(&self, widget: Widget) -> Vec<&Record> {
        let records = query::apply(self.dataset.records(), &self.effective(widget));
        debug!(?widget, matched = records.len(), "widget refreshed");
        records
    }

    pub fn monthly(&self) -> Vec<MonthCount> {
        query::by_month(self.subset(Widget::Monthly))
    }

    pub fn sectors(&self) -> Vec<(String, usize)> {
        query::by_sector(self.subset(Widget::Sector))
    }

    pub fn ages(&self) -> [usize; 6] {
        query::by_age_bucket(self.subset(Widget::Age))
    }

    pub fn city_counts(&self) -> (HashMap<String, usize>, ChoroplethScale) {
        let counts = query::by_city(self.subset(Widget::Choropleth));
        let scale = ChoroplethScale::from_counts(&counts);
        (counts, scale)
    }

    pub fn yearly(&self) -> BTreeMap<i32, [usize; 12]> {
        query::by_year_month(self.subset(Widget::Yearly))
    }
}
