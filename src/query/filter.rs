use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::data::Record;

/// Effective bounds when an age input is left empty
pub const AGE_FLOOR: u32 = 0;
pub const AGE_CEILING: u32 = 150;

/// Year control: either every year or one specific year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearSelection {
    #[default]
    All,
    Year(i32),
}

impl YearSelection {
    pub fn is_active(self) -> bool {
        matches!(self, YearSelection::Year(_))
    }
}

impl fmt::Display for YearSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearSelection::All => f.write_str("all"),
            YearSelection::Year(y) => write!(f, "{y}"),
        }
    }
}

impl FromStr for YearSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(YearSelection::All);
        }
        s.parse::<i32>()
            .map(YearSelection::Year)
            .map_err(|_| format!("invalid year `{s}` (expected `all` or a year)"))
    }
}

/// Raw age inputs. Empty inputs fall back to `0..=150`; a zero maximum is
/// treated as empty, matching the numeric input controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgeFilter {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl AgeFilter {
    pub fn new(min: Option<u32>, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Effective inclusive `(min, max)` bounds
    pub fn bounds(&self) -> (f64, f64) {
        let min = self.min.unwrap_or(AGE_FLOOR);
        let max = self.max.filter(|m| *m != 0).unwrap_or(AGE_CEILING);
        (min as f64, max as f64)
    }

    /// Active once the effective bounds differ from the defaults
    pub fn is_active(&self) -> bool {
        self.bounds() != (AGE_FLOOR as f64, AGE_CEILING as f64)
    }

    /// Whether any age input was filled in, even with a default value
    pub fn has_input(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Interval-overlap test. A record without age information passes only
    /// while the filter is inactive.
    pub fn accepts(&self, record: &Record) -> bool {
        let (min, max) = self.bounds();
        match record.age_interval() {
            Some((lo, hi)) => lo <= max && hi >= min,
            None => !self.is_active(),
        }
    }
}

/// Active filter values for one widget. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub gender: Option<String>,
    pub sector: Option<String>,
    pub city: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub age: AgeFilter,
    pub year: YearSelection,
    /// Table-only name search; ignored by `matches`
    pub name_query: Option<String>,
}

fn equals(expected: &Option<String>, actual: &Option<String>) -> bool {
    match expected.as_deref().filter(|s| !s.is_empty()) {
        Some(want) => actual.as_deref() == Some(want),
        None => true,
    }
}

impl Criteria {
    /// Whether any date-scoped constraint (year or range bound) is set
    pub fn is_date_scoped(&self) -> bool {
        self.year.is_active() || self.date_start.is_some() || self.date_end.is_some()
    }

    /// Conjunction of every active criterion except the name search
    pub fn matches(&self, record: &Record) -> bool {
        if !equals(&self.gender, &record.gender)
            || !equals(&self.sector, &record.sector)
            || !equals(&self.city, &record.city)
        {
            return false;
        }

        if !self.age.accepts(record) {
            return false;
        }

        if self.is_date_scoped() {
            let Some(date) = record.parsed_date() else {
                return false;
            };
            if let YearSelection::Year(year) = self.year {
                if date.year() != year {
                    return false;
                }
            }
            if self.date_start.is_some_and(|start| date < start) {
                return false;
            }
            if self.date_end.is_some_and(|end| date > end) {
                return false;
            }
        }

        true
    }

    /// Case-insensitive substring match on the display name
    pub fn matches_name(&self, record: &Record) -> bool {
        match self.name_query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => record
                .display_name()
                .to_lowercase()
                .contains(&query.to_lowercase()),
            None => true,
        }
    }

    /// Same criteria with date range and year cleared
    pub fn without_dates(&self) -> Self {
        Self {
            date_start: None,
            date_end: None,
            year: YearSelection::All,
            ..self.clone()
        }
    }
}

/// Filtered subset of `records`, in source order
pub fn apply<'a>(records: &'a [Record], criteria: &Criteria) -> Vec<&'a Record> {
    records.iter().filter(|r| criteria.matches(r)).collect()
}

/// Indices of the matching records, in source order
pub fn matching_indices(records: &[Record], criteria: &Criteria) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(idx, _)| idx)
        .collect()
}

/// Parse a date control value: `YYYY-MM-DD` or `DD.MM.YYYY`
pub fn parse_date_input(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| crate::data::parse_dotted_date(text))
}
