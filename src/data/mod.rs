mod geography;
mod record;

pub use geography::{feature_name, Geography, Province, Ring};
pub use record::{
    month_name, parse_dotted_date, parse_lenient_date, Message, Record, DEFAULT_BUCKET_AGE,
    SECTOR_OPTIONS, TURKISH_MONTHS, UNKNOWN_SECTOR, UNNAMED_WORKER,
};

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use geojson::GeoJson;
use reqwest::header::CACHE_CONTROL;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::query::YearSelection;

/// Where a resource comes from: a local file or an HTTP(S) URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn parse(text: &str) -> Self {
        if text.starts_with("http://") || text.starts_with("https://") {
            DataSource::Url(text.to_string())
        } else {
            DataSource::Path(PathBuf::from(text))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

/// Append a `ts` query parameter so intermediaries cannot serve a stale copy
pub fn cache_busted(url: &str, millis: i64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}ts={millis}")
}

/// Read the raw bytes of a resource. URLs are fetched fresh every time.
pub fn fetch_bytes(source: &DataSource) -> Result<Vec<u8>, LoadError> {
    match source {
        DataSource::Path(path) => fs::read(path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        }),
        DataSource::Url(url) => {
            let busted = cache_busted(url, Utc::now().timestamp_millis());
            debug!(url = %busted, "fetching");
            let http = |source: reqwest::Error| LoadError::Http {
                url: url.clone(),
                source,
            };
            let response = reqwest::blocking::Client::new()
                .get(&busted)
                .header(CACHE_CONTROL, "no-store")
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(http)?;
            Ok(response.bytes().map_err(http)?.to_vec())
        }
    }
}

/// The immutable in-memory record set
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Parse a JSON array of records
    pub fn from_json(mut bytes: Vec<u8>) -> Result<Self, LoadError> {
        let records: Vec<Record> = simd_json::serde::from_slice(&mut bytes)?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact id lookup for the profile deep link
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Distinct city names, sorted, for the city filter
    pub fn cities(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.city.as_deref())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Distinct parsed years, ascending
    pub fn years(&self) -> Vec<i32> {
        use chrono::Datelike;
        self.records
            .iter()
            .filter_map(|r| r.parsed_date())
            .map(|d| d.year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// `Tüm Yıllar` followed by every dataset year, newest first
    pub fn year_options(&self) -> Vec<YearSelection> {
        std::iter::once(YearSelection::All)
            .chain(self.years().into_iter().rev().map(YearSelection::Year))
            .collect()
    }

    /// Step `delta` places through `year_options` from `current`, wrapping.
    /// An unknown `current` counts as `All`.
    pub fn step_year(&self, current: YearSelection, delta: isize) -> YearSelection {
        let options = self.year_options();
        let pos = options.iter().position(|y| *y == current).unwrap_or(0) as isize;
        options[(pos + delta).rem_euclid(options.len() as isize) as usize]
    }
}

/// Load the dataset from a file or URL
pub fn load_dataset(source: &DataSource) -> Result<Dataset, LoadError> {
    let dataset = Dataset::from_json(fetch_bytes(source)?)?;
    info!(records = dataset.len(), source = %source, "dataset loaded");
    Ok(dataset)
}

/// Load province geometry from a GeoJSON file or URL
pub fn load_geography(source: &DataSource) -> Result<Geography, LoadError> {
    let text = String::from_utf8(fetch_bytes(source)?)?;
    let geojson: GeoJson = text.parse()?;
    let geography = Geography::from_geojson(&geojson);
    info!(provinces = geography.provinces.len(), source = %source, "geography loaded");
    Ok(geography)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_source_kind() {
        assert_eq!(
            DataSource::parse("https://example.org/data.json"),
            DataSource::Url("https://example.org/data.json".into())
        );
        assert_eq!(DataSource::parse("data.json"), DataSource::Path("data.json".into()));
    }

    #[test]
    fn test_cache_busted() {
        assert_eq!(cache_busted("https://x/data.json", 42), "https://x/data.json?ts=42");
        assert_eq!(cache_busted("https://x/data.json?v=1", 42), "https://x/data.json?v=1&ts=42");
    }

    #[test]
    fn test_load_dataset_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"a","city":"Ankara","date":"01.02.2024"}},{{"id":"b","city":"İzmir"}},{{"id":"c","city":"Ankara"}}]"#
        )
        .unwrap();

        let dataset = load_dataset(&DataSource::Path(file.path().to_path_buf())).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.cities(), vec!["Ankara".to_string(), "İzmir".to_string()]);
        assert_eq!(dataset.years(), vec![2024]);
        assert_eq!(dataset.find("b").map(|r| r.id.as_str()), Some("b"));
        assert!(dataset.find("zzz").is_none());
    }

    #[test]
    fn test_step_year_newest_first_and_wraps() {
        let dataset = Dataset::new(
            ["01.01.2023", "01.01.2025", "bilinmiyor"]
                .iter()
                .map(|date| Record {
                    date: Some(date.to_string()),
                    ..Default::default()
                })
                .collect(),
        );
        assert_eq!(
            dataset.year_options(),
            vec![YearSelection::All, YearSelection::Year(2025), YearSelection::Year(2023)]
        );
        assert_eq!(dataset.step_year(YearSelection::All, 1), YearSelection::Year(2025));
        assert_eq!(dataset.step_year(YearSelection::All, -1), YearSelection::Year(2023));
        assert_eq!(dataset.step_year(YearSelection::Year(2023), 1), YearSelection::All);
        assert_eq!(dataset.step_year(YearSelection::Year(1999), 1), YearSelection::Year(2025));
    }

    #[test]
    fn test_load_dataset_rejects_non_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"id":"a"}}"#).unwrap();
        let err = load_dataset(&DataSource::Path(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, LoadError::Dataset(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_dataset(&DataSource::Path("/nonexistent/data.json".into())).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
