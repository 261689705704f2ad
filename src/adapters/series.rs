use std::collections::BTreeMap;

use crate::data::{Record, TURKISH_MONTHS};
use crate::query::{MonthCount, AGE_BUCKETS};

/// Sector chart palette, cycled by position
pub const SECTOR_PALETTE: [&str; 11] = [
    "#c41e3a", "#e74c3c", "#f39c12", "#27ae60", "#3498db", "#9b59b6", "#1abc9c", "#e67e22",
    "#2ecc71", "#8e44ad", "#16a085",
];

/// Bar colour used for children in the age chart and on the map
pub const CHILD_COLOR: &str = "#3498db";
/// Default bar and marker colour
pub const ACCENT_COLOR: &str = "#c41e3a";

/// Parse `#rrggbb` into components; malformed input yields mid grey
pub fn hex_rgb(hex: &str) -> (u8, u8, u8) {
    let digits = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) if digits.len() == 6 => (r, g, b),
        _ => (128, 128, 128),
    }
}

/// One labelled bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarPoint {
    pub label: String,
    pub value: u64,
    pub color: &'static str,
}

pub fn monthly_bars(months: &[MonthCount]) -> Vec<BarPoint> {
    months
        .iter()
        .map(|m| BarPoint {
            label: m.label.clone(),
            value: m.count as u64,
            color: ACCENT_COLOR,
        })
        .collect()
}

pub fn sector_bars(sectors: &[(String, usize)]) -> Vec<BarPoint> {
    sectors
        .iter()
        .enumerate()
        .map(|(i, (label, count))| BarPoint {
            label: label.clone(),
            value: *count as u64,
            color: SECTOR_PALETTE[i % SECTOR_PALETTE.len()],
        })
        .collect()
}

/// Age chart bars; the child bucket is highlighted
pub fn age_bars(counts: &[usize; 6]) -> Vec<BarPoint> {
    AGE_BUCKETS
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(i, (bucket, count))| BarPoint {
            label: bucket.label.to_string(),
            value: *count as u64,
            color: if i == 0 { CHILD_COLOR } else { ACCENT_COLOR },
        })
        .collect()
}

/// One year of the year-over-year chart
#[derive(Debug, Clone, PartialEq)]
pub struct YearLine {
    pub year: i32,
    pub color: &'static str,
    /// (month index 0..12, count)
    pub points: Vec<(f64, f64)>,
}

pub fn year_color(year: i32) -> &'static str {
    match year {
        2023 => "#9b59b6",
        2024 => "#3498db",
        2025 => "#c41e3a",
        _ => "#95a5a6",
    }
}

pub fn yearly_lines(years: &BTreeMap<i32, [usize; 12]>) -> Vec<YearLine> {
    years
        .iter()
        .map(|(&year, months)| YearLine {
            year,
            color: year_color(year),
            points: months
                .iter()
                .enumerate()
                .map(|(m, &c)| (m as f64, c as f64))
                .collect(),
        })
        .collect()
}

/// Short month labels for the yearly chart axis
pub fn month_axis_labels() -> Vec<&'static str> {
    TURKISH_MONTHS.to_vec()
}

/// A map marker for one record with valid coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Index of the record in the dataset
    pub record: usize,
    pub lat: f64,
    pub lon: f64,
    pub child: bool,
}

/// Markers for the given dataset indices; records without valid coordinates
/// are skipped
pub fn markers(records: &[Record], indices: &[usize]) -> Vec<Marker> {
    indices
        .iter()
        .filter_map(|&idx| {
            let record = records.get(idx)?;
            let Some((lat, lon)) = record.coords() else {
                tracing::trace!(id = %record.id, "invalid coordinates, marker skipped");
                return None;
            };
            Some(Marker {
                record: idx,
                lat,
                lon,
                child: record.is_child(),
            })
        })
        .collect()
}

/// Cells of one table row: name, date, city, district, sector, cause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub record: usize,
    pub cells: [String; 6],
}

pub const TABLE_HEADERS: [&str; 6] = ["İsim", "Tarih", "Şehir", "İlçe", "Sektör", "Neden"];

pub fn table_row(idx: usize, record: &Record) -> TableRow {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    TableRow {
        record: idx,
        cells: [
            record.display_name().to_string(),
            text(&record.date),
            text(&record.city),
            text(&record.district),
            text(&record.sector),
            text(&record.cause),
        ],
    }
}
