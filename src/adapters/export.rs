use std::cmp::Reverse;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::adapters::markup::Popup;
use crate::data::Record;
use crate::error::ExportError;
use crate::query::AgeFilter;

/// UTF-8 byte order mark so spreadsheet tools pick the right encoding
pub const BOM: &str = "\u{FEFF}";

pub const CSV_HEADERS: [&str; 10] = [
    "İsim", "Tarih", "Şehir", "İlçe", "Yaş", "Cinsiyet", "Sektör", "Şirket", "Neden", "Açıklama",
];

/// Newest first by lenient date; undated records last, ties in input order
pub fn sort_newest_first<'a>(records: &[&'a Record]) -> Vec<&'a Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| Reverse(r.sort_date()));
    sorted
}

fn csv_fields(record: &Record) -> [String; 10] {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    [
        record.display_name().to_string(),
        text(&record.date),
        text(&record.city),
        text(&record.district),
        record.age_display(),
        text(&record.gender),
        text(&record.sector),
        text(&record.company),
        text(&record.cause),
        text(&record.details),
    ]
}

/// Write the CSV artifact: BOM, fully quoted fields, `\n` line endings,
/// newest record first
pub fn write_csv<W: Write>(records: &[&Record], mut out: W) -> Result<(), ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    out.write_all(BOM.as_bytes()).map_err(|source| ExportError::Io {
        path: PathBuf::from("-"),
        source,
    })?;

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    writer.write_record(CSV_HEADERS)?;
    for record in sort_newest_first(records) {
        writer.write_record(csv_fields(record))?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: PathBuf::from("-"),
        source,
    })?;
    Ok(())
}

/// `is_cinayetleri_<date>[_yas<min>-<max>].csv`
pub fn export_filename(today: NaiveDate, age: &AgeFilter) -> String {
    let mut name = format!("is_cinayetleri_{}", today.format("%Y-%m-%d"));
    if age.has_input() {
        let min = age.min.unwrap_or(0);
        let max = age.max.map_or_else(|| "max".to_string(), |m| m.to_string());
        name.push_str(&format!("_yas{min}-{max}"));
    }
    name.push_str(".csv");
    name
}

/// Write the CSV into `dir` and return the created path
pub fn export_to_dir(
    dir: &Path,
    today: NaiveDate,
    age: &AgeFilter,
    records: &[&Record],
) -> Result<PathBuf, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    let path = dir.join(export_filename(today, age));
    let file = File::create(&path).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    write_csv(records, BufWriter::new(file))?;
    Ok(path)
}

/// GeoJSON FeatureCollection of marker points with escaped popup markup
pub fn markers_geojson(records: &[&Record]) -> FeatureCollection {
    let features = records
        .iter()
        .filter_map(|record| {
            let (lat, lon) = record.coords()?;
            let popup = Popup::from_record(record);
            let mut properties = JsonObject::new();
            properties.insert("id".into(), JsonValue::from(record.id.clone()));
            properties.insert("name".into(), JsonValue::from(popup.name.clone()));
            properties.insert("child".into(), JsonValue::from(record.is_child()));
            properties.insert("popup".into(), JsonValue::from(popup.to_html()));
            Some(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![lon, lat]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
