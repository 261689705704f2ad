use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain or parse a remote or local resource
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("dataset is not a JSON array of records: {0}")]
    Dataset(#[from] simd_json::Error),
    #[error("geography is not valid GeoJSON: {0}")]
    Geography(#[from] geojson::Error),
    #[error("geography document is not UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Failure while writing an export artifact
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing matches the current filters
    #[error("Dışa aktarılacak veri bulunamadı.")]
    Empty,
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}
