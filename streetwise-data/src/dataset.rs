//! The persisted street dataset `{dir}/{name}_streets.json`.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use streetwise_core::{ExtractionReport, StreetEntity, round_to_hundredths};
use streetwise_fs::{read_utf8_file, write_utf8_file};
use thiserror::Error;

/// Suffix appended to the dataset name to form its file name.
pub const DATASET_FILE_SUFFIX: &str = "_streets.json";

/// Failures reading or writing a dataset file.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be read or written.
    #[error("dataset I/O failed at {path}")]
    Io {
        /// File involved.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The dataset could not be encoded or decoded.
    #[error("dataset JSON invalid at {path}")]
    Json {
        /// File involved.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// One extraction run as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetDataset {
    /// Region key or `{city}_{state}` stem.
    pub region: String,
    /// Unix seconds at which the dataset was produced.
    pub generated_at: i64,
    /// Number of streets.
    pub total_streets: usize,
    /// Sum of street lengths, rounded to hundredths of a mile.
    pub total_miles: f64,
    /// Streets sorted by base name.
    pub streets: Vec<StreetEntity>,
}

impl StreetDataset {
    /// Dataset stamped with an explicit time.
    #[must_use]
    pub fn new(region: impl Into<String>, streets: Vec<StreetEntity>, generated_at: i64) -> Self {
        let total_miles = round_to_hundredths(streets.iter().map(|s| s.length_miles).sum());
        Self {
            region: region.into(),
            generated_at,
            total_streets: streets.len(),
            total_miles,
            streets,
        }
    }

    /// Dataset from a report, stamped now.
    #[must_use]
    pub fn from_report(region: impl Into<String>, report: ExtractionReport) -> Self {
        Self::new(region, report.streets, Utc::now().timestamp())
    }
}

/// Location of the dataset named `name` inside `dir`.
#[must_use]
pub fn dataset_path(dir: &Utf8Path, name: &str) -> Utf8PathBuf {
    dir.join(format!("{name}{DATASET_FILE_SUFFIX}"))
}

/// Write `dataset` to `{dir}/{region}_streets.json`, creating `dir` if
/// needed.
///
/// # Errors
///
/// Returns [`DatasetError`] when encoding or writing fails.
pub fn write_dataset(dir: &Utf8Path, dataset: &StreetDataset) -> Result<Utf8PathBuf, DatasetError> {
    let path = dataset_path(dir, &dataset.region);
    let text = serde_json::to_string_pretty(dataset).map_err(|source| DatasetError::Json {
        path: path.clone(),
        source,
    })?;
    write_utf8_file(&path, &text).map_err(|source| DatasetError::Io {
        path: path.clone(),
        source,
    })?;
    info!("Saved {} streets to {path}", dataset.total_streets);
    info!("Total miles: {}", dataset.total_miles);
    Ok(path)
}

/// Read a dataset file.
///
/// # Errors
///
/// Returns [`DatasetError`] when reading or decoding fails.
pub fn read_dataset(path: &Utf8Path) -> Result<StreetDataset, DatasetError> {
    let text = read_utf8_file(path).map_err(|source| DatasetError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DatasetError::Json {
        path: path.to_owned(),
        source,
    })
}
