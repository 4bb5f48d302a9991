//! CSV dataset loading
//!
//! A dataset source is a table name plus a CSV path. Sources are read with
//! `tokio::fs` and parsed with the `csv` crate; [`load_each`] runs one task
//! per source and joins them all before returning.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info, warn};

use super::statement::sanitize_identifier;
use super::{RawDataset, RawRow};
use crate::error::{CsvqlError, LoadError, Result};

/// A named CSV file to be loaded as one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSource {
    /// Table name (already sanitized)
    pub name: String,
    pub path: PathBuf,
}

impl DatasetSource {
    /// Create a source with an explicit table name.
    pub fn new(name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            name: sanitize_identifier(name),
            path: path.into(),
        }
    }

    /// Create a source named after the file stem (`time zones.csv` -> `time_zones`).
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| LoadError::invalid_source(path.display().to_string()))?;
        Ok(Self::new(stem, path.clone()))
    }

    /// Parse `name=path` or a bare `path`.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(LoadError::invalid_source(spec).into());
        }

        match spec.split_once('=') {
            Some((name, path)) => {
                let (name, path) = (name.trim(), path.trim());
                if name.is_empty() || path.is_empty() {
                    return Err(LoadError::invalid_source(spec).into());
                }
                Ok(Self::new(name, path))
            }
            None => Self::from_path(spec),
        }
    }
}

impl FromStr for DatasetSource {
    type Err = CsvqlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.path.display())
    }
}

/// Parse CSV text into a raw dataset.
///
/// The header row names the fields. Short records read as empty strings for
/// the missing trailing fields; fields beyond the header are dropped. Values
/// are kept exactly as written.
pub fn parse_csv(name: &str, label: &str, text: &str) -> Result<RawDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::parse(label, e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| LoadError::parse(label, e.to_string()))?;
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }

    debug!(
        dataset = %name,
        columns = headers.len(),
        rows = rows.len(),
        "Parsed CSV"
    );

    Ok(RawDataset::new(name, rows))
}

/// Read and parse one source.
pub async fn load_csv_file(source: &DatasetSource) -> Result<RawDataset> {
    let label = source.path.display().to_string();
    let text = tokio::fs::read_to_string(&source.path)
        .await
        .map_err(|e| LoadError::read(label.as_str(), e.to_string()))?;

    let dataset = parse_csv(&source.name, &label, &text)?;
    info!(
        dataset = %dataset.name,
        path = %label,
        rows = dataset.rows.len(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Every `*.csv` file in `dir`, as sources sorted by path.
pub async fn discover_csv_files(dir: &Path) -> Result<Vec<DatasetSource>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| LoadError::read(dir.display().to_string(), e.to_string()))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LoadError::read(dir.display().to_string(), e.to_string()))?
    {
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    paths.into_iter().map(DatasetSource::from_path).collect()
}

/// Load every source concurrently, keeping each outcome.
///
/// All tasks run to completion before this returns. Outcomes come back in
/// source order, so a failed file does not hide the ones that loaded.
pub async fn load_each(sources: Vec<DatasetSource>) -> Vec<Result<RawDataset>> {
    let mut handles = Vec::with_capacity(sources.len());
    for source in sources {
        handles.push(tokio::spawn(async move { load_csv_file(&source).await }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(e) => Err(e.into()),
        };
        if let Err(ref e) = outcome {
            warn!(error = %e, "Dataset load failed");
        }
        outcomes.push(outcome);
    }
    outcomes
}

/// Load every source concurrently.
///
/// Datasets come back in source order; if any load failed, the first
/// failure (in source order) is returned instead.
pub async fn load_all(sources: Vec<DatasetSource>) -> Result<Vec<RawDataset>> {
    load_each(sources).await.into_iter().collect()
}
