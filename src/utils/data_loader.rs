//! Data loading and artifact persistence utilities

use crate::error::{Result, ScorecastError};
use polars::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// CSV reader for raw and split datasets
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows scanned to infer column types
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        if !path.is_file() {
            return Err(ScorecastError::DataError(format!(
                "file not found: {}",
                path.display()
            )));
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        Ok(df)
    }

    /// Shape and per-column summary, parsed the same way as [`load_csv`](Self::load_csv)
    pub fn get_file_info(&self, path: &Path) -> Result<FileInfo> {
        let df = self.load_csv(path)?;
        let file_size = fs::metadata(path)?.len();

        let columns = df
            .get_columns()
            .iter()
            .map(|col| {
                Ok(ColumnInfo {
                    name: col.name().to_string(),
                    dtype: col.dtype().to_string(),
                    null_count: col.null_count(),
                    n_unique: col.n_unique()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FileInfo {
            path: path.to_path_buf(),
            file_size,
            n_rows: df.height(),
            columns,
        })
    }
}

/// File information
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub n_rows: usize,
    pub columns: Vec<ColumnInfo>,
}

impl FileInfo {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// One column of a [`FileInfo`]
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
    pub n_unique: usize,
}

/// Writes artifacts so readers never observe a partially written file
pub struct DataSaver;

impl DataSaver {
    /// Save a DataFrame as CSV with header
    pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        CsvWriter::new(&mut buf)
            .include_header(true)
            .finish(df)?;
        Self::write_atomic(path, &buf)
    }

    /// Save any serializable value as JSON
    pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
        let json = serde_json::to_vec(value)?;
        Self::write_atomic(path, &json)
    }

    /// Load a JSON artifact
    pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        if !path.is_file() {
            return Err(ScorecastError::DataError(format!(
                "artifact not found: {}",
                path.display()
            )));
        }
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write to a sibling temporary file, then rename over the target.
    pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ScorecastError::ValidationError(format!("invalid artifact path: {}", path.display()))
            })?;
        let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }
}
