//! Data ingestion stage
//!
//! Reads the raw dataset, keeps an unmodified copy under the storage root and
//! writes a deterministic train/test split next to it.

use crate::config::{ArtifactPaths, PipelineConfig};
use crate::error::{DataIngestionError, Result, ScorecastError};
use crate::utils::{DataLoader, DataSaver};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Locations of the split files written by ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionArtifacts {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

/// Data ingestion stage
#[derive(Debug, Clone)]
pub struct DataIngestion {
    raw_data_path: PathBuf,
    artifacts: ArtifactPaths,
    test_size: f64,
    random_state: u64,
    loader: DataLoader,
}

impl DataIngestion {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            raw_data_path: config.raw_data_path.clone(),
            artifacts: config.artifacts.clone(),
            test_size: config.test_size,
            random_state: config.random_state,
            loader: DataLoader::new(),
        }
    }

    /// Load, copy and split the raw dataset
    pub fn initiate_data_ingestion(&self) -> std::result::Result<IngestionArtifacts, DataIngestionError> {
        let start = Instant::now();
        info!(source = %self.raw_data_path.display(), "entered data ingestion");

        let mut df = self.loader.load_csv(&self.raw_data_path).map_err(|e| {
            DataIngestionError::SourceUnreadable {
                path: self.raw_data_path.clone(),
                reason: e.to_string(),
            }
        })?;
        info!(rows = df.height(), columns = df.width(), "read raw dataset");

        if df.height() < 2 {
            return Err(DataIngestionError::Malformed(format!(
                "{} row(s) cannot be split into train and test sets",
                df.height()
            )));
        }

        persist(&mut df, &self.artifacts.raw_data)?;

        let (mut train, mut test) = train_test_split(&df, self.test_size, self.random_state)
            .map_err(|e| DataIngestionError::Malformed(e.to_string()))?;
        debug!(train_rows = train.height(), test_rows = test.height(), "split dataset");

        persist(&mut train, &self.artifacts.train_data)?;
        persist(&mut test, &self.artifacts.test_data)?;

        info!(
            train = %self.artifacts.train_data.display(),
            test = %self.artifacts.test_data.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "data ingestion completed"
        );

        Ok(IngestionArtifacts {
            train_path: self.artifacts.train_data.clone(),
            test_path: self.artifacts.test_data.clone(),
        })
    }
}

fn persist(df: &mut DataFrame, path: &Path) -> std::result::Result<(), DataIngestionError> {
    DataSaver::save_csv(df, path).map_err(|e| DataIngestionError::Persist {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), rows = df.height(), "wrote artifact");
    Ok(())
}

/// Number of test rows for `n` rows: `ceil(n * test_size)` kept within `[1, n - 1]`
pub fn test_row_count(n_rows: usize, test_size: f64) -> usize {
    let n_test = (n_rows as f64 * test_size).ceil() as usize;
    n_test.clamp(1, n_rows.saturating_sub(1).max(1))
}

/// Shuffle rows with a seeded ChaCha8 permutation and cut them into `(train, test)`.
///
/// Both parts keep the permuted order, so the same seed always yields the same files.
pub fn train_test_split(df: &DataFrame, test_size: f64, seed: u64) -> Result<(DataFrame, DataFrame)> {
    let n_rows = df.height();
    if n_rows < 2 {
        return Err(ScorecastError::ValidationError(format!(
            "need at least 2 rows to split, got {n_rows}"
        )));
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ScorecastError::ValidationError(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }

    let mut indices: Vec<IdxSize> = (0..n_rows as IdxSize).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_train = n_rows - test_row_count(n_rows, test_size);
    let test_indices = indices.split_off(n_train);

    let train = df.take(&IdxCa::from_vec("idx".into(), indices))?;
    let test = df.take(&IdxCa::from_vec("idx".into(), test_indices))?;
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn numbered_frame(n: i64) -> DataFrame {
        let ids: Vec<i64> = (0..n).collect();
        let labels: Vec<String> = (0..n).map(|i| format!("row{i}")).collect();
        df!("id" => ids, "label" => labels).unwrap()
    }

    fn ids(df: &DataFrame) -> Vec<i64> {
        df.column("id")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn test_row_counts() {
        assert_eq!(test_row_count(1000, 0.2), 200);
        assert_eq!(test_row_count(10, 0.25), 3);
        assert_eq!(test_row_count(2, 0.01), 1);
        assert_eq!(test_row_count(2, 0.99), 1);
    }

    #[test]
    fn test_split_is_a_partition() {
        let df = numbered_frame(100);
        let (train, test) = train_test_split(&df, 0.2, 42).unwrap();

        assert_eq!(train.height(), 80);
        assert_eq!(test.height(), 20);

        let train_ids: HashSet<i64> = ids(&train).into_iter().collect();
        let test_ids: HashSet<i64> = ids(&test).into_iter().collect();
        assert!(train_ids.is_disjoint(&test_ids));
        assert_eq!(train_ids.len() + test_ids.len(), 100);
    }

    #[test]
    fn test_split_is_deterministic() {
        let df = numbered_frame(50);
        let (a_train, a_test) = train_test_split(&df, 0.2, 7).unwrap();
        let (b_train, b_test) = train_test_split(&df, 0.2, 7).unwrap();
        assert!(a_train.equals(&b_train));
        assert!(a_test.equals(&b_test));

        let (c_train, _) = train_test_split(&df, 0.2, 8).unwrap();
        assert!(!a_train.equals(&c_train));
    }

    #[test]
    fn test_split_rejects_tiny_frames() {
        let df = numbered_frame(1);
        assert!(train_test_split(&df, 0.2, 42).is_err());
    }

    #[test]
    fn test_ingestion_writes_all_artifacts() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("raw.csv");
        let mut df = numbered_frame(20);
        DataSaver::save_csv(&mut df, &raw).unwrap();

        let config = PipelineConfig::new()
            .with_artifacts_dir(dir.path().join("artifacts"))
            .with_raw_data_path(&raw);
        let artifacts = DataIngestion::new(&config).initiate_data_ingestion().unwrap();

        assert!(config.artifacts.raw_data.is_file());
        assert_eq!(artifacts.train_path, config.artifacts.train_data);
        assert_eq!(artifacts.test_path, config.artifacts.test_data);

        let train = DataLoader::new().load_csv(&artifacts.train_path).unwrap();
        let test = DataLoader::new().load_csv(&artifacts.test_path).unwrap();
        assert_eq!(train.height(), 16);
        assert_eq!(test.height(), 4);
    }

    #[test]
    fn test_missing_source_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::new()
            .with_artifacts_dir(dir.path())
            .with_raw_data_path(dir.path().join("missing.csv"));

        let result = DataIngestion::new(&config).initiate_data_ingestion();
        assert!(matches!(result, Err(DataIngestionError::SourceUnreadable { .. })));
        assert!(!config.artifacts.train_data.exists());
    }

    #[test]
    fn test_single_row_is_malformed() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("raw.csv");
        std::fs::write(&raw, "id,label\n1,a\n").unwrap();

        let config = PipelineConfig::new()
            .with_artifacts_dir(dir.path().join("artifacts"))
            .with_raw_data_path(&raw);
        let result = DataIngestion::new(&config).initiate_data_ingestion();
        assert!(matches!(result, Err(DataIngestionError::Malformed(_))));
    }
}
