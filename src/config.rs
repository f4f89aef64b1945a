//! Pipeline configuration and the fixed artifact layout

use crate::error::{Result, ScorecastError};
use crate::preprocessing::PreprocessingConfig;
use crate::training::CandidateModel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the storage root
pub const ARTIFACTS_DIR_ENV: &str = "SCORECAST_ARTIFACTS_DIR";
/// Environment variable overriding the raw dataset location
pub const RAW_DATA_ENV: &str = "SCORECAST_RAW_DATA";

const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
const DEFAULT_RAW_DATA: &str = "notebook/data/stud.csv";

/// Locations of every artifact beneath one storage root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub root: PathBuf,
    pub raw_data: PathBuf,
    pub train_data: PathBuf,
    pub test_data: PathBuf,
    pub preprocessor: PathBuf,
    pub model: PathBuf,
}

impl ArtifactPaths {
    /// Derive the fixed layout under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            raw_data: root.join("data.csv"),
            train_data: root.join("train.csv"),
            test_data: root.join("test.csv"),
            preprocessor: root.join("preprocessor.json"),
            model: root.join("model.json"),
            root,
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACTS_DIR)
    }
}

/// Configuration shared by all training stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pre-existing raw dataset (CSV with header)
    pub raw_data_path: PathBuf,

    /// Artifact layout under the storage root
    pub artifacts: ArtifactPaths,

    /// Fraction of rows held out for testing
    pub test_size: f64,

    /// Seed for the train/test shuffle and seeded models
    pub random_state: u64,

    /// Minimum test R² the selected model must reach
    pub min_r2: f64,

    /// Candidate models, evaluated in this order
    pub candidates: Vec<CandidateModel>,

    /// Imputation and scaling used by the transformation stage
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_data_path: PathBuf::from(DEFAULT_RAW_DATA),
            artifacts: ArtifactPaths::default(),
            test_size: 0.2,
            random_state: 42,
            min_r2: 0.6,
            candidates: CandidateModel::all().to_vec(),
            preprocessing: PreprocessingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the storage root and raw source taken from the
    /// environment when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var(ARTIFACTS_DIR_ENV) {
            if !dir.trim().is_empty() {
                config = config.with_artifacts_dir(dir);
            }
        }
        if let Ok(path) = std::env::var(RAW_DATA_ENV) {
            if !path.trim().is_empty() {
                config = config.with_raw_data_path(path);
            }
        }
        config
    }

    /// Builder method to set the storage root
    pub fn with_artifacts_dir(mut self, root: impl AsRef<Path>) -> Self {
        self.artifacts = ArtifactPaths::new(root.as_ref());
        self
    }

    /// Builder method to set the raw dataset location
    pub fn with_raw_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.raw_data_path = path.into();
        self
    }

    /// Builder method to set the test fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Builder method to set the random seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set the acceptance threshold
    pub fn with_min_r2(mut self, min_r2: f64) -> Self {
        self.min_r2 = min_r2;
        self
    }

    /// Builder method to replace the candidate list
    pub fn with_candidates(mut self, candidates: Vec<CandidateModel>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Builder method to set the preprocessing strategies
    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    /// Reject settings no stage can work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ScorecastError::ValidationError(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if !self.min_r2.is_finite() {
            return Err(ScorecastError::ValidationError(format!(
                "min_r2 must be finite, got {}",
                self.min_r2
            )));
        }
        if self.candidates.is_empty() {
            return Err(ScorecastError::ValidationError(
                "at least one candidate model is required".to_string(),
            ));
        }
        Ok(())
    }
}
