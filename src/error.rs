//! Error types for the scorecast training pipeline
//!
//! Library internals (preprocessing, models, artifact I/O) report
//! [`ScorecastError`]. Each pipeline stage owns its own error type, and the
//! orchestrator wraps whichever one fired in a [`TrainingPipelineError`].

use std::fmt;
use std::panic::Location;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scorecast operations
pub type Result<T> = std::result::Result<T, ScorecastError>;

/// Main error type for preprocessing, models and artifact handling
#[derive(Error, Debug)]
pub enum ScorecastError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl From<polars::error::PolarsError> for ScorecastError {
    fn from(err: polars::error::PolarsError) -> Self {
        ScorecastError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ScorecastError {
    fn from(err: serde_json::Error) -> Self {
        ScorecastError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ScorecastError {
    fn from(err: ndarray::ShapeError) -> Self {
        ScorecastError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

/// Failures of the data ingestion stage
#[derive(Error, Debug)]
pub enum DataIngestionError {
    #[error("cannot read raw dataset {}: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("raw dataset is malformed: {0}")]
    Malformed(String),

    #[error("failed to persist {}: {reason}", path.display())]
    Persist { path: PathBuf, reason: String },
}

/// Failures of the data transformation stage
#[derive(Error, Debug)]
pub enum DataTransformationError {
    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("unexpected column '{0}'")]
    UnexpectedColumn(String),

    #[error("column '{column}' is invalid: {reason}")]
    InvalidColumn { column: String, reason: String },

    #[error("preprocessing failed: {0}")]
    Preprocessing(#[from] ScorecastError),

    #[error("failed to persist {}: {reason}", path.display())]
    Persist { path: PathBuf, reason: String },
}

/// Failures of the model trainer stage
#[derive(Error, Debug)]
pub enum ModelTrainerError {
    #[error("train and test feature widths differ: {train} vs {test}")]
    FeatureWidthMismatch { train: usize, test: usize },

    #[error("no candidate models configured")]
    EmptyCandidateSet,

    #[error("candidate '{model}' failed: {source}")]
    CandidateFailed {
        model: String,
        #[source]
        source: ScorecastError,
    },

    #[error("best model '{model}' scored R² {score:.4}, below the minimum of {threshold:.4}")]
    BelowThreshold {
        model: String,
        score: f64,
        threshold: f64,
    },

    #[error("failed to persist {}: {reason}", path.display())]
    Persist { path: PathBuf, reason: String },
}

/// Pipeline stage that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Configuration,
    Ingestion,
    Transformation,
    Training,
}

impl PipelineStage {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Configuration => "configuration",
            PipelineStage::Ingestion => "data ingestion",
            PipelineStage::Transformation => "data transformation",
            PipelineStage::Training => "model trainer",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The stage-local error carried by a [`TrainingPipelineError`]
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Configuration(#[from] ScorecastError),

    #[error(transparent)]
    Ingestion(#[from] DataIngestionError),

    #[error(transparent)]
    Transformation(#[from] DataTransformationError),

    #[error(transparent)]
    Training(#[from] ModelTrainerError),
}

/// Top-level error returned by the training pipeline
#[derive(Error, Debug)]
#[error("training pipeline failed in {stage} stage at {location}: {source}")]
pub struct TrainingPipelineError {
    pub stage: PipelineStage,
    pub location: &'static Location<'static>,
    #[source]
    pub source: StageError,
}

impl TrainingPipelineError {
    /// Wrap a stage error, recording the caller's source location.
    #[track_caller]
    pub fn new(stage: PipelineStage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            location: Location::caller(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = ScorecastError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ScorecastError = io_err.into();
        assert!(matches!(err, ScorecastError::IoError(_)));
    }

    #[test]
    fn test_pipeline_error_carries_stage_and_location() {
        let err = TrainingPipelineError::new(
            PipelineStage::Transformation,
            DataTransformationError::MissingColumn("math_score".to_string()),
        );

        assert_eq!(err.stage, PipelineStage::Transformation);
        assert!(err.location.file().ends_with("error.rs"));

        let msg = err.to_string();
        assert!(msg.contains("data transformation"));
        assert!(msg.contains("math_score"));

        let source = err.source().expect("source should be set");
        assert!(source.to_string().contains("missing"));
    }
}
