//! Scorecast - exam-score regression pipeline
//!
//! This crate trains and serves a model that predicts a student's math score
//! from five categorical attributes and two numeric scores:
//! - Data ingestion with a deterministic train/test split
//! - A fitted preprocessor (imputation, scaling, one-hot encoding)
//! - Model selection over a fixed set of regressors, scored by test R²
//! - A prediction path over the persisted artifacts
//!
//! # Modules
//!
//! ## Pipeline stages
//! - [`ingestion`] - Raw dataset copy and train/test split
//! - [`transformation`] - Schema checks and preprocessor fitting
//! - [`training`] - Regressors and the model trainer stage
//! - [`pipeline`] - Training orchestrator and prediction pipeline
//!
//! ## Building blocks
//! - [`preprocessing`] - Imputer, scaler, one-hot encoder, [`preprocessing::Preprocessor`]
//! - [`schema`] - Fixed column schema and [`schema::StudentRecord`]
//! - [`config`] - Pipeline configuration and artifact layout
//! - [`utils`] - CSV loading and atomic artifact writes
//!
//! ## Services
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Configuration and schema
pub mod config;
pub mod schema;

// Pipeline stages
pub mod ingestion;
pub mod preprocessing;
pub mod transformation;
pub mod training;
pub mod pipeline;

// Utilities
pub mod utils;

// Services
pub mod cli;

pub use error::{Result, ScorecastError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{
        DataIngestionError, DataTransformationError, ModelTrainerError, PipelineStage, Result,
        ScorecastError, StageError, TrainingPipelineError,
    };

    // Configuration
    pub use crate::config::{ArtifactPaths, PipelineConfig};
    pub use crate::schema::StudentRecord;

    // Stages
    pub use crate::ingestion::{train_test_split, DataIngestion, IngestionArtifacts};
    pub use crate::transformation::{DataTransformation, TransformationArtifacts, TransformedArray};
    pub use crate::training::{
        CandidateModel, ModelArtifact, ModelReport, ModelTrainer, Regressor, TrainedModel,
        TrainerOutcome,
    };

    // Preprocessing
    pub use crate::preprocessing::{PreprocessingConfig, Preprocessor};

    // Pipelines
    pub use crate::pipeline::{PipelineState, PredictPipeline, TrainingPipeline};
}
