//! Training pipeline orchestrator
//!
//! Runs ingestion, transformation and model training strictly in sequence.
//! The first stage failure stops the run; artifacts already written by earlier
//! stages are left in place.

use crate::config::PipelineConfig;
use crate::error::{PipelineStage, TrainingPipelineError};
use crate::ingestion::DataIngestion;
use crate::training::{ModelTrainer, TrainerOutcome};
use crate::transformation::DataTransformation;
use std::fmt;
use std::time::Instant;
use tracing::{error, info};

/// Progress of a [`TrainingPipeline`] run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Ingesting,
    Transforming,
    Training,
    Done,
    Failed,
}

impl PipelineState {
    /// Whether a run has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Idle => "idle",
            PipelineState::Ingesting => "ingesting",
            PipelineState::Transforming => "transforming",
            PipelineState::Training => "training",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Three-stage training pipeline
#[derive(Debug)]
pub struct TrainingPipeline {
    config: PipelineConfig,
    state: PipelineState,
    outcome: Option<TrainerOutcome>,
}

impl TrainingPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            state: PipelineState::Idle,
            outcome: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Candidate reports of the last successful run
    pub fn outcome(&self) -> Option<&TrainerOutcome> {
        self.outcome.as_ref()
    }

    /// Run every stage and return the selected model's test R²
    pub fn initiate_train_pipeline(&mut self) -> Result<f64, TrainingPipelineError> {
        let start = Instant::now();
        self.outcome = None;
        info!(
            source = %self.config.raw_data_path.display(),
            artifacts = %self.config.artifacts.root.display(),
            "training pipeline started"
        );

        // A rejected configuration never leaves Idle: no stage has run.
        if let Err(e) = self.config.validate() {
            let err = TrainingPipelineError::new(PipelineStage::Configuration, e);
            error!(stage = %err.stage, error = %err.source, "training pipeline rejected configuration");
            return Err(err);
        }

        self.state = PipelineState::Ingesting;
        let ingested = match DataIngestion::new(&self.config).initiate_data_ingestion() {
            Ok(ingested) => ingested,
            Err(e) => return Err(self.fail(TrainingPipelineError::new(PipelineStage::Ingestion, e))),
        };

        self.state = PipelineState::Transforming;
        let transformed = match DataTransformation::new(&self.config)
            .initiate_data_transformation(&ingested.train_path, &ingested.test_path)
        {
            Ok(transformed) => transformed,
            Err(e) => {
                return Err(self.fail(TrainingPipelineError::new(PipelineStage::Transformation, e)))
            }
        };

        self.state = PipelineState::Training;
        let outcome = match ModelTrainer::new(&self.config)
            .with_preprocessor_fingerprint(transformed.preprocessor_fingerprint.as_str())
            .initiate_model_trainer(&transformed.train, &transformed.test)
        {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail(TrainingPipelineError::new(PipelineStage::Training, e))),
        };

        let r2 = outcome.r2();
        info!(
            model = %outcome.best.model_name,
            r2,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "training pipeline finished"
        );
        self.outcome = Some(outcome);
        self.state = PipelineState::Done;
        Ok(r2)
    }

    fn fail(&mut self, err: TrainingPipelineError) -> TrainingPipelineError {
        error!(stage = %err.stage, location = %err.location, error = %err.source, "training pipeline failed");
        self.state = PipelineState::Failed;
        err
    }
}
