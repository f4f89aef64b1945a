//! Model trainer stage
//!
//! Fits every configured candidate on the training array, scores it on the
//! held-out array, and persists the winner if it clears the quality threshold.

use super::candidates::{CandidateModel, TrainedModel};
use super::models::{ModelMetrics, Regressor};
use crate::config::{ArtifactPaths, PipelineConfig};
use crate::error::{ModelTrainerError, Result, ScorecastError};
use crate::transformation::TransformedArray;
use crate::utils::DataSaver;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

type StageResult<T> = std::result::Result<T, ModelTrainerError>;

/// Test-set result of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReport {
    pub model: CandidateModel,
    pub model_name: String,
    pub r2: f64,
    /// Root mean squared error on the test split
    pub rmse: f64,
    /// Mean absolute error on the test split
    pub mae: f64,
    pub training_time_secs: f64,
}

/// The persisted selected model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_name: String,
    pub candidate: CandidateModel,
    pub r2: f64,
    pub n_features: usize,
    /// Fingerprint of the preprocessor this model was trained behind
    pub preprocessor_fingerprint: Option<String>,
    pub model: TrainedModel,
}

impl ModelArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        DataSaver::load_json(path)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.n_features {
            return Err(ScorecastError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        self.model.predict(x)
    }
}

/// Output of the model trainer stage
#[derive(Debug, Clone)]
pub struct TrainerOutcome {
    pub best: ModelReport,
    pub reports: Vec<ModelReport>,
    pub model_path: PathBuf,
}

impl TrainerOutcome {
    pub fn r2(&self) -> f64 {
        self.best.r2
    }
}

/// Model trainer stage
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    artifacts: ArtifactPaths,
    candidates: Vec<CandidateModel>,
    min_r2: f64,
    random_state: u64,
    preprocessor_fingerprint: Option<String>,
}

impl ModelTrainer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            artifacts: config.artifacts.clone(),
            candidates: config.candidates.clone(),
            min_r2: config.min_r2,
            random_state: config.random_state,
            preprocessor_fingerprint: None,
        }
    }

    /// Stamp the persisted model with the preprocessor that produced its features
    pub fn with_preprocessor_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.preprocessor_fingerprint = Some(fingerprint.into());
        self
    }

    /// Evaluate all candidates and persist the best one
    pub fn initiate_model_trainer(
        &self,
        train: &TransformedArray,
        test: &TransformedArray,
    ) -> StageResult<TrainerOutcome> {
        let start = Instant::now();
        info!(
            train_rows = train.n_rows(),
            test_rows = test.n_rows(),
            candidates = self.candidates.len(),
            "entered model trainer"
        );

        if train.n_features() != test.n_features() {
            return Err(ModelTrainerError::FeatureWidthMismatch {
                train: train.n_features(),
                test: test.n_features(),
            });
        }
        if self.candidates.is_empty() {
            return Err(ModelTrainerError::EmptyCandidateSet);
        }

        let mut reports = Vec::with_capacity(self.candidates.len());
        let mut fitted = Vec::with_capacity(self.candidates.len());

        for &candidate in &self.candidates {
            let (model, report) = self.evaluate(candidate, train, test).map_err(|source| {
                warn!(model = candidate.name(), error = %source, "candidate failed");
                ModelTrainerError::CandidateFailed {
                    model: candidate.name().to_string(),
                    source,
                }
            })?;
            info!(
                model = %report.model_name,
                r2 = report.r2,
                fit_secs = report.training_time_secs,
                "evaluated candidate"
            );
            reports.push(report);
            fitted.push(model);
        }

        let best_idx = best_index(&reports);
        let (best, model) = match best_idx {
            Some(idx) => (reports[idx].clone(), fitted.swap_remove(idx)),
            None => {
                // Every score was NaN
                return Err(ModelTrainerError::BelowThreshold {
                    model: reports[0].model_name.clone(),
                    score: f64::NAN,
                    threshold: self.min_r2,
                });
            }
        };

        if !(best.r2 >= self.min_r2) {
            warn!(model = %best.model_name, r2 = best.r2, min_r2 = self.min_r2, "no candidate is good enough");
            return Err(ModelTrainerError::BelowThreshold {
                model: best.model_name.clone(),
                score: best.r2,
                threshold: self.min_r2,
            });
        }

        let artifact = ModelArtifact {
            model_name: best.model_name.clone(),
            candidate: best.model,
            r2: best.r2,
            n_features: train.n_features(),
            preprocessor_fingerprint: self.preprocessor_fingerprint.clone(),
            model,
        };
        let model_path = self.artifacts.model.clone();
        DataSaver::save_json(&artifact, &model_path).map_err(|e| ModelTrainerError::Persist {
            path: model_path.clone(),
            reason: e.to_string(),
        })?;

        info!(
            model = %best.model_name,
            r2 = best.r2,
            path = %model_path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "model trainer completed"
        );

        Ok(TrainerOutcome {
            best,
            reports,
            model_path,
        })
    }

    fn evaluate(
        &self,
        candidate: CandidateModel,
        train: &TransformedArray,
        test: &TransformedArray,
    ) -> Result<(TrainedModel, ModelReport)> {
        let fit_start = Instant::now();
        let mut model = candidate.build(self.random_state);
        model.fit(&train.features, &train.target)?;
        let training_time_secs = fit_start.elapsed().as_secs_f64();

        let predictions = model.predict(&test.features)?;
        let metrics = ModelMetrics::compute_regression(&test.target, &predictions)?;
        debug!(model = candidate.name(), rmse = metrics.rmse, mae = metrics.mae, "scored on test split");

        Ok((
            model,
            ModelReport {
                model: candidate,
                model_name: candidate.name().to_string(),
                r2: metrics.r2,
                rmse: metrics.rmse,
                mae: metrics.mae,
                training_time_secs,
            },
        ))
    }
}

/// Highest R² wins; ties keep the earlier report and NaN never wins.
pub fn select_best(reports: &[ModelReport]) -> Option<&ModelReport> {
    best_index(reports).map(|idx| &reports[idx])
}

fn best_index(reports: &[ModelReport]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, report) in reports.iter().enumerate() {
        if report.r2.is_nan() {
            continue;
        }
        match best {
            Some(b) if !(report.r2 > reports[b].r2) => {}
            _ => best = Some(idx),
        }
    }
    best
}
