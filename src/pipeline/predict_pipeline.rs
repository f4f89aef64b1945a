//! Single-record prediction from persisted artifacts

use crate::config::ArtifactPaths;
use crate::error::{Result, ScorecastError};
use crate::preprocessing::Preprocessor;
use crate::schema::StudentRecord;
use crate::training::ModelArtifact;
use crate::utils::DataSaver;
use tracing::debug;

/// Loaded preprocessor and model, checked to come from the same successful run
#[derive(Debug, Clone)]
pub struct PredictPipeline {
    preprocessor: Preprocessor,
    model: ModelArtifact,
}

impl PredictPipeline {
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let preprocessor: Preprocessor = DataSaver::load_json(&paths.preprocessor)?;
        let model = ModelArtifact::load(&paths.model)?;
        Self::new(preprocessor, model)
    }

    pub fn new(preprocessor: Preprocessor, model: ModelArtifact) -> Result<Self> {
        if preprocessor.n_features_out() != model.n_features {
            return Err(ScorecastError::ValidationError(format!(
                "preprocessor produces {} features but model '{}' expects {}",
                preprocessor.n_features_out(),
                model.model_name,
                model.n_features
            )));
        }
        // A run that failed after transformation leaves a newer preprocessor next
        // to the previous model; the widths still agree but the pair does not.
        let fingerprint = preprocessor.fingerprint()?;
        if model.preprocessor_fingerprint.as_deref() != Some(fingerprint.as_str()) {
            return Err(ScorecastError::ValidationError(format!(
                "model '{}' was not trained behind the current preprocessor \
                 (model expects {}, preprocessor is {fingerprint})",
                model.model_name,
                model.preprocessor_fingerprint.as_deref().unwrap_or("none"),
            )));
        }
        debug!(model = %model.model_name, features = model.n_features, "loaded prediction artifacts");
        Ok(Self { preprocessor, model })
    }

    pub fn model_name(&self) -> &str {
        &self.model.model_name
    }

    /// Test R² recorded when the model was selected
    pub fn model_r2(&self) -> f64 {
        self.model.r2
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn predict(&self, records: &[StudentRecord]) -> Result<Vec<f64>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        for record in records {
            record.validate()?;
        }
        let features = self.preprocessor.transform_records(records)?;
        Ok(self.model.predict(&features)?.to_vec())
    }
}
