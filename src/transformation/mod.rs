//! Data transformation stage
//!
//! Validates both splits against the fixed schema, fits the [`Preprocessor`] on
//! the training features only and applies it to both splits.

use crate::config::{ArtifactPaths, PipelineConfig};
use crate::error::{DataTransformationError, Result, ScorecastError};
use crate::preprocessing::{numeric_values, PreprocessingConfig, Preprocessor};
use crate::schema::{dataset_columns, NUMERIC_COLUMNS, TARGET_COLUMN};
use crate::utils::{DataLoader, DataSaver};
use ndarray::{concatenate, Array1, Array2, Axis};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

type StageResult<T> = std::result::Result<T, DataTransformationError>;

/// Feature matrix with its aligned target vector
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedArray {
    pub features: Array2<f64>,
    pub target: Array1<f64>,
}

impl TransformedArray {
    pub fn new(features: Array2<f64>, target: Array1<f64>) -> Result<Self> {
        if features.nrows() != target.len() {
            return Err(ScorecastError::ShapeError {
                expected: format!("{} target values", features.nrows()),
                actual: format!("{} target values", target.len()),
            });
        }
        Ok(Self { features, target })
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Features with the target appended as the last column
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        let target = self.target.view().insert_axis(Axis(1));
        Ok(concatenate(Axis(1), &[self.features.view(), target])?)
    }
}

/// Output of the transformation stage
#[derive(Debug, Clone)]
pub struct TransformationArtifacts {
    pub train: TransformedArray,
    pub test: TransformedArray,
    pub preprocessor_path: PathBuf,
    /// [`Preprocessor::fingerprint`] of the persisted preprocessor
    pub preprocessor_fingerprint: String,
}

/// Data transformation stage
#[derive(Debug, Clone)]
pub struct DataTransformation {
    artifacts: ArtifactPaths,
    preprocessing: PreprocessingConfig,
    loader: DataLoader,
}

impl DataTransformation {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            artifacts: config.artifacts.clone(),
            preprocessing: config.preprocessing.clone(),
            loader: DataLoader::new(),
        }
    }

    /// Fit the preprocessor on `train_path`, transform both splits and persist it
    pub fn initiate_data_transformation(
        &self,
        train_path: &Path,
        test_path: &Path,
    ) -> StageResult<TransformationArtifacts> {
        let start = Instant::now();
        info!(train = %train_path.display(), test = %test_path.display(), "entered data transformation");

        let train_df = self.load_split(train_path)?;
        let test_df = self.load_split(test_path)?;

        check_schema(&train_df)?;
        check_schema(&test_df)?;

        let train_target = target_vector(&train_df)?;
        let test_target = target_vector(&test_df)?;

        // Fit on training features only; the test split never reaches fit.
        let preprocessor = Preprocessor::fit(&self.preprocessing, &train_df)?;
        info!(
            features_out = preprocessor.n_features_out(),
            "fitted preprocessor on training split"
        );

        let train = TransformedArray::new(preprocessor.transform(&train_df)?, train_target)?;
        let test = TransformedArray::new(preprocessor.transform(&test_df)?, test_target)?;
        debug!(
            train_shape = ?train.features.dim(),
            test_shape = ?test.features.dim(),
            "transformed splits"
        );

        let preprocessor_fingerprint = preprocessor.fingerprint()?;
        let preprocessor_path = self.artifacts.preprocessor.clone();
        DataSaver::save_json(&preprocessor, &preprocessor_path).map_err(|e| {
            DataTransformationError::Persist {
                path: preprocessor_path.clone(),
                reason: e.to_string(),
            }
        })?;

        info!(
            preprocessor = %preprocessor_path.display(),
            fingerprint = %preprocessor_fingerprint,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "data transformation completed"
        );

        Ok(TransformationArtifacts {
            train,
            test,
            preprocessor_path,
            preprocessor_fingerprint,
        })
    }

    fn load_split(&self, path: &Path) -> StageResult<DataFrame> {
        self.loader
            .load_csv(path)
            .map_err(DataTransformationError::Preprocessing)
    }
}

/// Require exactly the fixed feature and target columns, with numeric columns parseable as numbers
pub fn check_schema(df: &DataFrame) -> StageResult<()> {
    let expected = dataset_columns();
    let present: Vec<&str> = df.get_column_names().iter().map(|c| c.as_str()).collect();

    if let Some(missing) = expected.iter().find(|c| !present.contains(*c)) {
        return Err(DataTransformationError::MissingColumn(missing.to_string()));
    }
    if let Some(extra) = present.iter().find(|c| !expected.contains(*c)) {
        return Err(DataTransformationError::UnexpectedColumn(extra.to_string()));
    }

    for column in NUMERIC_COLUMNS {
        numeric_values(df, column).map_err(|e| DataTransformationError::InvalidColumn {
            column: column.to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

/// Target column as a dense vector; missing targets are rejected rather than imputed
fn target_vector(df: &DataFrame) -> StageResult<Array1<f64>> {
    let invalid = |reason: String| DataTransformationError::InvalidColumn {
        column: TARGET_COLUMN.to_string(),
        reason,
    };

    let values = numeric_values(df, TARGET_COLUMN).map_err(|e| invalid(e.to_string()))?;
    let nulls = values.iter().filter(|v| v.is_none()).count();
    if nulls > 0 {
        return Err(invalid(format!("{nulls} missing value(s)")));
    }
    Ok(values.into_iter().flatten().collect())
}
