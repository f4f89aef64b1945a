//! Fitted preprocessing pipeline

use super::{
    categorical_values, numeric_values, Imputer, OneHotEncoder, PreprocessingConfig, Scaler,
};
use crate::error::{Result, ScorecastError};
use crate::schema::StudentRecord;
use crate::utils::compute_sha256;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Column transformer fitted on training data.
///
/// Output layout is the scaled numeric columns in configured order, followed by
/// one indicator block per categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    config: PreprocessingConfig,
    numeric_imputer: Imputer,
    categorical_imputer: Imputer,
    scaler: Scaler,
    encoder: OneHotEncoder,
    n_samples_seen: usize,
}

impl Preprocessor {
    /// Learn imputation values, scaling parameters and category vocabularies
    pub fn fit(config: &PreprocessingConfig, df: &DataFrame) -> Result<Self> {
        let start = Instant::now();

        if df.height() == 0 {
            return Err(ScorecastError::ValidationError(
                "cannot fit preprocessor on an empty frame".to_string(),
            ));
        }

        let mut numeric_imputer = Imputer::new(config.numeric_impute_strategy.clone());
        let mut scaler = Scaler::new(config.scaler_type.clone());
        for column in &config.numeric_columns {
            let values = numeric_values(df, column)?;
            numeric_imputer.fit_numeric(column, &values)?;
            let filled = numeric_imputer.fill_numeric(column, &values)?;
            scaler.fit_column(column, &filled)?;
        }

        let mut categorical_imputer = Imputer::new(config.categorical_impute_strategy.clone());
        let mut encoder = OneHotEncoder::new();
        for column in &config.categorical_columns {
            let values = categorical_values(df, column)?;
            categorical_imputer.fit_categorical(column, &values)?;
            let filled = categorical_imputer.fill_categorical(column, &values)?;
            encoder.fit_column(column, &filled)?;
        }

        let fitted = Self {
            config: config.clone(),
            numeric_imputer,
            categorical_imputer,
            scaler,
            encoder,
            n_samples_seen: df.height(),
        };

        debug!(
            rows = df.height(),
            features_out = fitted.n_features_out(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "preprocessor fitted"
        );
        Ok(fitted)
    }

    /// Fit on `df` and return the fitted preprocessor with the transformed matrix
    pub fn fit_transform(config: &PreprocessingConfig, df: &DataFrame) -> Result<(Self, Array2<f64>)> {
        let fitted = Self::fit(config, df)?;
        let matrix = fitted.transform(df)?;
        Ok((fitted, matrix))
    }

    /// Apply the fitted transformation. Columns outside the configured inputs are ignored.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let n_rows = df.height();
        let mut output = Array2::<f64>::zeros((n_rows, self.n_features_out()));
        let mut col_idx = 0;

        for column in &self.config.numeric_columns {
            let values = numeric_values(df, column)?;
            let filled = self.numeric_imputer.fill_numeric(column, &values)?;
            let scaled = self.scaler.transform_column(column, &filled)?;
            for (row, v) in scaled.into_iter().enumerate() {
                output[[row, col_idx]] = v;
            }
            col_idx += 1;
        }

        for column in &self.config.categorical_columns {
            let values = categorical_values(df, column)?;
            let filled = self.categorical_imputer.fill_categorical(column, &values)?;
            let encoded = self.encoder.transform_column(column, &filled)?;
            let width = self
                .encoder
                .vocabulary(column)
                .map(|v| v.categories.len())
                .unwrap_or(0);
            for (row, indicators) in encoded.into_iter().enumerate() {
                for (k, v) in indicators.into_iter().enumerate() {
                    output[[row, col_idx + k]] = v;
                }
            }
            col_idx += width;
        }

        Ok(output)
    }

    /// Transform typed records, as used at prediction time
    pub fn transform_records(&self, records: &[StudentRecord]) -> Result<Array2<f64>> {
        let df = StudentRecord::to_frame(records)?;
        self.transform(&df)
    }

    /// Names of the output columns, in matrix order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.config.numeric_columns.clone();
        names.extend(self.encoder.feature_names());
        names
    }

    pub fn n_features_out(&self) -> usize {
        self.config.numeric_columns.len() + self.encoder.output_width()
    }

    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// SHA-256 of the serialized fitted state.
    ///
    /// Equal for a preprocessor and its persisted copy, so a model artifact can
    /// name the exact preprocessor it was trained behind.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(compute_sha256(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::ScalerType;

    fn sample_frame() -> DataFrame {
        df!(
            "gender" => &[Some("female"), Some("male"), None, Some("female")],
            "race_ethnicity" => &["group A", "group B", "group A", "group C"],
            "parental_level_of_education" => &["some college", "high school", "master's degree", "high school"],
            "lunch" => &["standard", "free/reduced", "standard", "standard"],
            "test_preparation_course" => &["none", "completed", "none", "none"],
            "reading_score" => &[Some(70.0), Some(80.0), None, Some(90.0)],
            "writing_score" => &[60i64, 70, 80, 90],
            "math_score" => &[65i64, 75, 70, 95]
        )
        .unwrap()
    }

    #[test]
    fn test_fit_transform_shape() {
        let df = sample_frame();
        let (pre, matrix) = Preprocessor::fit_transform(&PreprocessingConfig::default(), &df).unwrap();

        // 2 numeric + gender(2) + race(3) + education(3) + lunch(2) + prep(2)
        assert_eq!(pre.n_features_out(), 14);
        assert_eq!(matrix.dim(), (4, 14));
        assert_eq!(pre.feature_names().len(), 14);
        assert_eq!(pre.feature_names()[0], "reading_score");
        assert_eq!(pre.feature_names()[2], "gender_female");
    }

    #[test]
    fn test_missing_values_are_imputed() {
        let df = sample_frame();
        let config = PreprocessingConfig::default().with_scaler(ScalerType::None);
        let (_, matrix) = Preprocessor::fit_transform(&config, &df).unwrap();

        // median of 70, 80, 90
        assert_eq!(matrix[[2, 0]], 80.0);
        // most frequent gender is female
        assert_eq!(matrix[[2, 2]], 1.0);
        assert_eq!(matrix[[2, 3]], 0.0);
        assert!(matrix.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_transform_is_repeatable() {
        let df = sample_frame();
        let pre = Preprocessor::fit(&PreprocessingConfig::default(), &df).unwrap();

        let first = pre.transform(&df).unwrap();
        let second = pre.transform(&df).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_frame_rejected() {
        let df = sample_frame().head(Some(0));
        assert!(Preprocessor::fit(&PreprocessingConfig::default(), &df).is_err());
    }

    #[test]
    fn test_serde_roundtrip_preserves_output() {
        let df = sample_frame();
        let pre = Preprocessor::fit(&PreprocessingConfig::default(), &df).unwrap();

        let json = serde_json::to_string(&pre).unwrap();
        let restored: Preprocessor = serde_json::from_str(&json).unwrap();

        assert_eq!(pre.transform(&df).unwrap(), restored.transform(&df).unwrap());
    }

    #[test]
    fn test_fingerprint_survives_persistence() {
        let df = sample_frame();
        let pre = Preprocessor::fit(&PreprocessingConfig::default(), &df).unwrap();

        let json = serde_json::to_vec(&pre).unwrap();
        let restored: Preprocessor = serde_json::from_slice(&json).unwrap();
        assert_eq!(pre.fingerprint().unwrap(), restored.fingerprint().unwrap());

        let refit = Preprocessor::fit(&PreprocessingConfig::default(), &df.head(Some(3))).unwrap();
        assert_ne!(pre.fingerprint().unwrap(), refit.fingerprint().unwrap());
    }
}
