//! Preprocessing configuration

use super::{ImputeStrategy, ScalerType};
use crate::schema::{CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
use serde::{Deserialize, Serialize};

/// Configuration for data preprocessing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Columns routed through imputation and scaling
    pub numeric_columns: Vec<String>,

    /// Columns routed through imputation and one-hot encoding
    pub categorical_columns: Vec<String>,

    /// Strategy for handling missing numeric values
    pub numeric_impute_strategy: ImputeStrategy,

    /// Strategy for handling missing categorical values
    pub categorical_impute_strategy: ImputeStrategy,

    /// Type of scaler to use for numeric features
    pub scaler_type: ScalerType,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            numeric_columns: NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
            categorical_columns: CATEGORICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            numeric_impute_strategy: ImputeStrategy::Median,
            categorical_impute_strategy: ImputeStrategy::MostFrequent,
            scaler_type: ScalerType::Standard,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set numeric impute strategy
    pub fn with_numeric_impute(mut self, strategy: ImputeStrategy) -> Self {
        self.numeric_impute_strategy = strategy;
        self
    }

    /// Builder method to set scaler type
    pub fn with_scaler(mut self, scaler_type: ScalerType) -> Self {
        self.scaler_type = scaler_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PreprocessingConfig::default();
        assert_eq!(config.numeric_columns, vec!["reading_score", "writing_score"]);
        assert_eq!(config.categorical_columns.len(), 5);
        assert_eq!(config.numeric_impute_strategy, ImputeStrategy::Median);
        assert_eq!(config.scaler_type, ScalerType::Standard);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PreprocessingConfig::new()
            .with_scaler(ScalerType::MinMax)
            .with_numeric_impute(ImputeStrategy::Mean);

        assert!(matches!(config.scaler_type, ScalerType::MinMax));
        assert_eq!(config.numeric_columns, vec!["reading_score", "writing_score"]);
        assert_eq!(config.numeric_impute_strategy, ImputeStrategy::Mean);
    }
}
