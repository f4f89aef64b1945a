//! Feature scaling implementations

use crate::error::{Result, ScorecastError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type of scaler to use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// No scaling
    None,
}

/// Parameters for a fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    center: f64, // mean or min
    scale: f64,  // std or range
}

/// Feature scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: BTreeMap<String, ScalerParams>,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: BTreeMap::new(),
        }
    }

    pub fn scaler_type(&self) -> &ScalerType {
        &self.scaler_type
    }

    /// Fit one column
    pub fn fit_column(&mut self, column: &str, values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Err(ScorecastError::ValidationError(format!(
                "cannot fit scaler on empty column '{column}'"
            )));
        }
        let params = self.compute_params(values);
        self.params.insert(column.to_string(), params);
        Ok(())
    }

    /// Scale one column using the fitted parameters
    pub fn transform_column(&self, column: &str, values: &[f64]) -> Result<Vec<f64>> {
        let params = self
            .params
            .get(column)
            .ok_or_else(|| ScorecastError::FeatureNotFound(column.to_string()))?;

        Ok(values
            .iter()
            .map(|v| (v - params.center) / params.scale)
            .collect())
    }

    fn compute_params(&self, values: &[f64]) -> ScalerParams {
        let n = values.len() as f64;

        match self.scaler_type {
            ScalerType::Standard => {
                let mean = values.iter().sum::<f64>() / n;
                // Population std, matching the usual StandardScaler convention
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                ScalerParams {
                    center: mean,
                    scale: if std == 0.0 { 1.0 } else { std },
                }
            }
            ScalerType::MinMax => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let range = max - min;
                ScalerParams {
                    center: min,
                    scale: if range == 0.0 { 1.0 } else { range },
                }
            }
            ScalerType::None => ScalerParams {
                center: 0.0,
                scale: 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaler() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut scaler = Scaler::new(ScalerType::Standard);
        scaler.fit_column("a", &values).unwrap();

        let scaled = scaler.transform_column("a", &values).unwrap();
        let mean: f64 = scaled.iter().sum::<f64>() / scaled.len() as f64;
        let var: f64 = scaled.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / scaled.len() as f64;

        assert!(mean.abs() < 1e-10);
        assert!((var - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_minmax_scaler() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut scaler = Scaler::new(ScalerType::MinMax);
        scaler.fit_column("a", &values).unwrap();

        let scaled = scaler.transform_column("a", &values).unwrap();
        assert!((scaled[0] - 0.0).abs() < 1e-10);
        assert!((scaled[4] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_constant_column_does_not_divide_by_zero() {
        let mut scaler = Scaler::new(ScalerType::Standard);
        scaler.fit_column("a", &[3.0, 3.0, 3.0]).unwrap();

        let scaled = scaler.transform_column("a", &[3.0, 4.0]).unwrap();
        assert_eq!(scaled, vec![0.0, 1.0]);
    }
}
