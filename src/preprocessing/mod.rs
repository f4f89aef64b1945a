//! Data preprocessing module
//!
//! Turns the raw student table into a numeric feature matrix:
//! - Missing value imputation (median for numeric, most frequent for categorical)
//! - Standard scaling of numeric features
//! - One-hot encoding of categorical features with a frozen vocabulary
//!
//! A [`Preprocessor`] only exists in fitted form. Fitting returns a new value and
//! transforming borrows it immutably, so fitted statistics never drift.

mod config;
mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use config::PreprocessingConfig;
pub use encoder::{CategoryVocabulary, OneHotEncoder};
pub use imputer::{ImputeStrategy, Imputer};
pub use pipeline::Preprocessor;
pub use scaler::{Scaler, ScalerType};

use crate::error::{Result, ScorecastError};
use polars::prelude::*;

/// Read a column as optional floats. Integer columns are widened; text that does not parse fails.
pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(column)
        .map_err(|_| ScorecastError::FeatureNotFound(column.to_string()))?
        .as_materialized_series();

    let casted = series.strict_cast(&DataType::Float64).map_err(|e| {
        ScorecastError::DataError(format!("column '{column}' is not numeric: {e}"))
    })?;

    Ok(casted.f64()?.into_iter().collect())
}

/// Read a column as optional trimmed strings. Blank cells count as missing.
pub fn categorical_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(column)
        .map_err(|_| ScorecastError::FeatureNotFound(column.to_string()))?
        .as_materialized_series();

    let casted = series.cast(&DataType::String)?;

    Ok(casted
        .str()?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect())
}
