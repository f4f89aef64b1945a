//! One-hot encoding of categorical columns

use crate::error::{Result, ScorecastError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Frozen vocabulary of one categorical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    pub column: String,
    /// Sorted, unique categories seen at fit time
    pub categories: Vec<String>,
}

impl CategoryVocabulary {
    fn position(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }
}

/// One-hot encoder.
///
/// Each fitted column expands into one indicator per known category. A value
/// that was not seen during fitting encodes as an all-zero block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    vocabularies: Vec<CategoryVocabulary>,
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self {
            vocabularies: Vec::new(),
        }
    }

    /// Learn the vocabulary of a column. Columns keep the order they were fitted in.
    pub fn fit_column(&mut self, column: &str, values: &[String]) -> Result<()> {
        if self.vocabularies.iter().any(|v| v.column == column) {
            return Err(ScorecastError::ValidationError(format!(
                "column '{column}' is already fitted"
            )));
        }

        let categories: Vec<String> = values
            .iter()
            .map(|s| s.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        if categories.is_empty() {
            return Err(ScorecastError::ValidationError(format!(
                "column '{column}' has no categories"
            )));
        }

        self.vocabularies.push(CategoryVocabulary {
            column: column.to_string(),
            categories,
        });
        Ok(())
    }

    /// Encode one column into `values.len()` rows of indicator values
    pub fn transform_column(&self, column: &str, values: &[String]) -> Result<Vec<Vec<f64>>> {
        let vocab = self
            .vocabulary(column)
            .ok_or_else(|| ScorecastError::FeatureNotFound(column.to_string()))?;
        let width = vocab.categories.len();

        Ok(values
            .iter()
            .map(|value| {
                let mut row = vec![0.0; width];
                if let Some(idx) = vocab.position(value) {
                    row[idx] = 1.0;
                }
                row
            })
            .collect())
    }

    pub fn vocabulary(&self, column: &str) -> Option<&CategoryVocabulary> {
        self.vocabularies.iter().find(|v| v.column == column)
    }

    pub fn vocabularies(&self) -> &[CategoryVocabulary] {
        &self.vocabularies
    }

    /// Total number of indicator columns produced
    pub fn output_width(&self) -> usize {
        self.vocabularies.iter().map(|v| v.categories.len()).sum()
    }

    /// Output feature names as `{column}_{category}`
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabularies
            .iter()
            .flat_map(|v| {
                v.categories
                    .iter()
                    .map(move |c| format!("{}_{}", v.column, c))
            })
            .collect()
    }
}
