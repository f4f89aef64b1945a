//! Missing value imputation strategies

use crate::error::{Result, ScorecastError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for imputing missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with mean (numeric only)
    Mean,
    /// Replace with median (numeric only)
    Median,
    /// Replace with mode / most frequent value
    MostFrequent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum ImputeValue {
    Numeric(f64),
    String(String),
}

/// Imputer for handling missing values.
///
/// Fill values are learned per column at fit time and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: BTreeMap<String, ImputeValue>,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: BTreeMap::new(),
        }
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }

    /// Learn the fill value of a numeric column
    pub fn fit_numeric(&mut self, column: &str, values: &[Option<f64>]) -> Result<()> {
        let mut present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return Err(ScorecastError::ValidationError(format!(
                "column '{column}' has no values to impute from"
            )));
        }

        let fill = match self.strategy {
            ImputeStrategy::Mean => present.iter().sum::<f64>() / present.len() as f64,
            ImputeStrategy::Median => {
                present.sort_by(|a, b| a.total_cmp(b));
                let mid = present.len() / 2;
                if present.len() % 2 == 0 {
                    (present[mid - 1] + present[mid]) / 2.0
                } else {
                    present[mid]
                }
            }
            ImputeStrategy::MostFrequent => {
                let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
                for v in &present {
                    *counts.entry(v.to_bits()).or_insert(0) += 1;
                }
                most_frequent(counts.into_iter(), |a, b| {
                    f64::from_bits(*a).total_cmp(&f64::from_bits(*b))
                })
                .map(f64::from_bits)
                .unwrap_or(present[0])
            }
        };

        self.fill_values
            .insert(column.to_string(), ImputeValue::Numeric(fill));
        Ok(())
    }

    /// Learn the fill value of a categorical column
    pub fn fit_categorical(&mut self, column: &str, values: &[Option<String>]) -> Result<()> {
        if self.strategy != ImputeStrategy::MostFrequent {
            return Err(ScorecastError::ValidationError(format!(
                "{:?} imputation is not defined for categorical column '{column}'",
                self.strategy
            )));
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for v in values.iter().flatten() {
            *counts.entry(v.as_str()).or_insert(0) += 1;
        }

        let mode = most_frequent(counts.into_iter(), |a, b| a.cmp(b))
            .ok_or_else(|| {
                ScorecastError::ValidationError(format!(
                    "column '{column}' has no values to impute from"
                ))
            })?
            .to_string();
        self.fill_values
            .insert(column.to_string(), ImputeValue::String(mode));
        Ok(())
    }

    /// Replace missing entries of a numeric column
    pub fn fill_numeric(&self, column: &str, values: &[Option<f64>]) -> Result<Vec<f64>> {
        match self.fill_values.get(column) {
            Some(ImputeValue::Numeric(fill)) => {
                Ok(values.iter().map(|v| v.unwrap_or(*fill)).collect())
            }
            Some(ImputeValue::String(_)) => Err(ScorecastError::DataError(format!(
                "column '{column}' was fitted as categorical"
            ))),
            None => Err(ScorecastError::FeatureNotFound(column.to_string())),
        }
    }

    /// Replace missing entries of a categorical column
    pub fn fill_categorical(&self, column: &str, values: &[Option<String>]) -> Result<Vec<String>> {
        match self.fill_values.get(column) {
            Some(ImputeValue::String(fill)) => Ok(values
                .iter()
                .map(|v| v.clone().unwrap_or_else(|| fill.clone()))
                .collect()),
            Some(ImputeValue::Numeric(_)) => Err(ScorecastError::DataError(format!(
                "column '{column}' was fitted as numeric"
            ))),
            None => Err(ScorecastError::FeatureNotFound(column.to_string())),
        }
    }
}

/// Highest count wins; ties go to the smallest key.
fn most_frequent<K: Copy>(
    counts: impl Iterator<Item = (K, usize)>,
    cmp: impl Fn(&K, &K) -> std::cmp::Ordering,
) -> Option<K> {
    let mut best: Option<(K, usize)> = None;
    for (key, count) in counts {
        best = match best {
            None => Some((key, count)),
            Some((b, c)) if count > c || (count == c && cmp(&key, &b).is_lt()) => Some((key, count)),
            keep => keep,
        };
    }
    best.map(|(k, _)| k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_imputation() {
        let mut imputer = Imputer::new(ImputeStrategy::Median);
        let values = vec![Some(1.0), None, Some(3.0), Some(10.0), Some(2.0)];
        imputer.fit_numeric("a", &values).unwrap();

        let filled = imputer.fill_numeric("a", &values).unwrap();
        assert_eq!(filled, vec![1.0, 2.5, 3.0, 10.0, 2.0]);
    }

    #[test]
    fn test_mean_imputation() {
        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        imputer.fit_numeric("a", &[Some(1.0), Some(3.0)]).unwrap();
        assert_eq!(imputer.fill_numeric("a", &[None]).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_most_frequent_categorical_tie_breaks_lexicographically() {
        let mut imputer = Imputer::new(ImputeStrategy::MostFrequent);
        let values = vec![
            Some("b".to_string()),
            Some("a".to_string()),
            None,
            Some("b".to_string()),
            Some("a".to_string()),
        ];
        imputer.fit_categorical("c", &values).unwrap();

        let filled = imputer.fill_categorical("c", &values).unwrap();
        assert_eq!(filled[2], "a");
    }

    #[test]
    fn test_all_missing_column_is_rejected() {
        let mut imputer = Imputer::new(ImputeStrategy::Median);
        assert!(imputer.fit_numeric("a", &[None, None]).is_err());
    }

    #[test]
    fn test_unfitted_column() {
        let imputer = Imputer::new(ImputeStrategy::Median);
        let result = imputer.fill_numeric("missing", &[Some(1.0)]);
        assert!(matches!(result, Err(ScorecastError::FeatureNotFound(_))));
    }
}
