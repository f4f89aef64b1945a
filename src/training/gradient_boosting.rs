//! Gradient Boosting implementation
//!
//! Least-squares gradient boosting over shallow regression trees: each round
//! fits a tree to the current residuals and adds a shrunken copy of it.

use super::decision_tree::DecisionTreeRegressor;
use super::models::{check_fit_input, check_predict_input, Regressor};
use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Gradient Boosting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Learning rate (shrinkage)
    pub learning_rate: f64,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Subsample ratio for each tree
    pub subsample: f64,
    /// Column subsample ratio
    pub colsample_bytree: f64,
    /// Random seed
    pub random_state: u64,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 1.0,
            colsample_bytree: 1.0,
            random_state: 42,
        }
    }
}

/// Gradient Boosting Regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    config: GradientBoostingConfig,
    trees: Vec<DecisionTreeRegressor>,
    col_indices_per_tree: Vec<Vec<usize>>,
    initial_prediction: f64,
    feature_importances: Vec<f64>,
    n_features: usize,
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self::new(GradientBoostingConfig::default())
    }
}

impl GradientBoostingRegressor {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            col_indices_per_tree: Vec::new(),
            initial_prediction: 0.0,
            feature_importances: Vec::new(),
            n_features: 0,
        }
    }

    pub fn config(&self) -> &GradientBoostingConfig {
        &self.config
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    fn validate_config(&self) -> Result<()> {
        let c = &self.config;
        if c.n_estimators == 0 {
            return Err(ScorecastError::ValidationError(
                "gradient boosting needs at least one round".to_string(),
            ));
        }
        if !(c.learning_rate > 0.0) {
            return Err(ScorecastError::ValidationError(format!(
                "learning_rate must be positive, got {}",
                c.learning_rate
            )));
        }
        for (name, ratio) in [("subsample", c.subsample), ("colsample_bytree", c.colsample_bytree)] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(ScorecastError::ValidationError(format!(
                    "{name} must be in (0, 1], got {ratio}"
                )));
            }
        }
        Ok(())
    }

    fn sample_indices(n: usize, ratio: f64, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        if ratio >= 1.0 {
            return indices;
        }
        let sample_size = ((n as f64) * ratio).ceil().max(1.0) as usize;
        indices.shuffle(rng);
        indices.truncate(sample_size);
        indices.sort_unstable();
        indices
    }
}

impl Regressor for GradientBoostingRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;
        self.validate_config()?;

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let lr = self.config.learning_rate;

        self.trees.clear();
        self.col_indices_per_tree.clear();
        self.initial_prediction = y.mean().unwrap_or(0.0);
        self.feature_importances = vec![0.0; n_features];

        let mut predictions = Array1::from_elem(n_samples, self.initial_prediction);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);

        for _ in 0..self.config.n_estimators {
            let residuals = y - &predictions;

            let rows = Self::sample_indices(n_samples, self.config.subsample, &mut rng);
            let cols = Self::sample_indices(n_features, self.config.colsample_bytree, &mut rng);

            let x_cols = x.select(Axis(1), &cols);
            let x_sub = x_cols.select(Axis(0), &rows);
            let r_sub = residuals.select(Axis(0), &rows);

            let mut tree = DecisionTreeRegressor::new()
                .with_max_depth(self.config.max_depth)
                .with_min_samples_leaf(self.config.min_samples_leaf);
            tree.fit(&x_sub, &r_sub)?;

            // Update every row, including rows left out of this round's subsample
            let tree_pred = tree.predict(&x_cols)?;
            predictions.scaled_add(lr, &tree_pred);

            if let Some(importance) = tree.feature_importances() {
                for (j, &col_idx) in cols.iter().enumerate() {
                    self.feature_importances[col_idx] += importance[j];
                }
            }

            self.trees.push(tree);
            self.col_indices_per_tree.push(cols);
        }

        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= total;
            }
        }

        self.n_features = n_features;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ScorecastError::ModelNotFitted);
        }
        check_predict_input(x, self.n_features)?;

        let mut predictions = Array1::from_elem(x.nrows(), self.initial_prediction);
        for (tree, col_indices) in self.trees.iter().zip(self.col_indices_per_tree.iter()) {
            let x_sub = x.select(Axis(1), col_indices);
            predictions.scaled_add(self.config.learning_rate, &tree.predict(&x_sub)?);
        }
        Ok(predictions)
    }

    fn n_features(&self) -> Option<usize> {
        (!self.trees.is_empty()).then_some(self.n_features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regression_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((80, 2), |(i, j)| ((i * (j + 3)) % 23) as f64);
        let y = x.column(0).mapv(|v| v * v / 10.0) + x.column(1);
        (x, y)
    }

    #[test]
    fn test_boosting_reduces_training_error() {
        let (x, y) = regression_data();

        let mut few = GradientBoostingRegressor::new(GradientBoostingConfig {
            n_estimators: 5,
            ..Default::default()
        });
        let mut many = GradientBoostingRegressor::default();
        few.fit(&x, &y).unwrap();
        many.fit(&x, &y).unwrap();

        let few_r2 = few.score(&x, &y).unwrap();
        let many_r2 = many.score(&x, &y).unwrap();
        assert!(many_r2 > few_r2);
        assert!(many_r2 > 0.95);
    }

    #[test]
    fn test_subsampled_boosting_is_deterministic() {
        let (x, y) = regression_data();
        let config = GradientBoostingConfig {
            n_estimators: 20,
            subsample: 0.7,
            colsample_bytree: 0.5,
            ..Default::default()
        };

        let fit = || {
            let mut model = GradientBoostingRegressor::new(config.clone());
            model.fit(&x, &y).unwrap();
            model.predict(&x).unwrap()
        };
        assert_eq!(fit(), fit());
    }

    #[test]
    fn test_invalid_subsample_rejected() {
        let (x, y) = regression_data();
        let mut model = GradientBoostingRegressor::new(GradientBoostingConfig {
            subsample: 0.0,
            ..Default::default()
        });
        assert!(matches!(
            model.fit(&x, &y),
            Err(ScorecastError::ValidationError(_))
        ));
    }
}
