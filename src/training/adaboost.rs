//! AdaBoost regression (AdaBoost.R2)
//!
//! Each round trains a shallow regression tree on a bootstrap drawn according to
//! the current sample weights, then raises the weight of samples it predicts
//! badly. The ensemble predicts the weighted median of its trees.

use super::decision_tree::DecisionTreeRegressor;
use super::models::{check_fit_input, check_predict_input, Regressor};
use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2, Axis};
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Per-sample loss applied to the normalized absolute error
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoostLoss {
    Linear,
    Square,
    Exponential,
}

impl BoostLoss {
    fn apply(&self, normalized_error: f64) -> f64 {
        match self {
            BoostLoss::Linear => normalized_error,
            BoostLoss::Square => normalized_error * normalized_error,
            BoostLoss::Exponential => 1.0 - (-normalized_error).exp(),
        }
    }
}

/// AdaBoost Regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostRegressor {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub loss: BoostLoss,
    pub random_state: u64,
    trees: Vec<DecisionTreeRegressor>,
    estimator_weights: Vec<f64>,
    n_features: usize,
}

impl Default for AdaBoostRegressor {
    fn default() -> Self {
        Self::new(50, 1.0)
    }
}

impl AdaBoostRegressor {
    pub fn new(n_estimators: usize, learning_rate: f64) -> Self {
        Self {
            n_estimators,
            learning_rate,
            max_depth: 3,
            loss: BoostLoss::Linear,
            random_state: 42,
            trees: Vec::new(),
            estimator_weights: Vec::new(),
            n_features: 0,
        }
    }

    pub fn with_loss(mut self, loss: BoostLoss) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for AdaBoostRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;
        if self.n_estimators == 0 || !(self.learning_rate > 0.0) {
            return Err(ScorecastError::ValidationError(format!(
                "invalid AdaBoost settings: n_estimators={}, learning_rate={}",
                self.n_estimators, self.learning_rate
            )));
        }

        let n_samples = x.nrows();
        let mut sample_weights = vec![1.0 / n_samples as f64; n_samples];
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);

        let mut trees = Vec::with_capacity(self.n_estimators);
        let mut estimator_weights = Vec::with_capacity(self.n_estimators);

        for round in 0..self.n_estimators {
            let sampler = WeightedIndex::new(&sample_weights)
                .map_err(|e| ScorecastError::ComputationError(format!("sample weights: {e}")))?;
            let bootstrap: Vec<usize> = (0..n_samples).map(|_| sampler.sample(&mut rng)).collect();

            let mut tree = DecisionTreeRegressor::new()
                .with_max_depth(self.max_depth)
                .with_random_state(round as u64);
            tree.fit(&x.select(Axis(0), &bootstrap), &y.select(Axis(0), &bootstrap))?;

            let errors: Vec<f64> = (&tree.predict(x)? - y).mapv(f64::abs).to_vec();
            let max_error = errors.iter().copied().fold(0.0, f64::max);

            if max_error == 0.0 {
                // Perfect fit: this tree alone decides
                trees.push(tree);
                estimator_weights.push(1.0);
                break;
            }

            let losses: Vec<f64> = errors.iter().map(|e| self.loss.apply(e / max_error)).collect();
            let avg_loss: f64 = losses
                .iter()
                .zip(sample_weights.iter())
                .map(|(l, w)| l * w)
                .sum();

            if avg_loss >= 0.5 {
                // Worse than chance; keep it only if nothing else exists
                if trees.is_empty() {
                    trees.push(tree);
                    estimator_weights.push(1.0);
                }
                break;
            }

            let beta = (avg_loss / (1.0 - avg_loss)).max(1e-10);
            let weight = self.learning_rate * (1.0 / beta).ln();

            for (w, l) in sample_weights.iter_mut().zip(losses.iter()) {
                *w *= beta.powf((1.0 - l) * self.learning_rate);
            }
            let total: f64 = sample_weights.iter().sum();
            trees.push(tree);
            estimator_weights.push(weight);

            if !(total > 0.0) {
                break;
            }
            for w in &mut sample_weights {
                *w /= total;
            }
        }

        self.trees = trees;
        self.estimator_weights = estimator_weights;
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ScorecastError::ModelNotFitted);
        }
        check_predict_input(x, self.n_features)?;

        let per_tree: Vec<Array1<f64>> = self
            .trees
            .iter()
            .map(|t| t.predict(x))
            .collect::<Result<_>>()?;

        Ok((0..x.nrows())
            .map(|i| {
                let preds: Vec<f64> = per_tree.iter().map(|p| p[i]).collect();
                weighted_median(&preds, &self.estimator_weights)
            })
            .collect())
    }

    fn n_features(&self) -> Option<usize> {
        (!self.trees.is_empty()).then_some(self.n_features)
    }
}

/// Smallest value whose cumulative weight reaches half the total
fn weighted_median(values: &[f64], weights: &[f64]) -> f64 {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let half = weights.iter().sum::<f64>() / 2.0;
    let mut cumulative = 0.0;
    for &i in &order {
        cumulative += weights[i];
        if cumulative >= half {
            return values[i];
        }
    }
    order.last().map(|&i| values[i]).unwrap_or(0.0)
}
