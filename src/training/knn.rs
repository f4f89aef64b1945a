//! K-Nearest Neighbors regression

use super::models::{check_fit_input, check_predict_input, Regressor};
use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Distance metric for KNN
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Euclidean distance (L2)
    #[default]
    Euclidean,
    /// Manhattan distance (L1)
    Manhattan,
    /// Minkowski distance with parameter p
    Minkowski(f64),
}

/// Weighting scheme for neighbors
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum WeightScheme {
    /// All neighbors have equal weight
    #[default]
    Uniform,
    /// Closer neighbors have more weight (inverse distance)
    Distance,
}

/// KNN configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KNNConfig {
    /// Number of neighbors
    pub n_neighbors: usize,
    /// Distance metric
    pub metric: DistanceMetric,
    /// Weighting scheme
    pub weights: WeightScheme,
}

impl Default for KNNConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            metric: DistanceMetric::Euclidean,
            weights: WeightScheme::Uniform,
        }
    }
}

/// K-Nearest Neighbors Regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNRegressor {
    config: KNNConfig,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl Default for KNNRegressor {
    fn default() -> Self {
        Self::new(KNNConfig::default())
    }
}

impl KNNRegressor {
    pub fn new(config: KNNConfig) -> Self {
        Self {
            config,
            x_train: None,
            y_train: None,
        }
    }

    /// Create with default config and specified k
    pub fn with_k(k: usize) -> Self {
        Self::new(KNNConfig {
            n_neighbors: k,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &KNNConfig {
        &self.config
    }
}

impl Regressor for KNNRegressor {
    /// Stores the training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;
        if self.config.n_neighbors == 0 {
            return Err(ScorecastError::ValidationError(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        if let DistanceMetric::Minkowski(p) = self.config.metric {
            if !(p >= 1.0) {
                return Err(ScorecastError::ValidationError(format!(
                    "Minkowski p must be >= 1, got {p}"
                )));
            }
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    /// Predict target values (parallelized over query rows)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(x_train), Some(y_train)) => (x_train, y_train),
            _ => return Err(ScorecastError::ModelNotFitted),
        };
        check_predict_input(x, x_train.ncols())?;

        let k = self.config.n_neighbors.min(x_train.nrows());
        let metric = self.config.metric;
        let weights = self.config.weights;

        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let neighbors = find_k_nearest(x.row(i), x_train, y_train, k, metric);
                weighted_mean_from(&neighbors, weights)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    fn n_features(&self) -> Option<usize> {
        self.x_train.as_ref().map(|x| x.ncols())
    }
}

/// Max-heap entry ordered by distance, then by training row so ties resolve to earlier rows
struct Neighbor {
    dist: f64,
    row: usize,
    target: f64,
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then(self.row.cmp(&other.row))
    }
}

/// Find k nearest neighbors using a max-heap: O(n log k)
fn find_k_nearest(
    point: ArrayView1<f64>,
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    k: usize,
    metric: DistanceMetric,
) -> Vec<(f64, f64)> {
    let mut heap = BinaryHeap::with_capacity(k + 1);
    for (row, train_row) in x_train.rows().into_iter().enumerate() {
        let candidate = Neighbor {
            dist: compute_distance(point, train_row, metric),
            row,
            target: y_train[row],
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|top| candidate < *top) {
            heap.pop();
            heap.push(candidate);
        }
    }
    heap.into_sorted_vec()
        .into_iter()
        .map(|n| (n.dist, n.target))
        .collect()
}

/// Compute distance between two points using the specified metric
fn compute_distance(a: ArrayView1<f64>, b: ArrayView1<f64>, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Euclidean => a
            .iter()
            .zip(b.iter())
            .map(|(ai, bi)| {
                let d = ai - bi;
                d * d
            })
            .sum::<f64>()
            .sqrt(),
        DistanceMetric::Manhattan => a.iter().zip(b.iter()).map(|(ai, bi)| (ai - bi).abs()).sum(),
        DistanceMetric::Minkowski(p) => a
            .iter()
            .zip(b.iter())
            .map(|(ai, bi)| (ai - bi).abs().powf(p))
            .sum::<f64>()
            .powf(1.0 / p),
    }
}

/// Compute weighted mean of neighbor targets
fn weighted_mean_from(neighbors: &[(f64, f64)], weights: WeightScheme) -> f64 {
    let uniform = || neighbors.iter().map(|(_, y)| y).sum::<f64>() / neighbors.len() as f64;
    match weights {
        WeightScheme::Uniform => uniform(),
        WeightScheme::Distance => {
            // An exact match takes the whole weight
            let exact: Vec<f64> = neighbors
                .iter()
                .filter(|(d, _)| *d == 0.0)
                .map(|(_, y)| *y)
                .collect();
            if !exact.is_empty() {
                return exact.iter().sum::<f64>() / exact.len() as f64;
            }

            let mut weighted_sum = 0.0;
            let mut weight_total = 0.0;
            for &(dist, y) in neighbors {
                let w = 1.0 / dist;
                weighted_sum += w * y;
                weight_total += w;
            }
            if weight_total > 0.0 {
                weighted_sum / weight_total
            } else {
                uniform()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn create_regression_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec((10, 2), (0..20).map(|i| i as f64).collect()).unwrap();
        let y: Array1<f64> = x.rows().into_iter().map(|row| row[0] + row[1]).collect();
        (x, y)
    }

    #[test]
    fn test_knn_regressor() {
        let (x, y) = create_regression_data();
        let mut knn = KNNRegressor::with_k(3);
        knn.fit(&x, &y).unwrap();

        let predictions = knn.predict(&x).unwrap();
        let mse: f64 = y
            .iter()
            .zip(predictions.iter())
            .map(|(yi, pi)| (yi - pi).powi(2))
            .sum::<f64>()
            / y.len() as f64;
        assert!(mse < 20.0, "MSE ({mse}) should be small");
    }

    #[test]
    fn test_k1_reproduces_training_targets() {
        let (x, y) = create_regression_data();
        let mut knn = KNNRegressor::with_k(1);
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_k_larger_than_training_set() {
        let x = array![[0.0], [1.0]];
        let y = array![2.0, 4.0];
        let mut knn = KNNRegressor::with_k(5);
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&array![[0.4]]).unwrap()[0], 3.0);
    }

    #[test]
    fn test_distance_weighting() {
        let x = array![[0.0], [10.0]];
        let y = array![0.0, 10.0];
        let mut knn = KNNRegressor::new(KNNConfig {
            n_neighbors: 2,
            weights: WeightScheme::Distance,
            ..Default::default()
        });
        knn.fit(&x, &y).unwrap();

        let pred = knn.predict(&array![[1.0], [10.0]]).unwrap();
        assert!(pred[0] < 5.0);
        assert_eq!(pred[1], 10.0);
    }

    #[test]
    fn test_distance_metrics() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert_eq!(compute_distance(a.view(), b.view(), DistanceMetric::Euclidean), 5.0);
        assert_eq!(compute_distance(a.view(), b.view(), DistanceMetric::Manhattan), 7.0);
        let m = compute_distance(a.view(), b.view(), DistanceMetric::Minkowski(2.0));
        assert!((m - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_before_fit() {
        let knn = KNNRegressor::default();
        assert!(matches!(
            knn.predict(&array![[1.0]]),
            Err(ScorecastError::ModelNotFitted)
        ));
    }
}
