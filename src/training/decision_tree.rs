//! Regression tree (CART, squared-error criterion)

use super::models::{check_fit_input, check_predict_input, Regressor};
use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2, ArrayView1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node. Children are indices into the tree's node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf { value: f64, n_samples: usize },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
        impurity: f64,
    },
}

/// Number of features considered at each split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of n_features
    Sqrt,
    /// Log2 of n_features
    Log2,
    /// Fraction of n_features
    Fraction(f64),
    /// Fixed number
    Fixed(usize),
    /// All features
    All,
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        match *self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().ceil() as usize,
            MaxFeatures::Fraction(f) => (n_features as f64 * f).ceil() as usize,
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_features,
        }
        .clamp(1, n_features.max(1))
    }
}

/// Regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    /// Maximum depth (number of split levels); `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features drawn at random for each split
    pub max_features: MaxFeatures,
    /// Seed for feature sampling
    pub random_state: u64,
    nodes: Vec<TreeNode>,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeRegressor {
    pub fn new() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            random_state: 0,
            nodes: Vec::new(),
            n_features: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Number of split levels on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match &self.nodes[idx] {
                TreeNode::Leaf { .. } => max_depth = max_depth.max(depth),
                TreeNode::Split { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        max_depth
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if row[*feature_idx] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl Regressor for DecisionTreeRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;

        let n_features = x.ncols();
        let mut builder = TreeBuilder {
            x,
            y,
            params: self,
            n_try: self.max_features.resolve(n_features),
            rng: ChaCha8Rng::seed_from_u64(self.random_state),
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
        };

        let indices: Vec<usize> = (0..x.nrows()).collect();
        builder.build(&indices, 0);

        let TreeBuilder {
            nodes,
            mut importances,
            ..
        } = builder;

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        self.nodes = nodes;
        self.n_features = n_features;
        self.feature_importances = Some(Array1::from_vec(importances));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.nodes.is_empty() {
            return Err(ScorecastError::ModelNotFitted);
        }
        check_predict_input(x, self.n_features)?;

        Ok(x.rows().into_iter().map(|row| self.predict_row(row)).collect())
    }

    fn n_features(&self) -> Option<usize> {
        (!self.nodes.is_empty()).then_some(self.n_features)
    }
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a Array1<f64>,
    params: &'a DecisionTreeRegressor,
    n_try: usize,
    rng: ChaCha8Rng,
    nodes: Vec<TreeNode>,
    importances: Vec<f64>,
}

/// Best split of one node: (feature, threshold, squared-error reduction)
type SplitCandidate = (usize, f64, f64);

impl TreeBuilder<'_> {
    /// Grow the subtree for `indices` and return its node index
    fn build(&mut self, indices: &[usize], depth: usize) -> usize {
        let n_samples = indices.len();
        let mean = indices.iter().map(|&i| self.y[i]).sum::<f64>() / n_samples as f64;
        let sse: f64 = indices.iter().map(|&i| (self.y[i] - mean).powi(2)).sum();

        let should_stop = n_samples < self.params.min_samples_split
            || n_samples < 2 * self.params.min_samples_leaf
            || self.params.max_depth.is_some_and(|d| depth >= d)
            || sse <= 1e-12;

        let split = if should_stop {
            None
        } else {
            self.find_best_split(indices, mean)
        };

        let Some((feature_idx, threshold, gain)) = split else {
            self.nodes.push(TreeNode::Leaf {
                value: mean,
                n_samples,
            });
            return self.nodes.len() - 1;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[[i, feature_idx]] <= threshold);

        self.importances[feature_idx] += gain;

        // Reserve the slot so the parent precedes its children
        let idx = self.nodes.len();
        self.nodes.push(TreeNode::Leaf {
            value: mean,
            n_samples,
        });
        let left = self.build(&left_indices, depth + 1);
        let right = self.build(&right_indices, depth + 1);
        self.nodes[idx] = TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            n_samples,
            impurity: sse / n_samples as f64,
        };
        idx
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        let n_features = self.x.ncols();
        if self.n_try >= n_features {
            return (0..n_features).collect();
        }
        let mut features = rand::seq::index::sample(&mut self.rng, n_features, self.n_try).into_vec();
        features.sort_unstable();
        features
    }

    fn find_best_split(&mut self, indices: &[usize], mean: f64) -> Option<SplitCandidate> {
        let features = self.candidate_features();
        let (x, y) = (self.x, self.y);
        let min_leaf = self.params.min_samples_leaf;

        // Each feature is scanned independently; results are reduced in feature order
        let results: Vec<Option<SplitCandidate>> = features
            .par_iter()
            .map(|&feature_idx| best_split_for_feature(x, y, indices, feature_idx, mean, min_leaf))
            .collect();

        results.into_iter().flatten().fold(None, |best, cand| match best {
            Some(b) if b.2 >= cand.2 => Some(b),
            _ => Some(cand),
        })
    }
}

/// Sort the node's samples by one feature and sweep every boundary between distinct values
fn best_split_for_feature(
    x: &Array2<f64>,
    y: &Array1<f64>,
    indices: &[usize],
    feature_idx: usize,
    mean: f64,
    min_leaf: usize,
) -> Option<SplitCandidate> {
    let mut pairs: Vec<(f64, f64)> = indices
        .iter()
        .map(|&i| (x[[i, feature_idx]], y[i] - mean))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = pairs.len();
    let total_sum: f64 = pairs.iter().map(|p| p.1).sum();
    let total_sq: f64 = pairs.iter().map(|p| p.1 * p.1).sum();
    let parent_sse = total_sq - total_sum * total_sum / n as f64;

    let mut left_sum = 0.0;
    let mut left_sq = 0.0;
    let mut best: Option<(f64, f64)> = None;

    for k in 0..n - 1 {
        let (value, yk) = pairs[k];
        left_sum += yk;
        left_sq += yk * yk;

        let next_value = pairs[k + 1].0;
        if value == next_value {
            continue;
        }

        let n_left = k + 1;
        let n_right = n - n_left;
        if n_left < min_leaf || n_right < min_leaf {
            continue;
        }

        let right_sum = total_sum - left_sum;
        let right_sq = total_sq - left_sq;
        let sse_left = left_sq - left_sum * left_sum / n_left as f64;
        let sse_right = right_sq - right_sum * right_sum / n_right as f64;
        let gain = parent_sse - sse_left - sse_right;

        if gain > 1e-12 && best.map_or(true, |(_, g)| gain > g) {
            best = Some(((value + next_value) / 2.0, gain));
        }
    }

    best.map(|(threshold, gain)| (feature_idx, threshold, gain))
}
