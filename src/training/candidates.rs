//! The fixed, ordered set of candidate regressors

use super::adaboost::AdaBoostRegressor;
use super::decision_tree::DecisionTreeRegressor;
use super::gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
use super::knn::KNNRegressor;
use super::linear_models::{LassoRegression, LinearRegression, RidgeRegression};
use super::models::Regressor;
use super::random_forest::RandomForestRegressor;
use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Candidate regression algorithms, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateModel {
    LinearRegression,
    Ridge,
    Lasso,
    KNeighbors,
    DecisionTree,
    RandomForest,
    GradientBoosting,
    AdaBoost,
}

impl CandidateModel {
    const ALL: [CandidateModel; 8] = [
        CandidateModel::LinearRegression,
        CandidateModel::Ridge,
        CandidateModel::Lasso,
        CandidateModel::KNeighbors,
        CandidateModel::DecisionTree,
        CandidateModel::RandomForest,
        CandidateModel::GradientBoosting,
        CandidateModel::AdaBoost,
    ];

    /// Every candidate, in the order ties are broken
    pub fn all() -> &'static [CandidateModel] {
        &Self::ALL
    }

    pub fn name(&self) -> &'static str {
        match self {
            CandidateModel::LinearRegression => "Linear Regression",
            CandidateModel::Ridge => "Ridge",
            CandidateModel::Lasso => "Lasso",
            CandidateModel::KNeighbors => "K-Neighbors Regressor",
            CandidateModel::DecisionTree => "Decision Tree",
            CandidateModel::RandomForest => "Random Forest Regressor",
            CandidateModel::GradientBoosting => "Gradient Boosting",
            CandidateModel::AdaBoost => "AdaBoost Regressor",
        }
    }

    /// Unfitted model with this candidate's fixed hyperparameters
    pub fn build(&self, seed: u64) -> TrainedModel {
        match self {
            CandidateModel::LinearRegression => TrainedModel::LinearRegression(LinearRegression::new()),
            CandidateModel::Ridge => TrainedModel::Ridge(RidgeRegression::new(1.0)),
            CandidateModel::Lasso => TrainedModel::Lasso(LassoRegression::new(1.0)),
            CandidateModel::KNeighbors => TrainedModel::KNeighbors(KNNRegressor::with_k(5)),
            CandidateModel::DecisionTree => {
                TrainedModel::DecisionTree(DecisionTreeRegressor::new().with_random_state(seed))
            }
            CandidateModel::RandomForest => {
                TrainedModel::RandomForest(RandomForestRegressor::new(100).with_random_state(seed))
            }
            CandidateModel::GradientBoosting => {
                TrainedModel::GradientBoosting(GradientBoostingRegressor::new(GradientBoostingConfig {
                    random_state: seed,
                    ..Default::default()
                }))
            }
            CandidateModel::AdaBoost => {
                TrainedModel::AdaBoost(AdaBoostRegressor::new(50, 1.0).with_random_state(seed))
            }
        }
    }
}

impl fmt::Display for CandidateModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A regressor of any candidate kind; the persisted form of the selected model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    LinearRegression(LinearRegression),
    Ridge(RidgeRegression),
    Lasso(LassoRegression),
    KNeighbors(KNNRegressor),
    DecisionTree(DecisionTreeRegressor),
    RandomForest(RandomForestRegressor),
    GradientBoosting(GradientBoostingRegressor),
    AdaBoost(AdaBoostRegressor),
}

impl TrainedModel {
    pub fn candidate(&self) -> CandidateModel {
        match self {
            TrainedModel::LinearRegression(_) => CandidateModel::LinearRegression,
            TrainedModel::Ridge(_) => CandidateModel::Ridge,
            TrainedModel::Lasso(_) => CandidateModel::Lasso,
            TrainedModel::KNeighbors(_) => CandidateModel::KNeighbors,
            TrainedModel::DecisionTree(_) => CandidateModel::DecisionTree,
            TrainedModel::RandomForest(_) => CandidateModel::RandomForest,
            TrainedModel::GradientBoosting(_) => CandidateModel::GradientBoosting,
            TrainedModel::AdaBoost(_) => CandidateModel::AdaBoost,
        }
    }

    fn as_regressor(&self) -> &dyn Regressor {
        match self {
            TrainedModel::LinearRegression(m) => m,
            TrainedModel::Ridge(m) => m,
            TrainedModel::Lasso(m) => m,
            TrainedModel::KNeighbors(m) => m,
            TrainedModel::DecisionTree(m) => m,
            TrainedModel::RandomForest(m) => m,
            TrainedModel::GradientBoosting(m) => m,
            TrainedModel::AdaBoost(m) => m,
        }
    }

    fn as_regressor_mut(&mut self) -> &mut dyn Regressor {
        match self {
            TrainedModel::LinearRegression(m) => m,
            TrainedModel::Ridge(m) => m,
            TrainedModel::Lasso(m) => m,
            TrainedModel::KNeighbors(m) => m,
            TrainedModel::DecisionTree(m) => m,
            TrainedModel::RandomForest(m) => m,
            TrainedModel::GradientBoosting(m) => m,
            TrainedModel::AdaBoost(m) => m,
        }
    }
}

impl Regressor for TrainedModel {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.as_regressor_mut().fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.as_regressor().predict(x)
    }

    fn n_features(&self) -> Option<usize> {
        self.as_regressor().n_features()
    }
}
