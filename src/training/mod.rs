//! Model training module
//!
//! Provides the regressors evaluated by the model trainer stage:
//! - Linear models (OLS, Ridge, Lasso)
//! - K-Nearest Neighbors
//! - Decision trees and Random Forests
//! - Gradient boosting
//! - AdaBoost
//!
//! plus the fixed [`CandidateModel`] list and the [`ModelTrainer`] stage that
//! selects and persists the best of them.

mod candidates;
mod models;
mod trainer;
pub mod adaboost;
pub mod decision_tree;
pub mod gradient_boosting;
pub mod knn;
pub mod linear_models;
pub mod random_forest;

pub use adaboost::{AdaBoostRegressor, BoostLoss};
pub use candidates::{CandidateModel, TrainedModel};
pub use decision_tree::{DecisionTreeRegressor, MaxFeatures, TreeNode};
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use knn::{DistanceMetric, KNNConfig, KNNRegressor, WeightScheme};
pub use linear_models::{LassoRegression, LinearCoefficients, LinearRegression, RidgeRegression};
pub use models::{r2_score, ModelMetrics, Regressor};
pub use random_forest::RandomForestRegressor;
pub use trainer::{select_best, ModelArtifact, ModelReport, ModelTrainer, TrainerOutcome};
