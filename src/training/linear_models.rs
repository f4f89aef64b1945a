//! Linear model implementations

use super::models::{check_fit_input, check_predict_input, Regressor};
use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Pivots below this fraction of the largest diagonal entry count as singular
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Retries once with a small diagonal jitter if the matrix is (near-)singular.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    if let Some(x) = cholesky_factor_solve(a, b) {
        return Some(x);
    }

    let mut a_reg = a.clone();
    let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
    for k in 0..n {
        a_reg[[k, k]] += ridge.max(1e-12);
    }
    cholesky_factor_solve(&a_reg, b)
}

fn cholesky_factor_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let max_diag = a.diag().iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let tol = PIVOT_TOLERANCE * max_diag.max(1.0);

    // A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= tol {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Center columns of `x` and `y`, returning the means used
fn center(x: &Array2<f64>, y: &Array1<f64>) -> Result<(Array2<f64>, Array1<f64>, Array1<f64>, f64)> {
    let x_mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| ScorecastError::ComputationError("cannot center an empty matrix".to_string()))?;
    let y_mean = y.mean().unwrap_or(0.0);

    let x_centered = x - &x_mean.view().insert_axis(Axis(0));
    let y_centered = y - y_mean;
    Ok((x_centered, y_centered, x_mean, y_mean))
}

/// Solve (X^T X + alpha*I) w = X^T y on centered data
fn solve_normal_equations(x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> Result<Array1<f64>> {
    let mut xtx = x.t().dot(x);
    for i in 0..xtx.nrows() {
        xtx[[i, i]] += alpha;
    }
    let xty = x.t().dot(y);

    cholesky_solve(&xtx, &xty).ok_or_else(|| {
        ScorecastError::ComputationError("normal equations are singular".to_string())
    })
}

/// Fitted linear coefficients shared by the linear regressors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearCoefficients {
    pub weights: Array1<f64>,
    pub intercept: f64,
}

impl LinearCoefficients {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        check_predict_input(x, self.weights.len())?;
        Ok(x.dot(&self.weights) + self.intercept)
    }
}

/// Ordinary least squares
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    fitted: Option<LinearCoefficients>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coefficients(&self) -> Option<&LinearCoefficients> {
        self.fitted.as_ref()
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;
        let (x_c, y_c, x_mean, y_mean) = center(x, y)?;

        let weights = solve_normal_equations(&x_c, &y_c, 0.0)?;
        let intercept = y_mean - weights.dot(&x_mean);

        self.fitted = Some(LinearCoefficients { weights, intercept });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.fitted
            .as_ref()
            .ok_or(ScorecastError::ModelNotFitted)?
            .predict(x)
    }

    fn n_features(&self) -> Option<usize> {
        self.fitted.as_ref().map(|c| c.weights.len())
    }
}

/// Ridge Regression (L2 regularization)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub alpha: f64,
    fitted: Option<LinearCoefficients>,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            fitted: None,
        }
    }

    pub fn coefficients(&self) -> Option<&LinearCoefficients> {
        self.fitted.as_ref()
    }
}

impl Regressor for RidgeRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;
        if !(self.alpha >= 0.0) {
            return Err(ScorecastError::ValidationError(format!(
                "ridge alpha must be non-negative, got {}",
                self.alpha
            )));
        }
        let (x_c, y_c, x_mean, y_mean) = center(x, y)?;

        let weights = solve_normal_equations(&x_c, &y_c, self.alpha)?;
        let intercept = y_mean - weights.dot(&x_mean);

        self.fitted = Some(LinearCoefficients { weights, intercept });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.fitted
            .as_ref()
            .ok_or(ScorecastError::ModelNotFitted)?
            .predict(x)
    }

    fn n_features(&self) -> Option<usize> {
        self.fitted.as_ref().map(|c| c.weights.len())
    }
}

/// Lasso Regression (L1 regularization via coordinate descent).
///
/// Minimizes `1/(2n) * ||y - Xw||² + alpha * ||w||₁`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LassoRegression {
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    fitted: Option<LinearCoefficients>,
}

impl Default for LassoRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LassoRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            max_iter: 1000,
            tol: 1e-6,
            fitted: None,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn coefficients(&self) -> Option<&LinearCoefficients> {
        self.fitted.as_ref()
    }

    /// Soft-threshold operator for L1 proximal step
    fn soft_threshold(val: f64, threshold: f64) -> f64 {
        if val > threshold {
            val - threshold
        } else if val < -threshold {
            val + threshold
        } else {
            0.0
        }
    }
}

impl Regressor for LassoRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;
        if !(self.alpha >= 0.0) {
            return Err(ScorecastError::ValidationError(format!(
                "lasso alpha must be non-negative, got {}",
                self.alpha
            )));
        }

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let (x_c, y_c, x_mean, y_mean) = center(x, y)?;

        let col_norms: Vec<f64> = (0..n_features)
            .map(|j| x_c.column(j).mapv(|v| v * v).sum())
            .collect();

        let mut w = Array1::<f64>::zeros(n_features);
        let lambda = self.alpha * n_samples as f64;
        let mut r = y_c.clone();

        for _ in 0..self.max_iter {
            let mut max_delta = 0.0f64;

            for j in 0..n_features {
                if col_norms[j] < 1e-15 {
                    w[j] = 0.0;
                    continue;
                }
                let rho = x_c.column(j).dot(&r) + col_norms[j] * w[j];
                let old_wj = w[j];
                w[j] = Self::soft_threshold(rho, lambda) / col_norms[j];

                let delta = old_wj - w[j];
                if delta != 0.0 {
                    r.scaled_add(delta, &x_c.column(j));
                    max_delta = max_delta.max(delta.abs());
                }
            }

            if max_delta < self.tol {
                break;
            }
        }

        let intercept = y_mean - w.dot(&x_mean);
        self.fitted = Some(LinearCoefficients {
            weights: w,
            intercept,
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.fitted
            .as_ref()
            .ok_or(ScorecastError::ModelNotFitted)?
            .predict(x)
    }

    fn n_features(&self) -> Option<usize> {
        self.fitted.as_ref().map(|c| c.weights.len())
    }
}
