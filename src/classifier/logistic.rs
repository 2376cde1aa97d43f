// Binary logistic regression over sparse TF-IDF rows.
//
// Objective: mean log-loss + ||w||² / (2·C·n), intercept unpenalized. That is
// the usual C-parameterized L2 objective divided through by n, so C keeps its
// familiar meaning. Fitting is full-batch gradient descent with a fixed
// visiting order, which makes training fully deterministic. The step is
// `step_scale / L`, where L bounds the gradient's Lipschitz constant, so the
// objective decreases monotonically for any step_scale below 2.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::tfidf::SparseVector;
use crate::error::{ClassifierError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Inverse L2 regularization strength.
    pub c: f64,
    pub max_iter: usize,
    /// Stop once the objective improves by less than this between iterations.
    pub tolerance: f64,
    /// Multiplier on the 1/L step size; must lie in (0, 2).
    pub step_scale: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tolerance: 1e-6,
            step_scale: 1.0,
        }
    }
}

impl LogisticParams {
    fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(ClassifierError::training(format!("C must be positive, got {}", self.c)));
        }
        if !(self.step_scale > 0.0 && self.step_scale < 2.0) {
            return Err(ClassifierError::training(format!(
                "step scale must be in (0, 2), got {}",
                self.step_scale
            )));
        }
        if self.max_iter == 0 {
            return Err(ClassifierError::training("max_iter must be at least 1"));
        }
        Ok(())
    }
}

/// Fitted coefficients. `predict_proba_positive` is the probability of
/// class index 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

/// What happened during a fit, for logging and reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    pub iterations: usize,
    pub converged: bool,
    pub final_objective: f64,
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Log-loss of one sample given its decision value, without forming p.
fn sample_loss(z: f64, y: f64) -> f64 {
    // log(1 + e^z) - y·z, evaluated without overflow
    let softplus = if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    };
    softplus - y * z
}

impl LogisticRegression {
    pub fn from_parts(coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        let model = Self {
            coefficients,
            intercept,
        };
        model.validate()?;
        Ok(model)
    }

    /// Fit on rows `x` with binary targets `y` (false = class 0, true = class 1).
    pub fn fit(
        x: &[SparseVector],
        y: &[bool],
        n_features: usize,
        params: &LogisticParams,
    ) -> Result<(Self, FitSummary)> {
        params.validate()?;
        if x.is_empty() {
            return Err(ClassifierError::training("no samples to fit"));
        }
        if x.len() != y.len() {
            return Err(ClassifierError::training(format!(
                "{} rows but {} targets",
                x.len(),
                y.len()
            )));
        }

        let n = x.len() as f64;
        let l2 = 1.0 / (params.c * n);
        let targets: Vec<f64> = y.iter().map(|&t| if t { 1.0 } else { 0.0 }).collect();

        // Log-loss curvature is at most 1/4 per unit of squared row norm; the
        // intercept adds one more unit.
        let max_sq_norm = x
            .iter()
            .map(|r| r.l2_norm().powi(2))
            .fold(0.0_f64, f64::max);
        let lipschitz = 0.25 * (max_sq_norm + 1.0) + l2;
        let step = params.step_scale / lipschitz;

        let mut model = Self {
            coefficients: vec![0.0; n_features],
            intercept: 0.0,
        };
        let mut grad_w = vec![0.0; n_features];
        let mut previous = model.objective(x, &targets, l2);
        let mut summary = FitSummary {
            iterations: 0,
            converged: false,
            final_objective: previous,
        };

        for iter in 1..=params.max_iter {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;
            for (row, &target) in x.iter().zip(&targets) {
                let err = sigmoid(model.decision(row)) - target;
                for &(idx, value) in row.entries() {
                    if let Some(g) = grad_w.get_mut(idx) {
                        *g += err * value;
                    }
                }
                grad_b += err;
            }

            for (w, g) in model.coefficients.iter_mut().zip(&grad_w) {
                *w -= step * (g / n + l2 * *w);
            }
            model.intercept -= step * grad_b / n;

            let current = model.objective(x, &targets, l2);
            summary.iterations = iter;
            summary.final_objective = current;
            if !current.is_finite() {
                return Err(ClassifierError::training(
                    "objective diverged; lower the step scale",
                ));
            }
            if (previous - current).abs() < params.tolerance {
                summary.converged = true;
                debug!(iterations = iter, objective = current, "Logistic regression converged");
                break;
            }
            previous = current;
        }

        if summary.converged {
            info!(
                iterations = summary.iterations,
                objective = summary.final_objective,
                "Fitted logistic regression"
            );
        } else {
            warn!(
                max_iter = params.max_iter,
                objective = summary.final_objective,
                "Logistic regression hit max_iter before converging"
            );
        }

        Ok((model, summary))
    }

    fn objective(&self, x: &[SparseVector], targets: &[f64], l2: f64) -> f64 {
        let loss: f64 = x
            .iter()
            .zip(targets)
            .map(|(row, &t)| sample_loss(self.decision(row), t))
            .sum::<f64>()
            / x.len() as f64;
        let penalty: f64 = self.coefficients.iter().map(|w| w * w).sum::<f64>() * l2 / 2.0;
        loss + penalty
    }

    /// Log-odds of class 1.
    pub fn decision(&self, row: &SparseVector) -> f64 {
        row.dot(&self.coefficients) + self.intercept
    }

    /// Probability of class index 1.
    pub fn predict_proba_positive(&self, row: &SparseVector) -> f64 {
        sigmoid(self.decision(row))
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(ClassifierError::serialization(
                "classifier weights contain non-finite values",
            ));
        }
        Ok(())
    }
}
