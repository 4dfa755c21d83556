//! Levenberg-Marquardt for square and overdetermined residual systems.

use log::{debug, trace};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};
use crate::linear_algebra::solve_linear_system;

/// Configuration for [`levenberg_marquardt`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevenbergMarquardtConfig {
    /// Maximum number of accepted or rejected steps.
    pub max_iterations: usize,
    /// Converged once every `|r_i|` is at most this.
    pub function_tolerance: f64,
    /// Stop once a step is this small relative to the parameters.
    pub parameter_tolerance: f64,
    /// Stop once every component of `J^T r` is at most this.
    pub gradient_tolerance: f64,
    /// Initial damping.
    pub initial_lambda: f64,
    /// Damping multiplier on rejection, divisor on acceptance.
    pub lambda_factor: f64,
    /// Lower clamp for the damping.
    pub min_lambda: f64,
    /// Damping beyond which the search gives up.
    pub max_lambda: f64,
    /// Relative bump of the finite-difference Jacobian.
    pub jacobian_step: f64,
}

impl Default for LevenbergMarquardtConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            function_tolerance: 1e-12,
            parameter_tolerance: 1e-16,
            gradient_tolerance: 0.0,
            initial_lambda: 1e-3,
            lambda_factor: 10.0,
            min_lambda: 1e-12,
            max_lambda: 1e12,
            jacobian_step: 1e-7,
        }
    }
}

impl LevenbergMarquardtConfig {
    /// Sets the function tolerance.
    #[must_use]
    pub fn with_function_tolerance(mut self, tolerance: f64) -> Self {
        self.function_tolerance = tolerance;
        self
    }

    /// Sets the iteration limit.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> MathResult<()> {
        let positive = [
            ("function_tolerance", self.function_tolerance),
            ("initial_lambda", self.initial_lambda),
            ("jacobian_step", self.jacobian_step),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| !(*v > 0.0 && v.is_finite())) {
            return Err(MathError::invalid_input(format!(
                "{name} must be positive and finite, got {value}"
            )));
        }
        if !(self.lambda_factor > 1.0) {
            return Err(MathError::invalid_input("lambda_factor must exceed 1"));
        }
        if self.max_iterations == 0 {
            return Err(MathError::invalid_input("max_iterations must be positive"));
        }
        Ok(())
    }
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// All residuals within `function_tolerance`.
    FunctionTolerance,
    /// Gradient vanished before the residuals did.
    GradientTolerance,
    /// Steps stopped moving the parameters.
    ParameterTolerance,
    /// Damping grew past `max_lambda` without an improving step.
    DampingExhausted,
    /// Iteration limit reached.
    MaxIterations,
}

/// Outcome of [`levenberg_marquardt`].
#[derive(Debug, Clone, PartialEq)]
pub struct LevenbergMarquardtResult {
    /// Final parameters.
    pub parameters: Vec<f64>,
    /// Residuals at the final parameters.
    pub residuals: Vec<f64>,
    /// Iterations performed.
    pub iterations: usize,
    /// Why the search stopped.
    pub termination: Termination,
}

impl LevenbergMarquardtResult {
    /// True when every residual is within the function tolerance.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.termination == Termination::FunctionTolerance
    }

    /// Largest absolute residual.
    #[must_use]
    pub fn max_residual(&self) -> f64 {
        max_abs(&self.residuals)
    }
}

/// A residual system `r(x)` to drive towards zero.
pub trait LeastSquaresProblem {
    /// Error raised while evaluating residuals.
    type Error: From<MathError>;

    /// Residuals at `x`.
    fn residuals(&self, x: &[f64]) -> Result<Vec<f64>, Self::Error>;

    /// Jacobian `dr_i/dx_j` at `x`.
    ///
    /// Defaults to central differences, one column at a time.
    fn jacobian(&self, x: &[f64], step: f64) -> Result<DMatrix<f64>, Self::Error> {
        numerical_jacobian(|p| self.residuals(p), x, step)
    }
}

/// One central-difference Jacobian column, `dr/dx_j`.
pub fn jacobian_column<F, E>(f: F, x: &[f64], j: usize, step: f64) -> Result<Vec<f64>, E>
where
    F: Fn(&[f64]) -> Result<Vec<f64>, E>,
{
    let h = step * x[j].abs().max(1.0);
    let mut bumped = x.to_vec();
    bumped[j] = x[j] + h;
    let up = f(&bumped)?;
    bumped[j] = x[j] - h;
    let down = f(&bumped)?;
    Ok(up.iter().zip(&down).map(|(u, d)| (u - d) / (2.0 * h)).collect())
}

/// Central-difference Jacobian of `f` at `x`.
pub fn numerical_jacobian<F, E>(f: F, x: &[f64], step: f64) -> Result<DMatrix<f64>, E>
where
    F: Fn(&[f64]) -> Result<Vec<f64>, E>,
{
    let columns = (0..x.len())
        .map(|j| jacobian_column(&f, x, j, step))
        .collect::<Result<Vec<_>, E>>()?;
    let rows = columns.first().map_or(0, Vec::len);
    Ok(DMatrix::from_fn(rows, x.len(), |i, j| columns[j][i]))
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
}

fn sum_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// Minimizes `sum r_i(x)^2` from `initial`.
///
/// Damping follows Marquardt: the normal equations are
/// `(J^T J + lambda diag(J^T J)) delta = -J^T r`. An improving step is
/// accepted and the damping relaxed; a worse one is rejected and the damping
/// raised.
///
/// Only evaluation errors are returned as `Err`; running out of iterations or
/// damping is reported through [`Termination`] so the caller can decide.
pub fn levenberg_marquardt<P>(
    problem: &P,
    initial: &[f64],
    config: &LevenbergMarquardtConfig,
) -> Result<LevenbergMarquardtResult, P::Error>
where
    P: LeastSquaresProblem + ?Sized,
{
    config.validate()?;

    let mut x = initial.to_vec();
    let mut r = problem.residuals(&x)?;
    if r.iter().any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("initial residuals are not finite").into());
    }
    let mut lambda = config.initial_lambda;

    let finish = |x: Vec<f64>,
                  r: Vec<f64>,
                  iterations: usize,
                  termination: Termination|
     -> Result<LevenbergMarquardtResult, P::Error> {
        debug!(
            "levenberg-marquardt: {termination:?} after {iterations} iterations, max residual {:.3e}",
            max_abs(&r)
        );
        Ok(LevenbergMarquardtResult {
            parameters: x,
            residuals: r,
            iterations,
            termination,
        })
    };

    if max_abs(&r) <= config.function_tolerance {
        return finish(x, r, 0, Termination::FunctionTolerance);
    }

    let mut iteration = 0;
    while iteration < config.max_iterations {
        let jacobian = problem.jacobian(&x, config.jacobian_step)?;
        let residual_vector = DVector::from_column_slice(&r);
        let jtj = jacobian.transpose() * &jacobian;
        let gradient = jacobian.transpose() * &residual_vector;

        if gradient.amax() <= config.gradient_tolerance {
            return finish(x, r, iteration, Termination::GradientTolerance);
        }

        let cost = sum_squares(&r);
        // Inner loop raises the damping until a step improves the cost
        loop {
            iteration += 1;
            let mut damped = jtj.clone();
            for k in 0..x.len() {
                damped[(k, k)] += lambda * jtj[(k, k)].max(f64::EPSILON);
            }

            let step = match solve_linear_system(&damped, &(-&gradient)) {
                Ok(step) => Some(step),
                Err(MathError::SingularMatrix) => None,
                Err(e) => return Err(e.into()),
            };

            if let Some(step) = step {
                let candidate: Vec<f64> = x.iter().zip(step.iter()).map(|(a, d)| a + d).collect();
                let r_candidate = problem.residuals(&candidate)?;
                let improved = r_candidate.iter().all(|v| v.is_finite())
                    && sum_squares(&r_candidate) < cost;

                trace!(
                    "iteration {iteration}: lambda {lambda:.1e}, |step| {:.3e}, accepted {improved}",
                    step.amax()
                );

                if improved {
                    let x_norm = x.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
                    x = candidate;
                    r = r_candidate;
                    lambda = (lambda / config.lambda_factor).max(config.min_lambda);

                    if max_abs(&r) <= config.function_tolerance {
                        return finish(x, r, iteration, Termination::FunctionTolerance);
                    }
                    if step.amax() <= config.parameter_tolerance * (x_norm + config.parameter_tolerance) {
                        return finish(x, r, iteration, Termination::ParameterTolerance);
                    }
                    break;
                }
            }

            lambda *= config.lambda_factor;
            if lambda > config.max_lambda {
                return finish(x, r, iteration, Termination::DampingExhausted);
            }
            if iteration >= config.max_iterations {
                return finish(x, r, iteration, Termination::MaxIterations);
            }
        }
    }

    finish(x, r, iteration, Termination::MaxIterations)
}
