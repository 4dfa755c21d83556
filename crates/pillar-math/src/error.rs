//! Error types for mathematical operations.

use thiserror::Error;

/// A specialized Result type for mathematical operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors that can occur during mathematical operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Iterative algorithm failed to converge.
    #[error("Convergence failed after {iterations} iterations (residual: {residual:.2e})")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: u32,
        /// Final residual value.
        residual: f64,
    },

    /// A caller-supplied bracket does not contain a sign change.
    #[error("Invalid bracket: f({a}) = {fa:.2e} and f({b}) = {fb:.2e} have same sign")]
    InvalidBracket {
        /// Lower bound of bracket.
        a: f64,
        /// Upper bound of bracket.
        b: f64,
        /// Function value at a.
        fa: f64,
        /// Function value at b.
        fb: f64,
    },

    /// Bracket expansion around a guess did not find a sign change.
    #[error(
        "Root not bracketed after {evaluations} evaluations: \
         f({lower}) = {f_lower:.2e}, f({upper}) = {f_upper:.2e}"
    )]
    RootNotBracketed {
        /// Evaluations spent searching.
        evaluations: usize,
        /// Last lower end tried.
        lower: f64,
        /// Last upper end tried.
        upper: f64,
        /// Function value at the lower end.
        f_lower: f64,
        /// Function value at the upper end.
        f_upper: f64,
    },

    /// The evaluation budget ran out while refining a valid bracket.
    #[error("Maximum number of function evaluations ({max}) exceeded")]
    MaxEvaluationsExceeded {
        /// The configured budget.
        max: usize,
    },

    /// The objective returned NaN or an infinity.
    #[error("Non-finite function value {value} at x = {x}")]
    NonFiniteValue {
        /// Argument that produced the value.
        x: f64,
        /// The offending value.
        value: f64,
    },

    /// Matrix is singular (not invertible).
    #[error("Singular matrix: cannot invert")]
    SingularMatrix,

    /// Matrix dimensions are incompatible.
    #[error("Incompatible matrix dimensions: ({rows1}x{cols1}) and ({rows2}x{cols2})")]
    DimensionMismatch {
        /// Rows in first matrix.
        rows1: usize,
        /// Columns in first matrix.
        cols1: usize,
        /// Rows in second matrix.
        rows2: usize,
        /// Columns in second matrix.
        cols2: usize,
    },

    /// Interpolation point is outside the valid range.
    #[error("Extrapolation not allowed: {x} is outside [{min}, {max}]")]
    ExtrapolationNotAllowed {
        /// The query point.
        x: f64,
        /// Minimum valid value.
        min: f64,
        /// Maximum valid value.
        max: f64,
    },

    /// Insufficient data points for operation.
    #[error("Insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum required points.
        required: usize,
        /// Actual number of points.
        actual: usize,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl MathError {
    /// Creates a convergence failed error.
    #[must_use]
    pub fn convergence_failed(iterations: u32, residual: f64) -> Self {
        Self::ConvergenceFailed {
            iterations,
            residual,
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// True for failures to find or exploit a sign change.
    #[must_use]
    pub fn is_bracketing_failure(&self) -> bool {
        matches!(
            self,
            Self::RootNotBracketed { .. } | Self::InvalidBracket { .. }
        )
    }
}
