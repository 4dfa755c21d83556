//! Error types for curve construction and queries.
//!
//! Every variant belongs to one [`ErrorKind`]: configuration problems are
//! caught before any solving starts, numerical failures name the instrument
//! that could not be fitted, domain violations report the admissible range
//! the root fell outside of, and query errors come from the finished curve.

use pillar_core::{CoreError, Date};
use pillar_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Broad class of a [`CurveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input, surfaced before any root finding.
    Configuration,
    /// A solver or optimizer failed.
    Numerical,
    /// A solved value lies outside the admissible range.
    Domain,
    /// A query on a curve was rejected.
    Query,
}

/// Error types for curve operations.
#[derive(Error, Debug, Clone)]
pub enum CurveError {
    /// No rate helpers were supplied.
    #[error("Cannot bootstrap {curve}: no rate helpers")]
    EmptyInstrumentSet {
        /// Curve being built.
        curve: String,
    },

    /// Two helpers share a pillar date.
    #[error("Duplicate pillar {date} for helper {index} ({instrument})")]
    DuplicatePillar {
        /// Position of the offending helper after sorting.
        index: usize,
        /// The shared pillar date.
        date: Date,
        /// Offending helper.
        instrument: String,
    },

    /// A helper starts before the previous pillar it should follow.
    #[error("Helper {index} ({instrument}) has dates inconsistent with the curve: {reason}")]
    InvalidHelperDates {
        /// Position of the offending helper.
        index: usize,
        /// Offending helper.
        instrument: String,
        /// What is wrong.
        reason: String,
    },

    /// Too few helpers for the chosen interpolation.
    #[error("Insufficient helpers: need at least {required}, got {got}")]
    InsufficientHelpers {
        /// Minimum required.
        required: usize,
        /// Supplied.
        got: usize,
    },

    /// A quote holds no valid value.
    #[error("Invalid quote for {instrument}: {value}")]
    InvalidQuote {
        /// Helper reading the quote.
        instrument: String,
        /// The value found.
        value: f64,
    },

    /// A helper was evaluated before being attached to a curve.
    #[error("Helper {instrument} is not attached to a curve")]
    NotAttached {
        /// Offending helper.
        instrument: String,
    },

    /// A helper refers to a curve that does not exist.
    #[error("Curve not found: {name}")]
    CurveNotFound {
        /// Name of the missing curve.
        name: String,
    },

    /// Configuration values are invalid.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Date arithmetic failed while setting up a helper.
    #[error("Date error: {0}")]
    Core(#[from] CoreError),

    /// The root finder failed on one node.
    #[error("Bootstrap failed at pillar {index} ({instrument}): {source}")]
    SolverFailure {
        /// Node index (1-based; node 0 is the reference node).
        index: usize,
        /// Helper whose quote could not be matched.
        instrument: String,
        /// The underlying solver error.
        #[source]
        source: MathError,
    },

    /// The fixed-point loop for global interpolation did not settle.
    #[error("Global refinement did not converge after {iterations} passes (max change {max_change:.3e})")]
    RefinementNotConverged {
        /// Passes performed.
        iterations: usize,
        /// Largest node change in the last pass.
        max_change: f64,
    },

    /// The joint optimizer left a residual above tolerance.
    #[error(
        "Simultaneous bootstrap failed after {iterations} iterations: \
         worst instrument {instrument} has error {error:.3e} (tolerance {tolerance:.1e})"
    )]
    SimultaneousNotConverged {
        /// Optimizer iterations performed.
        iterations: usize,
        /// Helper with the largest error.
        instrument: String,
        /// Its error.
        error: f64,
        /// Configured tolerance.
        tolerance: f64,
    },

    /// The root lies outside the admissible node range.
    #[error(
        "Domain violation at pillar {index} ({instrument}): \
         no root in admissible range [{lower:.6e}, {upper:.6e}]"
    )]
    DomainViolation {
        /// Node index.
        index: usize,
        /// Helper whose quote cannot be matched inside the range.
        instrument: String,
        /// Lower end of the admissible range.
        lower: f64,
        /// Upper end of the admissible range.
        upper: f64,
    },

    /// Negative or non-finite time requested.
    #[error("Invalid time {t}: must be finite and non-negative")]
    InvalidTime {
        /// Requested time.
        t: f64,
    },

    /// Time beyond the last node with extrapolation disabled.
    #[error("Time {t:.6} is beyond the curve's max time {max_time:.6} and extrapolation is disabled")]
    ExtrapolationDisabled {
        /// Requested time.
        t: f64,
        /// Last node time.
        max_time: f64,
    },

    /// A forward period ends before it starts.
    #[error("Invalid forward period: t2 = {t2} is before t1 = {t1}")]
    InvalidForwardPeriod {
        /// Start.
        t1: f64,
        /// End.
        t2: f64,
    },

    /// Mathematical error outside a per-node solve.
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

impl CurveError {
    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInstrumentSet { .. }
            | Self::DuplicatePillar { .. }
            | Self::InvalidHelperDates { .. }
            | Self::InsufficientHelpers { .. }
            | Self::InvalidQuote { .. }
            | Self::NotAttached { .. }
            | Self::CurveNotFound { .. }
            | Self::InvalidConfig { .. }
            | Self::Core(_) => ErrorKind::Configuration,
            Self::SolverFailure { .. }
            | Self::RefinementNotConverged { .. }
            | Self::SimultaneousNotConverged { .. } => ErrorKind::Numerical,
            Self::DomainViolation { .. } => ErrorKind::Domain,
            Self::InvalidTime { .. }
            | Self::ExtrapolationDisabled { .. }
            | Self::InvalidForwardPeriod { .. } => ErrorKind::Query,
            Self::Math(e) => match e {
                MathError::ExtrapolationNotAllowed { .. } => ErrorKind::Query,
                MathError::InvalidInput { .. } | MathError::InsufficientData { .. } => {
                    ErrorKind::Configuration
                }
                _ => ErrorKind::Numerical,
            },
        }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Creates a curve not found error.
    #[must_use]
    pub fn curve_not_found(name: impl Into<String>) -> Self {
        Self::CurveNotFound { name: name.into() }
    }

    /// True for configuration errors.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CurveError::ExtrapolationDisabled {
            t: 15.0,
            max_time: 10.0,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("15.0"));
        assert!(msg.contains("extrapolation is disabled"));
    }

    #[test]
    fn test_kinds() {
        let d = Date::from_ymd(2024, 1, 2).unwrap();
        let dup = CurveError::DuplicatePillar {
            index: 3,
            date: d,
            instrument: "5Y swap".into(),
        };
        assert_eq!(dup.kind(), ErrorKind::Configuration);
        assert!(dup.to_string().contains("2024-01-02"));

        let solver = CurveError::SolverFailure {
            index: 2,
            instrument: "6M deposit".into(),
            source: MathError::MaxEvaluationsExceeded { max: 100 },
        };
        assert_eq!(solver.kind(), ErrorKind::Numerical);

        let domain = CurveError::DomainViolation {
            index: 1,
            instrument: "3M deposit".into(),
            lower: 0.7,
            upper: 1.3,
        };
        assert_eq!(domain.kind(), ErrorKind::Domain);

        assert_eq!(CurveError::InvalidTime { t: -1.0 }.kind(), ErrorKind::Query);
        assert_eq!(
            CurveError::from(MathError::SingularMatrix).kind(),
            ErrorKind::Numerical
        );
        assert_eq!(
            CurveError::from(MathError::invalid_input("bad")).kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_core_error_converts() {
        let err: CurveError = CoreError::invalid_schedule("empty").into();
        assert!(err.is_configuration());
    }
}
