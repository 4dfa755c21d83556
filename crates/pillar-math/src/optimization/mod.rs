//! Optimization algorithms.
//!
//! Nonlinear least squares for fitting many curve nodes at once.

mod levenberg_marquardt;

pub use levenberg_marquardt::{
    jacobian_column, levenberg_marquardt, numerical_jacobian, LeastSquaresProblem,
    LevenbergMarquardtConfig, LevenbergMarquardtResult, Termination,
};
