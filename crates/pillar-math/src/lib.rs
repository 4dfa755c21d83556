//! # Pillar Math
//!
//! Numerical building blocks for curve bootstrapping.
//!
//! This crate provides:
//!
//! - **Solvers**: one-dimensional root finding behind the [`solvers::RootFinder`]
//!   trait (Brent, Bisection, False Position, Ridder, Secant, Newton)
//! - **Interpolation**: local and global interpolators behind
//!   [`interpolation::Interpolator`]
//! - **Optimization**: Levenberg-Marquardt for simultaneous fits
//! - **Linear Algebra**: tridiagonal and dense solves
//!
//! ## Design Philosophy
//!
//! - **Explicit failure**: budgets, brackets and domains are checked, and
//!   every failure carries the numbers that caused it
//! - **Fallible objectives**: solvers accept closures that return `Result`
//!   and may mutate the state they evaluate

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::if_not_else)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::single_match_else)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::derivable_impls)]

pub mod error;
pub mod interpolation;
pub mod linear_algebra;
pub mod optimization;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{
        BackwardFlat, CubicSpline, InterpolationMethod, Interpolator, LinearInterpolator,
        LogLinearInterpolator,
    };
    pub use crate::optimization::{
        levenberg_marquardt, LeastSquaresProblem, LevenbergMarquardtConfig,
        LevenbergMarquardtResult, Termination,
    };
    pub use crate::solvers::{
        Bisection, Brent, FalsePosition, Newton, NewtonSafe, Ridder, RootFinder, Secant,
        SolverConfig, SolverKind, SolverResult,
    };
}

pub use error::{MathError, MathResult};
