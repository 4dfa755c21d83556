//! # Pillar Curves
//!
//! Piecewise yield curve bootstrapping for the Pillar library.
//!
//! This crate provides:
//!
//! - **Term Structures**: the [`TermStructure`] query facade (discount
//!   factors, zero rates, forward rates) and [`PiecewiseYieldCurve`]
//! - **Rate Helpers**: deposits, FRAs, futures, swaps and OIS as bootstrap
//!   constraints
//! - **Curve Traits**: discount, zero-yield and forward-rate node strategies
//! - **Bootstrap**: node-by-node root finding with refinement for global
//!   interpolation, and a joint Levenberg-Marquardt fit
//! - **Multi-Curve**: curve sets bootstrapped in dependency order
//! - **Repricing**: audit reports of how well a curve fits its helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use pillar_curves::prelude::*;
//!
//! let trade = Date::from_ymd(2025, 1, 2).unwrap();
//! let curve = PiecewiseCurveBuilder::new(trade)
//!     .with_helper(eur::deposit("3M", 0.0300, trade).unwrap())
//!     .with_helper(eur::deposit("6M", 0.0305, trade).unwrap())
//!     .with_helper(eur::euribor_6m_swap("2Y", 0.0290, trade).unwrap())
//!     .with_helper(eur::euribor_6m_swap("5Y", 0.0285, trade).unwrap())
//!     .bootstrap()
//!     .unwrap();
//!
//! let df = curve.discount(1.5).unwrap();
//! let zero = curve.zero_rate(1.5, Compounding::Continuous).unwrap();
//! assert!((df - (-zero * 1.5).exp()).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]

pub mod bootstrap;
pub mod builder;
pub mod config;
pub mod conventions;
pub mod curves;
pub mod error;
pub mod instruments;
pub mod multicurve;
pub mod quote;
pub mod repricing;
pub mod term_structure;
pub mod traits;
pub mod value_type;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bootstrap::{CurveSpec, IterativeBootstrap, SimultaneousBootstrap};
    pub use crate::builder::{BootstrapMethod, PiecewiseCurveBuilder};
    pub use crate::config::{BootstrapConfig, SimultaneousConfig};
    pub use crate::conventions::{eur, usd, IndexConventions, OisConventions, SwapConventions};
    pub use crate::curves::PiecewiseYieldCurve;
    pub use crate::error::{CurveError, CurveResult, ErrorKind};
    pub use crate::instruments::{
        DepositHelper, FraHelper, FuturesHelper, InstrumentType, OisHelper, PillarChoice,
        RateHelper, SwapHelper,
    };
    pub use crate::multicurve::{CurveId, CurveLookup, CurveMap, CurveSet, CurveSource};
    pub use crate::quote::Quote;
    pub use crate::repricing::{tolerances, BootstrapResult, RepricingCheck, RepricingReport};
    pub use crate::term_structure::TermStructure;
    pub use crate::value_type::ValueType;

    pub use pillar_core::types::{Compounding, Date};
    pub use pillar_math::interpolation::InterpolationMethod;
    pub use pillar_math::solvers::SolverKind;
}

pub use curves::PiecewiseYieldCurve;
pub use error::{CurveError, CurveResult};
pub use term_structure::TermStructure;
