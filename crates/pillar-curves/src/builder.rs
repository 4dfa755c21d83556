//! Fluent builder for piecewise yield curves.
//!
//! # Example
//!
//! ```rust
//! use pillar_core::types::Compounding;
//! use pillar_core::Date;
//! use pillar_curves::builder::PiecewiseCurveBuilder;
//! use pillar_curves::conventions::eur;
//! use pillar_curves::term_structure::TermStructure;
//! use pillar_curves::value_type::ValueType;
//! use pillar_math::interpolation::InterpolationMethod;
//!
//! let trade = Date::from_ymd(2025, 1, 2).unwrap();
//! let curve = PiecewiseCurveBuilder::new(trade)
//!     .with_id("ESTR")
//!     .with_value_type(ValueType::Discount)
//!     .with_interpolation(InterpolationMethod::LogLinear)
//!     .with_helper(eur::estr_ois("6M", 0.0290, trade).unwrap())
//!     .with_helper(eur::estr_ois("1Y", 0.0280, trade).unwrap())
//!     .with_helper(eur::estr_ois("2Y", 0.0265, trade).unwrap())
//!     .bootstrap()
//!     .unwrap();
//!
//! assert_eq!(curve.dates().len(), 4);
//! assert!(curve.zero_rate(1.0, Compounding::Continuous).unwrap() > 0.0);
//! ```

use std::fmt;

use pillar_core::daycounts::DayCountConvention;
use pillar_core::Date;
use pillar_math::interpolation::InterpolationMethod;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bootstrap::{CurveInputs, CurveSpec, IterativeBootstrap, SimultaneousBootstrap};
use crate::config::BootstrapConfig;
use crate::curves::PiecewiseYieldCurve;
use crate::error::{CurveError, CurveResult};
use crate::instruments::RateHelper;
use crate::multicurve::{CurveId, CurveLookup, CurveMap, Overlay};
use crate::repricing::{BootstrapResult, BuildTimer, RepricingCheck, RepricingReport};
use crate::term_structure::TermStructure;
use crate::value_type::ValueType;

/// Bootstrap algorithm used by [`PiecewiseCurveBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BootstrapMethod {
    /// Node-by-node root finding; see [`IterativeBootstrap`].
    #[default]
    Iterative,
    /// Joint least squares; see [`SimultaneousBootstrap`].
    Simultaneous,
}

/// Collects helpers and settings for one curve and bootstraps it.
///
/// Helpers are attached to the builder's curve id as they are added, so
/// their [`CurveSource::Attached`](crate::multicurve::CurveSource) legs
/// resolve to the curve under construction.
///
/// Extra helpers and extra node dates turn the build into a global fit:
/// they always go through the [`SimultaneousBootstrap`], whatever the
/// configured method.
///
/// Bootstrapping does not consume the builder. Each call snapshots the
/// current quotes, so changing a shared [`Quote`](crate::quote::Quote) and
/// bootstrapping again rebuilds the curve on the new market.
pub struct PiecewiseCurveBuilder {
    spec: CurveSpec,
    helpers: Vec<Box<dyn RateHelper>>,
    extra_helpers: Vec<Box<dyn RateHelper>>,
    extra_dates: Vec<Date>,
    config: BootstrapConfig,
    method: BootstrapMethod,
}

impl PiecewiseCurveBuilder {
    /// Creates a builder with default settings.
    ///
    /// # Default Settings
    ///
    /// - Id: `"curve"`
    /// - Day count: ACT/365F
    /// - Value type: discount factors
    /// - Interpolation: LogLinear
    /// - Bootstrap: iterative
    #[must_use]
    pub fn new(reference_date: Date) -> Self {
        Self {
            spec: CurveSpec::new("curve", reference_date),
            helpers: Vec::new(),
            extra_helpers: Vec::new(),
            extra_dates: Vec::new(),
            config: BootstrapConfig::default(),
            method: BootstrapMethod::default(),
        }
    }

    /// Sets the curve id and re-attaches every helper to it.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<CurveId>) -> Self {
        self.spec.id = id.into();
        for helper in self.helpers.iter_mut().chain(&mut self.extra_helpers) {
            helper.attach(self.spec.id.clone());
        }
        self
    }

    /// Sets the day count of the node times.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.spec.day_count = day_count;
        self
    }

    /// Sets what the nodes store.
    #[must_use]
    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.spec.value_type = value_type;
        self
    }

    /// Sets the interpolation method.
    #[must_use]
    pub fn with_interpolation(mut self, method: InterpolationMethod) -> Self {
        self.spec.interpolation = method;
        self
    }

    /// Sets the bootstrap configuration.
    #[must_use]
    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the bootstrap algorithm.
    #[must_use]
    pub fn with_method(mut self, method: BootstrapMethod) -> Self {
        self.method = method;
        self
    }

    /// Adds a helper.
    #[must_use]
    pub fn with_helper<H: RateHelper + 'static>(mut self, helper: H) -> Self {
        self.add_helper(helper);
        self
    }

    /// Adds a helper in place.
    pub fn add_helper<H: RateHelper + 'static>(&mut self, helper: H) {
        self.add_boxed(Box::new(helper));
    }

    /// Adds an already boxed helper.
    pub fn add_boxed(&mut self, mut helper: Box<dyn RateHelper>) {
        helper.attach(self.spec.id.clone());
        self.helpers.push(helper);
    }

    /// Adds a helper that is fitted without a node at its pillar.
    #[must_use]
    pub fn with_extra_helper<H: RateHelper + 'static>(mut self, helper: H) -> Self {
        let mut helper: Box<dyn RateHelper> = Box::new(helper);
        helper.attach(self.spec.id.clone());
        self.extra_helpers.push(helper);
        self
    }

    /// Adds a node date that no helper defines.
    #[must_use]
    pub fn with_extra_date(mut self, date: Date) -> Self {
        self.extra_dates.push(date);
        self
    }

    /// Helpers fitted without nodes of their own.
    #[must_use]
    pub fn extra_helpers(&self) -> &[Box<dyn RateHelper>] {
        &self.extra_helpers
    }

    /// Node dates not tied to a helper.
    #[must_use]
    pub fn extra_dates(&self) -> &[Date] {
        &self.extra_dates
    }

    /// True when extra helpers or dates make this a global fit.
    #[must_use]
    pub fn is_global_fit(&self) -> bool {
        !self.extra_helpers.is_empty() || !self.extra_dates.is_empty()
    }

    /// Everything the simultaneous bootstrap needs for this curve.
    #[must_use]
    pub fn inputs(&self) -> CurveInputs<'_> {
        CurveInputs::new(&self.spec, &self.helpers)
            .with_extra_helpers(&self.extra_helpers)
            .with_extra_dates(&self.extra_dates)
    }

    /// Curve id.
    #[must_use]
    pub fn id(&self) -> &CurveId {
        &self.spec.id
    }

    /// Curve description.
    #[must_use]
    pub fn spec(&self) -> &CurveSpec {
        &self.spec
    }

    /// Helpers in insertion order.
    #[must_use]
    pub fn helpers(&self) -> &[Box<dyn RateHelper>] {
        &self.helpers
    }

    /// Bootstrap configuration.
    #[must_use]
    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Bootstrap algorithm.
    #[must_use]
    pub fn method(&self) -> BootstrapMethod {
        self.method
    }

    /// Ids of other curves the helpers read, without repeats.
    #[must_use]
    pub fn dependencies(&self) -> Vec<CurveId> {
        let mut ids: Vec<CurveId> = Vec::new();
        for id in self
            .helpers
            .iter()
            .chain(&self.extra_helpers)
            .flat_map(|h| h.curves().linked_ids())
        {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }

    /// Bootstraps a curve whose helpers only read the curve itself.
    ///
    /// # Errors
    ///
    /// See [`IterativeBootstrap::bootstrap`] and
    /// [`SimultaneousBootstrap::bootstrap`].
    pub fn bootstrap(&self) -> CurveResult<PiecewiseYieldCurve> {
        self.bootstrap_with(&CurveMap::new())
    }

    /// Bootstraps with `curves` serving every linked curve.
    pub fn bootstrap_with(&self, curves: &dyn CurveLookup) -> CurveResult<PiecewiseYieldCurve> {
        match self.method {
            BootstrapMethod::Iterative if !self.is_global_fit() => {
                IterativeBootstrap::new(self.config).bootstrap(&self.spec, &self.helpers, curves)
            }
            _ => SimultaneousBootstrap::new(self.config)
                .bootstrap(&[self.inputs()], curves)?
                .pop()
                .ok_or_else(|| CurveError::curve_not_found(self.spec.id.as_str())),
        }
    }

    /// Bootstraps and reprices every helper on the result.
    pub fn bootstrap_validated(&self) -> CurveResult<BootstrapResult<PiecewiseYieldCurve>> {
        self.bootstrap_validated_with(&CurveMap::new())
    }

    /// Bootstraps with linked curves and reprices every helper on the result.
    pub fn bootstrap_validated_with(
        &self,
        curves: &dyn CurveLookup,
    ) -> CurveResult<BootstrapResult<PiecewiseYieldCurve>> {
        let timer = BuildTimer::start();
        let curve = self.bootstrap_with(curves)?;
        let build_duration = timer.elapsed();
        let report = self.reprice_with(&curve, curves)?;

        info!(
            curve = %self.spec.id,
            helpers = report.len(),
            max_error = report.max_abs_error(),
            elapsed_us = u64::try_from(build_duration.as_micros()).unwrap_or(u64::MAX),
            "curve built"
        );
        Ok(BootstrapResult::new(curve, report, build_duration))
    }

    /// Reprices the helpers on `curve`.
    pub fn reprice(&self, curve: &dyn TermStructure) -> CurveResult<RepricingReport> {
        self.reprice_with(curve, &CurveMap::new())
    }

    /// Reprices the helpers, extra helpers included, on `curve`, with
    /// `others` serving linked curves.
    pub fn reprice_with(
        &self,
        curve: &dyn TermStructure,
        others: &dyn CurveLookup,
    ) -> CurveResult<RepricingReport> {
        let lookup = Overlay {
            id: &self.spec.id,
            curve,
            fallback: others,
        };
        let checks = self
            .helpers
            .iter()
            .chain(&self.extra_helpers)
            .map(|h| RepricingCheck::from_helper(h.as_ref(), &lookup))
            .collect::<CurveResult<Vec<_>>>()?;
        Ok(RepricingReport::new(checks))
    }
}

impl fmt::Debug for PiecewiseCurveBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PiecewiseCurveBuilder")
            .field("spec", &self.spec)
            .field(
                "helpers",
                &self.helpers.iter().map(|h| h.description()).collect::<Vec<_>>(),
            )
            .field(
                "extra_helpers",
                &self
                    .extra_helpers
                    .iter()
                    .map(|h| h.description())
                    .collect::<Vec<_>>(),
            )
            .field("extra_dates", &self.extra_dates)
            .field("config", &self.config)
            .field("method", &self.method)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::test_support::d;
    use crate::instruments::{DepositHelper, FraHelper};
    use crate::quote::Quote;

    fn builder() -> PiecewiseCurveBuilder {
        let spot = d(2025, 1, 6);
        PiecewiseCurveBuilder::new(d(2025, 1, 2))
            .with_id("main")
            .with_helper(DepositHelper::new(0.030, spot, d(2025, 4, 7)).unwrap())
            .with_helper(DepositHelper::new(0.031, spot, d(2025, 7, 7)).unwrap())
            .with_helper(DepositHelper::new(0.032, spot, d(2026, 1, 6)).unwrap())
    }

    #[test]
    fn test_with_id_reattaches() {
        let b = builder().with_id("other");
        assert!(b.helpers().iter().all(|h| h.binding() == Some(&CurveId::new("other"))));
        assert!(b.dependencies().is_empty());
    }

    #[test]
    fn test_bootstrap_is_repeatable() {
        let b = builder();
        let first = b.bootstrap().unwrap();
        let second = b.bootstrap().unwrap();
        assert_eq!(first.values(), second.values());
    }

    #[test]
    fn test_quote_change_rebuilds() {
        let quote = Quote::new(0.030);
        let b = PiecewiseCurveBuilder::new(d(2025, 1, 2))
            .with_helper(DepositHelper::new(quote.clone(), d(2025, 1, 6), d(2025, 4, 7)).unwrap());
        let before = b.bootstrap().unwrap();
        quote.set_value(0.035);
        let after = b.bootstrap().unwrap();
        assert!(after.values()[1] < before.values()[1]);
    }

    #[test]
    fn test_validated_report() {
        let result = builder().bootstrap_validated().unwrap();
        assert!(result.is_valid());
        assert_eq!(result.repricing_report.len(), 3);
        assert!(result.repricing_report.is_within(1e-10));
    }

    #[test]
    fn test_methods_agree() {
        let b = builder();
        let iterative = b.bootstrap().unwrap();
        let joint = builder()
            .with_method(BootstrapMethod::Simultaneous)
            .bootstrap()
            .unwrap();
        for (a, j) in iterative.values().iter().zip(joint.values()) {
            assert!((a - j).abs() < 1e-9);
        }
    }

    #[test]
    fn test_debug_lists_helpers() {
        let text = format!("{:?}", builder());
        assert!(text.contains("Deposit 2025-01-06/2025-04-07"));
    }

    #[test]
    fn test_extra_helper_forces_global_fit() {
        let b = builder()
            .with_extra_helper(FraHelper::new(0.0325, d(2025, 4, 7), d(2026, 1, 6)).unwrap())
            .with_id("renamed");
        assert!(b.is_global_fit());
        assert_eq!(b.extra_helpers()[0].binding(), Some(&CurveId::new("renamed")));
        assert!(b.dependencies().is_empty());
    }

    #[test]
    fn test_consistent_extra_helper_keeps_exact_curve() {
        let plain = builder().bootstrap().unwrap();
        let mut fra = FraHelper::new(0.0, d(2025, 4, 7), d(2026, 1, 6)).unwrap();
        fra.attach(CurveId::new("main"));
        let lookup = Overlay {
            id: &CurveId::new("main"),
            curve: &plain,
            fallback: &CurveMap::new(),
        };
        let implied = fra.implied_quote(&lookup).unwrap();

        let global = builder()
            .with_extra_helper(FraHelper::new(implied, d(2025, 4, 7), d(2026, 1, 6)).unwrap());
        let result = global.bootstrap_validated().unwrap();
        assert_eq!(result.repricing_report.len(), 4);
        assert!(result.repricing_report.is_within(1e-10));
        assert_eq!(result.curve.dates(), plain.dates());
        for (a, b) in result.curve.values().iter().zip(plain.values()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
