//! Repricing validation for bootstrapped curves.
//!
//! A curve is only as good as its fit: every helper it was built from must
//! reprice its own quote within tolerance when valued on the finished
//! curve. This module produces that audit trail.
//!
//! # Usage
//!
//! ```rust
//! use pillar_core::Date;
//! use pillar_curves::builder::PiecewiseCurveBuilder;
//! use pillar_curves::instruments::DepositHelper;
//!
//! let reference = Date::from_ymd(2025, 1, 2).unwrap();
//! let end = Date::from_ymd(2025, 4, 2).unwrap();
//! let builder = PiecewiseCurveBuilder::new(reference)
//!     .with_helper(DepositHelper::new(0.03, reference, end).unwrap());
//!
//! let result = builder.bootstrap_validated().unwrap();
//! assert!(result.is_valid());
//! println!("{}", result.repricing_report);
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::CurveResult;
use crate::instruments::RateHelper;
use crate::multicurve::CurveLookup;

pub use crate::instruments::InstrumentType;

/// Repricing tolerances by instrument type, in quote units.
///
/// | Instrument Type | Tolerance | Quote unit       |
/// |-----------------|-----------|------------------|
/// | Deposits        | 1e-9      | simple rate      |
/// | FRAs            | 1e-9      | simple rate      |
/// | Futures         | 1e-7      | price (100 - r%) |
/// | Swaps           | 1e-9      | par rate         |
/// | OIS             | 1e-9      | par rate         |
pub mod tolerances {
    use super::InstrumentType;

    /// Deposit rate tolerance.
    pub const DEPOSIT: f64 = 1e-9;

    /// FRA rate tolerance.
    pub const FRA: f64 = 1e-9;

    /// Futures price tolerance; prices are a hundred times rates.
    pub const FUTURE: f64 = 1e-7;

    /// Swap par rate tolerance.
    pub const SWAP: f64 = 1e-9;

    /// OIS par rate tolerance.
    pub const OIS: f64 = 1e-9;

    /// Strict tolerance for production use.
    pub const STRICT: f64 = 1e-9;

    /// Relaxed tolerance for testing.
    pub const RELAXED: f64 = 1e-3;

    /// Tolerance for a specific instrument type.
    #[must_use]
    pub fn for_instrument(instrument_type: InstrumentType) -> f64 {
        match instrument_type {
            InstrumentType::Deposit => DEPOSIT,
            InstrumentType::Fra => FRA,
            InstrumentType::Future => FUTURE,
            InstrumentType::Swap => SWAP,
            InstrumentType::Ois => OIS,
        }
    }
}

/// Result of repricing one helper.
#[derive(Debug, Clone, PartialEq)]
pub struct RepricingCheck {
    /// Helper description, e.g. "5Y swap vs EURIBOR6M".
    pub instrument: String,

    /// Type of instrument.
    pub instrument_type: InstrumentType,

    /// Market quote.
    pub quote: f64,

    /// Quote implied by the curve.
    pub implied: f64,

    /// `quote - implied`.
    pub error: f64,

    /// Tolerance on `|error|`.
    pub tolerance: f64,

    /// Whether `|error| <= tolerance`.
    pub passed: bool,
}

impl RepricingCheck {
    /// Creates a check from a quote and its implied value.
    #[must_use]
    pub fn new(
        instrument: String,
        instrument_type: InstrumentType,
        quote: f64,
        implied: f64,
        tolerance: f64,
    ) -> Self {
        let error = quote - implied;
        Self {
            instrument,
            instrument_type,
            quote,
            implied,
            error,
            tolerance,
            passed: error.abs() <= tolerance,
        }
    }

    /// Reprices a helper with its instrument type's tolerance.
    pub fn from_helper(helper: &dyn RateHelper, curves: &dyn CurveLookup) -> CurveResult<Self> {
        let tolerance = tolerances::for_instrument(helper.instrument_type());
        Self::from_helper_with_tolerance(helper, curves, tolerance)
    }

    /// Reprices a helper with a custom tolerance.
    pub fn from_helper_with_tolerance(
        helper: &dyn RateHelper,
        curves: &dyn CurveLookup,
        tolerance: f64,
    ) -> CurveResult<Self> {
        Ok(Self::new(
            helper.description(),
            helper.instrument_type(),
            helper.quote_value()?,
            helper.implied_quote(curves)?,
            tolerance,
        ))
    }
}

impl fmt::Display for RepricingCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "ok" } else { "FAIL" };
        write!(
            f,
            "{status:>4} {} | quote: {:.8} | implied: {:.8} | error: {:.2e} (tol: {:.0e})",
            self.instrument, self.quote, self.implied, self.error, self.tolerance
        )
    }
}

/// Repricing of every helper of a curve.
#[derive(Debug, Clone, PartialEq)]
pub struct RepricingReport {
    checks: Vec<RepricingCheck>,
    max_error: f64,
    rms_error: f64,
}

impl RepricingReport {
    /// Creates a report from individual checks.
    #[must_use]
    pub fn new(checks: Vec<RepricingCheck>) -> Self {
        let max_error = checks.iter().map(|c| c.error.abs()).fold(0.0_f64, f64::max);
        let rms_error = if checks.is_empty() {
            0.0
        } else {
            let sum_sq: f64 = checks.iter().map(|c| c.error * c.error).sum();
            (sum_sq / checks.len() as f64).sqrt()
        };
        Self {
            checks,
            max_error,
            rms_error,
        }
    }

    /// Reprices `helpers` against `curves`.
    pub fn from_helpers(
        helpers: &[Box<dyn RateHelper>],
        curves: &dyn CurveLookup,
    ) -> CurveResult<Self> {
        let checks = helpers
            .iter()
            .map(|h| RepricingCheck::from_helper(h.as_ref(), curves))
            .collect::<CurveResult<Vec<_>>>()?;
        Ok(Self::new(checks))
    }

    /// True when every check passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// True when every `|error|` is within `tolerance`.
    #[must_use]
    pub fn is_within(&self, tolerance: f64) -> bool {
        self.checks.iter().all(|c| c.error.abs() <= tolerance)
    }

    /// Individual checks, in helper order.
    #[must_use]
    pub fn checks(&self) -> &[RepricingCheck] {
        &self.checks
    }

    /// Largest `|error|`.
    #[must_use]
    pub fn max_abs_error(&self) -> f64 {
        self.max_error
    }

    /// Root mean square error.
    #[must_use]
    pub fn rms_error(&self) -> f64 {
        self.rms_error
    }

    /// The check with the largest `|error|`.
    #[must_use]
    pub fn worst(&self) -> Option<&RepricingCheck> {
        self.checks
            .iter()
            .max_by(|a, b| a.error.abs().total_cmp(&b.error.abs()))
    }

    /// Number of helpers checked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// True for a report without checks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Checks that failed.
    #[must_use]
    pub fn failed_checks(&self) -> Vec<&RepricingCheck> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }
}

impl fmt::Display for RepricingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        writeln!(f, "Repricing Report")?;
        writeln!(f, "================")?;
        writeln!(f, "Status: {}", if self.is_valid() { "PASSED" } else { "FAILED" })?;
        writeln!(f, "Instruments: {passed}/{} passed", self.checks.len())?;
        writeln!(f, "Max Error: {:.2e}", self.max_error)?;
        writeln!(f, "RMS Error: {:.2e}", self.rms_error)?;

        if !self.checks.is_empty() {
            writeln!(f)?;
            writeln!(f, "Details:")?;
            for check in &self.checks {
                writeln!(f, "  {check}")?;
            }
        }

        Ok(())
    }
}

/// A bootstrapped curve with its repricing report.
#[derive(Debug, Clone)]
pub struct BootstrapResult<C> {
    /// The curve.
    pub curve: C,

    /// Repricing of the helpers it was built from.
    pub repricing_report: RepricingReport,

    /// Wall time of the bootstrap.
    pub build_duration: Duration,
}

impl<C> BootstrapResult<C> {
    /// Bundles a curve with its report.
    #[must_use]
    pub fn new(curve: C, repricing_report: RepricingReport, build_duration: Duration) -> Self {
        Self {
            curve,
            repricing_report,
            build_duration,
        }
    }

    /// True when every helper repriced within tolerance.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.repricing_report.is_valid()
    }

    /// The curve, or the report when some helper failed.
    pub fn into_curve(self) -> Result<C, RepricingReport> {
        if self.is_valid() {
            Ok(self.curve)
        } else {
            Err(self.repricing_report)
        }
    }

    /// The curve regardless of the report.
    #[must_use]
    pub fn into_curve_unchecked(self) -> C {
        self.curve
    }
}

/// Wall-clock timer for a build.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BuildTimer(Instant);

impl BuildTimer {
    pub(crate) fn start() -> Self {
        Self(Instant::now())
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::test_support::{d, flat};
    use crate::instruments::DepositHelper;
    use crate::multicurve::CurveId;

    fn check(error: f64) -> RepricingCheck {
        RepricingCheck::new(
            "3M deposit".to_string(),
            InstrumentType::Deposit,
            0.03,
            0.03 - error,
            tolerances::DEPOSIT,
        )
    }

    #[test]
    fn test_check_passed() {
        let c = check(1e-12);
        assert!(c.passed);
        assert!((c.error - 1e-12).abs() < 1e-20);
    }

    #[test]
    fn test_check_failed() {
        let c = check(-1e-6);
        assert!(!c.passed);
        assert!(c.to_string().contains("FAIL"));
    }

    #[test]
    fn test_report_statistics() {
        let report = RepricingReport::new(vec![check(1e-12), check(-3e-6), check(2e-6)]);
        assert!(!report.is_valid());
        assert_eq!(report.len(), 3);
        assert_eq!(report.failed_checks().len(), 2);
        assert!((report.max_abs_error() - 3e-6).abs() < 1e-15);
        assert!((report.worst().unwrap().error + 3e-6).abs() < 1e-15);
        assert!(report.is_within(1e-5));
        assert!(!report.is_within(1e-6));
        assert!(report.to_string().contains("FAILED"));
    }

    #[test]
    fn test_empty_report() {
        let report = RepricingReport::new(Vec::new());
        assert!(report.is_valid());
        assert!(report.is_empty());
        assert_eq!(report.max_abs_error(), 0.0);
        assert!(report.worst().is_none());
    }

    #[test]
    fn test_from_helpers() {
        let (id, curves) = flat(0.03);
        let start = d(2025, 1, 2);
        let end = d(2025, 7, 2);
        let mut deposit = DepositHelper::new(0.05, start, end).unwrap();
        deposit.attach(id.clone());
        let helpers: Vec<Box<dyn RateHelper>> = vec![Box::new(deposit)];

        let report = RepricingReport::from_helpers(&helpers, &curves).unwrap();
        assert!(!report.is_valid());
        let worst = report.worst().unwrap();
        assert_eq!(worst.instrument_type, InstrumentType::Deposit);
        assert!(worst.error > 0.015);
        assert_eq!(id, CurveId::new("main"));
    }

    #[test]
    fn test_result_into_curve() {
        let ok = BootstrapResult::new(1_u8, RepricingReport::new(vec![check(0.0)]), Duration::ZERO);
        assert_eq!(ok.into_curve().unwrap(), 1);

        let bad = BootstrapResult::new(2_u8, RepricingReport::new(vec![check(1.0)]), Duration::ZERO);
        assert!(!bad.is_valid());
        let report = bad.clone().into_curve().unwrap_err();
        assert_eq!(report.failed_checks().len(), 1);
        assert_eq!(bad.into_curve_unchecked(), 2);
    }

    #[test]
    fn test_tolerance_for_instrument() {
        assert_eq!(tolerances::for_instrument(InstrumentType::Future), tolerances::FUTURE);
        assert_eq!(tolerances::for_instrument(InstrumentType::Ois), tolerances::OIS);
    }
}
