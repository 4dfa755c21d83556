//! Rate helpers: market instruments as bootstrap constraints.
//!
//! Each helper wraps one market [`Quote`] and knows how to compute the quote
//! the curves imply. The bootstrap adjusts one node per helper until the
//! implied quote matches the market one.
//!
//! # Available Helpers
//!
//! ## Money Market
//! - [`DepositHelper`]: simple-rate deposits
//! - [`FraHelper`]: forward rate agreements
//! - [`FuturesHelper`]: IMM-dated rate futures quoted as prices
//!
//! ## Swaps
//! - [`SwapHelper`]: fixed against floating, with separate forecast and
//!   discount curves
//! - [`OisHelper`]: fixed against compounded overnight, with payment lag
//!
//! # Curve Resolution
//!
//! Helpers hold a [`HelperCurves`] describing where each leg takes its curve
//! from, and receive a [`CurveLookup`] when evaluated. Attaching a helper to
//! a curve id makes [`CurveSource::Attached`] resolve to that curve.

mod deposit;
mod fra;
mod future;
mod ois;
mod swap;

pub use deposit::DepositHelper;
pub use fra::FraHelper;
pub use future::{imm_date, next_imm_date, FuturesHelper};
pub use ois::OisHelper;
pub use swap::SwapHelper;

use pillar_core::daycounts::{DayCount, DayCountConvention};
use pillar_core::Date;
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::multicurve::{CurveId, CurveLookup, CurveSource};
use crate::quote::Quote;
use crate::term_structure::TermStructure;

/// Instrument type for categorization and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InstrumentType {
    /// Money market deposit
    Deposit,
    /// Forward Rate Agreement
    Fra,
    /// Rate future
    Future,
    /// Interest Rate Swap
    Swap,
    /// Overnight Index Swap
    Ois,
}

impl std::fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "Deposit"),
            Self::Fra => write!(f, "FRA"),
            Self::Future => write!(f, "Future"),
            Self::Swap => write!(f, "Swap"),
            Self::Ois => write!(f, "OIS"),
        }
    }
}

/// Which date of a helper becomes its curve node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PillarChoice {
    /// The instrument's maturity.
    MaturityDate,
    /// The last date whose discount factor the helper needs.
    #[default]
    LastRelevantDate,
}

/// Curve sources of a helper's legs, plus the curve it is attached to.
#[derive(Debug, Clone, Default)]
pub struct HelperCurves {
    forecast: CurveSource,
    discount: CurveSource,
    binding: Option<CurveId>,
}

impl HelperCurves {
    /// Both legs on the attached curve.
    #[must_use]
    pub fn attached() -> Self {
        Self::default()
    }

    /// Source used to project rates.
    #[must_use]
    pub fn forecast(&self) -> &CurveSource {
        &self.forecast
    }

    /// Source used to discount cash flows.
    #[must_use]
    pub fn discount(&self) -> &CurveSource {
        &self.discount
    }

    /// Curve the helper is attached to.
    #[must_use]
    pub fn binding(&self) -> Option<&CurveId> {
        self.binding.as_ref()
    }

    /// Sets the forecast source.
    pub fn set_forecast(&mut self, source: CurveSource) {
        self.forecast = source;
    }

    /// Sets the discount source.
    pub fn set_discount(&mut self, source: CurveSource) {
        self.discount = source;
    }

    /// Attaches to a curve id.
    pub fn attach(&mut self, id: CurveId) {
        self.binding = Some(id);
    }

    /// Linked curve ids, excluding the attached one.
    pub fn linked_ids(&self) -> impl Iterator<Item = &CurveId> {
        [&self.forecast, &self.discount]
            .into_iter()
            .filter_map(CurveSource::linked_id)
            .filter(move |id| Some(*id) != self.binding.as_ref())
    }

    /// True when the forecast leg uses the attached curve.
    #[must_use]
    pub fn forecasts_on_attached(&self) -> bool {
        match &self.forecast {
            CurveSource::Attached => true,
            CurveSource::Linked(id) => Some(id) == self.binding.as_ref(),
            CurveSource::External(_) => false,
        }
    }

    /// Resolves one source.
    pub fn resolve<'a>(
        &'a self,
        source: &'a CurveSource,
        curves: &'a dyn CurveLookup,
        instrument: &str,
    ) -> CurveResult<&'a dyn TermStructure> {
        match source {
            CurveSource::Attached => {
                let id = self.binding.as_ref().ok_or_else(|| CurveError::NotAttached {
                    instrument: instrument.to_string(),
                })?;
                curves.curve(id)
            }
            CurveSource::Linked(id) => curves.curve(id),
            CurveSource::External(curve) => Ok(curve.as_ref()),
        }
    }

    /// Resolves the forecast curve.
    pub fn forecast_curve<'a>(
        &'a self,
        curves: &'a dyn CurveLookup,
        instrument: &str,
    ) -> CurveResult<&'a dyn TermStructure> {
        self.resolve(&self.forecast, curves, instrument)
    }

    /// Resolves the discount curve.
    pub fn discount_curve<'a>(
        &'a self,
        curves: &'a dyn CurveLookup,
        instrument: &str,
    ) -> CurveResult<&'a dyn TermStructure> {
        self.resolve(&self.discount, curves, instrument)
    }
}

/// A market instrument the bootstrap fits a curve node to.
///
/// Implementations must be thread-safe so the simultaneous bootstrap can
/// evaluate helpers in parallel.
pub trait RateHelper: Send + Sync {
    /// The market quote.
    fn quote(&self) -> &Quote;

    /// First date the helper depends on.
    fn earliest_date(&self) -> Date;

    /// Maturity of the instrument.
    fn maturity_date(&self) -> Date;

    /// Last date whose discount factor the helper needs.
    fn latest_relevant_date(&self) -> Date {
        self.maturity_date()
    }

    /// Date of the curve node this helper determines.
    fn pillar_date(&self, choice: PillarChoice) -> Date {
        match choice {
            PillarChoice::MaturityDate => self.maturity_date(),
            PillarChoice::LastRelevantDate => self.latest_relevant_date(),
        }
    }

    /// The quote implied by the given curves.
    fn implied_quote(&self, curves: &dyn CurveLookup) -> CurveResult<f64>;

    /// Validated current quote value.
    fn quote_value(&self) -> CurveResult<f64> {
        let value = self.quote().value();
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CurveError::InvalidQuote {
                instrument: self.description(),
                value,
            })
        }
    }

    /// Market quote minus implied quote.
    fn quote_error(&self, curves: &dyn CurveLookup) -> CurveResult<f64> {
        Ok(self.quote_value()? - self.implied_quote(curves)?)
    }

    /// Discount factor at the pillar that reprices `quote`, when the helper
    /// can tell without a solve.
    fn implied_discount_guess(&self, _curves: &dyn CurveLookup, _quote: f64) -> Option<f64> {
        None
    }

    /// Curve sources of the legs.
    fn curves(&self) -> &HelperCurves;

    /// Mutable access to the curve sources.
    fn curves_mut(&mut self) -> &mut HelperCurves;

    /// Attaches the helper to a curve.
    fn attach(&mut self, id: CurveId) {
        self.curves_mut().attach(id);
    }

    /// Curve the helper is attached to.
    fn binding(&self) -> Option<&CurveId> {
        self.curves().binding()
    }

    /// Instrument category.
    fn instrument_type(&self) -> InstrumentType;

    /// Human-readable description.
    fn description(&self) -> String;
}

/// Simple forward rate over `[start, end]` with accrual `tau`.
pub(crate) fn simple_forward(
    curve: &dyn TermStructure,
    start: Date,
    end: Date,
    tau: f64,
) -> CurveResult<f64> {
    Ok((curve.discount_at(start)? / curve.discount_at(end)? - 1.0) / tau)
}

/// Accrual over a period that must be positive.
pub(crate) fn accrual(
    day_count: DayCountConvention,
    start: Date,
    end: Date,
    instrument: &str,
) -> CurveResult<f64> {
    let tau = day_count.year_fraction_f64(start, end);
    if tau > 0.0 && tau.is_finite() {
        Ok(tau)
    } else {
        Err(CurveError::invalid_config(format!(
            "{instrument}: {start} to {end} has no positive accrual under {day_count}"
        )))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use pillar_core::Date;

    use crate::multicurve::CurveId;
    use crate::term_structure::tests::FlatCurve;

    pub(crate) fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    /// One flat curve registered as "main".
    pub(crate) fn flat(rate: f64) -> (CurveId, HashMap<CurveId, FlatCurve>) {
        let id = CurveId::new("main");
        let mut map = HashMap::new();
        map.insert(id.clone(), FlatCurve::new(d(2025, 1, 2), rate));
        (id, map)
    }
}
