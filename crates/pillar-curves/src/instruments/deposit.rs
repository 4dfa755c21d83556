//! Money market deposit helper.

use pillar_core::daycounts::{DayCount, DayCountConvention};
use pillar_core::types::Period;
use pillar_core::Date;

use super::{accrual, simple_forward, HelperCurves, InstrumentType, RateHelper};
use crate::conventions::IndexConventions;
use crate::error::{CurveError, CurveResult};
use crate::multicurve::{CurveLookup, CurveSource};
use crate::quote::Quote;

/// Money market deposit quoted as a simple rate.
///
/// # Pricing
///
/// ```text
/// rate = (DF(start) / DF(end) - 1) / τ(start, end)
/// ```
///
/// # Example
///
/// ```rust
/// use pillar_core::Date;
/// use pillar_curves::instruments::{DepositHelper, RateHelper};
///
/// let start = Date::from_ymd(2025, 1, 6).unwrap();
/// let end = Date::from_ymd(2025, 4, 7).unwrap();
/// let deposit = DepositHelper::new(0.0285, start, end).unwrap();
/// assert_eq!(deposit.maturity_date(), end);
/// ```
#[derive(Debug, Clone)]
pub struct DepositHelper {
    quote: Quote,
    start: Date,
    end: Date,
    day_count: DayCountConvention,
    curves: HelperCurves,
    label: String,
}

impl DepositHelper {
    /// Creates a deposit accruing ACT/360 from `start` to `end`.
    pub fn new(quote: impl Into<Quote>, start: Date, end: Date) -> CurveResult<Self> {
        if end <= start {
            return Err(CurveError::invalid_config(format!(
                "deposit end {end} is not after start {start}"
            )));
        }
        Ok(Self {
            quote: quote.into(),
            start,
            end,
            day_count: DayCountConvention::Act360,
            curves: HelperCurves::attached(),
            label: format!("Deposit {start}/{end}"),
        })
    }

    /// Creates a deposit starting at spot and running for `tenor`.
    pub fn from_tenor(
        quote: impl Into<Quote>,
        trade_date: Date,
        tenor: Period,
        index: &IndexConventions,
    ) -> CurveResult<Self> {
        let start = index.spot_date(trade_date)?;
        let end = index.advance(start, tenor)?;
        let mut helper = Self::new(quote, start, end)?.with_day_count(index.day_count);
        helper.label = format!("{tenor} deposit");
        Ok(helper)
    }

    /// Sets the accrual day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Projects the rate on another curve.
    #[must_use]
    pub fn with_forecast_curve(mut self, source: CurveSource) -> Self {
        self.curves.set_forecast(source);
        self
    }

    /// Start date.
    #[must_use]
    pub fn start_date(&self) -> Date {
        self.start
    }

    /// Accrual year fraction.
    #[must_use]
    pub fn year_fraction(&self) -> f64 {
        self.day_count.year_fraction_f64(self.start, self.end)
    }
}

impl RateHelper for DepositHelper {
    fn quote(&self) -> &Quote {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.start
    }

    fn maturity_date(&self) -> Date {
        self.end
    }

    fn implied_quote(&self, curves: &dyn CurveLookup) -> CurveResult<f64> {
        let curve = self.curves.forecast_curve(curves, &self.label)?;
        let tau = accrual(self.day_count, self.start, self.end, &self.label)?;
        simple_forward(curve, self.start, self.end, tau)
    }

    fn implied_discount_guess(&self, curves: &dyn CurveLookup, quote: f64) -> Option<f64> {
        if !self.curves.forecasts_on_attached() {
            return None;
        }
        let curve = self.curves.forecast_curve(curves, &self.label).ok()?;
        let df_start = curve.discount_at(self.start).ok()?;
        Some(df_start / (1.0 + quote * self.year_fraction()))
    }

    fn curves(&self) -> &HelperCurves {
        &self.curves
    }

    fn curves_mut(&mut self) -> &mut HelperCurves {
        &mut self.curves
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Deposit
    }

    fn description(&self) -> String {
        self.label.clone()
    }
}
