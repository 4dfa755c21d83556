//! Rate futures on IMM dates.
//!
//! Futures are quoted as prices: `Price = 100 × (1 - Rate)` with the rate in
//! decimal, so a price of 97.25 means 2.75%.
//!
//! # Convexity Adjustment
//!
//! Daily margining makes the futures rate higher than the forward rate.
//! The helper carries the adjustment explicitly:
//!
//! ```text
//! Futures Rate = Forward Rate + Convexity Adjustment
//! ```

use chrono::Weekday;
use pillar_core::calendars::{BusinessDayConvention, Calendar};
use pillar_core::daycounts::{DayCount, DayCountConvention};
use pillar_core::types::Period;
use pillar_core::{CoreResult, Date};

use super::{accrual, simple_forward, HelperCurves, InstrumentType, RateHelper};
use crate::conventions::IndexConventions;
use crate::error::{CurveError, CurveResult};
use crate::multicurve::{CurveLookup, CurveSource};
use crate::quote::Quote;

/// IMM date of a month: its third Wednesday.
pub fn imm_date(year: i32, month: u32) -> CoreResult<Date> {
    Date::nth_weekday(3, Weekday::Wed, year, month)
}

/// First IMM date strictly after `from`.
///
/// With `main_cycle` only March, June, September and December count.
pub fn next_imm_date(from: Date, main_cycle: bool) -> CoreResult<Date> {
    let (mut year, mut month) = (from.year(), from.month());
    loop {
        if !main_cycle || month % 3 == 0 {
            let candidate = imm_date(year, month)?;
            if candidate > from {
                return Ok(candidate);
            }
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
}

/// Rate future quoted as a price.
///
/// # Example
///
/// ```rust
/// use pillar_core::calendars::WeekendCalendar;
/// use pillar_curves::instruments::{FuturesHelper, RateHelper};
///
/// // March 2025 3M contract at 97.40
/// let fut = FuturesHelper::imm(97.40, 2025, 3, 3, &WeekendCalendar).unwrap();
/// assert_eq!(fut.earliest_date().to_string(), "2025-03-19");
/// ```
#[derive(Debug, Clone)]
pub struct FuturesHelper {
    quote: Quote,
    start: Date,
    end: Date,
    day_count: DayCountConvention,
    convexity_adjustment: f64,
    curves: HelperCurves,
    label: String,
}

impl FuturesHelper {
    /// Creates a future on the period `start` to `end`, accruing ACT/360.
    pub fn new(price: impl Into<Quote>, start: Date, end: Date) -> CurveResult<Self> {
        if end <= start {
            return Err(CurveError::invalid_config(format!(
                "future end {end} is not after start {start}"
            )));
        }
        Ok(Self {
            quote: price.into(),
            start,
            end,
            day_count: DayCountConvention::Act360,
            convexity_adjustment: 0.0,
            curves: HelperCurves::attached(),
            label: format!("Future {start}/{end}"),
        })
    }

    /// Creates the contract starting on the IMM date of `year`/`month` and
    /// running `length_months`, rolled modified following on `calendar`.
    pub fn imm<C: Calendar + ?Sized>(
        price: impl Into<Quote>,
        year: i32,
        month: u32,
        length_months: u32,
        calendar: &C,
    ) -> CurveResult<Self> {
        let start = imm_date(year, month)?;
        let end = calendar.advance(
            start,
            Period::months(length_months as i32),
            BusinessDayConvention::ModifiedFollowing,
            false,
        )?;
        let mut helper = Self::new(price, start, end)?;
        helper.label = format!("{year}-{month:02} {length_months}M future");
        Ok(helper)
    }

    /// Creates the contract on the next main-cycle IMM date after the spot
    /// of `trade_date`, on an index's calendar and day count.
    pub fn next_after(
        price: impl Into<Quote>,
        trade_date: Date,
        index: &IndexConventions,
    ) -> CurveResult<Self> {
        let start = next_imm_date(index.spot_date(trade_date)?, true)?;
        let end = index.maturity_date(start)?;
        let mut helper = Self::new(price, start, end)?.with_day_count(index.day_count);
        helper.label = format!("{} future {start}", index.name);
        Ok(helper)
    }

    /// Sets the convexity adjustment, as a decimal rate.
    #[must_use]
    pub fn with_convexity_adjustment(mut self, adjustment: f64) -> Self {
        self.convexity_adjustment = adjustment;
        self
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

    /// Convexity adjustment.
    #[must_use]
    pub fn convexity_adjustment(&self) -> f64 {
        self.convexity_adjustment
    }

    /// Accrual year fraction.
    #[must_use]
    pub fn year_fraction(&self) -> f64 {
        self.day_count.year_fraction_f64(self.start, self.end)
    }
}

impl RateHelper for FuturesHelper {
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
        let forward = simple_forward(curve, self.start, self.end, tau)?;
        Ok(100.0 * (1.0 - (forward + self.convexity_adjustment)))
    }

    fn implied_discount_guess(&self, curves: &dyn CurveLookup, quote: f64) -> Option<f64> {
        if !self.curves.forecasts_on_attached() {
            return None;
        }
        let forward = (100.0 - quote) / 100.0 - self.convexity_adjustment;
        let curve = self.curves.forecast_curve(curves, &self.label).ok()?;
        let df_start = curve.discount_at(self.start).ok()?;
        Some(df_start / (1.0 + forward * self.year_fraction()))
    }

    fn curves(&self) -> &HelperCurves {
        &self.curves
    }

    fn curves_mut(&mut self) -> &mut HelperCurves {
        &mut self.curves
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Future
    }

    fn description(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::test_support::{d, flat};
    use crate::multicurve::CurveId;
    use crate::term_structure::TermStructure;
    use approx::assert_relative_eq;
    use pillar_core::calendars::WeekendCalendar;

    #[test]
    fn test_imm_dates() {
        assert_eq!(imm_date(2025, 3).unwrap(), d(2025, 3, 19));
        assert_eq!(imm_date(2025, 6).unwrap(), d(2025, 6, 18));
        assert_eq!(next_imm_date(d(2025, 1, 6), true).unwrap(), d(2025, 3, 19));
        assert_eq!(next_imm_date(d(2025, 1, 6), false).unwrap(), d(2025, 1, 15));
        // an IMM date itself rolls to the next one
        assert_eq!(next_imm_date(d(2025, 3, 19), true).unwrap(), d(2025, 6, 18));
        assert_eq!(next_imm_date(d(2025, 12, 20), true).unwrap(), d(2026, 3, 18));
    }

    #[test]
    fn test_price_from_flat_curve() {
        let (id, curves) = flat(0.03);
        let mut fut = FuturesHelper::imm(0.0, 2025, 3, 3, &WeekendCalendar)
            .unwrap()
            .with_convexity_adjustment(0.0002);
        fut.attach(id.clone());

        let tau = fut.year_fraction();
        let dt = (fut.maturity_date().days_between(&fut.earliest_date())).abs() as f64 / 365.0;
        let forward = ((0.03 * dt).exp() - 1.0) / tau;
        assert_relative_eq!(
            fut.implied_quote(&curves).unwrap(),
            100.0 * (1.0 - forward - 0.0002),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_discount_guess_matches_price() {
        let (id, curves) = flat(0.03);
        let mut fut = FuturesHelper::imm(97.0, 2025, 6, 3, &WeekendCalendar).unwrap();
        fut.attach(id);
        let df_end = fut.implied_discount_guess(&curves, 97.0).unwrap();
        let df_start = curves[&CurveId::new("main")].discount_at(fut.earliest_date()).unwrap();
        assert_relative_eq!((df_start / df_end - 1.0) / fut.year_fraction(), 0.03, epsilon = 1e-12);
    }
}
