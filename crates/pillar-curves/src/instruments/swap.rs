//! Fixed-for-floating interest rate swap helper.

use pillar_core::daycounts::{DayCount, DayCountConvention};
use pillar_core::schedule::Schedule;
use pillar_core::types::Period;
use pillar_core::Date;
use pillar_math::MathError;

use super::{accrual, simple_forward, HelperCurves, InstrumentType, RateHelper};
use crate::conventions::SwapConventions;
use crate::error::CurveResult;
use crate::multicurve::{CurveLookup, CurveSource};
use crate::quote::Quote;

/// Par swap: fixed leg against an index leg plus spread.
///
/// # Pricing
///
/// The implied quote is the fixed rate that sets the swap to par:
///
/// ```text
/// Annuity   = Σ τ_fixed(i) × P_d(T_i)
/// Float PV  = Σ (F(s_j, e_j) + spread) × τ_float(j) × P_d(e_j)
/// Par rate  = Float PV / Annuity
/// ```
///
/// where `F` is the simple forward on the forecast curve and `P_d` the
/// discount curve. With both on the same curve and no spread, the float
/// leg telescopes to `P(s_0) - P(e_n)`.
#[derive(Debug, Clone)]
pub struct SwapHelper {
    quote: Quote,
    fixed_schedule: Schedule,
    float_schedule: Schedule,
    fixed_day_count: DayCountConvention,
    float_day_count: DayCountConvention,
    spread: f64,
    curves: HelperCurves,
    label: String,
}

impl SwapHelper {
    /// Creates a swap from its two schedules, with a 30/360 fixed leg and an
    /// ACT/360 floating leg.
    pub fn new(quote: impl Into<Quote>, fixed_schedule: Schedule, float_schedule: Schedule) -> Self {
        let label = format!(
            "Swap {}/{}",
            fixed_schedule.start_date(),
            fixed_schedule.end_date()
        );
        Self {
            quote: quote.into(),
            fixed_schedule,
            float_schedule,
            fixed_day_count: DayCountConvention::Thirty360,
            float_day_count: DayCountConvention::Act360,
            spread: 0.0,
            curves: HelperCurves::attached(),
            label,
        }
    }

    /// Creates a spot-starting swap of length `tenor`.
    ///
    /// Both schedules run backward from the unadjusted termination date
    /// `spot + tenor`.
    pub fn from_tenor(
        quote: impl Into<Quote>,
        trade_date: Date,
        tenor: Period,
        conventions: &SwapConventions,
    ) -> CurveResult<Self> {
        let index = &conventions.index;
        let effective = index.spot_date(trade_date)?;
        let termination = effective.add_period(tenor)?;
        let fixed = Schedule::from_frequency(
            effective,
            termination,
            conventions.fixed_frequency,
            index.calendar.as_ref(),
            conventions.fixed_convention,
            index.end_of_month,
        )?;
        let float = Schedule::backward(
            effective,
            termination,
            index.tenor,
            index.calendar.as_ref(),
            index.convention,
            index.end_of_month,
        )?;
        let mut helper = Self::new(quote, fixed, float)
            .with_fixed_day_count(conventions.fixed_day_count)
            .with_float_day_count(index.day_count);
        helper.label = format!("{tenor} swap vs {}", index.name);
        Ok(helper)
    }

    /// Sets the fixed leg day count.
    #[must_use]
    pub fn with_fixed_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.fixed_day_count = day_count;
        self
    }

    /// Sets the floating leg day count.
    #[must_use]
    pub fn with_float_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.float_day_count = day_count;
        self
    }

    /// Adds a spread to the floating leg.
    #[must_use]
    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    /// Projects the floating leg on another curve.
    #[must_use]
    pub fn with_forecast_curve(mut self, source: CurveSource) -> Self {
        self.curves.set_forecast(source);
        self
    }

    /// Discounts both legs on another curve.
    #[must_use]
    pub fn with_discount_curve(mut self, source: CurveSource) -> Self {
        self.curves.set_discount(source);
        self
    }

    /// Fixed leg schedule.
    #[must_use]
    pub fn fixed_schedule(&self) -> &Schedule {
        &self.fixed_schedule
    }

    /// Floating leg schedule.
    #[must_use]
    pub fn float_schedule(&self) -> &Schedule {
        &self.float_schedule
    }

    /// Fixed leg annuity on the discount curve.
    pub fn annuity(&self, curves: &dyn CurveLookup) -> CurveResult<f64> {
        let discount = self.curves.discount_curve(curves, &self.label)?;
        self.fixed_schedule
            .periods()
            .map(|(start, end)| -> CurveResult<f64> {
                let tau = self.fixed_day_count.year_fraction_f64(start, end);
                Ok(tau * discount.discount_at(end)?)
            })
            .sum()
    }
}

impl RateHelper for SwapHelper {
    fn quote(&self) -> &Quote {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.fixed_schedule
            .start_date()
            .min(self.float_schedule.start_date())
    }

    fn maturity_date(&self) -> Date {
        self.fixed_schedule
            .end_date()
            .max(self.float_schedule.end_date())
    }

    fn implied_quote(&self, curves: &dyn CurveLookup) -> CurveResult<f64> {
        let forecast = self.curves.forecast_curve(curves, &self.label)?;
        let discount = self.curves.discount_curve(curves, &self.label)?;

        let mut float_pv = 0.0;
        for (start, end) in self.float_schedule.periods() {
            let tau = accrual(self.float_day_count, start, end, &self.label)?;
            let forward = simple_forward(forecast, start, end, tau)?;
            float_pv += (forward + self.spread) * tau * discount.discount_at(end)?;
        }

        let annuity = self.annuity(curves)?;
        if !(annuity.abs() > 0.0) {
            return Err(MathError::invalid_input(format!("{}: zero annuity", self.label)).into());
        }
        Ok(float_pv / annuity)
    }

    fn curves(&self) -> &HelperCurves {
        &self.curves
    }

    fn curves_mut(&mut self) -> &mut HelperCurves {
        &mut self.curves
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Swap
    }

    fn description(&self) -> String {
        self.label.clone()
    }
}
