//! Overnight index swap helper.
//!
//! OIS helpers build the discounting curve (ESTR, SOFR, EONIA).

use pillar_core::calendars::Calendar;
use pillar_core::daycounts::{DayCount, DayCountConvention};
use pillar_core::schedule::Schedule;
use pillar_core::types::{Frequency, Period, TimeUnit};
use pillar_core::Date;
use pillar_math::MathError;

use super::{HelperCurves, InstrumentType, RateHelper};
use crate::conventions::OisConventions;
use crate::error::CurveResult;
use crate::multicurve::{CurveLookup, CurveSource};
use crate::quote::Quote;

/// Overnight index swap.
///
/// The overnight leg compounds daily, so over each period its accrual is
/// `P_f(s)/P_f(e) - 1` on the forecast curve. Each period pays
/// `payment_lag` business days after its end.
///
/// ```text
/// Par rate = Σ (P_f(s_i)/P_f(e_i) - 1) × P_d(pay_i) / Σ τ_i × P_d(pay_i)
/// ```
#[derive(Debug, Clone)]
pub struct OisHelper {
    quote: Quote,
    schedule: Schedule,
    payment_dates: Vec<Date>,
    fixed_day_count: DayCountConvention,
    curves: HelperCurves,
    label: String,
}

impl OisHelper {
    /// Creates an OIS on `schedule` paying `payment_lag` business days after
    /// each period end, with an ACT/360 fixed leg.
    pub fn new<C: Calendar + ?Sized>(
        quote: impl Into<Quote>,
        schedule: Schedule,
        payment_lag: u32,
        calendar: &C,
    ) -> Self {
        let payment_dates = schedule
            .dates()
            .iter()
            .skip(1)
            .map(|end| {
                if payment_lag == 0 {
                    *end
                } else {
                    calendar.add_business_days(*end, payment_lag as i32)
                }
            })
            .collect();
        let label = format!("OIS {}/{}", schedule.start_date(), schedule.end_date());
        Self {
            quote: quote.into(),
            schedule,
            payment_dates,
            fixed_day_count: DayCountConvention::Act360,
            curves: HelperCurves::attached(),
            label,
        }
    }

    /// Creates a spot-starting OIS of length `tenor`.
    ///
    /// Tenors up to one year pay once at maturity.
    pub fn from_tenor(
        quote: impl Into<Quote>,
        trade_date: Date,
        tenor: Period,
        conventions: &OisConventions,
    ) -> CurveResult<Self> {
        let index = &conventions.index;
        let effective = index.spot_date(trade_date)?;
        let termination = effective.add_period(tenor)?;
        let short = match tenor.unit() {
            TimeUnit::Days | TimeUnit::Weeks => true,
            TimeUnit::Months | TimeUnit::Years => tenor.in_months().is_some_and(|m| m <= 12),
        };
        let frequency = if short {
            Frequency::Once
        } else {
            conventions.fixed_frequency
        };
        let schedule = Schedule::from_frequency(
            effective,
            termination,
            frequency,
            index.calendar.as_ref(),
            index.convention,
            index.end_of_month,
        )?;
        let mut helper = Self::new(
            quote,
            schedule,
            conventions.payment_lag,
            index.calendar.as_ref(),
        )
        .with_fixed_day_count(conventions.fixed_day_count);
        helper.label = format!("{tenor} {} OIS", index.name);
        Ok(helper)
    }

    /// Sets the fixed leg day count.
    #[must_use]
    pub fn with_fixed_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.fixed_day_count = day_count;
        self
    }

    /// Projects the overnight leg on another curve.
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

    /// Accrual schedule.
    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Payment date of each period.
    #[must_use]
    pub fn payment_dates(&self) -> &[Date] {
        &self.payment_dates
    }
}

impl RateHelper for OisHelper {
    fn quote(&self) -> &Quote {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.schedule.start_date()
    }

    fn maturity_date(&self) -> Date {
        self.schedule.end_date()
    }

    fn latest_relevant_date(&self) -> Date {
        self.payment_dates
            .last()
            .map_or(self.maturity_date(), |pay| (*pay).max(self.maturity_date()))
    }

    fn implied_quote(&self, curves: &dyn CurveLookup) -> CurveResult<f64> {
        let forecast = self.curves.forecast_curve(curves, &self.label)?;
        let discount = self.curves.discount_curve(curves, &self.label)?;

        let mut float_pv = 0.0;
        let mut annuity = 0.0;
        for ((start, end), pay) in self.schedule.periods().zip(&self.payment_dates) {
            let df_pay = discount.discount_at(*pay)?;
            let compounded = forecast.discount_at(start)? / forecast.discount_at(end)? - 1.0;
            float_pv += compounded * df_pay;
            annuity += self.fixed_day_count.year_fraction_f64(start, end) * df_pay;
        }
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
        InstrumentType::Ois
    }

    fn description(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::test_support::{d, flat};
    use crate::term_structure::TermStructure;
    use approx::assert_relative_eq;

    #[test]
    fn test_short_ois_is_single_period() {
        let ois = OisHelper::from_tenor(0.03, d(2025, 1, 2), Period::months(6), &OisConventions::eonia())
            .unwrap();
        assert_eq!(ois.schedule().len(), 1);
        assert_eq!(ois.latest_relevant_date(), ois.maturity_date());
        assert_eq!(ois.description(), "6M EONIA OIS");
    }

    #[test]
    fn test_payment_lag_moves_pillar() {
        let ois = OisHelper::from_tenor(0.03, d(2025, 1, 2), Period::years(3), &OisConventions::sofr())
            .unwrap();
        assert_eq!(ois.schedule().len(), 3);
        // 6 Jan 2028 is a Thursday; two business days later is Monday 10 Jan
        assert_eq!(ois.maturity_date(), d(2028, 1, 6));
        assert_eq!(ois.latest_relevant_date(), d(2028, 1, 10));
    }

    #[test]
    fn test_single_period_rate() {
        let (id, curves) = flat(0.03);
        let mut ois =
            OisHelper::from_tenor(0.0, d(2025, 1, 2), Period::years(1), &OisConventions::eonia())
                .unwrap();
        ois.attach(id.clone());
        let curve = &curves[&id];
        let s = ois.earliest_date();
        let e = ois.maturity_date();
        let tau = DayCountConvention::Act360.year_fraction_f64(s, e);
        let expected = (curve.discount_at(s).unwrap() / curve.discount_at(e).unwrap() - 1.0) / tau;
        assert_relative_eq!(ois.implied_quote(&curves).unwrap(), expected, epsilon = 1e-14);
    }
}
