//! The read-only yield term structure facade.
//!
//! Implementors supply the reference date, the time axis and a raw discount
//! function. Range checks, zero rates and forward rates come from the
//! provided methods, so every curve answers queries the same way.
//!
//! # Thread Safety
//!
//! All term structures are `Send + Sync`; finished curves are immutable and
//! can be shared freely behind an `Arc`.

use std::sync::Arc;

use pillar_core::daycounts::{DayCount, DayCountConvention};
use pillar_core::types::{Compounding, Date};

use crate::error::{CurveError, CurveResult};

/// Time step used where a rate is needed at a point or over an empty period.
pub const RATE_TIME_STEP: f64 = 1e-4;

/// Slack allowed when comparing a query time against `max_time`.
const TIME_TOLERANCE: f64 = 1e-12;

/// A discount curve on a time axis measured from its reference date.
pub trait TermStructure: Send + Sync {
    /// Date at which `t = 0` and the discount factor is 1.
    fn reference_date(&self) -> Date;

    /// Day count that converts dates into times.
    fn day_count(&self) -> DayCountConvention;

    /// Last date the curve is built for.
    fn max_date(&self) -> Date;

    /// True when queries past `max_time` are answered.
    fn allows_extrapolation(&self) -> bool;

    /// Discount factor at a time that already passed the range checks.
    fn discount_impl(&self, t: f64) -> CurveResult<f64>;

    // ========================================================================
    // Default implementations
    // ========================================================================

    /// Time of `max_date`.
    fn max_time(&self) -> f64 {
        self.time_from_reference(self.max_date())
    }

    /// Converts a date into a time with the curve's day count.
    fn time_from_reference(&self, date: Date) -> f64 {
        self.day_count()
            .year_fraction_f64(self.reference_date(), date)
    }

    /// Rejects negative or non-finite times, and times past `max_time`
    /// unless extrapolation is allowed.
    fn check_range(&self, t: f64) -> CurveResult<()> {
        if !t.is_finite() || t < 0.0 {
            return Err(CurveError::InvalidTime { t });
        }
        let max_time = self.max_time();
        if !self.allows_extrapolation() && t > max_time + TIME_TOLERANCE {
            return Err(CurveError::ExtrapolationDisabled { t, max_time });
        }
        Ok(())
    }

    /// Discount factor at time `t`.
    ///
    /// Exactly 1 at `t = 0`.
    fn discount(&self, t: f64) -> CurveResult<f64> {
        self.check_range(t)?;
        if t == 0.0 {
            return Ok(1.0);
        }
        self.discount_impl(t)
    }

    /// Discount factor at a date.
    fn discount_at(&self, date: Date) -> CurveResult<f64> {
        self.discount(self.time_from_reference(date))
    }

    /// Zero rate to time `t` with the given compounding.
    ///
    /// At `t = 0` the rate over the first [`RATE_TIME_STEP`] is returned.
    fn zero_rate(&self, t: f64, compounding: Compounding) -> CurveResult<f64> {
        self.check_range(t)?;
        let t = if t == 0.0 { RATE_TIME_STEP } else { t };
        let df = self.discount(t)?;
        Ok(compounding.implied_rate(1.0 / df, t))
    }

    /// Zero rate to a date.
    fn zero_rate_at(&self, date: Date, compounding: Compounding) -> CurveResult<f64> {
        self.zero_rate(self.time_from_reference(date), compounding)
    }

    /// Forward rate between `t1` and `t2`.
    ///
    /// When the period is empty the rate over `[t1, t1 + RATE_TIME_STEP]` is
    /// returned.
    fn forward_rate(&self, t1: f64, t2: f64, compounding: Compounding) -> CurveResult<f64> {
        if t2 < t1 {
            return Err(CurveError::InvalidForwardPeriod { t1, t2 });
        }
        self.check_range(t1)?;
        self.check_range(t2)?;
        let (t1, t2) = if t2 - t1 < RATE_TIME_STEP {
            step_around(self, t1)
        } else {
            (t1, t2)
        };
        let compound = self.discount(t1)? / self.discount(t2)?;
        Ok(compounding.implied_rate(compound, t2 - t1))
    }

    /// Forward rate between two dates.
    fn forward_rate_between(
        &self,
        start: Date,
        end: Date,
        compounding: Compounding,
    ) -> CurveResult<f64> {
        self.forward_rate(
            self.time_from_reference(start),
            self.time_from_reference(end),
            compounding,
        )
    }

    /// Instantaneous continuously compounded forward rate at `t`.
    fn instantaneous_forward(&self, t: f64) -> CurveResult<f64> {
        self.check_range(t)?;
        let (t1, t2) = step_around(self, t);
        Ok((self.discount(t1)? / self.discount(t2)?).ln() / (t2 - t1))
    }
}

/// A `[t1, t1 + step]` window near `t` that stays inside the queryable range.
fn step_around<T: TermStructure + ?Sized>(curve: &T, t: f64) -> (f64, f64) {
    let t1 = (t - RATE_TIME_STEP / 2.0).max(0.0);
    let t2 = t1 + RATE_TIME_STEP;
    let max_time = curve.max_time();
    if !curve.allows_extrapolation() && t2 > max_time {
        let t2 = max_time.max(RATE_TIME_STEP);
        return ((t2 - RATE_TIME_STEP).max(0.0), t2);
    }
    (t1, t2)
}

impl<T: TermStructure + ?Sized> TermStructure for Arc<T> {
    fn reference_date(&self) -> Date {
        (**self).reference_date()
    }

    fn day_count(&self) -> DayCountConvention {
        (**self).day_count()
    }

    fn max_date(&self) -> Date {
        (**self).max_date()
    }

    fn allows_extrapolation(&self) -> bool {
        (**self).allows_extrapolation()
    }

    fn discount_impl(&self, t: f64) -> CurveResult<f64> {
        (**self).discount_impl(t)
    }

    fn max_time(&self) -> f64 {
        (**self).max_time()
    }
}

impl<T: TermStructure + ?Sized> TermStructure for Box<T> {
    fn reference_date(&self) -> Date {
        (**self).reference_date()
    }

    fn day_count(&self) -> DayCountConvention {
        (**self).day_count()
    }

    fn max_date(&self) -> Date {
        (**self).max_date()
    }

    fn allows_extrapolation(&self) -> bool {
        (**self).allows_extrapolation()
    }

    fn discount_impl(&self, t: f64) -> CurveResult<f64> {
        (**self).discount_impl(t)
    }

    fn max_time(&self) -> f64 {
        (**self).max_time()
    }
}
