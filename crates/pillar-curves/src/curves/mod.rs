//! Piecewise curve types.
//!
//! - [`TrialCurve`]: the mutable node grid a bootstrap works on
//! - [`PiecewiseYieldCurve`]: the immutable result

mod piecewise;
mod trial;

pub use piecewise::PiecewiseYieldCurve;
pub use trial::TrialCurve;

use pillar_core::daycounts::{DayCount, DayCountConvention};
use pillar_core::Date;

use crate::error::{CurveError, CurveResult};

/// Node times for `dates`, which must start at the reference date and
/// strictly increase in time.
pub(crate) fn node_times(day_count: DayCountConvention, dates: &[Date]) -> CurveResult<Vec<f64>> {
    let Some(&reference) = dates.first() else {
        return Err(CurveError::invalid_config("a curve needs at least one node"));
    };
    let times: Vec<f64> = dates
        .iter()
        .map(|d| day_count.year_fraction_f64(reference, *d))
        .collect();
    if let Some(i) = (1..times.len()).find(|&i| times[i] <= times[i - 1]) {
        return Err(CurveError::invalid_config(format!(
            "node dates must increase: {} at t = {} follows {} at t = {}",
            dates[i],
            times[i],
            dates[i - 1],
            times[i - 1]
        )));
    }
    Ok(times)
}
