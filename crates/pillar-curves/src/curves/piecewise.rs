//! The bootstrapped piecewise yield curve.

use std::fmt;
use std::sync::Arc;

use pillar_core::daycounts::DayCountConvention;
use pillar_core::Date;
use pillar_math::interpolation::{InterpolationMethod, Interpolator};

use super::node_times;
use crate::error::{CurveError, CurveResult};
use crate::term_structure::TermStructure;
use crate::value_type::ValueType;

/// An immutable curve defined by node values and an interpolation scheme.
///
/// Node 0 sits at the reference date. Between nodes the curve follows the
/// interpolation of its [`ValueType`]; past the last node it continues with
/// a flat instantaneous forward when extrapolation is enabled.
///
/// # Example
///
/// ```rust
/// use pillar_core::daycounts::DayCountConvention;
/// use pillar_core::Date;
/// use pillar_curves::value_type::ValueType;
/// use pillar_curves::{PiecewiseYieldCurve, TermStructure};
/// use pillar_math::interpolation::InterpolationMethod;
///
/// let dates = vec![
///     Date::from_ymd(2025, 1, 2).unwrap(),
///     Date::from_ymd(2026, 1, 2).unwrap(),
///     Date::from_ymd(2027, 1, 2).unwrap(),
/// ];
/// let curve = PiecewiseYieldCurve::from_nodes(
///     DayCountConvention::Act365Fixed,
///     ValueType::Discount,
///     InterpolationMethod::LogLinear,
///     dates,
///     vec![1.0, 0.97, 0.94],
/// )
/// .unwrap();
/// assert!((curve.discount(1.0).unwrap() - 0.97).abs() < 1e-15);
/// assert!(curve.discount(5.0).is_err());
/// ```
#[derive(Clone)]
pub struct PiecewiseYieldCurve {
    reference_date: Date,
    day_count: DayCountConvention,
    value_type: ValueType,
    method: InterpolationMethod,
    dates: Vec<Date>,
    times: Vec<f64>,
    values: Vec<f64>,
    interpolator: Arc<dyn Interpolator>,
    allow_extrapolation: bool,
}

impl PiecewiseYieldCurve {
    /// Builds a curve from node dates (reference date first) and values.
    ///
    /// Extrapolation starts disabled.
    pub fn from_nodes(
        day_count: DayCountConvention,
        value_type: ValueType,
        method: InterpolationMethod,
        dates: Vec<Date>,
        values: Vec<f64>,
    ) -> CurveResult<Self> {
        if dates.len() != values.len() {
            return Err(CurveError::invalid_config(format!(
                "{} node dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        let required = method.required_points().max(2);
        if dates.len() < required {
            return Err(CurveError::InsufficientHelpers {
                required: required - 1,
                got: dates.len().saturating_sub(1),
            });
        }
        let times = node_times(day_count, &dates)?;
        let interpolator: Arc<dyn Interpolator> =
            Arc::from(method.build(times.clone(), values.clone())?);
        Ok(Self {
            reference_date: dates[0],
            day_count,
            value_type,
            method,
            dates,
            times,
            values,
            interpolator,
            allow_extrapolation: false,
        })
    }

    /// Returns the curve with extrapolation switched on or off.
    #[must_use]
    pub fn with_extrapolation(mut self, allow: bool) -> Self {
        self.allow_extrapolation = allow;
        self
    }

    /// Answers queries past the last node.
    pub fn enable_extrapolation(&mut self) {
        self.allow_extrapolation = true;
    }

    /// Rejects queries past the last node.
    pub fn disable_extrapolation(&mut self) {
        self.allow_extrapolation = false;
    }

    /// Node dates, reference date first.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Node times.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Node values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(date, value)` pairs.
    #[must_use]
    pub fn nodes(&self) -> Vec<(Date, f64)> {
        self.dates.iter().copied().zip(self.values.iter().copied()).collect()
    }

    /// What the node values represent.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Interpolation scheme.
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMethod {
        self.method
    }
}

impl TermStructure for PiecewiseYieldCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    fn max_date(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }

    fn max_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    fn allows_extrapolation(&self) -> bool {
        self.allow_extrapolation
    }

    fn discount_impl(&self, t: f64) -> CurveResult<f64> {
        Ok(self
            .value_type
            .traits()
            .discount(self.interpolator.as_ref(), t)?)
    }
}

impl fmt::Debug for PiecewiseYieldCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PiecewiseYieldCurve")
            .field("reference_date", &self.reference_date)
            .field("day_count", &self.day_count)
            .field("value_type", &self.value_type)
            .field("method", &self.method)
            .field("nodes", &self.nodes())
            .field("allow_extrapolation", &self.allow_extrapolation)
            .finish()
    }
}
