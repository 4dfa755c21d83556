//! The mutable node grid used during a bootstrap.

use std::fmt;
use std::sync::Arc;

use pillar_core::daycounts::DayCountConvention;
use pillar_core::Date;
use pillar_math::interpolation::{InterpolationMethod, Interpolator};

use super::{node_times, PiecewiseYieldCurve};
use crate::error::{CurveError, CurveResult};
use crate::term_structure::TermStructure;
use crate::traits::CurveTraits;
use crate::value_type::ValueType;

/// Node grid owned by a bootstrap.
///
/// Only the first `active` nodes take part in the interpolation, so the
/// first pass can extend the curve one node at a time. Queries past the
/// last active node always extrapolate flat-forward. The interpolator is
/// rebuilt after every change.
pub struct TrialCurve {
    reference_date: Date,
    day_count: DayCountConvention,
    value_type: ValueType,
    method: InterpolationMethod,
    dates: Vec<Date>,
    times: Vec<f64>,
    values: Vec<f64>,
    active: usize,
    interpolator: Arc<dyn Interpolator>,
}

impl TrialCurve {
    /// Creates a grid over `dates` (reference date first) with every node at
    /// the strategy's initial value and all nodes active.
    pub fn new(
        day_count: DayCountConvention,
        value_type: ValueType,
        method: InterpolationMethod,
        dates: Vec<Date>,
    ) -> CurveResult<Self> {
        let times = node_times(day_count, &dates)?;
        if times.len() < 2 {
            return Err(CurveError::InsufficientHelpers {
                required: 1,
                got: 0,
            });
        }
        let values = vec![value_type.traits().initial_value(); times.len()];
        let interpolator = build(method, &times, &values)?;
        Ok(Self {
            reference_date: dates[0],
            day_count,
            value_type,
            method,
            active: times.len(),
            dates,
            times,
            values,
            interpolator,
        })
    }

    /// Strategy for the node values.
    #[must_use]
    pub fn traits(&self) -> &'static dyn CurveTraits {
        self.value_type.traits()
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

    /// Number of nodes, including the reference node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false; a trial curve has at least two nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Interpolation method in use.
    #[must_use]
    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    /// Switches the interpolation method.
    pub fn set_method(&mut self, method: InterpolationMethod) -> CurveResult<()> {
        self.method = method;
        self.rebuild()
    }

    /// Restricts the interpolation to the first `active` nodes.
    pub fn set_active(&mut self, active: usize) -> CurveResult<()> {
        if !(2..=self.len()).contains(&active) {
            return Err(CurveError::invalid_config(format!(
                "active node count {active} outside 2..={}",
                self.len()
            )));
        }
        self.active = active;
        self.rebuild()
    }

    /// Sets node `i` through the strategy's update rule.
    pub fn set_node(&mut self, i: usize, value: f64) -> CurveResult<()> {
        self.value_type.traits().update_node(&mut self.values, i, value);
        self.rebuild()
    }

    /// Replaces every node value.
    pub fn set_values(&mut self, values: &[f64]) -> CurveResult<()> {
        if values.len() != self.values.len() {
            return Err(CurveError::invalid_config(format!(
                "expected {} node values, got {}",
                self.values.len(),
                values.len()
            )));
        }
        self.values.copy_from_slice(values);
        self.rebuild()
    }

    fn rebuild(&mut self) -> CurveResult<()> {
        let n = self.active;
        // a global scheme needs more nodes than the first pass may have
        let method = if n < self.method.required_points() {
            InterpolationMethod::Linear
        } else {
            self.method
        };
        self.interpolator = build(method, &self.times[..n], &self.values[..n])?;
        Ok(())
    }

    /// Freezes the grid into a finished curve.
    pub fn into_curve(
        self,
        method: InterpolationMethod,
        allow_extrapolation: bool,
    ) -> CurveResult<PiecewiseYieldCurve> {
        let curve = PiecewiseYieldCurve::from_nodes(
            self.day_count,
            self.value_type,
            method,
            self.dates,
            self.values,
        )?;
        Ok(curve.with_extrapolation(allow_extrapolation))
    }
}

fn build(
    method: InterpolationMethod,
    times: &[f64],
    values: &[f64],
) -> CurveResult<Arc<dyn Interpolator>> {
    Ok(Arc::from(method.build(times.to_vec(), values.to_vec())?))
}

impl TermStructure for TrialCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    fn max_date(&self) -> Date {
        self.dates[self.active - 1]
    }

    fn max_time(&self) -> f64 {
        self.times[self.active - 1]
    }

    fn allows_extrapolation(&self) -> bool {
        true
    }

    fn discount_impl(&self, t: f64) -> CurveResult<f64> {
        Ok(self
            .value_type
            .traits()
            .discount(self.interpolator.as_ref(), t)?)
    }
}

impl fmt::Debug for TrialCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrialCurve")
            .field("value_type", &self.value_type)
            .field("method", &self.method)
            .field("times", &self.times)
            .field("values", &self.values)
            .field("active", &self.active)
            .finish()
    }
}
