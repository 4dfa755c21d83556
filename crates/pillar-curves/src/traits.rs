//! Bootstrap strategies, one per node value type.
//!
//! A [`CurveTraits`] implementation tells the bootstrap what a node value
//! means: where to start, how far it may move from the previous node, and
//! how to turn an interpolator over node values into discount factors.
//! Past the last node every strategy continues with a flat instantaneous
//! forward equal to the forward at the last node.

use pillar_math::interpolation::Interpolator;
use pillar_math::MathResult;

use crate::value_type::ValueType;

/// Largest rate magnitude the node solver searches over.
pub const MAX_RATE: f64 = 1.0;

/// Rate behind first guesses.
pub const AVG_RATE: f64 = 0.05;

/// Initial bracket width for the node solver.
pub const ROOT_FINDER_STEP: f64 = 0.01;

/// Node strategy for one curve representation.
///
/// `times[0]` is always 0 and `values[0]` is the reference node.
pub trait CurveTraits: Send + Sync {
    /// The value type this strategy implements.
    fn value_type(&self) -> ValueType;

    /// Value every node starts from, including the reference node.
    fn initial_value(&self) -> f64;

    /// First guess for node `i` (`i >= 1`) given the nodes before it.
    ///
    /// `hint` is a discount factor at `times[i]` suggested by the helper.
    fn guess(&self, i: usize, times: &[f64], values: &[f64], hint: Option<f64>) -> f64;

    /// Smallest admissible value for node `i`.
    fn min_value_after(&self, i: usize, times: &[f64], values: &[f64]) -> f64;

    /// Largest admissible value for node `i`.
    fn max_value_after(&self, i: usize, times: &[f64], values: &[f64]) -> f64;

    /// Initial bracket width handed to the root finder.
    fn root_finder_step(&self) -> f64 {
        ROOT_FINDER_STEP
    }

    /// Stores `value` at node `i`.
    fn update_node(&self, values: &mut [f64], i: usize, value: f64) {
        values[i] = value;
    }

    /// Discount factor at `t >= 0` from an interpolator over the nodes.
    fn discount(&self, interpolator: &dyn Interpolator, t: f64) -> MathResult<f64>;

    /// Maps a node value to an unconstrained optimizer parameter.
    fn to_parameter(&self, value: f64) -> f64 {
        value
    }

    /// Inverse of [`CurveTraits::to_parameter`].
    fn from_parameter(&self, parameter: f64) -> f64 {
        parameter
    }
}

/// Nodes are discount factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discount;

impl CurveTraits for Discount {
    fn value_type(&self) -> ValueType {
        ValueType::Discount
    }

    fn initial_value(&self) -> f64 {
        1.0
    }

    fn guess(&self, i: usize, times: &[f64], values: &[f64], hint: Option<f64>) -> f64 {
        if let Some(df) = hint.filter(|df| df.is_finite() && *df > 0.0) {
            return df;
        }
        if i == 1 {
            return 1.0 / (1.0 + AVG_RATE * times[1]);
        }
        let r = -values[i - 1].ln() / times[i - 1];
        (-r * times[i]).exp()
    }

    fn min_value_after(&self, i: usize, times: &[f64], values: &[f64]) -> f64 {
        let dt = times[i] - times[i - 1];
        values[i - 1] * (-MAX_RATE * dt).exp()
    }

    fn max_value_after(&self, i: usize, times: &[f64], values: &[f64]) -> f64 {
        let dt = times[i] - times[i - 1];
        values[i - 1] * (MAX_RATE * dt).exp()
    }

    fn discount(&self, interpolator: &dyn Interpolator, t: f64) -> MathResult<f64> {
        let t_max = interpolator.max_x();
        if t <= t_max {
            return interpolator.interpolate(t);
        }
        let df_max = interpolator.interpolate(t_max)?;
        let forward = -interpolator.derivative(t_max)? / df_max;
        Ok(df_max * (-forward * (t - t_max)).exp())
    }

    fn to_parameter(&self, value: f64) -> f64 {
        value.ln()
    }

    fn from_parameter(&self, parameter: f64) -> f64 {
        parameter.exp()
    }
}

/// Nodes are continuously compounded zero rates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroYield;

impl CurveTraits for ZeroYield {
    fn value_type(&self) -> ValueType {
        ValueType::ZeroYield
    }

    fn initial_value(&self) -> f64 {
        AVG_RATE
    }

    fn guess(&self, i: usize, times: &[f64], values: &[f64], hint: Option<f64>) -> f64 {
        if let Some(df) = hint.filter(|df| df.is_finite() && *df > 0.0) {
            return -df.ln() / times[i];
        }
        if i == 1 {
            AVG_RATE
        } else {
            values[i - 1]
        }
    }

    fn min_value_after(&self, _i: usize, _times: &[f64], _values: &[f64]) -> f64 {
        -MAX_RATE
    }

    fn max_value_after(&self, _i: usize, _times: &[f64], _values: &[f64]) -> f64 {
        MAX_RATE
    }

    // Node 0 sits at t = 0 where a zero rate is undefined; it follows node 1.
    fn update_node(&self, values: &mut [f64], i: usize, value: f64) {
        values[i] = value;
        if i == 1 {
            values[0] = value;
        }
    }

    fn discount(&self, interpolator: &dyn Interpolator, t: f64) -> MathResult<f64> {
        let t_max = interpolator.max_x();
        if t <= t_max {
            let z = interpolator.interpolate(t)?;
            return Ok((-z * t).exp());
        }
        let z_max = interpolator.interpolate(t_max)?;
        let forward = z_max + t_max * interpolator.derivative(t_max)?;
        Ok((-(z_max * t_max + forward * (t - t_max))).exp())
    }
}

/// Nodes are instantaneous forward rates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardRate;

impl CurveTraits for ForwardRate {
    fn value_type(&self) -> ValueType {
        ValueType::ForwardRate
    }

    fn initial_value(&self) -> f64 {
        AVG_RATE
    }

    fn guess(&self, i: usize, _times: &[f64], values: &[f64], _hint: Option<f64>) -> f64 {
        if i == 1 {
            AVG_RATE
        } else {
            values[i - 1]
        }
    }

    fn min_value_after(&self, _i: usize, _times: &[f64], _values: &[f64]) -> f64 {
        -MAX_RATE
    }

    fn max_value_after(&self, _i: usize, _times: &[f64], _values: &[f64]) -> f64 {
        MAX_RATE
    }

    fn update_node(&self, values: &mut [f64], i: usize, value: f64) {
        values[i] = value;
        if i == 1 {
            values[0] = value;
        }
    }

    fn discount(&self, interpolator: &dyn Interpolator, t: f64) -> MathResult<f64> {
        let t_max = interpolator.max_x();
        if t <= t_max {
            return Ok((-interpolator.primitive(t)?).exp());
        }
        let integral =
            interpolator.primitive(t_max)? + interpolator.interpolate(t_max)? * (t - t_max);
        Ok((-integral).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pillar_math::interpolation::{InterpolationMethod, LinearInterpolator};

    #[test]
    fn test_discount_guess_and_bounds() {
        let times = [0.0, 0.5, 1.0];
        let values = [1.0, 0.98, 1.0];
        assert_relative_eq!(Discount.guess(1, &times, &values, None), 1.0 / 1.025);
        // flat zero rate carried forward
        let g = Discount.guess(2, &times, &values, None);
        assert_relative_eq!(g, 0.98 * 0.98, epsilon = 1e-14);
        assert_eq!(Discount.guess(2, &times, &values, Some(0.95)), 0.95);
        assert_eq!(Discount.guess(2, &times, &values, Some(-1.0)), g);

        let lo = Discount.min_value_after(2, &times, &values);
        let hi = Discount.max_value_after(2, &times, &values);
        assert_relative_eq!(lo, 0.98 * (-0.5_f64).exp());
        assert_relative_eq!(hi, 0.98 * 0.5_f64.exp());
    }

    #[test]
    fn test_rate_traits_mirror_first_node() {
        for traits in [&ZeroYield as &dyn CurveTraits, &ForwardRate] {
            let mut values = vec![traits.initial_value(); 3];
            traits.update_node(&mut values, 1, 0.031);
            assert_eq!(values[0], 0.031);
            traits.update_node(&mut values, 2, 0.035);
            assert_eq!(values[0], 0.031);
            assert_eq!(values[2], 0.035);
        }

        let mut values = vec![1.0; 3];
        Discount.update_node(&mut values, 1, 0.99);
        assert_eq!(values[0], 1.0);
    }

    #[test]
    fn test_zero_guess_from_hint() {
        let times = [0.0, 2.0];
        let values = [0.05, 0.05];
        let df = (-0.03_f64 * 2.0).exp();
        assert_relative_eq!(ZeroYield.guess(1, &times, &values, Some(df)), 0.03, epsilon = 1e-14);
    }

    #[test]
    fn test_discount_flat_forward_extrapolation() {
        let interp = InterpolationMethod::LogLinear
            .build(vec![0.0, 1.0, 2.0], vec![1.0, 0.97, 0.93])
            .unwrap();
        let fwd = (0.97_f64 / 0.93).ln();
        let df = Discount.discount(interp.as_ref(), 3.5).unwrap();
        assert_relative_eq!(df, 0.93 * (-fwd * 1.5).exp(), epsilon = 1e-12);
        assert_relative_eq!(Discount.discount(interp.as_ref(), 1.0).unwrap(), 0.97);
    }

    #[test]
    fn test_zero_yield_extrapolation() {
        let interp = LinearInterpolator::new(vec![0.0, 1.0, 2.0], vec![0.02, 0.02, 0.03]).unwrap();
        // forward at t=2: z + t dz/dt = 0.03 + 2 * 0.01
        let df = ZeroYield.discount(&interp, 3.0).unwrap();
        assert_relative_eq!(df, (-(0.03 * 2.0 + 0.05 * 1.0_f64)).exp(), epsilon = 1e-14);
        let inside = ZeroYield.discount(&interp, 1.5).unwrap();
        assert_relative_eq!(inside, (-0.025_f64 * 1.5).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_forward_rate_integrates() {
        let interp = InterpolationMethod::BackwardFlat
            .build(vec![0.0, 1.0, 2.0], vec![0.02, 0.02, 0.04])
            .unwrap();
        let df = ForwardRate.discount(interp.as_ref(), 1.5).unwrap();
        assert_relative_eq!(df, (-(0.02 + 0.04 * 0.5_f64)).exp(), epsilon = 1e-14);
        let beyond = ForwardRate.discount(interp.as_ref(), 3.0).unwrap();
        assert_relative_eq!(beyond, (-(0.06 + 0.04_f64)).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_discount_parameters_are_logs() {
        assert_relative_eq!(Discount.from_parameter(Discount.to_parameter(0.9)), 0.9);
        assert_eq!(ZeroYield.to_parameter(0.03), 0.03);
    }
}
