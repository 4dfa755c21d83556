//! Interpolation methods for curve construction.
//!
//! # Available Methods
//!
//! - [`LinearInterpolator`]: piecewise linear
//! - [`LogLinearInterpolator`]: linear in `ln(y)`, positive values only
//! - [`CubicSpline`]: natural cubic spline
//! - [`BackwardFlat`]: piecewise constant, each segment takes its right node
//!
//! # Local and Global Schemes
//!
//! | Method | Smoothness | Scope | Min. points |
//! |--------|------------|-------|-------------|
//! | Linear | C0 | Local | 2 |
//! | Log-Linear | C0 | Local | 2 |
//! | Backward Flat | None | Local | 2 |
//! | Cubic Spline | C2 | **Global** | 3 |
//!
//! A local scheme only looks at the two nodes around `x`, so moving a node
//! changes the curve between its neighbours and nowhere else. A global scheme
//! couples every node: moving the last one reshapes segments that were
//! already fitted. Curve builders use [`Interpolator::is_global`] to decide
//! whether a fitted curve needs another pass.

mod backward_flat;
mod cubic_spline;
mod linear;
mod log_linear;

pub use backward_flat::BackwardFlat;
pub use cubic_spline::CubicSpline;
pub use linear::LinearInterpolator;
pub use log_linear::LogLinearInterpolator;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{MathError, MathResult};

/// Trait for interpolation methods.
///
/// All interpolation methods implement this trait, providing a unified
/// interface for curve construction.
pub trait Interpolator: Send + Sync {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// Returns the first derivative at x.
    fn derivative(&self, x: f64) -> MathResult<f64>;

    /// Returns the integral of the interpolant from `min_x()` to `x`.
    fn primitive(&self, x: f64) -> MathResult<f64>;

    /// Returns true if extrapolation is allowed.
    fn allows_extrapolation(&self) -> bool {
        false
    }

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64;

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64;

    /// Checks if x is within the interpolation range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }

    /// True when every node influences every segment.
    fn is_global(&self) -> bool {
        false
    }
}

/// Checks node vectors: equal lengths, enough points, finite and strictly
/// increasing abscissae.
pub(crate) fn validate_nodes(xs: &[f64], ys: &[f64], required: usize) -> MathResult<()> {
    if xs.len() != ys.len() {
        return Err(MathError::invalid_input(format!(
            "xs and ys must have same length: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < required {
        return Err(MathError::insufficient_data(required, xs.len()));
    }
    if let Some(bad) = xs.iter().chain(ys).find(|v| !v.is_finite()) {
        return Err(MathError::invalid_input(format!("non-finite node value {bad}")));
    }
    if let Some(i) = (1..xs.len()).find(|&i| xs[i] <= xs[i - 1]) {
        return Err(MathError::invalid_input(format!(
            "x values must be strictly increasing: x[{}] = {} and x[{i}] = {}",
            i - 1,
            xs[i - 1],
            xs[i]
        )));
    }
    Ok(())
}

/// Finds the index i such that `xs[i] <= x < xs[i+1]`, clamped to the end
/// segments.
pub(crate) fn find_segment(xs: &[f64], x: f64) -> usize {
    let last = xs.len() - 2;
    match xs.binary_search_by(|node| node.partial_cmp(&x).unwrap_or(Ordering::Equal)) {
        Ok(i) => i.min(last),
        Err(i) => i.saturating_sub(1).min(last),
    }
}

/// Rejects `x` outside `[xs[0], xs[n-1]]` unless extrapolation is on.
pub(crate) fn check_range(xs: &[f64], x: f64, allow_extrapolation: bool) -> MathResult<()> {
    let (min, max) = (xs[0], xs[xs.len() - 1]);
    if !allow_extrapolation && (x < min || x > max) {
        return Err(MathError::ExtrapolationNotAllowed { x, min, max });
    }
    Ok(())
}

/// Selects an interpolation scheme by name.
///
/// # Example
///
/// ```rust
/// use pillar_math::interpolation::InterpolationMethod;
///
/// let method = InterpolationMethod::CubicSpline;
/// assert!(method.is_global());
/// let spline = method.build(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0]).unwrap();
/// assert!(spline.is_global());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InterpolationMethod {
    /// [`LinearInterpolator`]
    Linear,
    /// [`LogLinearInterpolator`]
    #[default]
    LogLinear,
    /// [`CubicSpline`]
    CubicSpline,
    /// [`BackwardFlat`]
    BackwardFlat,
}

impl InterpolationMethod {
    /// True for schemes where each node affects the whole curve.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, InterpolationMethod::CubicSpline)
    }

    /// Minimum number of nodes the scheme needs.
    #[must_use]
    pub fn required_points(&self) -> usize {
        match self {
            InterpolationMethod::CubicSpline => 3,
            _ => 2,
        }
    }

    /// Builds an interpolator over the given nodes.
    pub fn build(&self, xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Box<dyn Interpolator>> {
        Ok(match self {
            InterpolationMethod::Linear => Box::new(LinearInterpolator::new(xs, ys)?),
            InterpolationMethod::LogLinear => Box::new(LogLinearInterpolator::new(xs, ys)?),
            InterpolationMethod::CubicSpline => Box::new(CubicSpline::new(xs, ys)?),
            InterpolationMethod::BackwardFlat => Box::new(BackwardFlat::new(xs, ys)?),
        })
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterpolationMethod::Linear => "Linear",
            InterpolationMethod::LogLinear => "LogLinear",
            InterpolationMethod::CubicSpline => "CubicSpline",
            InterpolationMethod::BackwardFlat => "BackwardFlat",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const METHODS: [InterpolationMethod; 4] = [
        InterpolationMethod::Linear,
        InterpolationMethod::LogLinear,
        InterpolationMethod::CubicSpline,
        InterpolationMethod::BackwardFlat,
    ];

    #[test]
    fn test_all_interpolators_through_points() {
        let times = vec![0.5, 1.0, 2.0, 3.0, 5.0];
        let dfs: Vec<f64> = [0.02_f64, 0.025, 0.03, 0.035, 0.04]
            .iter()
            .zip(&times)
            .map(|(r, t)| (-r * t).exp())
            .collect();

        for method in METHODS {
            let interp = method.build(times.clone(), dfs.clone()).unwrap();
            for (t, df) in times.iter().zip(&dfs) {
                assert_relative_eq!(interp.interpolate(*t).unwrap(), *df, epsilon = 1e-14);
            }
            assert_eq!(interp.is_global(), method.is_global(), "{method}");
        }
    }

    #[test]
    fn test_derivative_consistency() {
        let times = vec![0.5, 1.0, 2.0, 3.0, 5.0];
        let rates = vec![0.02, 0.025, 0.03, 0.035, 0.04];

        for method in [
            InterpolationMethod::Linear,
            InterpolationMethod::LogLinear,
            InterpolationMethod::CubicSpline,
        ] {
            let interp = method.build(times.clone(), rates.clone()).unwrap();
            check_derivative(interp.as_ref(), 1.5, method);
            check_derivative(interp.as_ref(), 4.2, method);
        }
    }

    fn check_derivative(interp: &dyn Interpolator, t: f64, method: InterpolationMethod) {
        let h = 1e-6;
        let numerical =
            (interp.interpolate(t + h).unwrap() - interp.interpolate(t - h).unwrap()) / (2.0 * h);
        let analytical = interp.derivative(t).unwrap();

        assert!(
            (analytical - numerical).abs() < 1e-6,
            "{method} derivative at t={t}: analytical={analytical}, numerical={numerical}"
        );
    }

    #[test]
    fn test_primitive_matches_quadrature() {
        let times = vec![0.0, 0.5, 1.0, 2.0, 3.0, 5.0];
        let values = vec![0.01, 0.015, 0.02, 0.026, 0.029, 0.031];

        for method in METHODS {
            let interp = method.build(times.clone(), values.clone()).unwrap();
            let upper = 3.7;
            // Composite midpoint rule; the step jumps of BackwardFlat cost O(h)
            let n = 20_000;
            let h = upper / n as f64;
            let quadrature: f64 = (0..n)
                .map(|k| interp.interpolate((k as f64 + 0.5) * h).unwrap() * h)
                .sum();
            assert_relative_eq!(interp.primitive(upper).unwrap(), quadrature, epsilon = 2e-6);
            assert_eq!(interp.primitive(0.0).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_moving_last_node_is_local_only_for_local_schemes() {
        let xs = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = vec![1.0, 0.98, 0.95, 0.93, 0.90];
        let mut bumped = ys.clone();
        bumped[4] = 0.85;

        for method in METHODS {
            let before = method.build(xs.clone(), ys.clone()).unwrap();
            let after = method.build(xs.clone(), bumped.clone()).unwrap();
            let moved = (before.interpolate(1.5).unwrap() - after.interpolate(1.5).unwrap()).abs();
            if method.is_global() {
                assert!(moved > 1e-6, "{method} should react to a remote node");
            } else {
                assert_eq!(moved, 0.0, "{method} should not react to a remote node");
            }
        }
    }

    #[test]
    fn test_node_validation() {
        assert!(matches!(
            LinearInterpolator::new(vec![0.0], vec![1.0]),
            Err(MathError::InsufficientData { required: 2, actual: 1 })
        ));
        assert!(LinearInterpolator::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(LinearInterpolator::new(vec![0.0, 1.0, 1.0], vec![1.0, 2.0, 3.0]).is_err());
        assert!(LinearInterpolator::new(vec![0.0, f64::NAN], vec![1.0, 2.0]).is_err());
        assert!(CubicSpline::new(vec![0.0, 1.0], vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_find_segment() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(find_segment(&xs, -1.0), 0);
        assert_eq!(find_segment(&xs, 0.0), 0);
        assert_eq!(find_segment(&xs, 1.0), 1);
        assert_eq!(find_segment(&xs, 2.5), 2);
        assert_eq!(find_segment(&xs, 3.0), 2);
        assert_eq!(find_segment(&xs, 7.0), 2);
    }

    #[test]
    fn test_method_serde() {
        let json = serde_json::to_string(&InterpolationMethod::BackwardFlat).unwrap();
        assert_eq!(json, "\"BackwardFlat\"");
        let back: InterpolationMethod = serde_json::from_str(&json).unwrap();
        assert_eq!(back, InterpolationMethod::BackwardFlat);
        assert_eq!(InterpolationMethod::CubicSpline.required_points(), 3);
    }
}
