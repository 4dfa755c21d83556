//! Natural cubic spline interpolation.

use crate::error::MathResult;
use crate::interpolation::{check_range, find_segment, validate_nodes, Interpolator};
use crate::linear_algebra::solve_tridiagonal;

/// Natural cubic spline interpolation.
///
/// Piecewise cubics with continuous first and second derivatives; "natural"
/// means the second derivative vanishes at both ends. The second derivatives
/// come from one tridiagonal solve over all nodes, so every node influences
/// every segment.
///
/// # Example
///
/// ```rust
/// use pillar_math::interpolation::{CubicSpline, Interpolator};
///
/// let xs = vec![0.0, 1.0, 2.0, 3.0];
/// let ys = vec![0.0, 1.0, 4.0, 9.0];
///
/// let spline = CubicSpline::new(xs, ys).unwrap();
/// let y = spline.interpolate(1.5).unwrap();
/// assert!(y > 1.0 && y < 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot
    y2s: Vec<f64>,
    allow_extrapolation: bool,
}

impl CubicSpline {
    /// Creates a natural cubic spline interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 3 points, if lengths differ,
    /// or if `xs` is not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 3)?;
        let y2s = second_derivatives(&xs, &ys)?;

        Ok(Self {
            xs,
            ys,
            y2s,
            allow_extrapolation: false,
        })
    }

    /// Enables extrapolation with the end cubics.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.allow_extrapolation = true;
        self
    }

    /// Second derivatives at the knots.
    #[must_use]
    pub fn second_derivatives(&self) -> &[f64] {
        &self.y2s
    }

    /// Integral over `[xs[i], xs[i] + b * h]` where `h` is the segment width.
    fn segment_integral(&self, i: usize, b: f64) -> f64 {
        let h = self.xs[i + 1] - self.xs[i];
        let a = 1.0 - b;
        let b2 = b * b;
        let curvature_lo = (1.0 - a.powi(4)) / 4.0 - b + b2 / 2.0;
        let curvature_hi = b2 * b2 / 4.0 - b2 / 2.0;
        h * (self.ys[i] * (b - b2 / 2.0)
            + self.ys[i + 1] * b2 / 2.0
            + h * h / 6.0 * (self.y2s[i] * curvature_lo + self.y2s[i + 1] * curvature_hi))
    }
}

impl Interpolator for CubicSpline {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        let i = find_segment(&self.xs, x);

        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;

        Ok(a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.y2s[i] + (b * b * b - b) * self.y2s[i + 1]) * (h * h) / 6.0)
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        let i = find_segment(&self.xs, x);

        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;

        Ok((self.ys[i + 1] - self.ys[i]) / h - (3.0 * a * a - 1.0) / 6.0 * h * self.y2s[i]
            + (3.0 * b * b - 1.0) / 6.0 * h * self.y2s[i + 1])
    }

    fn primitive(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        let i = find_segment(&self.xs, x);
        let whole: f64 = (0..i).map(|j| self.segment_integral(j, 1.0)).sum();
        let b = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        Ok(whole + self.segment_integral(i, b))
    }

    fn allows_extrapolation(&self) -> bool {
        self.allow_extrapolation
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }

    fn is_global(&self) -> bool {
        true
    }
}

/// Second derivatives of the natural spline; zero at both ends.
fn second_derivatives(xs: &[f64], ys: &[f64]) -> MathResult<Vec<f64>> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let slope: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

    // Interior unknowns y2[1..n-1]
    let m = n - 2;
    let lower: Vec<f64> = (1..m).map(|k| h[k]).collect();
    let diag: Vec<f64> = (0..m).map(|k| 2.0 * (h[k] + h[k + 1])).collect();
    let upper: Vec<f64> = (1..m).map(|k| h[k]).collect();
    let rhs: Vec<f64> = (0..m).map(|k| 6.0 * (slope[k + 1] - slope[k])).collect();

    let interior = solve_tridiagonal(&lower, &diag, &upper, &rhs)?;

    let mut y2s = Vec::with_capacity(n);
    y2s.push(0.0);
    y2s.extend(interior);
    y2s.push(0.0);
    Ok(y2s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cubic_spline_through_points() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![0.0, 1.0, 4.0, 9.0];

        let spline = CubicSpline::new(xs.clone(), ys.clone()).unwrap();

        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_relative_eq!(spline.interpolate(*x).unwrap(), *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_three_points() {
        // One interior unknown: 2(h0 + h1) M1 = 6 (s1 - s0)
        let spline = CubicSpline::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0]).unwrap();
        assert_relative_eq!(spline.second_derivatives()[1], -3.0, epsilon = 1e-14);
        assert_relative_eq!(spline.interpolate(1.0).unwrap(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_linear_data_is_reproduced() {
        let xs = vec![0.0, 0.7, 1.5, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x - 1.0).collect();
        let spline = CubicSpline::new(xs, ys).unwrap();

        for &y2 in spline.second_derivatives() {
            assert!(y2.abs() < 1e-14);
        }
        assert_relative_eq!(spline.interpolate(2.2).unwrap(), 3.4, epsilon = 1e-13);
        assert_relative_eq!(spline.derivative(2.2).unwrap(), 2.0, epsilon = 1e-13);
        // Integral of 2x - 1 over [0, 3]
        assert_relative_eq!(spline.primitive(3.0).unwrap(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_first_derivative_is_continuous_at_knots() {
        let spline =
            CubicSpline::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![0.0, 1.0, 0.0, 1.0, 0.0]).unwrap();
        for knot in [1.0, 2.0, 3.0] {
            let left = spline.derivative(knot - 1e-9).unwrap();
            let right = spline.derivative(knot + 1e-9).unwrap();
            assert!((left - right).abs() < 1e-6, "kink at {knot}");
        }
    }

    #[test]
    fn test_cubic_spline_extrapolation() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![0.0, 1.0, 4.0, 9.0];

        let spline = CubicSpline::new(xs, ys).unwrap();
        assert!(spline.interpolate(-0.5).is_err());
        assert!(spline.interpolate(3.5).is_err());

        let spline = spline.with_extrapolation();
        assert!(spline.interpolate(-0.5).is_ok());
        assert!(spline.interpolate(3.5).is_ok());
    }
}
