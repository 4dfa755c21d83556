//! Linear interpolation.

use crate::error::MathResult;
use crate::interpolation::{check_range, find_segment, validate_nodes, Interpolator};

/// Linear interpolation between data points.
///
/// # Example
///
/// ```rust
/// use pillar_math::interpolation::{Interpolator, LinearInterpolator};
///
/// let xs = vec![0.0, 1.0, 2.0];
/// let ys = vec![0.0, 1.0, 4.0];
///
/// let interp = LinearInterpolator::new(xs, ys).unwrap();
/// assert!((interp.interpolate(1.5).unwrap() - 2.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    allow_extrapolation: bool,
}

impl LinearInterpolator {
    /// Creates a new linear interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points, if lengths differ,
    /// or if `xs` is not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;
        Ok(Self {
            xs,
            ys,
            allow_extrapolation: false,
        })
    }

    /// Enables linear extension of the end segments.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.allow_extrapolation = true;
        self
    }

    fn slope(&self, i: usize) -> f64 {
        (self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i])
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        let i = find_segment(&self.xs, x);
        Ok(self.ys[i] + self.slope(i) * (x - self.xs[i]))
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        Ok(self.slope(find_segment(&self.xs, x)))
    }

    fn primitive(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        let i = find_segment(&self.xs, x);
        let whole: f64 = (0..i)
            .map(|j| 0.5 * (self.ys[j] + self.ys[j + 1]) * (self.xs[j + 1] - self.xs[j]))
            .sum();
        let dx = x - self.xs[i];
        Ok(whole + dx * (self.ys[i] + 0.5 * self.slope(i) * dx))
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_basic() {
        let interp = LinearInterpolator::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]).unwrap();

        assert_relative_eq!(interp.interpolate(0.5).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(interp.interpolate(1.5).unwrap(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(interp.derivative(1.5).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_primitive() {
        let interp = LinearInterpolator::new(vec![0.0, 1.0, 3.0], vec![1.0, 3.0, 3.0]).unwrap();

        // Trapezoid 0..1 is 2, then a rectangle of height 3
        assert_relative_eq!(interp.primitive(1.0).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(interp.primitive(2.0).unwrap(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(interp.primitive(0.5).unwrap(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_extrapolation() {
        let interp = LinearInterpolator::new(vec![0.0, 1.0], vec![0.0, 2.0]).unwrap();
        assert!(interp.interpolate(1.5).is_err());

        let interp = interp.with_extrapolation();
        assert_relative_eq!(interp.interpolate(1.5).unwrap(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(interp.interpolate(-0.5).unwrap(), -1.0, epsilon = 1e-12);
    }
}
