//! Backward-flat (piecewise constant) interpolation.

use crate::error::MathResult;
use crate::interpolation::{check_range, validate_nodes, Interpolator};

/// Piecewise constant interpolation.
///
/// On `(x[i-1], x[i]]` the value is `y[i]`; left of the first node it is
/// `y[0]`, right of the last node (with extrapolation on) it is `y[n-1]`.
/// Applied to instantaneous forwards this gives the usual flat-forward curve.
#[derive(Debug, Clone)]
pub struct BackwardFlat {
    xs: Vec<f64>,
    ys: Vec<f64>,
    allow_extrapolation: bool,
}

impl BackwardFlat {
    /// Creates a new backward-flat interpolator.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;
        Ok(Self {
            xs,
            ys,
            allow_extrapolation: false,
        })
    }

    /// Enables flat extension past both ends.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.allow_extrapolation = true;
        self
    }

    /// Index of the node whose value applies at `x`.
    fn node_for(&self, x: f64) -> usize {
        self.xs.partition_point(|&node| node < x).min(self.xs.len() - 1)
    }
}

impl Interpolator for BackwardFlat {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        Ok(self.ys[self.node_for(x)])
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        Ok(0.0)
    }

    fn primitive(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        if x <= self.xs[0] {
            return Ok(self.ys[0] * (x - self.xs[0]));
        }
        let mut total = 0.0;
        let mut left = self.xs[0];
        for (&node, &value) in self.xs.iter().zip(&self.ys).skip(1) {
            if x <= node {
                return Ok(total + value * (x - left));
            }
            total += value * (node - left);
            left = node;
        }
        Ok(total + self.ys[self.ys.len() - 1] * (x - left))
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
    fn test_backward_flat_values() {
        let interp = BackwardFlat::new(vec![0.0, 1.0, 2.0], vec![5.0, 1.0, 2.0]).unwrap();

        assert_eq!(interp.interpolate(0.0).unwrap(), 5.0);
        assert_eq!(interp.interpolate(0.3).unwrap(), 1.0);
        assert_eq!(interp.interpolate(1.0).unwrap(), 1.0);
        assert_eq!(interp.interpolate(1.0001).unwrap(), 2.0);
        assert_eq!(interp.derivative(0.5).unwrap(), 0.0);
    }

    #[test]
    fn test_backward_flat_primitive() {
        let interp = BackwardFlat::new(vec![0.0, 1.0, 2.0], vec![5.0, 1.0, 2.0])
            .unwrap()
            .with_extrapolation();

        assert_relative_eq!(interp.primitive(0.5).unwrap(), 0.5, epsilon = 1e-15);
        assert_relative_eq!(interp.primitive(1.5).unwrap(), 2.0, epsilon = 1e-15);
        assert_relative_eq!(interp.primitive(3.0).unwrap(), 5.0, epsilon = 1e-15);
    }
}
