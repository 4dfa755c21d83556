//! Log-linear interpolation.
//!
//! Interpolates the logarithm of values, which is useful for discount factors
//! as it ensures positive values and produces piecewise constant forward rates.

use crate::error::{MathError, MathResult};
use crate::interpolation::{check_range, find_segment, validate_nodes, Interpolator};

/// Log-linear interpolation between data points.
///
/// ```text
/// y(x) = exp(linear_interpolate(x, ln(y)))
/// ```
///
/// # Example
///
/// ```rust
/// use pillar_math::interpolation::{Interpolator, LogLinearInterpolator};
///
/// // Discount factors at different maturities
/// let times = vec![0.0, 1.0, 2.0, 3.0];
/// let discount_factors = vec![1.0, 0.97, 0.94, 0.91];
///
/// let interp = LogLinearInterpolator::new(times, discount_factors).unwrap();
/// let df = interp.interpolate(1.5).unwrap();
/// assert!(df > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct LogLinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Precomputed ln(y) values
    log_ys: Vec<f64>,
    allow_extrapolation: bool,
}

impl LogLinearInterpolator {
    /// Creates a new log-linear interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - There are fewer than 2 points
    /// - Lengths differ or `xs` is not strictly increasing
    /// - Any y value is non-positive
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;

        let mut log_ys = Vec::with_capacity(ys.len());
        for (i, &y) in ys.iter().enumerate() {
            if y <= 0.0 {
                return Err(MathError::invalid_input(format!(
                    "y[{i}] = {y} is not positive; log-linear requires positive values"
                )));
            }
            log_ys.push(y.ln());
        }

        Ok(Self {
            xs,
            ys,
            log_ys,
            allow_extrapolation: false,
        })
    }

    /// Enables extrapolation beyond the data range.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.allow_extrapolation = true;
        self
    }

    /// Returns the original y values.
    #[must_use]
    pub fn y_values(&self) -> &[f64] {
        &self.ys
    }

    /// Slope of ln(y) on segment `i`.
    fn log_slope(&self, i: usize) -> f64 {
        (self.log_ys[i + 1] - self.log_ys[i]) / (self.xs[i + 1] - self.xs[i])
    }

    /// Integral of the interpolant over `[xs[i], xs[i] + dx]`.
    fn segment_integral(&self, i: usize, dx: f64) -> f64 {
        let s = self.log_slope(i);
        let sdx = s * dx;
        if sdx.abs() < 1e-8 {
            // Series of (exp(s dx) - 1) / s
            self.ys[i] * dx * (1.0 + 0.5 * sdx)
        } else {
            self.ys[i] * sdx.exp_m1() / s
        }
    }
}

impl Interpolator for LogLinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        let i = find_segment(&self.xs, x);
        Ok((self.log_ys[i] + self.log_slope(i) * (x - self.xs[i])).exp())
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        // dy/dx = y(x) * d(ln y)/dx
        let y = self.interpolate(x)?;
        Ok(y * self.log_slope(find_segment(&self.xs, x)))
    }

    fn primitive(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        let i = find_segment(&self.xs, x);
        let whole: f64 = (0..i)
            .map(|j| self.segment_integral(j, self.xs[j + 1] - self.xs[j]))
            .sum();
        Ok(whole + self.segment_integral(i, x - self.xs[i]))
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
