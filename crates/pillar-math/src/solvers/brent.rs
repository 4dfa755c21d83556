//! Brent's root-finding algorithm.

use crate::error::MathError;
use crate::solvers::{is_negligible, Bracket, Evaluator, RootFinder, SolverConfig};

/// Brent's method.
///
/// Combines the reliability of bisection with the speed of the secant method
/// and inverse quadratic interpolation. This is generally the best choice
/// when a derivative is not available.
///
/// # Example
///
/// ```rust
/// use pillar_math::error::MathError;
/// use pillar_math::solvers::{Brent, RootFinder, SolverConfig};
///
/// // Find root of x^3 - x - 2
/// let f = |x: f64| x * x * x - x - 2.0;
///
/// let result = Brent
///     .solve_bracketed(|x| Ok::<_, MathError>(f(x)), 1.5, 1.0, 2.0, &SolverConfig::default())
///     .unwrap();
/// assert!(f(result.root).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Brent;

impl RootFinder for Brent {
    fn name(&self) -> &'static str {
        "Brent"
    }

    #[allow(clippy::many_single_char_names)]
    fn refine<F, E>(
        &self,
        eval: &mut Evaluator<'_, F>,
        bracket: Bracket,
        guess: f64,
        config: &SolverConfig,
    ) -> Result<(f64, f64), E>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: From<MathError>,
    {
        let accuracy = config.accuracy;
        let (mut x_min, mut f_min) = (bracket.lower, bracket.f_lower);
        let (mut x_max, mut f_max) = (bracket.upper, bracket.f_upper);

        let mut root = guess;
        let mut f_root = eval.value(root)?;
        if is_negligible(f_root, accuracy) {
            return Ok((root, f_root));
        }

        // Keep the root on one side and both other points on the other
        if f_root * f_min < 0.0 {
            x_max = x_min;
            f_max = f_min;
        } else {
            x_min = x_max;
            f_min = f_max;
        }
        let mut d = root - x_max;
        let mut e = d;

        loop {
            if (f_root > 0.0 && f_max > 0.0) || (f_root < 0.0 && f_max < 0.0) {
                x_max = x_min;
                f_max = f_min;
                d = root - x_min;
                e = d;
            }
            if f_max.abs() < f_root.abs() {
                x_min = root;
                root = x_max;
                x_max = x_min;
                f_min = f_root;
                f_root = f_max;
                f_max = f_min;
            }

            let tol = 2.0 * f64::EPSILON * root.abs() + 0.5 * accuracy;
            let x_mid = 0.5 * (x_max - root);
            if x_mid.abs() <= tol || is_negligible(f_root, accuracy) {
                return Ok((root, f_root));
            }

            if e.abs() >= tol && f_min.abs() > f_root.abs() {
                let s = f_root / f_min;
                let (p, q) = if x_min == x_max {
                    // Secant step
                    (2.0 * x_mid * s, 1.0 - s)
                } else {
                    // Inverse quadratic interpolation
                    let q = f_min / f_max;
                    let r = f_root / f_max;
                    (
                        s * (2.0 * x_mid * q * (q - r) - (root - x_min) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                let q = if p > 0.0 { -q } else { q };
                let p = p.abs();
                let min1 = 3.0 * x_mid * q - (tol * q).abs();
                let min2 = (e * q).abs();
                if 2.0 * p < min1.min(min2) {
                    e = d;
                    d = p / q;
                } else {
                    d = x_mid;
                    e = d;
                }
            } else {
                d = x_mid;
                e = d;
            }

            x_min = root;
            f_min = f_root;
            root += if d.abs() > tol { d } else { tol.copysign(x_mid) };
            f_root = eval.value(root)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MathResult;
    use crate::solvers::{Bisection, SolverConfig};
    use approx::assert_relative_eq;

    fn solve(f: impl Fn(f64) -> f64, a: f64, b: f64) -> MathResult<crate::solvers::SolverResult> {
        Brent.solve_bracketed(|x| Ok(f(x)), 0.5 * (a + b), a, b, &SolverConfig::default())
    }

    #[test]
    fn test_sqrt_2() {
        let result = solve(|x| x * x - 2.0, 1.0, 2.0).unwrap();
        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-14);
    }

    #[test]
    fn test_cubic() {
        // x^3 - x - 2 has a root near 1.52
        let f = |x: f64| x * x * x - x - 2.0;
        let result = solve(f, 1.0, 2.0).unwrap();

        assert!(f(result.root).abs() < 1e-12);
        assert_relative_eq!(result.root, 1.521_379_706_804_568, epsilon = 1e-12);
    }

    #[test]
    fn test_sin() {
        let result = solve(f64::sin, 3.0, 4.0).unwrap();
        assert_relative_eq!(result.root, std::f64::consts::PI, epsilon = 1e-14);
    }

    #[test]
    fn test_invalid_bracket() {
        assert!(solve(|x| x * x - 2.0, 2.0, 3.0).is_err());
    }

    #[test]
    fn test_faster_than_bisection() {
        let f = |x: f64| x * x - 2.0;
        let config = SolverConfig::default();

        let brent = solve(f, 1.0, 2.0).unwrap();
        let bisection = Bisection
            .solve_bracketed(|x| Ok::<_, MathError>(f(x)), 1.5, 1.0, 2.0, &config)
            .unwrap();

        assert!(brent.evaluations < 15);
        assert!(brent.evaluations < bisection.evaluations);
    }
}
