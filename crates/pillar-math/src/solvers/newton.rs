//! Newton-Raphson variants using a numerical derivative.

use crate::error::MathError;
use crate::solvers::{is_negligible, Bracket, Evaluator, RootFinder, SolverConfig};

/// Newton-Raphson.
///
/// Uses a central-difference derivative. When a step leaves the bracket or
/// the slope vanishes it hands over to [`NewtonSafe`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Newton;

impl RootFinder for Newton {
    fn name(&self) -> &'static str {
        "Newton"
    }

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
        let mut root = guess;
        let mut f_root = eval.value(root)?;
        if is_negligible(f_root, config.accuracy) {
            return Ok((root, f_root));
        }
        let mut slope = eval.derivative(root)?;

        loop {
            if slope == 0.0 {
                return NewtonSafe.refine(eval, bracket, root, config);
            }
            let dx = f_root / slope;
            let next = root - dx;
            if (bracket.lower - next) * (next - bracket.upper) < 0.0 {
                return NewtonSafe.refine(eval, bracket, root, config);
            }

            root = next;
            f_root = eval.value(root)?;
            if dx.abs() < config.accuracy || is_negligible(f_root, config.accuracy) {
                return Ok((root, f_root));
            }
            slope = eval.derivative(root)?;
        }
    }
}

/// Safeguarded Newton-Raphson.
///
/// Takes a Newton step when it lands inside the bracket and shrinks the
/// bracket fast enough; bisects otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewtonSafe;

impl RootFinder for NewtonSafe {
    fn name(&self) -> &'static str {
        "NewtonSafe"
    }

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
        // Orient the search so that f(x_l) < 0
        let (mut x_l, mut x_h) = if bracket.f_lower < 0.0 {
            (bracket.lower, bracket.upper)
        } else {
            (bracket.upper, bracket.lower)
        };

        let mut root = guess;
        let mut f_root = eval.value(root)?;
        if is_negligible(f_root, config.accuracy) {
            return Ok((root, f_root));
        }
        let mut slope = eval.derivative(root)?;
        let mut dx_old = (bracket.upper - bracket.lower).abs();
        let mut dx = dx_old;

        loop {
            let out_of_range = ((root - x_h) * slope - f_root) * ((root - x_l) * slope - f_root) > 0.0;
            let too_slow = (2.0 * f_root).abs() > (dx_old * slope).abs();

            dx_old = dx;
            if out_of_range || too_slow {
                dx = 0.5 * (x_h - x_l);
                root = x_l + dx;
            } else {
                dx = f_root / slope;
                root -= dx;
            }

            f_root = eval.value(root)?;
            if dx.abs() < config.accuracy || is_negligible(f_root, config.accuracy) {
                return Ok((root, f_root));
            }
            slope = eval.derivative(root)?;
            if f_root < 0.0 {
                x_l = root;
            } else {
                x_h = root;
            }
        }
    }
}
