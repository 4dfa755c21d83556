//! Bisection method.

use crate::error::MathError;
use crate::solvers::{is_negligible, Bracket, Evaluator, RootFinder, SolverConfig};

/// Bisection.
///
/// Halves the bracket on every step. Slow, but it cannot fail once the
/// bracket is valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bisection;

impl RootFinder for Bisection {
    fn name(&self) -> &'static str {
        "Bisection"
    }

    fn refine<F, E>(
        &self,
        eval: &mut Evaluator<'_, F>,
        bracket: Bracket,
        _guess: f64,
        config: &SolverConfig,
    ) -> Result<(f64, f64), E>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: From<MathError>,
    {
        // Orient the search so that f(root) < 0 and f(root + dx) > 0
        let (mut root, mut f_root, mut dx) = if bracket.f_lower < 0.0 {
            (bracket.lower, bracket.f_lower, bracket.upper - bracket.lower)
        } else {
            (bracket.upper, bracket.f_upper, bracket.lower - bracket.upper)
        };

        loop {
            dx *= 0.5;
            let x_mid = root + dx;
            let f_mid = eval.value(x_mid)?;
            if f_mid <= 0.0 {
                root = x_mid;
                f_root = f_mid;
            }
            if is_negligible(f_mid, config.accuracy) {
                return Ok((x_mid, f_mid));
            }
            if dx.abs() < config.accuracy {
                return Ok((root, f_root));
            }
        }
    }
}
