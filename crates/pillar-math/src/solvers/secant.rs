//! Secant method.

use crate::error::MathError;
use crate::solvers::{is_negligible, Bracket, Evaluator, RootFinder, SolverConfig};

/// Secant method.
///
/// Starts from the bracket end with the smaller residual but does not keep
/// the root bracketed afterwards. Steps that leave the configured domain are
/// clamped to it; a step pinned at a bound fails with
/// `MathError::ConvergenceFailed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Secant;

impl RootFinder for Secant {
    fn name(&self) -> &'static str {
        "Secant"
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
        let stalled = |eval: &Evaluator<'_, F>, residual: f64| {
            MathError::convergence_failed(
                u32::try_from(eval.evaluations()).unwrap_or(u32::MAX),
                residual,
            )
        };

        let (mut root, mut f_root, mut x_prev, mut f_prev) =
            if bracket.f_lower.abs() < bracket.f_upper.abs() {
                (bracket.lower, bracket.f_lower, bracket.upper, bracket.f_upper)
            } else {
                (bracket.upper, bracket.f_upper, bracket.lower, bracket.f_lower)
            };

        loop {
            if f_root == f_prev {
                return Err(stalled(eval, f_root).into());
            }
            let dx = (x_prev - root) * f_root / (f_root - f_prev);
            let target = root + dx;
            let next = config.clamp(target);
            if next != target && next == root {
                return Err(stalled(eval, f_root).into());
            }

            x_prev = root;
            f_prev = f_root;
            root = next;
            f_root = eval.value(root)?;

            if dx.abs() < config.accuracy || is_negligible(f_root, config.accuracy) {
                return Ok((root, f_root));
            }
        }
    }
}
