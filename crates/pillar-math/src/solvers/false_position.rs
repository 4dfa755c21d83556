//! Regula falsi with the Illinois modification.

use crate::error::MathError;
use crate::solvers::{is_negligible, Bracket, Evaluator, RootFinder, SolverConfig};

/// False position (Illinois variant).
///
/// Each step takes the secant through the bracket ends. When the same end is
/// retained twice in a row its function value is halved, which restores
/// superlinear convergence on convex objectives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FalsePosition;

impl RootFinder for FalsePosition {
    fn name(&self) -> &'static str {
        "FalsePosition"
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
        let (mut x_l, mut f_l, mut x_h, mut f_h) = if bracket.f_lower < 0.0 {
            (bracket.lower, bracket.f_lower, bracket.upper, bracket.f_upper)
        } else {
            (bracket.upper, bracket.f_upper, bracket.lower, bracket.f_lower)
        };
        // -1 when the low end moved last, +1 for the high end
        let mut side = 0_i8;

        loop {
            let root = x_l + (x_h - x_l) * f_l / (f_l - f_h);
            let f_root = eval.value(root)?;
            if is_negligible(f_root, config.accuracy) {
                return Ok((root, f_root));
            }

            let del = if f_root < 0.0 {
                let del = x_l - root;
                x_l = root;
                f_l = f_root;
                if side == -1 {
                    f_h *= 0.5;
                }
                side = -1;
                del
            } else {
                let del = x_h - root;
                x_h = root;
                f_h = f_root;
                if side == 1 {
                    f_l *= 0.5;
                }
                side = 1;
                del
            };

            if del.abs() < config.accuracy || (x_h - x_l).abs() < config.accuracy {
                return Ok((root, f_root));
            }
        }
    }
}
