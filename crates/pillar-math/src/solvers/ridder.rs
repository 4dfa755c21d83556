//! Ridder's method.

use crate::error::MathError;
use crate::solvers::{is_negligible, Bracket, Evaluator, RootFinder, SolverConfig};

/// Ridder's method.
///
/// Fits an exponential through the bracket ends and midpoint. Each step
/// costs two evaluations and keeps the root bracketed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ridder;

impl RootFinder for Ridder {
    fn name(&self) -> &'static str {
        "Ridder"
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
        let accuracy = config.accuracy;
        let (mut x_min, mut f_min) = (bracket.lower, bracket.f_lower);
        let (mut x_max, mut f_max) = (bracket.upper, bracket.f_upper);
        let mut last: Option<(f64, f64)> = None;

        loop {
            let x_mid = 0.5 * (x_min + x_max);
            let f_mid = eval.value(x_mid)?;
            if is_negligible(f_mid, accuracy) {
                return Ok((x_mid, f_mid));
            }

            let s = (f_mid * f_mid - f_min * f_max).sqrt();
            if s == 0.0 {
                return Ok((x_mid, f_mid));
            }
            let direction = if f_min >= f_max { 1.0 } else { -1.0 };
            let next = x_mid + (x_mid - x_min) * direction * f_mid / s;
            if let Some((root, f_root)) = last {
                if (next - root).abs() <= accuracy {
                    return Ok((root, f_root));
                }
            }

            let f_next = eval.value(next)?;
            last = Some((next, f_next));
            if is_negligible(f_next, accuracy) {
                return Ok((next, f_next));
            }

            if (f_mid < 0.0) != (f_next < 0.0) {
                x_min = x_mid;
                f_min = f_mid;
                x_max = next;
                f_max = f_next;
            } else if (f_min < 0.0) != (f_next < 0.0) {
                x_max = next;
                f_max = f_next;
            } else if (f_max < 0.0) != (f_next < 0.0) {
                x_min = next;
                f_min = f_next;
            } else {
                return Err(MathError::convergence_failed(
                    u32::try_from(eval.evaluations()).unwrap_or(u32::MAX),
                    f_next,
                )
                .into());
            }

            if (x_max - x_min).abs() <= accuracy {
                return Ok((next, f_next));
            }
        }
    }
}
