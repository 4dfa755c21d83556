//! One-dimensional root finding.
//!
//! Every solver shares one contract, expressed by [`RootFinder`]:
//!
//! - [`RootFinder::solve`] starts from a guess, grows a bracket by a
//!   geometric factor until the objective changes sign, then refines it.
//! - [`RootFinder::solve_bracketed`] takes a caller-supplied bracket whose
//!   ends must have opposite signs.
//!
//! Objectives are `FnMut(f64) -> Result<f64, E>`, so they may mutate the
//! state they evaluate (a trial curve node, say) and may fail. Any error type
//! that can absorb a [`MathError`] works.
//!
//! A point is accepted once the bracket is narrower than `accuracy` or the
//! objective itself is smaller than `accuracy` in magnitude. Exhausting the
//! evaluation budget is an error, never a silent best effort.
//!
//! # Choosing a Solver
//!
//! | Solver | Convergence | Needs a bracket | Notes |
//! |--------|-------------|-----------------|-------|
//! | [`Brent`] | Superlinear | Yes | Default; inverse quadratic with bisection fallback |
//! | [`Bisection`] | Linear | Yes | Slow but never fails on a valid bracket |
//! | [`FalsePosition`] | Superlinear | Yes | Illinois variant |
//! | [`Ridder`] | Quadratic | Yes | Two evaluations per step |
//! | [`Secant`] | Superlinear | Start only | Steps clamped to the domain bounds |
//! | [`Newton`] | Quadratic | Start only | Falls back to [`NewtonSafe`] when it leaves the bracket |
//! | [`NewtonSafe`] | Quadratic | Yes | Newton with bisection safeguard |
//!
//! Newton variants use a central-difference derivative, which costs two
//! extra evaluations per step.
//!
//! # Example
//!
//! ```rust
//! use pillar_math::error::MathError;
//! use pillar_math::solvers::{Brent, RootFinder, SolverConfig};
//!
//! let f = |x: f64| -> Result<f64, MathError> { Ok(x * x - 2.0) };
//! let result = Brent.solve(f, 1.0, 0.1, &SolverConfig::default()).unwrap();
//! assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-12);
//! ```

mod bisection;
mod brent;
mod false_position;
mod newton;
mod ridder;
mod secant;

pub use bisection::Bisection;
pub use brent::Brent;
pub use false_position::FalsePosition;
pub use newton::{Newton, NewtonSafe};
pub use ridder::Ridder;
pub use secant::Secant;

use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MathError, MathResult};

/// Default accuracy: ten machine epsilons.
pub const DEFAULT_ACCURACY: f64 = 10.0 * f64::EPSILON;

/// Default evaluation budget.
pub const DEFAULT_MAX_EVALUATIONS: usize = 100;

/// Factor by which a failed bracket grows on its weaker side.
pub const BRACKET_GROWTH_FACTOR: f64 = 1.6;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Convergence accuracy (on `x`, or on `|f(x)|`).
    pub accuracy: f64,
    /// Maximum number of objective evaluations, bracketing included.
    pub max_evaluations: usize,
    /// Optional lower end of the feasible domain.
    pub lower_bound: Option<f64>,
    /// Optional upper end of the feasible domain.
    pub upper_bound: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            accuracy: DEFAULT_ACCURACY,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            lower_bound: None,
            upper_bound: None,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration without domain bounds.
    #[must_use]
    pub fn new(accuracy: f64, max_evaluations: usize) -> Self {
        Self {
            accuracy,
            max_evaluations,
            ..Self::default()
        }
    }

    /// Sets the accuracy.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Sets the evaluation budget.
    #[must_use]
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Restricts candidates to `x >= lower`.
    #[must_use]
    pub fn with_lower_bound(mut self, lower: f64) -> Self {
        self.lower_bound = Some(lower);
        self
    }

    /// Restricts candidates to `x <= upper`.
    #[must_use]
    pub fn with_upper_bound(mut self, upper: f64) -> Self {
        self.upper_bound = Some(upper);
        self
    }

    /// Restricts candidates to `[lower, upper]`.
    #[must_use]
    pub fn with_bounds(self, lower: f64, upper: f64) -> Self {
        self.with_lower_bound(lower).with_upper_bound(upper)
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> MathResult<()> {
        if !(self.accuracy > 0.0 && self.accuracy.is_finite()) {
            return Err(MathError::invalid_input(format!(
                "accuracy must be positive and finite, got {}",
                self.accuracy
            )));
        }
        if self.max_evaluations < 2 {
            return Err(MathError::invalid_input(format!(
                "max_evaluations must be at least 2, got {}",
                self.max_evaluations
            )));
        }
        if self.lower() >= self.upper() {
            return Err(MathError::invalid_input(format!(
                "empty domain [{}, {}]",
                self.lower(),
                self.upper()
            )));
        }
        Ok(())
    }

    /// Lower domain bound, `-inf` when unset.
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower_bound.unwrap_or(f64::NEG_INFINITY)
    }

    /// Upper domain bound, `+inf` when unset.
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper_bound.unwrap_or(f64::INFINITY)
    }

    /// Moves `x` back inside the domain.
    #[must_use]
    pub fn clamp(&self, x: f64) -> f64 {
        x.max(self.lower()).min(self.upper())
    }
}

/// Two points whose objective values have opposite signs (or a zero).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// Lower end.
    pub lower: f64,
    /// Upper end.
    pub upper: f64,
    /// Objective at `lower`.
    pub f_lower: f64,
    /// Objective at `upper`.
    pub f_upper: f64,
}

impl Bracket {
    /// True when the ends straddle zero.
    #[must_use]
    pub fn has_sign_change(&self) -> bool {
        self.f_lower * self.f_upper <= 0.0
    }

    /// Midpoint of the bracket.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }
}

/// Result of a root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Objective value at the root.
    pub residual: f64,
    /// Evaluations spent, bracketing included.
    pub evaluations: usize,
}

/// Relative step of the central-difference derivative.
const DERIVATIVE_STEP: f64 = 6.0e-6;

/// Budgeted access to an objective.
///
/// Every call counts against `max_evaluations`; non-finite values are
/// rejected so no algorithm has to reason about NaN.
pub struct Evaluator<'f, F> {
    f: &'f mut F,
    evaluations: usize,
    max_evaluations: usize,
}

impl<'f, F> Evaluator<'f, F> {
    /// Wraps an objective with an evaluation budget.
    pub fn new(f: &'f mut F, max_evaluations: usize) -> Self {
        Self {
            f,
            evaluations: 0,
            max_evaluations,
        }
    }

    /// Evaluations spent so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Evaluations left in the budget.
    pub fn remaining(&self) -> usize {
        self.max_evaluations.saturating_sub(self.evaluations)
    }

    /// Evaluates the objective at `x`.
    pub fn value<E>(&mut self, x: f64) -> Result<f64, E>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: From<MathError>,
    {
        if self.evaluations >= self.max_evaluations {
            return Err(MathError::MaxEvaluationsExceeded {
                max: self.max_evaluations,
            }
            .into());
        }
        self.evaluations += 1;
        let value = (self.f)(x)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(MathError::NonFiniteValue { x, value }.into())
        }
    }

    /// Central-difference slope of the objective at `x`.
    pub fn derivative<E>(&mut self, x: f64) -> Result<f64, E>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: From<MathError>,
    {
        let h = DERIVATIVE_STEP * x.abs().max(1.0);
        let up = self.value(x + h)?;
        let down = self.value(x - h)?;
        Ok((up - down) / (2.0 * h))
    }
}

/// True when `fx` is small enough to stop on.
#[inline]
pub(crate) fn is_negligible(fx: f64, accuracy: f64) -> bool {
    fx == 0.0 || fx.abs() < accuracy
}

/// Common contract of the 1-D solvers.
pub trait RootFinder {
    /// Returns the name of the solver.
    fn name(&self) -> &'static str;

    /// Refines a bracket known to contain a sign change.
    ///
    /// `guess` lies inside the bracket. Returns the root and the objective
    /// value there.
    fn refine<F, E>(
        &self,
        eval: &mut Evaluator<'_, F>,
        bracket: Bracket,
        guess: f64,
        config: &SolverConfig,
    ) -> Result<(f64, f64), E>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: From<MathError>;

    /// Finds a root starting from `guess`, growing a bracket from `step`.
    ///
    /// The guess and every bracket end are clamped to the configured domain.
    ///
    /// `config.accuracy` is a tolerance on `x` as well as on `f(x)`: the
    /// search stops once the bracket (or the last step) is narrower than it,
    /// or once `|f(x)|` falls below it, whichever comes first. On a steep
    /// objective the returned residual can therefore exceed the accuracy.
    ///
    /// # Errors
    ///
    /// - `MathError::RootNotBracketed` if no sign change is found within the
    ///   budget or inside the domain
    /// - `MathError::MaxEvaluationsExceeded` if refinement runs out of budget
    /// - any error raised by the objective
    fn solve<F, E>(
        &self,
        mut f: F,
        guess: f64,
        step: f64,
        config: &SolverConfig,
    ) -> Result<SolverResult, E>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: From<MathError>,
    {
        config.validate()?;
        if !(step > 0.0 && step.is_finite()) {
            return Err(MathError::invalid_input(format!("step must be positive, got {step}")).into());
        }

        let mut eval = Evaluator::new(&mut f, config.max_evaluations);
        let guess = config.clamp(guess);
        let f_guess = eval.value(guess)?;
        if is_negligible(f_guess, config.accuracy) {
            return Ok(SolverResult {
                root: guess,
                residual: f_guess,
                evaluations: eval.evaluations(),
            });
        }

        let bracket = expand_bracket(&mut eval, guess, f_guess, step, config)?;
        finish(self, &mut eval, bracket, bracket.midpoint(), config)
    }

    /// Finds a root inside a caller-supplied bracket.
    ///
    /// Stops on the same x-or-f(x) accuracy test as [`RootFinder::solve`].
    ///
    /// # Errors
    ///
    /// - `MathError::InvalidBracket` if `f(x_min)` and `f(x_max)` share a sign
    /// - `MathError::MaxEvaluationsExceeded` if refinement runs out of budget
    /// - any error raised by the objective
    fn solve_bracketed<F, E>(
        &self,
        mut f: F,
        guess: f64,
        x_min: f64,
        x_max: f64,
        config: &SolverConfig,
    ) -> Result<SolverResult, E>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: From<MathError>,
    {
        config.validate()?;
        let (lower, upper) = (config.clamp(x_min), config.clamp(x_max));
        if !(lower < upper) {
            return Err(MathError::invalid_input(format!(
                "bracket [{x_min}, {x_max}] is empty inside the domain"
            ))
            .into());
        }

        let mut eval = Evaluator::new(&mut f, config.max_evaluations);
        let f_lower = eval.value(lower)?;
        let f_upper = eval.value(upper)?;
        let bracket = Bracket {
            lower,
            upper,
            f_lower,
            f_upper,
        };
        if !bracket.has_sign_change() {
            return Err(MathError::InvalidBracket {
                a: lower,
                b: upper,
                fa: f_lower,
                fb: f_upper,
            }
            .into());
        }

        let guess = if guess > lower && guess < upper {
            guess
        } else {
            bracket.midpoint()
        };
        finish(self, &mut eval, bracket, guess, config)
    }
}

fn finish<S, F, E>(
    solver: &S,
    eval: &mut Evaluator<'_, F>,
    bracket: Bracket,
    guess: f64,
    config: &SolverConfig,
) -> Result<SolverResult, E>
where
    S: RootFinder + ?Sized,
    F: FnMut(f64) -> Result<f64, E>,
    E: From<MathError>,
{
    if is_negligible(bracket.f_lower, config.accuracy) {
        return Ok(SolverResult {
            root: bracket.lower,
            residual: bracket.f_lower,
            evaluations: eval.evaluations(),
        });
    }
    if is_negligible(bracket.f_upper, config.accuracy) {
        return Ok(SolverResult {
            root: bracket.upper,
            residual: bracket.f_upper,
            evaluations: eval.evaluations(),
        });
    }

    let (root, residual) = solver.refine(eval, bracket, guess, config)?;
    trace!(
        "{}: root {root:.15e} residual {residual:.3e} after {} evaluations",
        solver.name(),
        eval.evaluations()
    );
    Ok(SolverResult {
        root,
        residual,
        evaluations: eval.evaluations(),
    })
}

/// Grows `[guess - step, guess]` or `[guess, guess + step]` until the
/// objective changes sign, always moving the end with the smaller `|f|`.
fn expand_bracket<F, E>(
    eval: &mut Evaluator<'_, F>,
    guess: f64,
    f_guess: f64,
    step: f64,
    config: &SolverConfig,
) -> Result<Bracket, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<MathError>,
{
    let (lo, hi) = (config.lower(), config.upper());

    let downhill = (guess - step).max(lo);
    let uphill = (guess + step).min(hi);
    let mut bracket = if (f_guess > 0.0 && downhill < guess) || uphill <= guess {
        Bracket {
            lower: downhill,
            upper: guess,
            f_lower: eval.value(downhill)?,
            f_upper: f_guess,
        }
    } else {
        Bracket {
            lower: guess,
            upper: uphill,
            f_lower: f_guess,
            f_upper: eval.value(uphill)?,
        }
    };

    loop {
        if bracket.has_sign_change() {
            return Ok(bracket);
        }

        let lower_pinned = bracket.lower <= lo;
        let upper_pinned = bracket.upper >= hi;
        if (lower_pinned && upper_pinned) || eval.remaining() == 0 {
            return Err(MathError::RootNotBracketed {
                evaluations: eval.evaluations(),
                lower: bracket.lower,
                upper: bracket.upper,
                f_lower: bracket.f_lower,
                f_upper: bracket.f_upper,
            }
            .into());
        }

        let grow_lower = if lower_pinned {
            false
        } else if upper_pinned {
            true
        } else {
            bracket.f_lower.abs() < bracket.f_upper.abs()
        };

        let width = bracket.upper - bracket.lower;
        if grow_lower {
            bracket.lower = (bracket.lower - BRACKET_GROWTH_FACTOR * width).max(lo);
            bracket.f_lower = eval.value(bracket.lower)?;
        } else {
            bracket.upper = (bracket.upper + BRACKET_GROWTH_FACTOR * width).min(hi);
            bracket.f_upper = eval.value(bracket.upper)?;
        }
        trace!(
            "bracket [{:.6e}, {:.6e}] f = [{:.3e}, {:.3e}]",
            bracket.lower,
            bracket.upper,
            bracket.f_lower,
            bracket.f_upper
        );
    }
}

/// Runtime-selectable solver.
///
/// # Example
///
/// ```rust
/// use pillar_math::error::MathError;
/// use pillar_math::solvers::{SolverConfig, SolverKind};
///
/// let f = |x: f64| -> Result<f64, MathError> { Ok(x.exp() - 2.0) };
/// for kind in SolverKind::ALL {
///     let r = kind.solve(f, 0.5, 0.1, &SolverConfig::default()).unwrap();
///     assert!((r.root - 2f64.ln()).abs() < 1e-10);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SolverKind {
    /// [`Brent`]
    #[default]
    Brent,
    /// [`Bisection`]
    Bisection,
    /// [`FalsePosition`]
    FalsePosition,
    /// [`Ridder`]
    Ridder,
    /// [`Secant`]
    Secant,
    /// [`Newton`]
    Newton,
    /// [`NewtonSafe`]
    NewtonSafe,
}

impl SolverKind {
    /// Every solver, in declaration order.
    pub const ALL: [SolverKind; 7] = [
        SolverKind::Brent,
        SolverKind::Bisection,
        SolverKind::FalsePosition,
        SolverKind::Ridder,
        SolverKind::Secant,
        SolverKind::Newton,
        SolverKind::NewtonSafe,
    ];

    /// See [`RootFinder::solve`].
    pub fn solve<F, E>(
        &self,
        f: F,
        guess: f64,
        step: f64,
        config: &SolverConfig,
    ) -> Result<SolverResult, E>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: From<MathError>,
    {
        match self {
            SolverKind::Brent => Brent.solve(f, guess, step, config),
            SolverKind::Bisection => Bisection.solve(f, guess, step, config),
            SolverKind::FalsePosition => FalsePosition.solve(f, guess, step, config),
            SolverKind::Ridder => Ridder.solve(f, guess, step, config),
            SolverKind::Secant => Secant.solve(f, guess, step, config),
            SolverKind::Newton => Newton.solve(f, guess, step, config),
            SolverKind::NewtonSafe => NewtonSafe.solve(f, guess, step, config),
        }
    }

    /// See [`RootFinder::solve_bracketed`].
    pub fn solve_bracketed<F, E>(
        &self,
        f: F,
        guess: f64,
        x_min: f64,
        x_max: f64,
        config: &SolverConfig,
    ) -> Result<SolverResult, E>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: From<MathError>,
    {
        match self {
            SolverKind::Brent => Brent.solve_bracketed(f, guess, x_min, x_max, config),
            SolverKind::Bisection => Bisection.solve_bracketed(f, guess, x_min, x_max, config),
            SolverKind::FalsePosition => {
                FalsePosition.solve_bracketed(f, guess, x_min, x_max, config)
            }
            SolverKind::Ridder => Ridder.solve_bracketed(f, guess, x_min, x_max, config),
            SolverKind::Secant => Secant.solve_bracketed(f, guess, x_min, x_max, config),
            SolverKind::Newton => Newton.solve_bracketed(f, guess, x_min, x_max, config),
            SolverKind::NewtonSafe => NewtonSafe.solve_bracketed(f, guess, x_min, x_max, config),
        }
    }

    /// Returns the name of the solver.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SolverKind::Brent => Brent.name(),
            SolverKind::Bisection => Bisection.name(),
            SolverKind::FalsePosition => FalsePosition.name(),
            SolverKind::Ridder => Ridder.name(),
            SolverKind::Secant => Secant.name(),
            SolverKind::Newton => Newton.name(),
            SolverKind::NewtonSafe => NewtonSafe.name(),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
