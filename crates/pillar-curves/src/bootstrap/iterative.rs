//! Node-by-node bootstrap with fixed-point refinement.

use tracing::{debug, trace, warn};

use pillar_math::interpolation::InterpolationMethod;
use pillar_math::MathError;

use super::{BootstrapSetup, CurveSpec};
use crate::config::BootstrapConfig;
use crate::curves::{PiecewiseYieldCurve, TrialCurve};
use crate::error::{CurveError, CurveResult};
use crate::instruments::RateHelper;
use crate::multicurve::{CurveId, CurveLookup, Overlay};

/// Sequential bootstrap of a single curve.
///
/// The first pass walks the pillars in order. Node `i` is solved with a
/// bracketing root finder so that helper `i` reprices its quote, with the
/// curve ending at node `i` and flat-forward beyond it. A local
/// interpolation is then final: adding later nodes cannot move earlier
/// segments.
///
/// A global interpolation (cubic spline) couples every segment, so the
/// first pass runs on linear interpolation and further passes re-solve each
/// node on the full spline, starting from the previous values, until no
/// node moves by more than the refinement tolerance.
///
/// # Example
///
/// ```rust
/// use pillar_core::Date;
/// use pillar_curves::bootstrap::{CurveSpec, IterativeBootstrap};
/// use pillar_curves::config::BootstrapConfig;
/// use pillar_curves::instruments::{DepositHelper, RateHelper};
/// use pillar_curves::multicurve::{CurveId, CurveMap};
/// use pillar_curves::term_structure::TermStructure;
///
/// let reference = Date::from_ymd(2025, 1, 2).unwrap();
/// let spec = CurveSpec::new("eur", reference);
/// let mut deposit = DepositHelper::new(0.03, reference, Date::from_ymd(2025, 7, 2).unwrap()).unwrap();
/// deposit.attach(CurveId::new("eur"));
/// let helpers: Vec<Box<dyn RateHelper>> = vec![Box::new(deposit)];
///
/// let curve = IterativeBootstrap::new(BootstrapConfig::default())
///     .bootstrap(&spec, &helpers, &CurveMap::new())
///     .unwrap();
/// assert_eq!(curve.dates().len(), 2);
/// assert!(curve.discount(0.25).unwrap() < 1.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IterativeBootstrap {
    config: BootstrapConfig,
}

impl IterativeBootstrap {
    /// Creates a bootstrap with the given settings.
    #[must_use]
    pub fn new(config: BootstrapConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    #[must_use]
    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Builds the curve described by `spec` from `helpers`.
    ///
    /// `curves` serves every curve the helpers link to other than the one
    /// being built.
    ///
    /// # Errors
    ///
    /// Configuration errors from validation, `SolverFailure` or
    /// `DomainViolation` when a node cannot be solved, and
    /// `RefinementNotConverged` when the refinement passes run out.
    pub fn bootstrap(
        &self,
        spec: &CurveSpec,
        helpers: &[Box<dyn RateHelper>],
        curves: &dyn CurveLookup,
    ) -> CurveResult<PiecewiseYieldCurve> {
        self.config.validate()?;
        let setup = BootstrapSetup::prepare(spec, helpers, &self.config)?;
        let method = spec.interpolation;
        let global = method.is_global();

        debug!(
            curve = %spec.id,
            nodes = setup.len(),
            interpolation = %method,
            value_type = %spec.value_type,
            "bootstrap started"
        );

        let first_pass = if global {
            InterpolationMethod::Linear
        } else {
            method
        };
        let mut trial = TrialCurve::new(
            spec.day_count,
            spec.value_type,
            first_pass,
            setup.dates.clone(),
        )?;

        let traits = trial.traits();
        for i in 1..=setup.len() {
            trial.set_active(i + 1)?;
            let helper = setup.helpers[i - 1];
            let quote = setup.quotes[i - 1];

            let extended = traits.guess(i, trial.times(), trial.values(), None);
            trial.set_node(i, extended)?;
            let hint = {
                let lookup = Overlay {
                    id: &spec.id,
                    curve: &trial,
                    fallback: curves,
                };
                helper.implied_discount_guess(&lookup, quote)
            };
            let guess = traits.guess(i, trial.times(), trial.values(), hint);

            self.solve_node(&spec.id, &mut trial, i, helper, quote, curves, guess)?;
        }

        if global {
            trial.set_method(method)?;
            if self.config.refine_global {
                let passes = self.refine(&spec.id, &mut trial, &setup, curves)?;
                debug!(curve = %spec.id, passes, "refinement converged");
            } else {
                debug!(curve = %spec.id, "refinement skipped");
            }
        }

        debug!(curve = %spec.id, "bootstrap finished");
        trial.into_curve(method, self.config.allow_extrapolation)
    }

    fn refine(
        &self,
        id: &CurveId,
        trial: &mut TrialCurve,
        setup: &BootstrapSetup<'_>,
        curves: &dyn CurveLookup,
    ) -> CurveResult<usize> {
        let max_iterations = self.config.max_refinement_iterations;
        let mut max_change = f64::INFINITY;

        for iteration in 1..=max_iterations {
            let previous = trial.values().to_vec();
            for i in 1..=setup.len() {
                let guess = trial.values()[i];
                self.solve_node(
                    id,
                    trial,
                    i,
                    setup.helpers[i - 1],
                    setup.quotes[i - 1],
                    curves,
                    guess,
                )?;
            }

            max_change = trial
                .values()
                .iter()
                .zip(&previous)
                .skip(1)
                .fold(0.0_f64, |m, (v, p)| m.max((v - p).abs()));
            trace!(curve = %id, iteration, max_change, "refinement pass");

            if max_change < self.config.refinement_tolerance {
                return Ok(iteration);
            }
        }

        warn!(
            curve = %id,
            iterations = max_iterations,
            max_change,
            "refinement did not converge"
        );
        Err(CurveError::RefinementNotConverged {
            iterations: max_iterations,
            max_change,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn solve_node(
        &self,
        id: &CurveId,
        trial: &mut TrialCurve,
        i: usize,
        helper: &dyn RateHelper,
        quote: f64,
        curves: &dyn CurveLookup,
        guess: f64,
    ) -> CurveResult<()> {
        let traits = trial.traits();
        let lower = traits.min_value_after(i, trial.times(), trial.values());
        let upper = traits.max_value_after(i, trial.times(), trial.values());
        let solver_config = self.config.solver_config().with_bounds(lower, upper);
        let guess = solver_config.clamp(guess);
        let step = traits.root_finder_step();

        let outcome = self.config.solver.solve(
            |x| -> CurveResult<f64> {
                trial.set_node(i, x)?;
                let lookup = Overlay {
                    id,
                    curve: &*trial,
                    fallback: curves,
                };
                Ok(helper.implied_quote(&lookup)? - quote)
            },
            guess,
            step,
            &solver_config,
        );

        match outcome {
            Ok(result) => {
                trial.set_node(i, result.root)?;
                trace!(
                    curve = %id,
                    node = i,
                    value = result.root,
                    evaluations = result.evaluations,
                    "node solved"
                );
                Ok(())
            }
            Err(CurveError::Math(MathError::RootNotBracketed {
                lower: lo,
                upper: hi,
                ..
            })) if lo <= lower && hi >= upper => Err(CurveError::DomainViolation {
                index: i,
                instrument: helper.description(),
                lower,
                upper,
            }),
            Err(CurveError::Math(source)) => Err(CurveError::SolverFailure {
                index: i,
                instrument: helper.description(),
                source,
            }),
            Err(other) => Err(other),
        }
    }
}
