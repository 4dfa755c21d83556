//! Joint least-squares bootstrap of one or more curves.

use nalgebra::DMatrix;
use tracing::{debug, warn};

use pillar_math::optimization::{levenberg_marquardt, numerical_jacobian, LeastSquaresProblem};

use pillar_core::Date;

use super::{BootstrapSetup, CurveSpec};
use crate::config::BootstrapConfig;
use crate::curves::{node_times, PiecewiseYieldCurve, TrialCurve};
use crate::error::{CurveError, CurveResult};
use crate::instruments::RateHelper;
use crate::multicurve::{CurveId, CurveLookup};
use crate::term_structure::TermStructure;

/// A curve to fit and the helpers attached to it.
///
/// Each helper in `helpers` puts a node at its pillar date. Helpers in
/// `extra_helpers` only add residuals, and `extra_dates` only add nodes, so
/// the fit may be overdetermined. Every residual carries the same weight.
#[derive(Clone, Copy)]
pub struct CurveInputs<'a> {
    /// The curve.
    pub spec: &'a CurveSpec,
    /// Helpers defining the pillars.
    pub helpers: &'a [Box<dyn RateHelper>],
    /// Helpers fitted without a pillar of their own.
    pub extra_helpers: &'a [Box<dyn RateHelper>],
    /// Node dates not tied to any helper.
    pub extra_dates: &'a [Date],
}

impl<'a> CurveInputs<'a> {
    /// A curve with one node per helper.
    #[must_use]
    pub fn new(spec: &'a CurveSpec, helpers: &'a [Box<dyn RateHelper>]) -> Self {
        Self {
            spec,
            helpers,
            extra_helpers: &[],
            extra_dates: &[],
        }
    }

    /// Adds helpers that are fitted but define no node.
    #[must_use]
    pub fn with_extra_helpers(mut self, helpers: &'a [Box<dyn RateHelper>]) -> Self {
        self.extra_helpers = helpers;
        self
    }

    /// Adds node dates that no helper defines.
    #[must_use]
    pub fn with_extra_dates(mut self, dates: &'a [Date]) -> Self {
        self.extra_dates = dates;
        self
    }
}

/// Fits every node of every given curve at once.
///
/// The unknowns are the node values after the reference node, mapped to
/// the strategy's parameter space (log discount factors for discount
/// curves). The residuals are implied minus quoted values of every helper,
/// each priced against the trial versions of all curves in the set. With
/// one node per helper the system is square; extra helpers make it
/// overdetermined. Either way it is driven to zero with Levenberg-Marquardt,
/// so an overdetermined set must be consistent to within the tolerance.
///
/// This handles curves that depend on each other, such as a forecasting
/// curve discounted on a curve that is itself fitted to instruments
/// projecting on the first.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimultaneousBootstrap {
    config: BootstrapConfig,
}

impl SimultaneousBootstrap {
    /// Creates a bootstrap with the given settings.
    #[must_use]
    pub fn new(config: BootstrapConfig) -> Self {
        Self { config }
    }

    /// Fits the curves, returned in input order.
    ///
    /// `external` serves linked curves outside the set.
    ///
    /// # Errors
    ///
    /// Configuration errors from validating each curve's helpers,
    /// evaluation errors raised while pricing, and
    /// `SimultaneousNotConverged` when some helper still misses its quote
    /// by more than the tolerance.
    pub fn bootstrap(
        &self,
        inputs: &[CurveInputs<'_>],
        external: &dyn CurveLookup,
    ) -> CurveResult<Vec<PiecewiseYieldCurve>> {
        self.config.validate()?;
        if inputs.is_empty() {
            return Err(CurveError::invalid_config("no curves to bootstrap"));
        }

        let mut blocks = Vec::with_capacity(inputs.len());
        let mut offset = 0;
        for (k, input) in inputs.iter().enumerate() {
            let spec = input.spec;
            if inputs[..k].iter().any(|other| other.spec.id == spec.id) {
                return Err(CurveError::invalid_config(format!(
                    "curve {} appears twice",
                    spec.id
                )));
            }
            let setup = BootstrapSetup::prepare_global(
                spec,
                input.helpers,
                input.extra_helpers,
                input.extra_dates,
                &self.config,
            )?;
            let times = node_times(spec.day_count, &setup.dates)?;
            let size = setup.unknowns();
            blocks.push(Block {
                spec,
                setup,
                times,
                offset,
            });
            offset += size;
        }

        let settings = self.config.simultaneous;
        if settings.parallel && !cfg!(feature = "parallel") {
            warn!("parallel evaluation requested without the `parallel` feature");
        }
        let problem = JointProblem {
            blocks,
            external,
            parallel: settings.parallel,
        };
        let initial = problem.initial_parameters();

        debug!(
            curves = problem.blocks.len(),
            unknowns = initial.len(),
            residuals = problem.residual_count(),
            parallel = problem.parallel,
            "simultaneous bootstrap started"
        );

        let result = levenberg_marquardt(&problem, &initial, &settings.optimizer_config())?;

        let (worst, error) = result
            .residuals
            .iter()
            .enumerate()
            .fold((0, 0.0_f64), |(k, m), (j, r)| {
                if r.abs() > m || r.is_nan() {
                    (j, r.abs())
                } else {
                    (k, m)
                }
            });
        if error.is_nan() || error > settings.tolerance {
            let instrument = problem
                .helper(worst)
                .map_or_else(String::new, |h| h.description());
            warn!(
                iterations = result.iterations,
                %instrument,
                error,
                termination = ?result.termination,
                "simultaneous bootstrap did not converge"
            );
            return Err(CurveError::SimultaneousNotConverged {
                iterations: result.iterations,
                instrument,
                error,
                tolerance: settings.tolerance,
            });
        }

        debug!(
            iterations = result.iterations,
            max_error = error,
            "simultaneous bootstrap finished"
        );

        problem
            .blocks
            .iter()
            .map(|block| {
                let curve = PiecewiseYieldCurve::from_nodes(
                    block.spec.day_count,
                    block.spec.value_type,
                    block.spec.interpolation,
                    block.setup.dates.clone(),
                    block.node_values(&result.parameters),
                )?;
                Ok(curve.with_extrapolation(self.config.allow_extrapolation))
            })
            .collect()
    }
}

/// One curve's slice of the joint parameter vector.
struct Block<'a> {
    spec: &'a CurveSpec,
    setup: BootstrapSetup<'a>,
    times: Vec<f64>,
    offset: usize,
}

impl Block<'_> {
    fn node_values(&self, parameters: &[f64]) -> Vec<f64> {
        let traits = self.spec.value_type.traits();
        let mut values = vec![traits.initial_value(); self.setup.unknowns() + 1];
        let own = &parameters[self.offset..self.offset + self.setup.unknowns()];
        for (k, p) in own.iter().enumerate() {
            traits.update_node(&mut values, k + 1, traits.from_parameter(*p));
        }
        values
    }

    fn trial_curve(&self, parameters: &[f64]) -> CurveResult<TrialCurve> {
        let mut trial = TrialCurve::new(
            self.spec.day_count,
            self.spec.value_type,
            self.spec.interpolation,
            self.setup.dates.clone(),
        )?;
        trial.set_values(&self.node_values(parameters))?;
        Ok(trial)
    }
}

struct JointProblem<'a> {
    blocks: Vec<Block<'a>>,
    external: &'a dyn CurveLookup,
    parallel: bool,
}

impl<'a> JointProblem<'a> {
    /// Flat-forward continuation from the reference node.
    fn initial_parameters(&self) -> Vec<f64> {
        let mut initial = Vec::new();
        for block in &self.blocks {
            let traits = block.spec.value_type.traits();
            let mut values = vec![traits.initial_value(); block.setup.unknowns() + 1];
            for i in 1..values.len() {
                let guess = traits.guess(i, &block.times, &values, None);
                traits.update_node(&mut values, i, guess);
            }
            initial.extend(values[1..].iter().map(|v| traits.to_parameter(*v)));
        }
        initial
    }

    fn helper(&self, index: usize) -> Option<&'a dyn RateHelper> {
        self.blocks
            .iter()
            .flat_map(|b| b.setup.residual_helpers().map(|(h, _)| h))
            .nth(index)
    }

    fn residual_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|b| b.setup.len() + b.setup.extra_helpers.len())
            .sum()
    }

    fn evaluate(
        &self,
        tasks: &[(&dyn RateHelper, f64)],
        curves: &JointCurves<'_>,
    ) -> CurveResult<Vec<f64>> {
        #[cfg(feature = "parallel")]
        {
            if self.parallel {
                use rayon::prelude::*;
                return tasks
                    .par_iter()
                    .map(|(helper, quote)| Ok(helper.implied_quote(curves)? - quote))
                    .collect();
            }
        }
        tasks
            .iter()
            .map(|(helper, quote)| Ok(helper.implied_quote(curves)? - quote))
            .collect()
    }
}

impl LeastSquaresProblem for JointProblem<'_> {
    type Error = CurveError;

    fn residuals(&self, x: &[f64]) -> CurveResult<Vec<f64>> {
        let curves = JointCurves {
            ids: self.blocks.iter().map(|b| &b.spec.id).collect(),
            curves: self
                .blocks
                .iter()
                .map(|b| b.trial_curve(x))
                .collect::<CurveResult<_>>()?,
            fallback: self.external,
        };
        let tasks: Vec<(&dyn RateHelper, f64)> = self
            .blocks
            .iter()
            .flat_map(|b| b.setup.residual_helpers())
            .collect();
        self.evaluate(&tasks, &curves)
    }

    fn jacobian(&self, x: &[f64], step: f64) -> CurveResult<DMatrix<f64>> {
        #[cfg(feature = "parallel")]
        {
            if self.parallel {
                use pillar_math::optimization::jacobian_column;
                use rayon::prelude::*;
                let columns = (0..x.len())
                    .into_par_iter()
                    .map(|j| jacobian_column(|p| self.residuals(p), x, j, step))
                    .collect::<CurveResult<Vec<_>>>()?;
                let rows = columns.first().map_or(0, Vec::len);
                return Ok(DMatrix::from_fn(rows, x.len(), |i, j| columns[j][i]));
            }
        }
        numerical_jacobian(|p| self.residuals(p), x, step)
    }
}

/// Trial curves of the set, with everything else served by a fallback.
struct JointCurves<'a> {
    ids: Vec<&'a CurveId>,
    curves: Vec<TrialCurve>,
    fallback: &'a dyn CurveLookup,
}

impl CurveLookup for JointCurves<'_> {
    fn curve(&self, id: &CurveId) -> CurveResult<&dyn TermStructure> {
        match self.ids.iter().position(|own| *own == id) {
            Some(k) => Ok(&self.curves[k]),
            None => self.fallback.curve(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::bootstrap::IterativeBootstrap;
    use crate::config::SimultaneousConfig;
    use crate::error::ErrorKind;
    use crate::instruments::test_support::{d, flat};
    use crate::instruments::{DepositHelper, FraHelper};
    use crate::multicurve::{CurveMap, Overlay};

    fn helpers() -> Vec<Box<dyn RateHelper>> {
        let mut out: Vec<Box<dyn RateHelper>> = Vec::new();
        let mut deposit = DepositHelper::new(0.030, d(2025, 1, 6), d(2025, 4, 7)).unwrap();
        deposit.attach(CurveId::new("main"));
        out.push(Box::new(deposit));
        for (start, end, rate) in [
            ((2025, 4, 7), (2025, 7, 7), 0.031),
            ((2025, 7, 7), (2025, 10, 6), 0.0315),
            ((2025, 10, 6), (2026, 1, 6), 0.032),
        ] {
            let mut fra = FraHelper::new(
                rate,
                d(start.0, start.1, start.2),
                d(end.0, end.1, end.2),
            )
            .unwrap();
            fra.attach(CurveId::new("main"));
            out.push(Box::new(fra));
        }
        out
    }

    #[test]
    fn test_matches_iterative() {
        let helpers = helpers();
        let spec = CurveSpec::new("main", d(2025, 1, 2));
        let joint = SimultaneousBootstrap::default()
            .bootstrap(&[CurveInputs::new(&spec, &helpers)], &CurveMap::new())
            .unwrap();
        let sequential = IterativeBootstrap::default()
            .bootstrap(&spec, &helpers, &CurveMap::new())
            .unwrap();

        assert_eq!(joint.len(), 1);
        for (a, b) in joint[0].values().iter().zip(sequential.values()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_iteration_budget() {
        let helpers = helpers();
        let spec = CurveSpec::new("main", d(2025, 1, 2));
        let config = BootstrapConfig::default().with_simultaneous(SimultaneousConfig {
            max_iterations: 1,
            ..SimultaneousConfig::default()
        });
        let err = SimultaneousBootstrap::new(config)
            .bootstrap(&[CurveInputs::new(&spec, &helpers)], &CurveMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            CurveError::SimultaneousNotConverged { .. }
        ));
    }

    #[test]
    fn test_duplicate_curve_ids() {
        let helpers = helpers();
        let spec = CurveSpec::new("main", d(2025, 1, 2));
        let err = SimultaneousBootstrap::default()
            .bootstrap(
                &[CurveInputs::new(&spec, &helpers), CurveInputs::new(&spec, &helpers)],
                &CurveMap::new(),
            )
            .unwrap_err();
        assert!(err.is_configuration());
    }

    /// Attaches `helper` to "main" and quotes it off a flat curve.
    fn quoted_flat(mut helper: impl RateHelper + 'static, rate: f64) -> Box<dyn RateHelper> {
        helper.attach(CurveId::new("main"));
        let (_, market) = flat(rate);
        let implied = helper.implied_quote(&market).unwrap();
        helper.quote().set_value(implied);
        Box::new(helper)
    }

    fn flat_deposits(rate: f64) -> Vec<Box<dyn RateHelper>> {
        [d(2025, 4, 7), d(2025, 7, 7), d(2026, 1, 6)]
            .into_iter()
            .map(|end| quoted_flat(DepositHelper::new(0.0, d(2025, 1, 6), end).unwrap(), rate))
            .collect()
    }

    fn flat_fras(rate: f64) -> Vec<Box<dyn RateHelper>> {
        [
            (d(2025, 4, 7), d(2025, 7, 7)),
            (d(2025, 7, 7), d(2026, 1, 6)),
            (d(2025, 4, 7), d(2026, 1, 6)),
        ]
        .into_iter()
        .map(|(start, end)| quoted_flat(FraHelper::new(0.0, start, end).unwrap(), rate))
        .collect()
    }

    fn assert_flat(curve: &PiecewiseYieldCurve, rate: f64) {
        for (t, df) in curve.times().iter().zip(curve.values()) {
            assert_relative_eq!(*df, (-rate * t).exp(), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_more_helpers_than_nodes() {
        let pillars = flat_deposits(0.03);
        let extra = flat_fras(0.03);
        let spec = CurveSpec::new("main", d(2025, 1, 2));
        let curves = SimultaneousBootstrap::default()
            .bootstrap(
                &[CurveInputs::new(&spec, &pillars).with_extra_helpers(&extra)],
                &CurveMap::new(),
            )
            .unwrap();

        let curve = &curves[0];
        assert_eq!(curve.dates().len(), pillars.len() + 1);
        assert_flat(curve, 0.03);

        let empty = CurveMap::new();
        let lookup = Overlay {
            id: &spec.id,
            curve,
            fallback: &empty,
        };
        for helper in pillars.iter().chain(&extra) {
            let implied = helper.implied_quote(&lookup).unwrap();
            assert_relative_eq!(implied, helper.quote().value(), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_extra_dates_add_nodes() {
        let pillars = flat_deposits(0.025);
        let extra = flat_fras(0.025);
        let dates = [d(2025, 10, 6)];
        let spec = CurveSpec::new("main", d(2025, 1, 2));
        let curves = SimultaneousBootstrap::default()
            .bootstrap(
                &[CurveInputs::new(&spec, &pillars)
                    .with_extra_helpers(&extra)
                    .with_extra_dates(&dates)],
                &CurveMap::new(),
            )
            .unwrap();

        let curve = &curves[0];
        assert_eq!(curve.dates().len(), 5);
        assert_eq!(curve.dates()[3], d(2025, 10, 6));
        assert_flat(curve, 0.025);
    }

    #[test]
    fn test_extra_dates_need_residuals() {
        let pillars = flat_deposits(0.03);
        let dates = [d(2025, 10, 6)];
        let spec = CurveSpec::new("main", d(2025, 1, 2));
        let err = SimultaneousBootstrap::default()
            .bootstrap(
                &[CurveInputs::new(&spec, &pillars).with_extra_dates(&dates)],
                &CurveMap::new(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CurveError::InsufficientHelpers { required: 4, got: 3 }
        ));

        let on_pillar = [d(2025, 7, 7)];
        let err = SimultaneousBootstrap::default()
            .bootstrap(
                &[CurveInputs::new(&spec, &pillars).with_extra_dates(&on_pillar)],
                &CurveMap::new(),
            )
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_inconsistent_extra_helper_fails() {
        let pillars = flat_deposits(0.03);
        let extra = flat_fras(0.03);
        let quote = extra[2].quote();
        quote.set_value(quote.value() + 1e-4);

        let spec = CurveSpec::new("main", d(2025, 1, 2));
        let err = SimultaneousBootstrap::default()
            .bootstrap(
                &[CurveInputs::new(&spec, &pillars).with_extra_helpers(&extra)],
                &CurveMap::new(),
            )
            .unwrap_err();
        assert!(matches!(err, CurveError::SimultaneousNotConverged { .. }));
        assert_eq!(err.kind(), ErrorKind::Numerical);
    }
}
