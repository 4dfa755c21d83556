//! Bootstrapping a set of curves that read each other.
//!
//! A [`CurveSet`] holds one [`PiecewiseCurveBuilder`] per curve. Helpers
//! link to other curves of the set through
//! [`CurveSource::Linked`](super::CurveSource), for instance a EURIBOR 6M
//! swap discounted on the ESTR curve. Those links form a dependency graph:
//!
//! - Without cycles, the curves are bootstrapped one at a time in
//!   dependency order, each with every curve it reads already built.
//! - With a cycle, or when forced, every curve is fitted jointly with the
//!   [`SimultaneousBootstrap`].

use std::sync::Arc;

use tracing::debug;

use crate::bootstrap::{CurveInputs, SimultaneousBootstrap};
use crate::builder::PiecewiseCurveBuilder;
use crate::config::BootstrapConfig;
use crate::error::{CurveError, CurveResult};

use super::{CurveId, CurveMap};

/// Curves to bootstrap together.
///
/// # Example
///
/// ```rust
/// use pillar_core::Date;
/// use pillar_curves::builder::PiecewiseCurveBuilder;
/// use pillar_curves::conventions::eur;
/// use pillar_curves::multicurve::{CurveId, CurveSet, CurveSource};
///
/// let trade = Date::from_ymd(2025, 1, 2).unwrap();
/// let estr = PiecewiseCurveBuilder::new(trade)
///     .with_id("ESTR")
///     .with_helper(eur::estr_ois("1Y", 0.0280, trade).unwrap())
///     .with_helper(eur::estr_ois("2Y", 0.0265, trade).unwrap());
/// let euribor = PiecewiseCurveBuilder::new(trade)
///     .with_id("EURIBOR6M")
///     .with_helper(eur::deposit("6M", 0.0300, trade).unwrap())
///     .with_helper(
///         eur::euribor_6m_swap("2Y", 0.0285, trade)
///             .unwrap()
///             .with_discount_curve(CurveSource::Linked(CurveId::new("ESTR"))),
///     );
///
/// let mut set = CurveSet::new();
/// set.add(euribor).unwrap();
/// set.add(estr).unwrap();
/// let order = set.order().unwrap().unwrap();
/// assert_eq!(order, vec![CurveId::new("ESTR"), CurveId::new("EURIBOR6M")]);
///
/// let curves = set.bootstrap().unwrap();
/// assert_eq!(curves.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct CurveSet {
    builders: Vec<PiecewiseCurveBuilder>,
    config: BootstrapConfig,
    force_simultaneous: bool,
}

impl CurveSet {
    /// Creates an empty set with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration of the joint fit.
    ///
    /// Sequential builds use each builder's own configuration. The joint
    /// fit uses this one for every curve and ignores the builders'.
    #[must_use]
    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    /// Fits every curve jointly even without cycles.
    #[must_use]
    pub fn force_simultaneous(mut self, force: bool) -> Self {
        self.force_simultaneous = force;
        self
    }

    /// Adds a curve.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when a curve with the same id is already present.
    pub fn add(&mut self, builder: PiecewiseCurveBuilder) -> CurveResult<()> {
        if self.builders.iter().any(|b| b.id() == builder.id()) {
            return Err(CurveError::invalid_config(format!(
                "curve {} is already in the set",
                builder.id()
            )));
        }
        self.builders.push(builder);
        Ok(())
    }

    /// Adds a curve, builder style.
    pub fn with_curve(mut self, builder: PiecewiseCurveBuilder) -> CurveResult<Self> {
        self.add(builder)?;
        Ok(self)
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &CurveId> {
        self.builders.iter().map(PiecewiseCurveBuilder::id)
    }

    /// Number of curves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    /// True for a set without curves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Builder of the curve `id`.
    #[must_use]
    pub fn get(&self, id: &CurveId) -> Option<&PiecewiseCurveBuilder> {
        self.builders.iter().find(|b| b.id() == id)
    }

    /// Dependency order of the curves, or `None` when links form a cycle.
    ///
    /// Curves that do not depend on each other keep their insertion order.
    ///
    /// # Errors
    ///
    /// `CurveNotFound` when a helper links to a curve outside the set.
    pub fn order(&self) -> CurveResult<Option<Vec<CurveId>>> {
        Ok(self
            .order_indices()?
            .map(|order| order.into_iter().map(|k| self.builders[k].id().clone()).collect()))
    }

    fn order_indices(&self) -> CurveResult<Option<Vec<usize>>> {
        let n = self.builders.len();
        let mut dependencies = Vec::with_capacity(n);
        for builder in &self.builders {
            let mut own = Vec::new();
            for id in builder.dependencies() {
                let k = self
                    .builders
                    .iter()
                    .position(|b| *b.id() == id)
                    .ok_or_else(|| CurveError::curve_not_found(id.as_str()))?;
                own.push(k);
            }
            dependencies.push(own);
        }

        // Kahn's algorithm, lowest index first
        let mut done = vec![false; n];
        let mut order = Vec::with_capacity(n);
        while order.len() < n {
            let next = (0..n).find(|&k| !done[k] && dependencies[k].iter().all(|&j| done[j]));
            match next {
                Some(k) => {
                    done[k] = true;
                    order.push(k);
                }
                None => return Ok(None),
            }
        }
        Ok(Some(order))
    }

    /// Bootstraps every curve.
    ///
    /// The joint fit runs with the set's own configuration (see
    /// [`CurveSet::with_config`]). Each builder's [`BootstrapConfig`] is
    /// ignored on that path, `allow_extrapolation` and `pillar` included;
    /// only its curve spec, helpers, extra helpers and extra dates are read.
    ///
    /// # Errors
    ///
    /// The first error of any curve's bootstrap, or `CurveNotFound` for a
    /// link outside the set.
    pub fn bootstrap(&self) -> CurveResult<CurveMap> {
        if self.builders.is_empty() {
            return Err(CurveError::invalid_config("curve set is empty"));
        }
        let order = self.order_indices()?;

        match order {
            Some(order) if !self.force_simultaneous => {
                debug!(curves = order.len(), "sequential curve set bootstrap");
                let mut built = CurveMap::new();
                for k in order {
                    let builder = &self.builders[k];
                    let curve = builder.bootstrap_with(&built)?;
                    built.insert(builder.id().clone(), Arc::new(curve));
                }
                Ok(built)
            }
            order => {
                debug!(
                    curves = self.builders.len(),
                    cyclic = order.is_none(),
                    "simultaneous curve set bootstrap"
                );
                let inputs: Vec<CurveInputs<'_>> =
                    self.builders.iter().map(PiecewiseCurveBuilder::inputs).collect();
                let curves =
                    SimultaneousBootstrap::new(self.config).bootstrap(&inputs, &CurveMap::new())?;
                Ok(self
                    .builders
                    .iter()
                    .zip(curves)
                    .map(|(b, c)| (b.id().clone(), Arc::new(c)))
                    .collect())
            }
        }
    }
}
