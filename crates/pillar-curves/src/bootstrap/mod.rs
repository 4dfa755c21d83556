//! Curve bootstrap algorithms.
//!
//! Both algorithms fit one curve node per rate helper so that every helper
//! reprices its market quote.
//!
//! - [`IterativeBootstrap`]: solves the nodes one at a time with a 1-D root
//!   finder, then repeats full passes while a global interpolation scheme
//!   keeps moving earlier nodes.
//! - [`SimultaneousBootstrap`]: fits the nodes of one or more curves jointly
//!   with Levenberg-Marquardt. Needed when curves depend on each other.
//!
//! Both validate the helper set the same way before any solving starts; see
//! [`BootstrapSetup::prepare`].

mod iterative;
mod simultaneous;

pub use iterative::IterativeBootstrap;
pub use simultaneous::{CurveInputs, SimultaneousBootstrap};

use serde::{Deserialize, Serialize};

use pillar_core::daycounts::DayCountConvention;
use pillar_core::Date;
use pillar_math::interpolation::InterpolationMethod;

use crate::config::BootstrapConfig;
use crate::error::{CurveError, CurveResult};
use crate::instruments::RateHelper;
use crate::multicurve::CurveId;
use crate::value_type::ValueType;

/// Static description of a curve to bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSpec {
    /// Identifier helpers attach to.
    pub id: CurveId,
    /// Date of the first node.
    pub reference_date: Date,
    /// Converts node dates to times.
    pub day_count: DayCountConvention,
    /// What the nodes store.
    pub value_type: ValueType,
    /// How values between nodes are filled in.
    pub interpolation: InterpolationMethod,
}

impl CurveSpec {
    /// A discount-factor curve with log-linear interpolation on ACT/365F.
    pub fn new(id: impl Into<CurveId>, reference_date: Date) -> Self {
        Self {
            id: id.into(),
            reference_date,
            day_count: DayCountConvention::Act365Fixed,
            value_type: ValueType::Discount,
            interpolation: InterpolationMethod::LogLinear,
        }
    }
}

/// Validated helpers of one curve, sorted by pillar.
pub(crate) struct BootstrapSetup<'h> {
    /// Helpers in pillar order; helper `k` fits node `k + 1`.
    pub helpers: Vec<&'h dyn RateHelper>,
    /// Quote snapshot, aligned with `helpers`.
    pub quotes: Vec<f64>,
    /// Node dates, reference date first.
    pub dates: Vec<Date>,
    /// Helpers that add residuals but no node, sorted by pillar.
    pub extra_helpers: Vec<&'h dyn RateHelper>,
    /// Quote snapshot, aligned with `extra_helpers`.
    pub extra_quotes: Vec<f64>,
}

impl<'h> BootstrapSetup<'h> {
    /// Checks the helper set and snapshots the quotes.
    ///
    /// Fails before any solving when the set is empty, a quote is missing, a
    /// helper is bound to another curve, a helper starts before the
    /// reference date, a pillar is not after the reference date, two
    /// helpers share a pillar, or the interpolation needs more nodes.
    pub fn prepare(
        spec: &CurveSpec,
        helpers: &'h [Box<dyn RateHelper>],
        config: &BootstrapConfig,
    ) -> CurveResult<Self> {
        let setup = Self::collect(spec, helpers, config)?;
        setup.check_points(spec)?;
        Ok(setup)
    }

    /// Like [`BootstrapSetup::prepare`], plus helpers that only contribute
    /// residuals and dates that only add nodes.
    ///
    /// Extra dates must lie after the reference date and must not coincide
    /// with a pillar. The fit needs at least as many residuals as unknown
    /// nodes.
    pub fn prepare_global(
        spec: &CurveSpec,
        helpers: &'h [Box<dyn RateHelper>],
        extra_helpers: &'h [Box<dyn RateHelper>],
        extra_dates: &[Date],
        config: &BootstrapConfig,
    ) -> CurveResult<Self> {
        let mut setup = Self::collect(spec, helpers, config)?;

        let mut extras = Vec::with_capacity(extra_helpers.len());
        for (k, helper) in extra_helpers.iter().enumerate() {
            let helper = helper.as_ref();
            if helper.binding() != Some(&spec.id) {
                return Err(CurveError::NotAttached {
                    instrument: helper.description(),
                });
            }
            if helper.earliest_date() < spec.reference_date {
                return Err(CurveError::InvalidHelperDates {
                    index: setup.len() + k + 1,
                    instrument: helper.description(),
                    reason: format!(
                        "starts {} before reference date {}",
                        helper.earliest_date(),
                        spec.reference_date
                    ),
                });
            }
            let quote = helper.quote_value()?;
            extras.push((helper.pillar_date(config.pillar), helper, quote));
        }
        extras.sort_by_key(|(pillar, _, _)| *pillar);
        (setup.extra_helpers, setup.extra_quotes) =
            extras.into_iter().map(|(_, h, q)| (h, q)).unzip();

        for date in extra_dates {
            if *date <= spec.reference_date {
                return Err(CurveError::invalid_config(format!(
                    "extra node date {date} is not after reference date {}",
                    spec.reference_date
                )));
            }
            if setup.dates.contains(date) {
                return Err(CurveError::invalid_config(format!(
                    "extra node date {date} duplicates a node of curve {}",
                    spec.id
                )));
            }
            setup.dates.push(*date);
        }
        setup.dates.sort();

        setup.check_points(spec)?;
        let residuals = setup.len() + setup.extra_helpers.len();
        if residuals < setup.unknowns() {
            return Err(CurveError::InsufficientHelpers {
                required: setup.unknowns(),
                got: residuals,
            });
        }
        Ok(setup)
    }

    fn collect(
        spec: &CurveSpec,
        helpers: &'h [Box<dyn RateHelper>],
        config: &BootstrapConfig,
    ) -> CurveResult<Self> {
        if helpers.is_empty() {
            return Err(CurveError::EmptyInstrumentSet {
                curve: spec.id.to_string(),
            });
        }

        let mut entries = Vec::with_capacity(helpers.len());
        for helper in helpers {
            let helper = helper.as_ref();
            if helper.binding() != Some(&spec.id) {
                return Err(CurveError::NotAttached {
                    instrument: helper.description(),
                });
            }
            let quote = helper.quote_value()?;
            entries.push((helper.pillar_date(config.pillar), helper, quote));
        }
        entries.sort_by_key(|(pillar, _, _)| *pillar);

        let mut dates = Vec::with_capacity(entries.len() + 1);
        dates.push(spec.reference_date);
        for (k, (pillar, helper, _)) in entries.iter().enumerate() {
            let index = k + 1;
            if helper.earliest_date() < spec.reference_date {
                return Err(CurveError::InvalidHelperDates {
                    index,
                    instrument: helper.description(),
                    reason: format!(
                        "starts {} before reference date {}",
                        helper.earliest_date(),
                        spec.reference_date
                    ),
                });
            }
            if *pillar <= spec.reference_date {
                return Err(CurveError::InvalidHelperDates {
                    index,
                    instrument: helper.description(),
                    reason: format!(
                        "pillar {pillar} is not after reference date {}",
                        spec.reference_date
                    ),
                });
            }
            if k > 0 && dates[k] == *pillar {
                return Err(CurveError::DuplicatePillar {
                    index,
                    date: *pillar,
                    instrument: helper.description(),
                });
            }
            dates.push(*pillar);
        }

        let (helpers, quotes) = entries.into_iter().map(|(_, h, q)| (h, q)).unzip();
        Ok(Self {
            helpers,
            quotes,
            dates,
            extra_helpers: Vec::new(),
            extra_quotes: Vec::new(),
        })
    }

    fn check_points(&self, spec: &CurveSpec) -> CurveResult<()> {
        let required = spec.interpolation.required_points();
        if self.dates.len() < required {
            return Err(CurveError::InsufficientHelpers {
                required: required - 1,
                got: self.unknowns(),
            });
        }
        Ok(())
    }

    /// Number of pillar helpers.
    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    /// Number of nodes after the reference node.
    pub fn unknowns(&self) -> usize {
        self.dates.len() - 1
    }

    /// Every helper with its quote, pillar helpers first.
    pub fn residual_helpers(&self) -> impl Iterator<Item = (&'h dyn RateHelper, f64)> + '_ {
        self.helpers
            .iter()
            .copied()
            .zip(self.quotes.iter().copied())
            .chain(
                self.extra_helpers
                    .iter()
                    .copied()
                    .zip(self.extra_quotes.iter().copied()),
            )
    }
}
