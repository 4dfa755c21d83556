//! Bootstrap configuration.
//!
//! Every field has a default, so a configuration file only needs the values
//! it changes:
//!
//! ```rust
//! use pillar_curves::config::BootstrapConfig;
//! use pillar_math::solvers::SolverKind;
//!
//! let config = BootstrapConfig::from_toml_str(
//!     r#"
//!     solver = "Ridder"
//!     accuracy = 1e-13
//!
//!     [simultaneous]
//!     max_iterations = 50
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.solver, SolverKind::Ridder);
//! assert_eq!(config.max_evaluations, 100);
//! ```

use pillar_math::optimization::LevenbergMarquardtConfig;
use pillar_math::solvers::{SolverConfig, SolverKind, DEFAULT_ACCURACY};
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::instruments::PillarChoice;

/// Settings of the joint Levenberg-Marquardt bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimultaneousConfig {
    /// Largest accepted absolute quote error.
    pub tolerance: f64,
    /// Optimizer iteration limit.
    pub max_iterations: usize,
    /// Evaluate residuals and Jacobian columns on the rayon pool.
    ///
    /// Only effective with the `parallel` cargo feature.
    pub parallel: bool,
}

impl Default for SimultaneousConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 200,
            parallel: false,
        }
    }
}

impl SimultaneousConfig {
    /// Optimizer settings derived from this configuration.
    #[must_use]
    pub fn optimizer_config(&self) -> LevenbergMarquardtConfig {
        LevenbergMarquardtConfig::default()
            .with_function_tolerance(self.tolerance * 1e-2)
            .with_max_iterations(self.max_iterations)
    }
}

/// Settings shared by the iterative and simultaneous bootstraps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Root-finder accuracy on the quote error.
    ///
    /// Defaults to ten machine epsilons: numerical precision, not quote
    /// precision.
    pub accuracy: f64,
    /// Objective evaluations allowed per node solve.
    pub max_evaluations: usize,
    /// Root finder used per node.
    pub solver: SolverKind,
    /// Passes allowed in the refinement loop for global interpolation.
    pub max_refinement_iterations: usize,
    /// The refinement loop stops once no node moves by this much.
    pub refinement_tolerance: f64,
    /// Run the refinement loop for global interpolation.
    pub refine_global: bool,
    /// Whether the finished curve answers queries past its last node.
    pub allow_extrapolation: bool,
    /// Which helper date becomes the node.
    pub pillar: PillarChoice,
    /// Joint bootstrap settings.
    pub simultaneous: SimultaneousConfig,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            accuracy: DEFAULT_ACCURACY,
            max_evaluations: 100,
            solver: SolverKind::Brent,
            max_refinement_iterations: 100,
            refinement_tolerance: 1e-12,
            refine_global: true,
            allow_extrapolation: false,
            pillar: PillarChoice::LastRelevantDate,
            simultaneous: SimultaneousConfig::default(),
        }
    }
}

impl BootstrapConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> CurveResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| CurveError::invalid_config(format!("TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON document.
    pub fn from_json_str(text: &str) -> CurveResult<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| CurveError::invalid_config(format!("JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the root-finder accuracy.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Sets the evaluation budget per node.
    #[must_use]
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Sets the root finder.
    #[must_use]
    pub fn with_solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the refinement pass limit.
    #[must_use]
    pub fn with_max_refinement_iterations(mut self, iterations: usize) -> Self {
        self.max_refinement_iterations = iterations;
        self
    }

    /// Sets the refinement stopping tolerance.
    #[must_use]
    pub fn with_refinement_tolerance(mut self, tolerance: f64) -> Self {
        self.refinement_tolerance = tolerance;
        self
    }

    /// Switches the refinement loop on or off.
    #[must_use]
    pub fn with_refine_global(mut self, refine: bool) -> Self {
        self.refine_global = refine;
        self
    }

    /// Switches extrapolation of the finished curve.
    #[must_use]
    pub fn with_extrapolation(mut self, allow: bool) -> Self {
        self.allow_extrapolation = allow;
        self
    }

    /// Sets the pillar choice.
    #[must_use]
    pub fn with_pillar(mut self, pillar: PillarChoice) -> Self {
        self.pillar = pillar;
        self
    }

    /// Sets the joint bootstrap settings.
    #[must_use]
    pub fn with_simultaneous(mut self, simultaneous: SimultaneousConfig) -> Self {
        self.simultaneous = simultaneous;
        self
    }

    /// Per-node solver settings, before domain bounds are applied.
    #[must_use]
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::new(self.accuracy, self.max_evaluations)
    }

    /// Checks every field.
    pub fn validate(&self) -> CurveResult<()> {
        fn positive(name: &str, value: f64) -> CurveResult<()> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(CurveError::invalid_config(format!(
                    "{name} must be positive and finite, got {value}"
                )))
            }
        }

        positive("accuracy", self.accuracy)?;
        positive("refinement_tolerance", self.refinement_tolerance)?;
        positive("simultaneous.tolerance", self.simultaneous.tolerance)?;
        if self.max_evaluations < 2 {
            return Err(CurveError::invalid_config(format!(
                "max_evaluations must be at least 2, got {}",
                self.max_evaluations
            )));
        }
        if self.max_refinement_iterations == 0 {
            return Err(CurveError::invalid_config(
                "max_refinement_iterations must be at least 1",
            ));
        }
        if self.simultaneous.max_iterations == 0 {
            return Err(CurveError::invalid_config(
                "simultaneous.max_iterations must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BootstrapConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.refine_global);
        assert!(!config.allow_extrapolation);
        assert_eq!(config.pillar, PillarChoice::LastRelevantDate);
        assert_eq!(config.solver_config().max_evaluations, 100);
    }

    #[test]
    fn test_default_accuracy_is_numerical_precision() {
        let config = BootstrapConfig::default();
        assert_eq!(config.accuracy, 10.0 * f64::EPSILON);
        assert_eq!(config.solver_config().accuracy, DEFAULT_ACCURACY);
    }

    #[test]
    fn test_invalid_values() {
        let bad = [
            BootstrapConfig::default().with_accuracy(0.0),
            BootstrapConfig::default().with_accuracy(f64::NAN),
            BootstrapConfig::default().with_max_evaluations(1),
            BootstrapConfig::default().with_max_refinement_iterations(0),
            BootstrapConfig::default().with_refinement_tolerance(-1e-12),
        ];
        for config in bad {
            let err = config.validate().unwrap_err();
            assert!(err.is_configuration(), "{err}");
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let config = BootstrapConfig::default()
            .with_solver(SolverKind::NewtonSafe)
            .with_pillar(PillarChoice::MaturityDate)
            .with_extrapolation(true);
        let json = serde_json::to_string(&config).unwrap();
        let back = BootstrapConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_toml() {
        let config = BootstrapConfig::from_toml_str("refine_global = false\n").unwrap();
        assert!(!config.refine_global);
        assert_eq!(config.accuracy, DEFAULT_ACCURACY);

        let err = BootstrapConfig::from_toml_str("max_evaluations = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_evaluations"));
        assert!(BootstrapConfig::from_toml_str("accuracy = \"tight\"").is_err());
    }
}
