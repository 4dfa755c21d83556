//! Curve handles and multi-curve bootstrapping.
//!
//! Rate helpers never own the curves they price against. They hold a
//! [`CurveSource`] per leg and resolve it through a [`CurveLookup`] at
//! evaluation time, so the same helper can be priced against a trial curve
//! during the bootstrap and against the finished curve afterwards.
//!
//! ```text
//!          ┌──────────────┐   Linked("ESTR")   ┌────────────────┐
//!          │  ESTR (OIS)  │ ◄───────────────── │  EURIBOR 6M    │
//!          │  discounting │                    │  forecasting   │
//!          └──────────────┘                    └────────────────┘
//! ```
//!
//! A [`CurveSet`] bootstraps several curves in dependency order, and falls
//! back to a joint solve when the dependencies form a cycle.

mod curve_set;

pub use curve_set::CurveSet;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::curves::PiecewiseYieldCurve;
use crate::error::{CurveError, CurveResult};
use crate::term_structure::TermStructure;

/// Name of a curve within a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurveId(String);

impl CurveId {
    /// Creates a curve id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurveId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CurveId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Where a helper leg takes its curve from.
#[derive(Clone, Default)]
pub enum CurveSource {
    /// The curve the helper is attached to, usually the one being built.
    #[default]
    Attached,
    /// Another curve, resolved by id.
    Linked(CurveId),
    /// A fixed, already built curve.
    External(Arc<dyn TermStructure>),
}

impl CurveSource {
    /// Id of a linked curve, if any.
    #[must_use]
    pub fn linked_id(&self) -> Option<&CurveId> {
        match self {
            CurveSource::Linked(id) => Some(id),
            CurveSource::Attached | CurveSource::External(_) => None,
        }
    }
}

impl fmt::Debug for CurveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveSource::Attached => write!(f, "Attached"),
            CurveSource::Linked(id) => write!(f, "Linked({id})"),
            CurveSource::External(curve) => write!(f, "External(ref {})", curve.reference_date()),
        }
    }
}

/// Resolves curve ids to curves.
pub trait CurveLookup: Send + Sync {
    /// The curve registered under `id`.
    fn curve(&self, id: &CurveId) -> CurveResult<&dyn TermStructure>;
}

/// Finished curves by id.
pub type CurveMap = HashMap<CurveId, Arc<PiecewiseYieldCurve>>;

impl<T: TermStructure> CurveLookup for HashMap<CurveId, T> {
    fn curve(&self, id: &CurveId) -> CurveResult<&dyn TermStructure> {
        self.get(id)
            .map(|c| c as &dyn TermStructure)
            .ok_or_else(|| CurveError::curve_not_found(id.as_str()))
    }
}

/// Serves one curve under one id and defers everything else.
pub(crate) struct Overlay<'a> {
    pub id: &'a CurveId,
    pub curve: &'a dyn TermStructure,
    pub fallback: &'a dyn CurveLookup,
}

impl CurveLookup for Overlay<'_> {
    fn curve(&self, id: &CurveId) -> CurveResult<&dyn TermStructure> {
        if id == self.id {
            Ok(self.curve)
        } else {
            self.fallback.curve(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term_structure::tests::FlatCurve;
    use pillar_core::Date;

    #[test]
    fn test_map_lookup() {
        let d = Date::from_ymd(2025, 1, 2).unwrap();
        let mut map = HashMap::new();
        map.insert(CurveId::new("ESTR"), FlatCurve::new(d, 0.03));

        let found = map.curve(&CurveId::new("ESTR")).unwrap();
        assert_eq!(found.reference_date(), d);
        let err = map.curve(&"SOFR".into()).err().unwrap();
        assert!(matches!(err, CurveError::CurveNotFound { ref name } if name == "SOFR"));
    }

    #[test]
    fn test_overlay_prefers_its_curve() {
        let d = Date::from_ymd(2025, 1, 2).unwrap();
        let mut map = HashMap::new();
        map.insert(CurveId::new("A"), FlatCurve::new(d, 0.03));
        let other = FlatCurve::new(d, 0.07);
        let id = CurveId::new("A");
        let overlay = Overlay {
            id: &id,
            curve: &other,
            fallback: &map,
        };
        let df = overlay.curve(&id).unwrap().discount(1.0).unwrap();
        assert!((df - (-0.07_f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_source_debug() {
        assert_eq!(format!("{:?}", CurveSource::Linked("ESTR".into())), "Linked(ESTR)");
        assert!(CurveSource::Attached.linked_id().is_none());
    }
}
