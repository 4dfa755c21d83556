//! What a curve's node values represent.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::traits::{CurveTraits, Discount, ForwardRate, ZeroYield};

/// Quantity stored at the nodes of a piecewise curve.
///
/// Each value type selects a [`CurveTraits`] strategy that knows how to
/// guess, bound and interpret node values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValueType {
    /// Discount factors `P(t)`, with `P(0) = 1`.
    #[default]
    Discount,
    /// Continuously compounded zero rates `z(t)`, with `P(t) = exp(-z t)`.
    ZeroYield,
    /// Instantaneous forward rates `f(t)`, with `P(t) = exp(-integral of f)`.
    ForwardRate,
}

impl ValueType {
    /// Strategy for this value type.
    #[must_use]
    pub fn traits(&self) -> &'static dyn CurveTraits {
        match self {
            ValueType::Discount => &Discount,
            ValueType::ZeroYield => &ZeroYield,
            ValueType::ForwardRate => &ForwardRate,
        }
    }

    /// True when the values are rates rather than discount factors.
    #[must_use]
    pub fn is_rate(&self) -> bool {
        !matches!(self, ValueType::Discount)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Discount => write!(f, "Discount"),
            ValueType::ZeroYield => write!(f, "Zero Yield"),
            ValueType::ForwardRate => write!(f, "Forward Rate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_traits() {
        assert_eq!(ValueType::default(), ValueType::Discount);
        for vt in [ValueType::Discount, ValueType::ZeroYield, ValueType::ForwardRate] {
            assert_eq!(vt.traits().value_type(), vt);
        }
        assert!(ValueType::ZeroYield.is_rate());
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&ValueType::ForwardRate).unwrap();
        assert_eq!(json, "\"ForwardRate\"");
        let back: ValueType = serde_json::from_str("\"ZeroYield\"").unwrap();
        assert_eq!(back, ValueType::ZeroYield);
    }
}
