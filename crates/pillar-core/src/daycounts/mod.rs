//! Day count conventions.
//!
//! Day counts turn a pair of dates into the year fraction a rate accrues
//! over. The curve layer measures node times with one of these and each
//! rate helper accrues its legs with another.
//!
//! # Supported Conventions
//!
//! - [`Act360`]: Actual/360, money market and floating legs
//! - [`Act365Fixed`]: Actual/365 Fixed, the usual curve time axis
//! - [`Thirty360`]: 30/360 bond basis, EUR fixed legs
//! - [`Thirty360E`]: 30E/360 Eurobond basis
//! - [`ActActIsda`]: Actual/Actual ISDA
//!
//! # Usage
//!
//! ```rust
//! use pillar_core::daycounts::{DayCount, Act360};
//! use pillar_core::types::Date;
//!
//! let start = Date::from_ymd(2025, 1, 1).unwrap();
//! let end = Date::from_ymd(2025, 4, 1).unwrap();
//! assert_eq!(Act360.day_count(start, end), 90);
//! assert_eq!(Act360.year_fraction_f64(start, end), 0.25);
//! ```

mod act360;
mod act365;
mod actact;
mod thirty360;

pub use act360::Act360;
pub use act365::Act365Fixed;
pub use actact::ActActIsda;
pub use thirty360::{Thirty360, Thirty360E};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Date;

/// Trait for day count conventions.
///
/// Implementations must be thread-safe (`Send + Sync`) so curves holding
/// one can be shared across threads.
pub trait DayCount: Send + Sync {
    /// Returns the name of the day count convention.
    fn name(&self) -> &'static str;

    /// Calculates the year fraction between two dates.
    ///
    /// Negative if `end < start`.
    fn year_fraction(&self, start: Date, end: Date) -> Decimal;

    /// Calculates the day count between two dates according to the convention.
    fn day_count(&self, start: Date, end: Date) -> i64;

    /// Year fraction as `f64`, the representation the numerical layer uses.
    fn year_fraction_f64(&self, start: Date, end: Date) -> f64 {
        self.year_fraction(start, end).to_f64().unwrap_or(f64::NAN)
    }
}

/// Runtime-selectable day count convention.
///
/// # Example
///
/// ```rust
/// use pillar_core::daycounts::DayCountConvention;
/// use pillar_core::types::Date;
///
/// let dc = DayCountConvention::Act365Fixed.to_day_count();
/// let start = Date::from_ymd(2025, 1, 1).unwrap();
/// let end = Date::from_ymd(2026, 1, 1).unwrap();
/// assert_eq!(dc.year_fraction_f64(start, end), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DayCountConvention {
    /// Actual/360
    Act360,
    /// Actual/365 Fixed
    #[default]
    Act365Fixed,
    /// Actual/Actual ISDA
    ActActIsda,
    /// 30/360 bond basis
    Thirty360,
    /// 30E/360 Eurobond basis
    Thirty360E,
}

impl DayCountConvention {
    /// Creates a boxed day count implementation.
    #[must_use]
    pub fn to_day_count(&self) -> Box<dyn DayCount> {
        match self {
            DayCountConvention::Act360 => Box::new(Act360),
            DayCountConvention::Act365Fixed => Box::new(Act365Fixed),
            DayCountConvention::ActActIsda => Box::new(ActActIsda),
            DayCountConvention::Thirty360 => Box::new(Thirty360),
            DayCountConvention::Thirty360E => Box::new(Thirty360E),
        }
    }

    /// Returns the market name of the convention.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Act360 => "ACT/360",
            DayCountConvention::Act365Fixed => "ACT/365F",
            DayCountConvention::ActActIsda => "ACT/ACT ISDA",
            DayCountConvention::Thirty360 => "30/360",
            DayCountConvention::Thirty360E => "30E/360",
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Static dispatch over [`DayCountConvention`] without boxing.
impl DayCount for DayCountConvention {
    fn name(&self) -> &'static str {
        DayCountConvention::name(self)
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        match self {
            DayCountConvention::Act360 => Act360.year_fraction(start, end),
            DayCountConvention::Act365Fixed => Act365Fixed.year_fraction(start, end),
            DayCountConvention::ActActIsda => ActActIsda.year_fraction(start, end),
            DayCountConvention::Thirty360 => Thirty360.year_fraction(start, end),
            DayCountConvention::Thirty360E => Thirty360E.year_fraction(start, end),
        }
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        match self {
            DayCountConvention::Act360 => Act360.day_count(start, end),
            DayCountConvention::Act365Fixed => Act365Fixed.day_count(start, end),
            DayCountConvention::ActActIsda => ActActIsda.day_count(start, end),
            DayCountConvention::Thirty360 => Thirty360.day_count(start, end),
            DayCountConvention::Thirty360E => Thirty360E.day_count(start, end),
        }
    }

    fn year_fraction_f64(&self, start: Date, end: Date) -> f64 {
        match self {
            DayCountConvention::Act360 => Act360.year_fraction_f64(start, end),
            DayCountConvention::Act365Fixed => Act365Fixed.year_fraction_f64(start, end),
            DayCountConvention::ActActIsda => ActActIsda.year_fraction_f64(start, end),
            DayCountConvention::Thirty360 => Thirty360.year_fraction_f64(start, end),
            DayCountConvention::Thirty360E => Thirty360E.year_fraction_f64(start, end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convention_dispatch_matches_struct() {
        let start = Date::from_ymd(2014, 10, 27).unwrap();
        let end = Date::from_ymd(2019, 10, 28).unwrap();
        for conv in [
            DayCountConvention::Act360,
            DayCountConvention::Act365Fixed,
            DayCountConvention::ActActIsda,
            DayCountConvention::Thirty360,
            DayCountConvention::Thirty360E,
        ] {
            let boxed = conv.to_day_count();
            assert_eq!(boxed.name(), conv.name());
            assert_eq!(boxed.day_count(start, end), conv.day_count(start, end));
            assert_eq!(
                boxed.year_fraction_f64(start, end),
                conv.year_fraction_f64(start, end)
            );
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&DayCountConvention::Act360).unwrap();
        assert_eq!(json, "\"Act360\"");
        let parsed: DayCountConvention = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, DayCountConvention::Act360);
    }
}
