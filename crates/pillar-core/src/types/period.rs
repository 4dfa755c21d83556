//! Tenors such as `3M`, `2Y` or `1W`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use crate::error::CoreError;

/// Unit of a [`Period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Calendar days
    Days,
    /// Calendar weeks
    Weeks,
    /// Calendar months
    Months,
    /// Calendar years
    Years,
}

impl TimeUnit {
    fn suffix(self) -> char {
        match self {
            TimeUnit::Days => 'D',
            TimeUnit::Weeks => 'W',
            TimeUnit::Months => 'M',
            TimeUnit::Years => 'Y',
        }
    }
}

/// A signed length of calendar time.
///
/// # Example
///
/// ```rust
/// use pillar_core::types::{Period, TimeUnit};
///
/// let p: Period = "18M".parse().unwrap();
/// assert_eq!(p.length(), 18);
/// assert_eq!(p.unit(), TimeUnit::Months);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    length: i32,
    unit: TimeUnit,
}

impl Period {
    /// Creates a new period.
    #[must_use]
    pub const fn new(length: i32, unit: TimeUnit) -> Self {
        Self { length, unit }
    }

    /// `n` days.
    #[must_use]
    pub const fn days(n: i32) -> Self {
        Self::new(n, TimeUnit::Days)
    }

    /// `n` weeks.
    #[must_use]
    pub const fn weeks(n: i32) -> Self {
        Self::new(n, TimeUnit::Weeks)
    }

    /// `n` months.
    #[must_use]
    pub const fn months(n: i32) -> Self {
        Self::new(n, TimeUnit::Months)
    }

    /// `n` years.
    #[must_use]
    pub const fn years(n: i32) -> Self {
        Self::new(n, TimeUnit::Years)
    }

    /// Returns the signed length.
    #[must_use]
    pub fn length(&self) -> i32 {
        self.length
    }

    /// Returns the unit.
    #[must_use]
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Returns the same period multiplied by `n`.
    #[must_use]
    pub fn times(&self, n: i32) -> Self {
        Self::new(self.length * n, self.unit)
    }

    /// Length in months for month/year periods, `None` otherwise.
    #[must_use]
    pub fn in_months(&self) -> Option<i32> {
        match self.unit {
            TimeUnit::Months => Some(self.length),
            TimeUnit::Years => Some(self.length * 12),
            TimeUnit::Days | TimeUnit::Weeks => None,
        }
    }

    /// True for zero-length periods.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.length == 0
    }
}

impl Neg for Period {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.length, self.unit)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length, self.unit.suffix())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let Some(last) = trimmed.chars().last() else {
            return Err(CoreError::invalid_period(s, "empty tenor"));
        };
        let unit = match last.to_ascii_uppercase() {
            'D' => TimeUnit::Days,
            'W' => TimeUnit::Weeks,
            'M' => TimeUnit::Months,
            'Y' => TimeUnit::Years,
            other => {
                return Err(CoreError::invalid_period(s, format!("unknown unit '{other}'")))
            }
        };
        let digits = &trimmed[..trimmed.len() - last.len_utf8()];
        let length = digits
            .parse::<i32>()
            .map_err(|_| CoreError::invalid_period(s, "length is not an integer"))?;
        Ok(Self::new(length, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("3M".parse::<Period>().unwrap(), Period::months(3));
        assert_eq!("2y".parse::<Period>().unwrap(), Period::years(2));
        assert_eq!("1W".parse::<Period>().unwrap(), Period::weeks(1));
        assert_eq!(" 2D ".parse::<Period>().unwrap(), Period::days(2));
        assert_eq!("-6M".parse::<Period>().unwrap(), -Period::months(6));
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Period>().is_err());
        assert!("3X".parse::<Period>().is_err());
        assert!("M".parse::<Period>().is_err());
        assert!("1.5Y".parse::<Period>().is_err());
    }

    #[test]
    fn test_in_months() {
        assert_eq!(Period::years(2).in_months(), Some(24));
        assert_eq!(Period::months(6).in_months(), Some(6));
        assert_eq!(Period::weeks(1).in_months(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Period::years(10).to_string(), "10Y");
        assert_eq!(Period::months(6).times(2).to_string(), "12M");
    }
}
