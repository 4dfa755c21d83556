//! Frequency and compounding types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Period;

/// Payment frequency of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Frequency {
    /// Annual payments (1 per year)
    #[default]
    Annual,
    /// Semi-annual payments (2 per year)
    SemiAnnual,
    /// Quarterly payments (4 per year)
    Quarterly,
    /// Monthly payments (12 per year)
    Monthly,
    /// A single payment at maturity
    Once,
}

impl Frequency {
    /// Returns the number of periods per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
            Frequency::Once => 0,
        }
    }

    /// Returns the number of months per period.
    #[must_use]
    pub fn months_per_period(&self) -> u32 {
        match self {
            Frequency::Annual => 12,
            Frequency::SemiAnnual => 6,
            Frequency::Quarterly => 3,
            Frequency::Monthly => 1,
            Frequency::Once => 0,
        }
    }

    /// Returns the tenor of one period, `None` for [`Frequency::Once`].
    #[must_use]
    pub fn period(&self) -> Option<Period> {
        match self {
            Frequency::Once => None,
            other => Some(Period::months(other.months_per_period() as i32)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Annual => "Annual",
            Frequency::SemiAnnual => "Semi-Annual",
            Frequency::Quarterly => "Quarterly",
            Frequency::Monthly => "Monthly",
            Frequency::Once => "Once",
        };
        write!(f, "{name}")
    }
}

/// Interest compounding convention.
///
/// Links a rate `r` over a year fraction `t` to a compound factor:
///
/// | Convention | Compound factor |
/// |------------|-----------------|
/// | Simple | `1 + r t` |
/// | Periodic (`n` per year) | `(1 + r/n)^(n t)` |
/// | Continuous | `exp(r t)` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Compounding {
    /// Simple interest (no compounding)
    Simple,
    /// Annual compounding (1x per year)
    Annual,
    /// Semi-annual compounding (2x per year)
    SemiAnnual,
    /// Quarterly compounding (4x per year)
    Quarterly,
    /// Monthly compounding (12x per year)
    Monthly,
    /// Daily compounding (365x per year)
    Daily,
    /// Continuous compounding
    #[default]
    Continuous,
}

impl Compounding {
    /// Returns the number of compounding periods per year.
    ///
    /// `None` for simple and continuous compounding.
    #[must_use]
    pub fn periods_per_year(&self) -> Option<u32> {
        match self {
            Compounding::Simple | Compounding::Continuous => None,
            Compounding::Annual => Some(1),
            Compounding::SemiAnnual => Some(2),
            Compounding::Quarterly => Some(4),
            Compounding::Monthly => Some(12),
            Compounding::Daily => Some(365),
        }
    }

    /// Growth of one unit invested at `rate` for `t` years.
    #[must_use]
    pub fn compound_factor(&self, rate: f64, t: f64) -> f64 {
        match self {
            Compounding::Simple => 1.0 + rate * t,
            Compounding::Continuous => (rate * t).exp(),
            periodic => {
                let n = f64::from(periodic.periods_per_year().unwrap_or(1));
                (1.0 + rate / n).powf(n * t)
            }
        }
    }

    /// Discount factor for `rate` over `t` years.
    #[must_use]
    pub fn discount_factor(&self, rate: f64, t: f64) -> f64 {
        1.0 / self.compound_factor(rate, t)
    }

    /// Rate that produces `compound` over `t` years.
    ///
    /// `t` must be strictly positive; callers handle the `t = 0` limit.
    #[must_use]
    pub fn implied_rate(&self, compound: f64, t: f64) -> f64 {
        match self {
            Compounding::Simple => (compound - 1.0) / t,
            Compounding::Continuous => compound.ln() / t,
            periodic => {
                let n = f64::from(periodic.periods_per_year().unwrap_or(1));
                n * (compound.powf(1.0 / (n * t)) - 1.0)
            }
        }
    }
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compounding::Simple => "Simple",
            Compounding::Annual => "Annual",
            Compounding::SemiAnnual => "Semi-Annual",
            Compounding::Quarterly => "Quarterly",
            Compounding::Monthly => "Monthly",
            Compounding::Daily => "Daily",
            Compounding::Continuous => "Continuous",
        };
        write!(f, "{name}")
    }
}

impl From<Frequency> for Compounding {
    fn from(freq: Frequency) -> Self {
        match freq {
            Frequency::Annual => Compounding::Annual,
            Frequency::SemiAnnual => Compounding::SemiAnnual,
            Frequency::Quarterly => Compounding::Quarterly,
            Frequency::Monthly => Compounding::Monthly,
            Frequency::Once => Compounding::Simple,
        }
    }
}
