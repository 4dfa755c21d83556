//! Market conventions and preset helper constructors.
//!
//! Conventions are plain data: an [`IndexConventions`] describes how a rate
//! index settles and accrues, and [`SwapConventions`] / [`OisConventions`]
//! add the fixed leg. The `eur` and `usd` modules build helpers from tenor
//! strings with the usual market settings.
//!
//! Only weekend rules are applied by default; pass a holiday-aware
//! [`Calendar`] through the structs to use a market calendar.
//!
//! # Example
//!
//! ```rust
//! use pillar_core::Date;
//! use pillar_curves::conventions::eur;
//! use pillar_curves::instruments::RateHelper;
//!
//! let trade = Date::from_ymd(2025, 1, 2).unwrap();
//! let deposit = eur::deposit("6M", 0.0265, trade).unwrap();
//! assert_eq!(deposit.earliest_date(), Date::from_ymd(2025, 1, 6).unwrap());
//! ```

use std::fmt;
use std::sync::Arc;

use pillar_core::calendars::{BusinessDayConvention, Calendar, WeekendCalendar};
use pillar_core::daycounts::DayCountConvention;
use pillar_core::types::{Frequency, Period};
use pillar_core::{CoreResult, Date};

/// Settlement and accrual rules of a rate index.
#[derive(Clone)]
pub struct IndexConventions {
    /// Index name, used in helper descriptions.
    pub name: String,
    /// Index tenor (zero for overnight indices).
    pub tenor: Period,
    /// Business days from trade to spot.
    pub settlement_days: u32,
    /// Business day calendar.
    pub calendar: Arc<dyn Calendar>,
    /// Roll convention for period ends.
    pub convention: BusinessDayConvention,
    /// Month-end rolls stay on month ends.
    pub end_of_month: bool,
    /// Accrual day count.
    pub day_count: DayCountConvention,
}

impl IndexConventions {
    /// Spot date for a trade date.
    pub fn spot_date(&self, trade_date: Date) -> CoreResult<Date> {
        self.calendar.advance(
            trade_date,
            Period::days(self.settlement_days as i32),
            BusinessDayConvention::Following,
            false,
        )
    }

    /// Adjusted date `period` after `start`.
    pub fn advance(&self, start: Date, period: Period) -> CoreResult<Date> {
        self.calendar
            .advance(start, period, self.convention, self.end_of_month)
    }

    /// End of an index period starting at `start`.
    pub fn maturity_date(&self, start: Date) -> CoreResult<Date> {
        self.advance(start, self.tenor)
    }

    /// Euribor for the given tenor: T+2, modified following, end of month,
    /// ACT/360.
    #[must_use]
    pub fn euribor(tenor: Period) -> Self {
        Self {
            name: format!("Euribor{tenor}"),
            tenor,
            settlement_days: 2,
            calendar: Arc::new(WeekendCalendar),
            convention: BusinessDayConvention::ModifiedFollowing,
            end_of_month: true,
            day_count: DayCountConvention::Act360,
        }
    }

    /// Euro short-term rate.
    #[must_use]
    pub fn estr() -> Self {
        Self::overnight("ESTR", DayCountConvention::Act360)
    }

    /// Euro overnight index average.
    #[must_use]
    pub fn eonia() -> Self {
        Self::overnight("EONIA", DayCountConvention::Act360)
    }

    /// Secured overnight financing rate.
    #[must_use]
    pub fn sofr() -> Self {
        Self::overnight("SOFR", DayCountConvention::Act360)
    }

    fn overnight(name: &str, day_count: DayCountConvention) -> Self {
        Self {
            name: name.to_string(),
            tenor: Period::days(1),
            settlement_days: 2,
            calendar: Arc::new(WeekendCalendar),
            convention: BusinessDayConvention::ModifiedFollowing,
            end_of_month: false,
            day_count,
        }
    }
}

impl fmt::Debug for IndexConventions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexConventions")
            .field("name", &self.name)
            .field("tenor", &self.tenor)
            .field("settlement_days", &self.settlement_days)
            .field("calendar", &self.calendar.name())
            .field("convention", &self.convention)
            .field("end_of_month", &self.end_of_month)
            .field("day_count", &self.day_count)
            .finish()
    }
}

/// Fixed-for-floating swap conventions.
#[derive(Debug, Clone)]
pub struct SwapConventions {
    /// Fixed leg payment frequency.
    pub fixed_frequency: Frequency,
    /// Fixed leg day count.
    pub fixed_day_count: DayCountConvention,
    /// Fixed leg roll convention.
    pub fixed_convention: BusinessDayConvention,
    /// Floating index.
    pub index: IndexConventions,
}

impl SwapConventions {
    /// EUR swap against 6M Euribor: annual 30/360 fixed leg.
    #[must_use]
    pub fn euribor_6m() -> Self {
        Self {
            fixed_frequency: Frequency::Annual,
            fixed_day_count: DayCountConvention::Thirty360,
            fixed_convention: BusinessDayConvention::ModifiedFollowing,
            index: IndexConventions::euribor(Period::months(6)),
        }
    }
}

/// Overnight index swap conventions.
#[derive(Debug, Clone)]
pub struct OisConventions {
    /// Overnight index.
    pub index: IndexConventions,
    /// Fixed leg payment frequency beyond one year.
    pub fixed_frequency: Frequency,
    /// Fixed leg day count.
    pub fixed_day_count: DayCountConvention,
    /// Business days between period end and payment.
    pub payment_lag: u32,
}

impl OisConventions {
    /// ESTR OIS: annual ACT/360, payment one business day after period end.
    #[must_use]
    pub fn estr() -> Self {
        Self {
            index: IndexConventions::estr(),
            fixed_frequency: Frequency::Annual,
            fixed_day_count: DayCountConvention::Act360,
            payment_lag: 1,
        }
    }

    /// EONIA OIS: annual ACT/360, no payment lag.
    #[must_use]
    pub fn eonia() -> Self {
        Self {
            index: IndexConventions::eonia(),
            fixed_frequency: Frequency::Annual,
            fixed_day_count: DayCountConvention::Act360,
            payment_lag: 0,
        }
    }

    /// SOFR OIS: annual ACT/360, payment two business days after period end.
    #[must_use]
    pub fn sofr() -> Self {
        Self {
            index: IndexConventions::sofr(),
            fixed_frequency: Frequency::Annual,
            fixed_day_count: DayCountConvention::Act360,
            payment_lag: 2,
        }
    }
}

/// EUR market presets.
pub mod eur {
    use super::*;
    use crate::error::CurveResult;
    use crate::instruments::{DepositHelper, OisHelper, SwapHelper};

    /// Euribor deposit for a tenor such as `"3M"`.
    pub fn deposit(tenor: &str, rate: f64, trade_date: Date) -> CurveResult<DepositHelper> {
        let tenor: Period = tenor.parse()?;
        DepositHelper::from_tenor(rate, trade_date, tenor, &IndexConventions::euribor(tenor))
    }

    /// Par swap against 6M Euribor.
    pub fn euribor_6m_swap(tenor: &str, rate: f64, trade_date: Date) -> CurveResult<SwapHelper> {
        SwapHelper::from_tenor(rate, trade_date, tenor.parse()?, &SwapConventions::euribor_6m())
    }

    /// ESTR overnight index swap.
    pub fn estr_ois(tenor: &str, rate: f64, trade_date: Date) -> CurveResult<OisHelper> {
        OisHelper::from_tenor(rate, trade_date, tenor.parse()?, &OisConventions::estr())
    }

    /// EONIA overnight index swap.
    pub fn eonia_ois(tenor: &str, rate: f64, trade_date: Date) -> CurveResult<OisHelper> {
        OisHelper::from_tenor(rate, trade_date, tenor.parse()?, &OisConventions::eonia())
    }
}

/// USD market presets.
pub mod usd {
    use super::*;
    use crate::error::CurveResult;
    use crate::instruments::OisHelper;

    /// SOFR overnight index swap.
    pub fn sofr_ois(tenor: &str, rate: f64, trade_date: Date) -> CurveResult<OisHelper> {
        OisHelper::from_tenor(rate, trade_date, tenor.parse()?, &OisConventions::sofr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::RateHelper;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_spot_and_maturity() {
        let idx = IndexConventions::euribor(Period::months(6));
        // Thursday 2 Jan 2025 + 2 business days
        let spot = idx.spot_date(d(2025, 1, 2)).unwrap();
        assert_eq!(spot, d(2025, 1, 6));
        assert_eq!(idx.maturity_date(spot).unwrap(), d(2025, 7, 7));
        assert!(format!("{idx:?}").contains("Weekend Only"));
    }

    #[test]
    fn test_presets() {
        let trade = d(2025, 1, 2);
        let swap = eur::euribor_6m_swap("5Y", 0.025, trade).unwrap();
        assert_eq!(swap.earliest_date(), d(2025, 1, 6));
        assert_eq!(swap.maturity_date(), d(2030, 1, 7));

        let ois = usd::sofr_ois("2Y", 0.04, trade).unwrap();
        assert!(ois.latest_relevant_date() > ois.maturity_date());

        assert!(eur::deposit("3X", 0.02, trade).is_err());
    }
}
