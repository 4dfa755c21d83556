//! Coupon schedule generation.

use crate::calendars::{BusinessDayConvention, Calendar};
use crate::error::{CoreError, CoreResult};
use crate::types::{Date, Frequency, Period};

/// An ordered list of accrual boundaries.
///
/// `dates()[0]` is the (adjusted) effective date and the last entry is the
/// (adjusted) termination date; every consecutive pair is one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    unadjusted: Vec<Date>,
    dates: Vec<Date>,
}

impl Schedule {
    /// Generates a schedule backward from `termination` in steps of `tenor`.
    ///
    /// Any stub falls at the front. A zero `tenor` produces a single period.
    /// With `end_of_month` set and a termination on the last business day of
    /// its month, every roll lands on a month end.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSchedule` if `termination <= effective` or
    /// the tenor is negative.
    pub fn backward<C: Calendar + ?Sized>(
        effective: Date,
        termination: Date,
        tenor: Period,
        calendar: &C,
        convention: BusinessDayConvention,
        end_of_month: bool,
    ) -> CoreResult<Self> {
        if termination <= effective {
            return Err(CoreError::invalid_schedule(format!(
                "termination {termination} is not after effective {effective}"
            )));
        }
        if tenor.length() < 0 {
            return Err(CoreError::invalid_schedule(format!("negative tenor {tenor}")));
        }

        let mut unadjusted = vec![termination];
        if !tenor.is_zero() {
            let eom = end_of_month && calendar.is_end_of_month(termination);
            let mut n = 1;
            loop {
                let mut roll = termination.add_period(-tenor.times(n))?;
                if eom {
                    roll = roll.end_of_month();
                }
                if roll <= effective {
                    break;
                }
                unadjusted.push(roll);
                n += 1;
            }
        }
        unadjusted.push(effective);
        unadjusted.reverse();

        let last = unadjusted.len() - 1;
        let mut dates: Vec<Date> = Vec::with_capacity(unadjusted.len());
        for (i, d) in unadjusted.iter().enumerate() {
            let adjusted = if i == 0 || i == last {
                convention.adjust(*d, calendar)
            } else if end_of_month && calendar.is_end_of_month(termination) {
                calendar.end_of_month(*d)
            } else {
                convention.adjust(*d, calendar)
            };
            if dates.last().is_some_and(|prev| *prev >= adjusted) {
                continue;
            }
            dates.push(adjusted);
        }

        if dates.len() < 2 {
            return Err(CoreError::invalid_schedule(format!(
                "{effective} to {termination} collapses after adjustment"
            )));
        }

        Ok(Self { unadjusted, dates })
    }

    /// Generates a schedule from a payment frequency.
    ///
    /// # Errors
    ///
    /// See [`Schedule::backward`].
    pub fn from_frequency<C: Calendar + ?Sized>(
        effective: Date,
        termination: Date,
        frequency: Frequency,
        calendar: &C,
        convention: BusinessDayConvention,
        end_of_month: bool,
    ) -> CoreResult<Self> {
        let tenor = frequency.period().unwrap_or(Period::months(0));
        Self::backward(effective, termination, tenor, calendar, convention, end_of_month)
    }

    /// Adjusted accrual boundaries.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Unadjusted roll dates, before business-day adjustment.
    #[must_use]
    pub fn unadjusted_dates(&self) -> &[Date] {
        &self.unadjusted
    }

    /// Number of accrual periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len() - 1
    }

    /// Always false for a successfully generated schedule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.len() < 2
    }

    /// First adjusted date.
    #[must_use]
    pub fn start_date(&self) -> Date {
        self.dates[0]
    }

    /// Last adjusted date.
    #[must_use]
    pub fn end_date(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }

    /// Iterates over `(start, end)` accrual periods.
    pub fn periods(&self) -> impl Iterator<Item = (Date, Date)> + '_ {
        self.dates.windows(2).map(|w| (w[0], w[1]))
    }
}
