//! Business day calendars.
//!
//! Only weekend rules are modelled; market holiday tables are not part of
//! this crate. Rate helpers take any `Calendar`, so a holiday-aware
//! implementation can be plugged in by the caller.

mod conventions;

pub use conventions::BusinessDayConvention;

use crate::error::CoreResult;
use crate::types::{Date, Period, TimeUnit};

/// Trait for business day calendars.
pub trait Calendar: Send + Sync {
    /// Returns the name of the calendar.
    fn name(&self) -> &'static str;

    /// Returns true if the date is a business day.
    fn is_business_day(&self, date: Date) -> bool;

    /// Returns true if the date is a holiday.
    fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// Adjusts a date according to the given business day convention.
    fn adjust(&self, date: Date, convention: BusinessDayConvention) -> Date {
        convention.adjust(date, self)
    }

    /// Advances a date by a number of business days.
    ///
    /// A zero shift still rolls a holiday forward to the next business day.
    fn add_business_days(&self, date: Date, days: i32) -> Date {
        if days == 0 {
            return BusinessDayConvention::Following.adjust(date, self);
        }

        let mut result = date;
        let mut remaining = days.abs();
        let direction: i64 = if days > 0 { 1 } else { -1 };

        while remaining > 0 {
            result = result.add_days(direction);
            if self.is_business_day(result) {
                remaining -= 1;
            }
        }

        result
    }

    /// Returns true if `date` is the last business day of its month.
    fn is_end_of_month(&self, date: Date) -> bool {
        date.month() != self.add_business_days(date, 1).month()
    }

    /// Returns the last business day of the date's month.
    fn end_of_month(&self, date: Date) -> Date {
        BusinessDayConvention::Preceding.adjust(date.end_of_month(), self)
    }

    /// Advances a date by a period and adjusts the result.
    ///
    /// Day periods count business days. Week, month and year periods move
    /// calendar time and then apply `convention`. With `end_of_month` set,
    /// a start on the last business day of a month lands on the last
    /// business day of the target month.
    fn advance(
        &self,
        date: Date,
        period: Period,
        convention: BusinessDayConvention,
        end_of_month: bool,
    ) -> CoreResult<Date> {
        match period.unit() {
            TimeUnit::Days => Ok(self.add_business_days(date, period.length())),
            TimeUnit::Weeks => Ok(self.adjust(date.add_period(period)?, convention)),
            TimeUnit::Months | TimeUnit::Years => {
                let target = date.add_period(period)?;
                if end_of_month && self.is_end_of_month(date) {
                    Ok(self.end_of_month(target))
                } else {
                    Ok(self.adjust(target, convention))
                }
            }
        }
    }
}

/// A weekend-only calendar (no holidays).
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendCalendar;

impl Calendar for WeekendCalendar {
    fn name(&self) -> &'static str {
        "Weekend Only"
    }

    fn is_business_day(&self, date: Date) -> bool {
        !date.is_weekend()
    }
}

/// A calendar on which every day is a business day.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCalendar;

impl Calendar for NullCalendar {
    fn name(&self) -> &'static str {
        "Null"
    }

    fn is_business_day(&self, _date: Date) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_weekend_calendar() {
        let cal = WeekendCalendar;
        assert!(cal.is_business_day(d(2025, 1, 6)));
        assert!(!cal.is_business_day(d(2025, 1, 4)));
        assert!(!cal.is_business_day(d(2025, 1, 5)));
    }

    #[test]
    fn test_add_business_days() {
        let cal = WeekendCalendar;
        // Thursday 23 Oct 2014 + 2 = Monday 27 Oct 2014
        assert_eq!(cal.add_business_days(d(2014, 10, 23), 2), d(2014, 10, 27));
        assert_eq!(cal.add_business_days(d(2025, 1, 6), -1), d(2025, 1, 3));
        // zero shift on a Saturday rolls forward
        assert_eq!(cal.add_business_days(d(2025, 1, 4), 0), d(2025, 1, 6));
    }

    #[test]
    fn test_advance_months_modified_following() {
        let cal = WeekendCalendar;
        // 31 Jan 2015 is a Saturday; one month later is 28 Feb 2015 (Saturday),
        // modified following rolls back to Friday 27 Feb.
        let start = d(2015, 1, 30);
        let adjusted = cal
            .advance(start, Period::months(1), BusinessDayConvention::ModifiedFollowing, false)
            .unwrap();
        assert_eq!(adjusted, d(2015, 2, 27));
    }

    #[test]
    fn test_advance_end_of_month() {
        let cal = WeekendCalendar;
        // 30 Sep 2014 is the last business day of September
        let start = d(2014, 9, 30);
        let eom = cal
            .advance(start, Period::months(1), BusinessDayConvention::ModifiedFollowing, true)
            .unwrap();
        assert_eq!(eom, d(2014, 10, 31));

        let no_eom = cal
            .advance(start, Period::months(1), BusinessDayConvention::ModifiedFollowing, false)
            .unwrap();
        assert_eq!(no_eom, d(2014, 10, 30));
    }

    #[test]
    fn test_advance_days_counts_business_days() {
        let cal = WeekendCalendar;
        let friday = d(2025, 1, 3);
        assert_eq!(
            cal.advance(friday, Period::days(1), BusinessDayConvention::Following, false)
                .unwrap(),
            d(2025, 1, 6)
        );
    }

    #[test]
    fn test_null_calendar() {
        let cal = NullCalendar;
        let saturday = d(2025, 1, 4);
        assert!(cal.is_business_day(saturday));
        assert_eq!(cal.add_business_days(saturday, 1), d(2025, 1, 5));
    }
}
