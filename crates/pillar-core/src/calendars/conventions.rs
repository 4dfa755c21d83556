//! Business day adjustment conventions.

use serde::{Deserialize, Serialize};

use super::Calendar;
use crate::types::Date;

/// Business day adjustment conventions.
///
/// These conventions specify how to adjust a date that falls
/// on a non-business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BusinessDayConvention {
    /// No adjustment - use the date as-is even if not a business day.
    Unadjusted,

    /// Move to the following business day.
    #[default]
    Following,

    /// Move to the following business day, unless it crosses a month boundary,
    /// in which case move to the preceding business day.
    ModifiedFollowing,

    /// Move to the preceding business day.
    Preceding,

    /// Move to the preceding business day, unless it crosses a month boundary,
    /// in which case move to the following business day.
    ModifiedPreceding,
}

impl BusinessDayConvention {
    /// Adjusts `date` on `calendar` according to this convention.
    pub fn adjust<C: Calendar + ?Sized>(self, date: Date, calendar: &C) -> Date {
        if calendar.is_business_day(date) {
            return date;
        }

        match self {
            BusinessDayConvention::Unadjusted => date,
            BusinessDayConvention::Following => following(date, calendar),
            BusinessDayConvention::ModifiedFollowing => {
                let adjusted = following(date, calendar);
                if adjusted.month() == date.month() {
                    adjusted
                } else {
                    preceding(date, calendar)
                }
            }
            BusinessDayConvention::Preceding => preceding(date, calendar),
            BusinessDayConvention::ModifiedPreceding => {
                let adjusted = preceding(date, calendar);
                if adjusted.month() == date.month() {
                    adjusted
                } else {
                    following(date, calendar)
                }
            }
        }
    }
}

impl std::fmt::Display for BusinessDayConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BusinessDayConvention::Unadjusted => "Unadjusted",
            BusinessDayConvention::Following => "Following",
            BusinessDayConvention::ModifiedFollowing => "Modified Following",
            BusinessDayConvention::Preceding => "Preceding",
            BusinessDayConvention::ModifiedPreceding => "Modified Preceding",
        };
        write!(f, "{name}")
    }
}

fn following<C: Calendar + ?Sized>(mut date: Date, calendar: &C) -> Date {
    while !calendar.is_business_day(date) {
        date = date.add_days(1);
    }
    date
}

fn preceding<C: Calendar + ?Sized>(mut date: Date, calendar: &C) -> Date {
    while !calendar.is_business_day(date) {
        date = date.add_days(-1);
    }
    date
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendars::WeekendCalendar;

    #[test]
    fn test_following_and_preceding() {
        let cal = WeekendCalendar;
        let saturday = Date::from_ymd(2025, 1, 4).unwrap();

        assert_eq!(
            BusinessDayConvention::Following.adjust(saturday, &cal),
            Date::from_ymd(2025, 1, 6).unwrap()
        );
        assert_eq!(
            BusinessDayConvention::Preceding.adjust(saturday, &cal),
            Date::from_ymd(2025, 1, 3).unwrap()
        );
        assert_eq!(BusinessDayConvention::Unadjusted.adjust(saturday, &cal), saturday);
    }

    #[test]
    fn test_modified_following_month_end() {
        let cal = WeekendCalendar;
        // Saturday 31 May 2025 would roll into June
        let saturday = Date::from_ymd(2025, 5, 31).unwrap();
        assert_eq!(
            BusinessDayConvention::ModifiedFollowing.adjust(saturday, &cal),
            Date::from_ymd(2025, 5, 30).unwrap()
        );
    }

    #[test]
    fn test_modified_preceding_month_start() {
        let cal = WeekendCalendar;
        // Saturday 1 Feb 2025 would roll into January
        let saturday = Date::from_ymd(2025, 2, 1).unwrap();
        assert_eq!(
            BusinessDayConvention::ModifiedPreceding.adjust(saturday, &cal),
            Date::from_ymd(2025, 2, 3).unwrap()
        );
    }

    #[test]
    fn test_business_day_unchanged() {
        let cal = WeekendCalendar;
        let monday = Date::from_ymd(2025, 1, 6).unwrap();
        assert_eq!(BusinessDayConvention::Following.adjust(monday, &cal), monday);
    }
}
