//! Actual/Actual ISDA.

use rust_decimal::Decimal;

use super::DayCount;
use crate::types::Date;

/// Actual/Actual ISDA.
///
/// Splits the period at year boundaries and divides each piece by the
/// length of its own year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActActIsda;

impl ActActIsda {
    fn forward_fraction(start: Date, end: Date) -> Decimal {
        let mut total = Decimal::ZERO;
        let mut current = start;

        while current.year() < end.year() {
            let Ok(boundary) = Date::from_ymd(current.year() + 1, 1, 1) else {
                break;
            };
            total += Decimal::from(current.days_between(&boundary))
                / Decimal::from(current.days_in_year());
            current = boundary;
        }

        total + Decimal::from(current.days_between(&end)) / Decimal::from(current.days_in_year())
    }
}

impl DayCount for ActActIsda {
    fn name(&self) -> &'static str {
        "ACT/ACT ISDA"
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        if start == end {
            Decimal::ZERO
        } else if start < end {
            Self::forward_fraction(start, end)
        } else {
            -Self::forward_fraction(end, start)
        }
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        start.days_between(&end)
    }
}
