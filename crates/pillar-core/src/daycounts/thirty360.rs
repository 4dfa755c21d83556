//! 30/360 day count conventions.

use rust_decimal::Decimal;

use super::DayCount;
use crate::types::Date;

#[inline]
fn is_last_day_of_february(date: Date) -> bool {
    date.month() == 2 && date.is_end_of_month()
}

#[inline]
fn thirty360_days(start: Date, end: Date, d1: i64, d2: i64) -> i64 {
    let years = i64::from(end.year() - start.year());
    let months = i64::from(end.month()) - i64::from(start.month());
    360 * years + 30 * months + (d2 - d1)
}

/// 30/360 bond basis.
///
/// # Rules
///
/// 1. If D1 is the last day of February, change D1 to 30
/// 2. If D1 is 31, change D1 to 30
/// 3. If D2 is the last day of February and D1 was too, change D2 to 30
/// 4. If D2 is 31 and D1 is now 30, change D2 to 30
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thirty360;

impl DayCount for Thirty360 {
    fn name(&self) -> &'static str {
        "30/360"
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        Decimal::from(self.day_count(start, end)) / Decimal::from(360)
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        let start_feb_eom = is_last_day_of_february(start);
        let mut d1 = i64::from(start.day());
        let mut d2 = i64::from(end.day());

        if start_feb_eom || d1 == 31 {
            d1 = 30;
        }
        if (is_last_day_of_february(end) && start_feb_eom) || (d2 == 31 && d1 >= 30) {
            d2 = 30;
        }

        thirty360_days(start, end, d1, d2)
    }

    fn year_fraction_f64(&self, start: Date, end: Date) -> f64 {
        self.day_count(start, end) as f64 / 360.0
    }
}

/// 30E/360 Eurobond basis: both 31sts become 30.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thirty360E;

impl DayCount for Thirty360E {
    fn name(&self) -> &'static str {
        "30E/360"
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        Decimal::from(self.day_count(start, end)) / Decimal::from(360)
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        let d1 = i64::from(start.day()).min(30);
        let d2 = i64::from(end.day()).min(30);
        thirty360_days(start, end, d1, d2)
    }

    fn year_fraction_f64(&self, start: Date, end: Date) -> f64 {
        self.day_count(start, end) as f64 / 360.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_thirty360_full_year() {
        let start = Date::from_ymd(2014, 10, 27).unwrap();
        let end = Date::from_ymd(2015, 10, 27).unwrap();
        assert_eq!(Thirty360.day_count(start, end), 360);
        assert_eq!(Thirty360.year_fraction(start, end), dec!(1));
    }

    #[test]
    fn test_thirty360_month_end_rules() {
        // D1 = 31 -> 30, D2 = 31 with D1 = 30 -> 30
        let start = Date::from_ymd(2025, 1, 31).unwrap();
        let end = Date::from_ymd(2025, 3, 31).unwrap();
        assert_eq!(Thirty360.day_count(start, end), 60);

        // Feb EOM to Feb EOM
        let start = Date::from_ymd(2024, 2, 29).unwrap();
        let end = Date::from_ymd(2025, 2, 28).unwrap();
        assert_eq!(Thirty360.day_count(start, end), 360);
    }

    #[test]
    fn test_thirty360e_differs_on_d2() {
        // D1 = 15, D2 = 31: bond basis keeps 31, Eurobond caps at 30
        let start = Date::from_ymd(2025, 1, 15).unwrap();
        let end = Date::from_ymd(2025, 3, 31).unwrap();
        assert_eq!(Thirty360.day_count(start, end), 76);
        assert_eq!(Thirty360E.day_count(start, end), 75);
    }
}
