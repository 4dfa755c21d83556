//! Date-rolling checks for a EUR money market strip.
//!
//! Trade date Thursday 23 Oct 2014, spot T+2, weekend-only calendar.

use approx::assert_relative_eq;
use pillar_core::prelude::*;

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

#[test]
fn spot_and_deposit_maturities() {
    let cal = WeekendCalendar;
    let trade = d(2014, 10, 23);
    let spot = cal.add_business_days(trade, 2);
    assert_eq!(spot, d(2014, 10, 27));

    let expected = [
        ("1M", d(2014, 11, 27)),
        ("3M", d(2015, 1, 27)),
        ("6M", d(2015, 4, 27)),
        ("1Y", d(2015, 10, 27)),
    ];
    for (tenor, maturity) in expected {
        let period: Period = tenor.parse().unwrap();
        let rolled = cal
            .advance(spot, period, BusinessDayConvention::ModifiedFollowing, false)
            .unwrap();
        assert_eq!(rolled, maturity, "tenor {tenor}");
    }
}

#[test]
fn deposit_accrual_fractions() {
    let spot = d(2014, 10, 27);
    let three_months = d(2015, 1, 27);

    // 92 actual days
    assert_relative_eq!(Act360.year_fraction_f64(spot, three_months), 92.0 / 360.0);
    assert_relative_eq!(Act365Fixed.year_fraction_f64(spot, three_months), 92.0 / 365.0);
    assert_relative_eq!(Thirty360.year_fraction_f64(spot, three_months), 0.25);
}

#[test]
fn five_year_annual_fixed_leg() {
    let spot = d(2014, 10, 27);
    let termination = spot.add_period(Period::years(5)).unwrap();
    let schedule = Schedule::from_frequency(
        spot,
        termination,
        Frequency::Annual,
        &WeekendCalendar,
        BusinessDayConvention::ModifiedFollowing,
        false,
    )
    .unwrap();

    assert_eq!(schedule.len(), 5);
    let total: f64 = schedule
        .periods()
        .map(|(s, e)| Thirty360.year_fraction_f64(s, e))
        .sum();
    // 30/360 accruals add up to five years plus the one-day roll at maturity
    assert_relative_eq!(total, 5.0 + 1.0 / 360.0, epsilon = 1e-12);
}
