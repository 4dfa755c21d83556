//! Integration test: EONIA discounting and EURIBOR 6M forecasting curves.
//!
//! Both curves are built from end-of-day EUR market data, first one after
//! the other and then jointly, and the two results are compared.
//!
//! Market Data: October 23, 2014
//!
//! | Tenor | EONIA OIS | EURIBOR 6M Deposit / Swap |
//! |-------|-----------|---------------------------|
//! | 1M    |           | 0.012%                    |
//! | 2M    |           | 0.050%                    |
//! | 3M    |           | 0.088%                    |
//! | 6M    |           | 0.189%                    |
//! | 1Y    | -0.0218%  | 0.341%                    |
//! | 2Y    | -0.0222%  | 0.233%                    |
//! | 3Y    | 0.0135%   | 0.291%                    |
//! | 4Y    | 0.0799%   |                           |
//! | 5Y    | 0.1715%   | 0.480%                    |
//! | 7Y    | 0.4082%   | 0.728%                    |
//! | 10Y   | 0.7879%   | 1.104%                    |
//! | 15Y   | 1.1333%   | 1.513%                    |
//! | 20Y   | 1.2470%   | 1.715%                    |
//! | 30Y   | 1.3470%   | 1.836%                    |
//! | 40Y   |           | 1.955%                    |

use pillar_curves::prelude::*;
use tracing_subscriber::EnvFilter;

const EONIA: [(&str, f64); 10] = [
    ("1Y", -0.000218),
    ("2Y", -0.000222),
    ("3Y", 0.000135),
    ("4Y", 0.000799),
    ("5Y", 0.001715),
    ("7Y", 0.004082),
    ("10Y", 0.007879),
    ("15Y", 0.011333),
    ("20Y", 0.01247),
    ("30Y", 0.01347),
];

const DEPOSITS: [(&str, f64); 5] = [
    ("1M", 0.00012),
    ("2M", 0.0005),
    ("3M", 0.00088),
    ("6M", 0.00189),
    ("1Y", 0.00341),
];

const SWAPS: [(&str, f64); 9] = [
    ("2Y", 0.00233),
    ("3Y", 0.00291),
    ("5Y", 0.00480),
    ("7Y", 0.00728),
    ("10Y", 0.01104),
    ("15Y", 0.01513),
    ("20Y", 0.01715),
    ("30Y", 0.01836),
    ("40Y", 0.01955),
];

/// Bootstrap logs, shown with `RUST_LOG=pillar_curves=debug`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn trade_date() -> Date {
    Date::from_ymd(2014, 10, 23).unwrap()
}

/// The 40Y swaps discount past the last EONIA pillar.
fn config() -> BootstrapConfig {
    BootstrapConfig::default().with_extrapolation(true)
}

fn eonia_builder() -> PiecewiseCurveBuilder {
    let trade = trade_date();
    let mut builder = PiecewiseCurveBuilder::new(trade)
        .with_id("EONIA")
        .with_value_type(ValueType::ZeroYield)
        .with_interpolation(InterpolationMethod::Linear)
        .with_config(config());
    for (tenor, rate) in EONIA {
        builder.add_helper(eur::eonia_ois(tenor, rate, trade).unwrap());
    }
    builder
}

fn euribor_builder() -> PiecewiseCurveBuilder {
    let trade = trade_date();
    let mut builder = PiecewiseCurveBuilder::new(trade)
        .with_id("EURIBOR6M")
        .with_value_type(ValueType::ZeroYield)
        .with_interpolation(InterpolationMethod::Linear)
        .with_config(config());
    for (tenor, rate) in DEPOSITS {
        builder.add_helper(eur::deposit(tenor, rate, trade).unwrap());
    }
    for (tenor, rate) in SWAPS {
        builder.add_helper(
            eur::euribor_6m_swap(tenor, rate, trade)
                .unwrap()
                .with_discount_curve(CurveSource::Linked(CurveId::new("EONIA"))),
        );
    }
    builder
}

fn curve_set() -> CurveSet {
    CurveSet::new()
        .with_config(config())
        .with_curve(euribor_builder())
        .unwrap()
        .with_curve(eonia_builder())
        .unwrap()
}

#[test]
fn test_eonia_curve_reprices_market() {
    init_tracing();
    let builder = eonia_builder();
    let result = builder.bootstrap_validated().unwrap();

    println!("{}", result.repricing_report);
    println!("Built in {:?}", result.build_duration);

    assert!(result.is_valid());
    assert!(result.repricing_report.is_within(1e-10));

    let curve = result.into_curve().unwrap();
    assert_eq!(curve.dates().len(), EONIA.len() + 1);
    assert_eq!(curve.dates()[0], trade_date());
    assert!(curve.times().windows(2).all(|w| w[0] < w[1]));
    assert_eq!(curve.discount(0.0).unwrap(), 1.0);
    assert_eq!(curve.discount_at(trade_date()).unwrap(), 1.0);

    // Negative short end, positive long end
    let z1 = curve.zero_rate(1.0, Compounding::Continuous).unwrap();
    let z30 = curve.zero_rate(29.0, Compounding::Continuous).unwrap();
    println!("EONIA zero 1Y: {:.4}%, 29Y: {:.4}%", z1 * 100.0, z30 * 100.0);
    assert!(z1 < 0.0);
    assert!(z30 > 0.01);
}

#[test]
fn test_dual_curve_sequential() {
    init_tracing();
    let set = curve_set();
    assert_eq!(
        set.order().unwrap().unwrap(),
        vec![CurveId::new("EONIA"), CurveId::new("EURIBOR6M")]
    );

    let curves = set.bootstrap().unwrap();
    let eonia = &curves[&CurveId::new("EONIA")];
    let euribor = &curves[&CurveId::new("EURIBOR6M")];

    let report = set
        .get(&CurveId::new("EURIBOR6M"))
        .unwrap()
        .reprice_with(euribor.as_ref(), &curves)
        .unwrap();
    println!("{report}");
    assert_eq!(report.len(), DEPOSITS.len() + SWAPS.len());
    assert!(report.is_within(1e-10));

    // EURIBOR 6M projects above EONIA across the curve
    println!("\n=== ZERO RATES ===");
    println!("{:>6} {:>10} {:>10}", "Years", "EONIA", "EURIBOR6M");
    for t in [1.0, 2.0, 5.0, 10.0, 20.0, 30.0] {
        let e = eonia.zero_rate(t, Compounding::Continuous).unwrap();
        let f = euribor.zero_rate(t, Compounding::Continuous).unwrap();
        println!("{t:>6.1} {:>9.4}% {:>9.4}%", e * 100.0, f * 100.0);
        assert!(f > e);
    }
}

#[test]
fn test_dual_curve_sequential_matches_joint() {
    init_tracing();
    let sequential = curve_set().bootstrap().unwrap();
    let joint = curve_set().force_simultaneous(true).bootstrap().unwrap();

    let mut worst = 0.0_f64;
    for id in [CurveId::new("EONIA"), CurveId::new("EURIBOR6M")] {
        let s = &sequential[&id];
        let j = &joint[&id];
        assert_eq!(s.dates(), j.dates());
        for date in &s.dates()[1..] {
            let zs = s.zero_rate_at(*date, Compounding::Continuous).unwrap();
            let zj = j.zero_rate_at(*date, Compounding::Continuous).unwrap();
            worst = worst.max((zs - zj).abs());
        }
    }
    println!("Largest pillar zero rate difference: {worst:.3e}");
    assert!(worst < 1e-9);
}

#[test]
fn test_quote_update_moves_forecast_curve_only() {
    init_tracing();
    let trade = trade_date();
    let quote = Quote::new(0.01104);
    let mut euribor = PiecewiseCurveBuilder::new(trade)
        .with_id("EURIBOR6M")
        .with_value_type(ValueType::ZeroYield)
        .with_interpolation(InterpolationMethod::Linear)
        .with_config(config());
    for (tenor, rate) in DEPOSITS {
        euribor.add_helper(eur::deposit(tenor, rate, trade).unwrap());
    }
    for (tenor, rate) in SWAPS {
        let swap = if tenor == "10Y" {
            let conventions = SwapConventions::euribor_6m();
            SwapHelper::from_tenor(quote.clone(), trade, tenor.parse().unwrap(), &conventions)
                .unwrap()
        } else {
            eur::euribor_6m_swap(tenor, rate, trade).unwrap()
        };
        euribor.add_helper(swap.with_discount_curve(CurveSource::Linked(CurveId::new("EONIA"))));
    }
    let set = CurveSet::new()
        .with_curve(eonia_builder())
        .unwrap()
        .with_curve(euribor)
        .unwrap();

    let before = set.bootstrap().unwrap();
    quote.set_value(0.01204);
    let after = set.bootstrap().unwrap();

    let eonia = CurveId::new("EONIA");
    let euribor = CurveId::new("EURIBOR6M");
    assert_eq!(before[&eonia].values(), after[&eonia].values());

    let z_before = before[&euribor].zero_rate(9.5, Compounding::Continuous).unwrap();
    let z_after = after[&euribor].zero_rate(9.5, Compounding::Continuous).unwrap();
    assert!(z_after > z_before + 5e-4);
}
