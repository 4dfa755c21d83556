//! Benchmarks for the curve bootstraps.
//!
//! Run with: cargo bench -p pillar-curves

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pillar_curves::prelude::*;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

const SWAP_TENORS: [&str; 12] = [
    "2Y", "3Y", "4Y", "5Y", "6Y", "7Y", "8Y", "10Y", "12Y", "15Y", "20Y", "30Y",
];

fn trade_date() -> Date {
    Date::from_ymd(2025, 1, 2).unwrap()
}

/// Deposits followed by `swaps` par swaps on an upward sloping curve.
fn euribor_builder(swaps: usize) -> PiecewiseCurveBuilder {
    let trade = trade_date();
    let mut builder = PiecewiseCurveBuilder::new(trade).with_id("EURIBOR6M");
    for (tenor, rate) in [("1M", 0.0280), ("3M", 0.0285), ("6M", 0.0290)] {
        builder.add_helper(eur::deposit(tenor, rate, trade).unwrap());
    }
    for (k, tenor) in SWAP_TENORS.iter().take(swaps).enumerate() {
        let rate = 0.0295 + 0.0005 * k as f64;
        builder.add_helper(eur::euribor_6m_swap(tenor, rate, trade).unwrap());
    }
    builder
}

fn estr_builder() -> PiecewiseCurveBuilder {
    let trade = trade_date();
    let mut builder = PiecewiseCurveBuilder::new(trade).with_id("ESTR");
    for (k, tenor) in ["6M", "1Y", "2Y", "3Y", "5Y", "7Y", "10Y", "15Y", "20Y", "30Y"]
        .iter()
        .enumerate()
    {
        builder.add_helper(eur::estr_ois(tenor, 0.0260 + 0.0004 * k as f64, trade).unwrap());
    }
    builder
}

// =============================================================================
// SINGLE CURVE
// =============================================================================

fn bench_iterative_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterative_log_linear");

    for swaps in [3, 6, 12] {
        let builder = euribor_builder(swaps);
        group.throughput(Throughput::Elements(builder.helpers().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(swaps), &builder, |b, builder| {
            b.iter(|| black_box(builder).bootstrap().unwrap())
        });
    }
    group.finish();
}

fn bench_interpolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolation_12_swaps");
    group.sample_size(30);

    for (value_type, method) in [
        (ValueType::Discount, InterpolationMethod::LogLinear),
        (ValueType::ZeroYield, InterpolationMethod::Linear),
        (ValueType::ForwardRate, InterpolationMethod::BackwardFlat),
        (ValueType::ZeroYield, InterpolationMethod::CubicSpline),
    ] {
        let builder = euribor_builder(12)
            .with_value_type(value_type)
            .with_interpolation(method);
        group.bench_function(format!("{value_type}/{method}"), |b| {
            b.iter(|| black_box(&builder).bootstrap().unwrap())
        });
    }
    group.finish();
}

fn bench_method_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("method_comparison_6_swaps");
    group.sample_size(20);

    let iterative = euribor_builder(6);
    let simultaneous = euribor_builder(6).with_method(BootstrapMethod::Simultaneous);

    group.bench_function("iterative", |b| {
        b.iter(|| black_box(&iterative).bootstrap().unwrap())
    });
    group.bench_function("simultaneous", |b| {
        b.iter(|| black_box(&simultaneous).bootstrap().unwrap())
    });
    group.finish();
}

// =============================================================================
// CURVE SETS
// =============================================================================

fn dual_curve_set() -> CurveSet {
    let trade = trade_date();
    let mut euribor = PiecewiseCurveBuilder::new(trade).with_id("EURIBOR6M");
    euribor.add_helper(eur::deposit("6M", 0.0290, trade).unwrap());
    for (k, tenor) in SWAP_TENORS.iter().take(6).enumerate() {
        euribor.add_helper(
            eur::euribor_6m_swap(tenor, 0.0295 + 0.0005 * k as f64, trade)
                .unwrap()
                .with_discount_curve(CurveSource::Linked(CurveId::new("ESTR"))),
        );
    }
    CurveSet::new()
        .with_config(BootstrapConfig::default().with_extrapolation(true))
        .with_curve(estr_builder().with_config(BootstrapConfig::default().with_extrapolation(true)))
        .unwrap()
        .with_curve(euribor)
        .unwrap()
}

fn bench_curve_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("dual_curve");
    group.sample_size(10);

    let sequential = dual_curve_set();
    let joint = dual_curve_set().force_simultaneous(true);

    group.bench_function("sequential", |b| {
        b.iter(|| black_box(&sequential).bootstrap().unwrap())
    });
    group.bench_function("simultaneous", |b| {
        b.iter(|| black_box(&joint).bootstrap().unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_iterative_by_size,
    bench_interpolation,
    bench_method_comparison,
    bench_curve_set,
);
criterion_main!(benches);
