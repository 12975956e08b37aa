//! Lag/lead throughput on synthetic balanced panels.
//!
//! Run with: `cargo bench --bench shift`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rust_panel_data::mutate::mutate;
use rust_panel_data::shift::{time_shift, ShiftOptions};
use rust_panel_data::types::{DataSet, DataType, Value};
use std::hint::black_box;

/// `entities` × `periods` rows with two float variables.
fn make_panel(entities: i64, periods: i64) -> DataSet {
    let n = (entities * periods) as usize;
    let mut ids = Vec::with_capacity(n);
    let mut times = Vec::with_capacity(n);
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);

    for e in 0..entities {
        for t in 0..periods {
            ids.push(Value::Utf8(format!("firm-{e}")));
            times.push(Value::Int64(2000 + t));
            x.push(Value::Float64((e * 31 + t * 7) as f64 % 97.0));
            y.push(Value::Float64((e + t) as f64 * 0.5));
        }
    }

    DataSet::from_columns(vec![
        ("firm", DataType::Utf8, ids),
        ("year", DataType::Int64, times),
        ("x", DataType::Float64, x),
        ("y", DataType::Float64, y),
    ])
    .expect("columns have equal length")
}

fn bench_shift(c: &mut Criterion) {
    let options = ShiftOptions::new("firm", "year");
    let mut group = c.benchmark_group("time_shift");

    for &(entities, periods) in &[(100_i64, 10_i64), (1_000, 20), (5_000, 20)] {
        let panel = make_panel(entities, periods);
        let label = format!("{entities}x{periods}");

        group.bench_with_input(BenchmarkId::new("lag1", &label), &panel, |b, p| {
            b.iter(|| time_shift(black_box(p), ["x", "y"], 1, &options).expect("lag"))
        });
        group.bench_with_input(BenchmarkId::new("lead3", &label), &panel, |b, p| {
            b.iter(|| time_shift(black_box(p), "x", -3, &options).expect("lead"))
        });
    }
    group.finish();
}

fn bench_mutate(c: &mut Criterion) {
    let panel = make_panel(1_000, 20);
    c.bench_function("mutate/query_string", |b| {
        b.iter(|| {
            mutate(
                black_box(&panel),
                "year >= 2010 and x > 40",
                "flag",
                1,
                Some(0.into()),
            )
            .expect("mutate")
        })
    });
}

criterion_group!(benches, bench_shift, bench_mutate);
criterion_main!(benches);
