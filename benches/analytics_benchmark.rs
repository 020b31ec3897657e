//! Benchmarks for equilens analytics.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array3;

use equilens::core::{CancelFlag, ForecastConfig, PriceSeries, SimulationConfig};
use equilens::forecast::LstmRegressor;
use equilens::indicators::{rsi, volatility};
use equilens::portfolio::run_efficient_frontier_analysis;

/// Generate a wavy close series.
fn generate_closes(n: usize, phase: f64) -> Vec<f64> {
    let mut close = vec![100.0; n];
    for i in 1..n {
        let change = ((i as f64) * 0.1 + phase).sin() * 2.0;
        close[i] = (close[i - 1] + change).max(1.0);
    }
    close
}

fn generate_assets(n_assets: usize, len: usize) -> Vec<PriceSeries> {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    (0..n_assets)
        .map(|a| {
            let closes = generate_closes(len, a as f64 * 0.7);
            PriceSeries::from_closes(format!("A{}", a), start, &closes).unwrap()
        })
        .collect()
}

fn bench_efficient_frontier(c: &mut Criterion) {
    let mut group = c.benchmark_group("efficient_frontier");
    group.sample_size(20);

    for trials in [1000, 5000, 20000].iter() {
        group.bench_with_input(BenchmarkId::new("trials", trials), trials, |b, &trials| {
            let assets = generate_assets(5, 250);
            let config = SimulationConfig::default().with_trials(trials);

            b.iter(|| {
                let result = run_efficient_frontier_analysis(black_box(&assets), &config, &CancelFlag::new());
                black_box(result)
            });
        });
    }

    group.finish();
}

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");

    for size in [1000, 10000, 50000].iter() {
        let closes = generate_closes(*size, 0.0);
        group.bench_with_input(BenchmarkId::new("rsi", size), &closes, |b, closes| {
            b.iter(|| black_box(rsi(black_box(closes), 14)))
        });
        group.bench_with_input(BenchmarkId::new("volatility", size), &closes, |b, closes| {
            b.iter(|| black_box(volatility(black_box(closes))))
        });
    }

    group.finish();
}

fn bench_lstm_epoch(c: &mut Criterion) {
    let mut group = c.benchmark_group("lstm");
    group.sample_size(10);

    let inputs = Array3::from_shape_fn((200, 5, 6), |(n, t, f)| ((n + t + f) as f64 * 0.05).sin() * 0.5 + 0.5);
    let targets = inputs.slice(ndarray::s![.., 4, 1]).to_owned();
    let config = ForecastConfig::default().with_epochs(1);

    group.bench_function("epoch_200x5x6_h50", |b| {
        b.iter(|| {
            let mut model = LstmRegressor::new(6, 50, 42).unwrap();
            let history = model.fit(&inputs, &targets, &config, &CancelFlag::new(), |_| {});
            black_box(history)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_efficient_frontier, bench_indicators, bench_lstm_epoch);
criterion_main!(benches);
