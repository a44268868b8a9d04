//! Benchmarks for the indicator bundle.

use charter_core::{Candle, CandleSeries};
use charter_indicators::{IndicatorBundle, IndicatorParams};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn generate_random_candles(count: usize) -> CandleSeries {
    let mut rng = StdRng::seed_from_u64(42);
    let mut price = 100.0;
    let candles = (0..count)
        .map(|i| {
            let open = price;
            price = (price + rng.gen_range(-1.5..1.5_f64)).max(1.0);
            let close = price;
            let high = open.max(close) + rng.gen_range(0.0..1.0);
            let low = (open.min(close) - rng.gen_range(0.0..1.0)).max(0.5);
            Candle::new(i as f64 * 60.0, open, high, low, close, rng.gen_range(10.0..1000.0))
        })
        .collect();
    CandleSeries::from_candles(candles)
}

fn bench_bundle(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_bundle");
    let params = IndicatorParams::default();

    for size in [500, 2_000, 10_000] {
        let series = generate_random_candles(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &series, |b, series| {
            b.iter(|| IndicatorBundle::compute(black_box(series), &params));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bundle);
criterion_main!(benches);
