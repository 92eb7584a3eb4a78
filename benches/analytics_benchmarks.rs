use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use task_analytics::analytics::series::from_values;
use task_analytics::{
    analyze_series, detect_anomalies, detect_ensemble, forecast, AnalyticsConfig, AnomalyConfig,
    AnomalyMethod, DataPoint, ForecastConfig, ForecastMethod,
};

fn noisy_series(n: usize) -> Vec<DataPoint> {
    let mut rng = StdRng::seed_from_u64(7);
    let values: Vec<f64> = (0..n)
        .map(|i| 100.0 + 0.5 * i as f64 + 10.0 * ((i % 7) as f64) + rng.gen_range(-5.0..5.0))
        .collect();
    from_values(&values)
}

fn benchmark_anomaly_detection(c: &mut Criterion) {
    let points = noisy_series(1_000);
    let mut group = c.benchmark_group("anomaly_detection");

    for method in [
        AnomalyMethod::ZScore,
        AnomalyMethod::Iqr,
        AnomalyMethod::MovingAverage,
        AnomalyMethod::Seasonal,
        AnomalyMethod::TrendChange,
    ] {
        let config = AnomalyConfig::for_method(method);
        group.bench_with_input(BenchmarkId::from_parameter(method), &config, |b, config| {
            b.iter(|| detect_anomalies(black_box(&points), config).unwrap())
        });
    }

    let config = AnomalyConfig::default();
    group.bench_function("ensemble", |b| {
        b.iter(|| detect_ensemble(black_box(&points), &config).unwrap())
    });
    group.finish();
}

fn benchmark_forecast(c: &mut Criterion) {
    let points = noisy_series(1_000);
    let mut group = c.benchmark_group("forecast");

    for method in [
        ForecastMethod::Linear,
        ForecastMethod::Exponential,
        ForecastMethod::Seasonal,
    ] {
        let config = ForecastConfig::new(method, 30);
        group.bench_with_input(BenchmarkId::from_parameter(method), &config, |b, config| {
            b.iter(|| forecast(black_box(&points), config).unwrap())
        });
    }
    group.finish();
}

fn benchmark_series_report(c: &mut Criterion) {
    let points = noisy_series(365);
    let config = AnalyticsConfig::default();

    c.bench_function("series_report_365", |b| {
        b.iter(|| analyze_series(black_box(&points), &config).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_anomaly_detection,
    benchmark_forecast,
    benchmark_series_report
);
criterion_main!(benches);
