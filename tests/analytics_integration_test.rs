//! 時系列分析エンジンの統合テスト

use rand::{rngs::StdRng, Rng, SeedableRng};
use task_analytics::analytics::anomaly::{AnomalyType, Severity};
use task_analytics::analytics::risk::RiskLevel;
use task_analytics::analytics::series::from_values;
use task_analytics::analytics::statistics;
use task_analytics::analytics::TrendDirection;
use task_analytics::{
    analyze_series, detect_anomalies, detect_ensemble, forecast, score_risk, AnalyticsConfig,
    AnomalyConfig, AnomalyMethod, DataPoint, Error, ForecastConfig, ForecastMethod,
    RiskThresholds, TrendAnalyzer,
};

const ALL_FORECAST_METHODS: [ForecastMethod; 3] = [
    ForecastMethod::Linear,
    ForecastMethod::Exponential,
    ForecastMethod::Seasonal,
];

/// Box-Muller 法による正規乱数系列
fn gaussian_series(seed: u64, n: usize, mean: f64, std_dev: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
            let u2: f64 = rng.gen_range(0.0..1.0);
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            mean + std_dev * z
        })
        .collect()
}

fn with_outliers(seed: u64) -> Vec<DataPoint> {
    let mut values = gaussian_series(seed, 60, 100.0, 10.0);
    values[7] = 190.0;
    values[31] = 15.0;
    values[48] = 160.0;
    from_values(&values)
}

fn weekly_series(weeks: usize) -> Vec<DataPoint> {
    let pattern = [30.0, 34.0, 36.0, 33.0, 31.0, 12.0, 10.0];
    let values: Vec<f64> = (0..weeks * 7)
        .map(|i| pattern[i % 7] + 0.2 * i as f64)
        .collect();
    from_values(&values)
}

#[test]
fn test_single_spike_example() {
    let points = from_values(&[10.0, 10.0, 10.0, 10.0, 10.0, 50.0, 10.0, 10.0, 10.0, 10.0]);

    let zscore = detect_anomalies(&points, &AnomalyConfig::default()).unwrap();
    assert_eq!(zscore.indices(), vec![5]);
    assert_eq!(zscore.anomalies[0].anomaly_type, AnomalyType::Spike);
    assert!(matches!(
        zscore.anomalies[0].severity,
        Severity::High | Severity::Critical
    ));

    let config = AnomalyConfig::for_method(AnomalyMethod::MovingAverage).with_lookback_window(3);
    let moving_average = detect_anomalies(&points, &config).unwrap();
    assert!(moving_average.contains_index(5));
}

#[test]
fn test_zscore_count_is_monotonic_in_sensitivity() {
    for seed in 0..5 {
        let points = from_values(&gaussian_series(seed, 200, 50.0, 5.0));
        let counts: Vec<usize> = [0.0, 0.25, 0.5, 0.75, 1.0]
            .iter()
            .map(|&s| {
                let config = AnomalyConfig::default().with_sensitivity(s);
                detect_anomalies(&points, &config).unwrap().anomaly_count
            })
            .collect();
        for pair in counts.windows(2) {
            assert!(pair[0] <= pair[1], "counts not monotonic: {:?}", counts);
        }
    }
}

#[test]
fn test_iqr_fence_containment() {
    for seed in 10..15 {
        let points = with_outliers(seed);
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let q = statistics::quartiles(&values);
        let lower = q.q1 - 1.5 * q.iqr();
        let upper = q.q3 + 1.5 * q.iqr();

        // 既定感度: 1.5 IQR の外側は必ず検出される
        let default = detect_anomalies(&points, &AnomalyConfig::for_method(AnomalyMethod::Iqr))
            .unwrap();
        for (index, value) in values.iter().enumerate() {
            if *value < lower || *value > upper {
                assert!(default.contains_index(index));
            }
        }

        // 感度 0: 倍率がちょうど 1.5 になり、内側の点は検出されない
        let strict = detect_anomalies(
            &points,
            &AnomalyConfig::for_method(AnomalyMethod::Iqr).with_sensitivity(0.0),
        )
        .unwrap();
        for (index, value) in values.iter().enumerate() {
            let outside = *value < lower || *value > upper;
            assert_eq!(strict.contains_index(index), outside);
        }
    }
}

#[test]
fn test_ensemble_is_subset_of_zscore() {
    for seed in 20..30 {
        let points = with_outliers(seed);
        for sensitivity in [0.0, 0.5, 1.0] {
            let config = AnomalyConfig::default().with_sensitivity(sensitivity);
            let ensemble = detect_ensemble(&points, &config).unwrap();
            let zscore = detect_anomalies(&points, &config).unwrap();
            for anomaly in &ensemble.anomalies {
                assert!(zscore.contains_index(anomaly.index));
            }
            assert_eq!(ensemble.normal_range, zscore.normal_range);
        }
    }
}

#[test]
fn test_detection_result_invariants() {
    let points = with_outliers(42);
    let methods = [
        AnomalyMethod::ZScore,
        AnomalyMethod::Iqr,
        AnomalyMethod::MovingAverage,
        AnomalyMethod::Seasonal,
        AnomalyMethod::TrendChange,
    ];
    for method in methods {
        let result = detect_anomalies(&points, &AnomalyConfig::for_method(method)).unwrap();
        assert_eq!(result.anomaly_count, result.anomalies.len());
        assert_eq!(result.total_data_points, points.len());
        assert!((0.0..=1.0).contains(&result.anomaly_rate));
        for anomaly in &result.anomalies {
            assert!(anomaly.value.is_finite());
            assert!(anomaly.expected_value.is_finite());
            assert!((0.0..=1.0).contains(&anomaly.confidence));
            assert_eq!(anomaly.value, points[anomaly.index].value);
        }
        assert!(result.normal_range.min.is_finite() && result.normal_range.max.is_finite());
    }
}

#[test]
fn test_forecast_horizon_and_bounds() {
    let points = weekly_series(4);
    for method in ALL_FORECAST_METHODS {
        for horizon in [1, 5, 20] {
            let result = forecast(&points, &ForecastConfig::new(method, horizon)).unwrap();
            assert_eq!(result.forecast.len(), horizon);
            for point in &result.forecast {
                assert!(point.value.is_finite());
                assert!(point.lower_bound <= point.value);
                assert!(point.value <= point.upper_bound);
            }
            assert!(result.accuracy.mape.is_finite());
            assert!(result.accuracy.rmse.is_finite());
            assert!(result.accuracy.mae.is_finite());
        }
    }
}

#[test]
fn test_linear_forecast_exactness() {
    let n = 20;
    let values: Vec<f64> = (0..n).map(|i| 3.0 * i as f64 + 7.0).collect();
    let result = forecast(
        &from_values(&values),
        &ForecastConfig::new(ForecastMethod::Linear, 10),
    )
    .unwrap();

    for (h, point) in result.forecast.iter().enumerate() {
        let expected = 3.0 * (n + h) as f64 + 7.0;
        assert!((point.value - expected).abs() < 1e-6);
    }
    assert!(result.accuracy.rmse.abs() < 1e-9);
}

#[test]
fn test_forecast_timestamps_follow_sampling_interval() {
    use chrono::{Duration, TimeZone, Utc};

    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let points: Vec<DataPoint> = (0..10)
        .map(|i| DataPoint::at(start + Duration::days(i), 5.0 + i as f64))
        .collect();
    let result = forecast(&points, &ForecastConfig::new(ForecastMethod::Linear, 3)).unwrap();

    let stamps: Vec<_> = result.forecast.iter().map(|p| p.timestamp).collect();
    assert_eq!(
        stamps,
        vec![
            Some(start + Duration::days(10)),
            Some(start + Duration::days(11)),
            Some(start + Duration::days(12)),
        ]
    );
}

#[test]
fn test_trend_sign() {
    let increasing = from_values(&[1.0, 2.0, 4.0, 7.0, 11.0, 16.0]);
    let analysis = TrendAnalyzer::default().analyze(&increasing).unwrap();
    assert_eq!(analysis.direction, TrendDirection::Up);
    assert!(analysis.slope > 0.0);

    let decreasing = from_values(&[30.0, 25.0, 24.0, 18.0, 9.0, 2.0]);
    let analysis = TrendAnalyzer::default().analyze(&decreasing).unwrap();
    assert_eq!(analysis.direction, TrendDirection::Down);
    assert!(analysis.slope < 0.0);
}

#[test]
fn test_trend_sign_for_small_unit_series() {
    // 完了率のような小さな単位の系列でも方向を失わない
    let increasing: Vec<f64> = (0..12).map(|i| 0.40 + 0.002 * i as f64).collect();
    let analysis = TrendAnalyzer::default()
        .analyze(&from_values(&increasing))
        .unwrap();
    assert!(analysis.slope > 0.0 && analysis.slope < 0.01);
    assert_eq!(analysis.direction, TrendDirection::Up);

    let decreasing: Vec<f64> = increasing.iter().rev().copied().collect();
    let analysis = TrendAnalyzer::default()
        .analyze(&from_values(&decreasing))
        .unwrap();
    assert_eq!(analysis.direction, TrendDirection::Down);

    let report = analyze_series(&from_values(&decreasing), &AnalyticsConfig::default()).unwrap();
    assert_eq!(report.trend.unwrap().direction, TrendDirection::Down);
}

#[test]
fn test_tiny_base_value_keeps_report_finite() {
    let mut values = vec![1e-200];
    values.extend((1..30).map(|i| 100.0 + i as f64));
    let report = analyze_series(&from_values(&values), &AnalyticsConfig::default()).unwrap();

    let trend = report.trend.as_ref().unwrap();
    assert!(trend.volatility.is_finite());
    assert!(report.forecast.as_ref().unwrap().accuracy.mape.is_finite());
    assert!(report.risk.as_ref().unwrap().score.is_finite());
    let json = report.to_json().unwrap();
    assert!(!json.contains("null"));
}

#[test]
fn test_risk_score_bounds() {
    let thresholds = [
        RiskThresholds::default(),
        RiskThresholds::new(Some(90.0), None),
        RiskThresholds::new(Some(120.0), Some(95.0)),
    ];
    for seed in 0..10 {
        let mut values = gaussian_series(seed, 30, 100.0, 5.0 + seed as f64 * 5.0);
        // 後半を下降させる
        for (i, value) in values.iter_mut().enumerate().skip(15) {
            *value -= i as f64 * seed as f64;
        }
        let points = from_values(&values);
        for threshold in &thresholds {
            let risk = score_risk(&points, threshold).unwrap();
            assert!((0.0..=100.0).contains(&risk.score));
            assert_eq!(risk.level, RiskLevel::from_score(risk.score));
            for factor in &risk.factors {
                assert!((-1.0..=1.0).contains(&factor.impact));
            }
        }
    }
}

#[test]
fn test_degenerate_series_produce_finite_output() {
    let series = [vec![0.0; 30], vec![7.0; 30]];
    for values in series {
        let points = from_values(&values);
        let report = analyze_series(&points, &AnalyticsConfig::default()).unwrap();
        let json = report.to_json().unwrap();
        assert!(!json.contains("NaN"));
        assert!(!json.contains("null"));

        for method in ALL_FORECAST_METHODS {
            let result = forecast(&points, &ForecastConfig::new(method, 5)).unwrap();
            for point in &result.forecast {
                assert!((point.value - values[0]).abs() < 1e-9);
            }
        }
    }
}

#[test]
fn test_insufficient_data_errors() {
    let points = from_values(&[1.0, 2.0, 3.0]);

    let err = detect_anomalies(
        &points,
        &AnomalyConfig::for_method(AnomalyMethod::TrendChange),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InsufficientData { required: 11, actual: 3, .. }));

    let err = forecast(
        &points,
        &ForecastConfig::new(ForecastMethod::Seasonal, 3),
    )
    .unwrap_err();
    assert!(err.is_input_error());
}
