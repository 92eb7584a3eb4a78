//! Anomaly Detector Implementation
//!
//! 異常検知器の実装

use super::types::{
    Anomaly, AnomalyConfig, AnomalyDetectionResult, AnomalyMethod, AnomalyType, NormalRange,
    Severity,
};
use crate::analytics::series::{checked_values, DataPoint};
use crate::analytics::statistics;
use crate::error::{Error, Result};
use tracing::debug;
use validator::Validate;

/// 季節性検知の基準閾値
const SEASONAL_Z_THRESHOLD: f64 = 2.5;
/// IQR法の基準倍率
const IQR_BASE_MULTIPLIER: f64 = 1.5;
/// トレンド反転とみなす傾きの差
const TREND_CHANGE_MIN_DELTA: f64 = 0.1;

/// 手法ごとに必要な最小データ数
pub fn required_points(method: AnomalyMethod, config: &AnomalyConfig) -> Result<usize> {
    let required = match method {
        AnomalyMethod::ZScore | AnomalyMethod::MovingAverage => 2,
        AnomalyMethod::Iqr => 4,
        AnomalyMethod::Seasonal => config.seasonal_period.max(2),
        AnomalyMethod::TrendChange => {
            let window = config.effective_lookback(method);
            window
                .checked_mul(2)
                .and_then(|n| n.checked_add(1))
                .ok_or_else(|| {
                    Error::InvalidArgument(format!("lookback window {} is too large", window))
                })?
        }
    };
    Ok(required)
}

/// 設定の手法で異常を検知
pub fn detect_anomalies(
    points: &[DataPoint],
    config: &AnomalyConfig,
) -> Result<AnomalyDetectionResult> {
    AnomalyDetector::new(config.clone()).detect(points)
}

/// 異常検知器
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    /// 検知設定
    config: AnomalyConfig,
}

impl AnomalyDetector {
    /// 新しい異常検知器を作成
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// 検知設定
    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// 手法を差し替えた検知器
    pub fn with_method(&self, method: AnomalyMethod) -> Self {
        Self::new(AnomalyConfig {
            method,
            ..self.config.clone()
        })
    }

    /// 異常を検知
    pub fn detect(&self, points: &[DataPoint]) -> Result<AnomalyDetectionResult> {
        self.config.validate()?;

        let method = self.config.method;
        let result = match method {
            AnomalyMethod::ZScore => self.detect_zscore(points),
            AnomalyMethod::Iqr => self.detect_iqr(points),
            AnomalyMethod::MovingAverage => self.detect_moving_average(points),
            AnomalyMethod::Seasonal => self.detect_seasonal(points),
            AnomalyMethod::TrendChange => self.detect_trend_change(points),
        }?;

        debug!(
            method = %method,
            total = result.total_data_points,
            anomalies = result.anomaly_count,
            "Anomaly detection complete"
        );
        Ok(result)
    }

    fn values(&self, method: AnomalyMethod, points: &[DataPoint]) -> Result<Vec<f64>> {
        checked_values(
            method.as_str(),
            points,
            required_points(method, &self.config)?,
        )
    }

    /// Z-スコア法による異常検知
    fn detect_zscore(&self, points: &[DataPoint]) -> Result<AnomalyDetectionResult> {
        let values = self.values(AnomalyMethod::ZScore, points)?;
        let mean = statistics::mean(&values);
        let std_dev = statistics::std_dev(&values);
        let threshold = self.config.min_anomaly_score * (1.0 - self.config.sensitivity * 0.5);

        let anomalies = points
            .iter()
            .enumerate()
            .filter_map(|(index, point)| {
                let z = statistics::z_score(point.value, mean, std_dev);
                if z.abs() <= threshold {
                    return None;
                }
                let direction = if z > 0.0 { "above" } else { "below" };
                Some(build_anomaly(
                    index,
                    point,
                    mean,
                    Severity::from_ratio(z),
                    (z.abs() / 5.0).min(1.0),
                    AnomalyType::from_direction(point.value, mean),
                    format!(
                        "Value {:.2} is {:.2} standard deviations {} the mean ({:.2})",
                        point.value,
                        z.abs(),
                        direction,
                        mean
                    ),
                ))
            })
            .collect();

        let range = NormalRange {
            min: mean - threshold * std_dev,
            max: mean + threshold * std_dev,
            mean,
            std_dev,
        };
        Ok(AnomalyDetectionResult::new(anomalies, range, points.len()))
    }

    /// IQR法による異常検知
    fn detect_iqr(&self, points: &[DataPoint]) -> Result<AnomalyDetectionResult> {
        let values = self.values(AnomalyMethod::Iqr, points)?;
        let quartiles = statistics::quartiles(&values);
        let iqr = quartiles.iqr();
        let std_dev = statistics::std_dev(&values);
        let multiplier = IQR_BASE_MULTIPLIER * (1.0 - self.config.sensitivity * 0.3);

        let lower_bound = quartiles.q1 - multiplier * iqr;
        let upper_bound = quartiles.q3 + multiplier * iqr;
        // IQR が 0 の場合は標準偏差で正規化
        let scale = if iqr > f64::EPSILON { iqr } else { std_dev };

        let anomalies = points
            .iter()
            .enumerate()
            .filter(|(_, point)| point.value < lower_bound || point.value > upper_bound)
            .map(|(index, point)| {
                let normalized = if scale > 0.0 {
                    (point.value - quartiles.q2) / scale
                } else {
                    0.0
                };
                build_anomaly(
                    index,
                    point,
                    quartiles.q2,
                    Severity::from_ratio(normalized),
                    (normalized.abs() / 3.0).min(1.0),
                    AnomalyType::Outlier,
                    format!(
                        "Value {:.2} is outside the IQR fence [{:.2}, {:.2}]",
                        point.value, lower_bound, upper_bound
                    ),
                )
            })
            .collect();

        let range = NormalRange {
            min: lower_bound,
            max: upper_bound,
            mean: statistics::mean(&values),
            std_dev,
        };
        Ok(AnomalyDetectionResult::new(anomalies, range, points.len()))
    }

    /// 移動平均乖離法による異常検知
    fn detect_moving_average(&self, points: &[DataPoint]) -> Result<AnomalyDetectionResult> {
        let values = self.values(AnomalyMethod::MovingAverage, points)?;
        let window = self.config.effective_lookback(AnomalyMethod::MovingAverage);
        let averages = statistics::moving_average(&values, window);

        let deviations: Vec<f64> = values
            .iter()
            .zip(&averages)
            .map(|(value, ma)| (value - ma).abs())
            .collect();
        let avg_deviation = statistics::mean(&deviations);
        let threshold = avg_deviation * (2.0 - self.config.sensitivity);

        let anomalies = points
            .iter()
            .enumerate()
            .filter(|(index, _)| deviations[*index] > threshold)
            .map(|(index, point)| {
                let expected = averages[index];
                let ratio = if avg_deviation > 0.0 {
                    deviations[index] / avg_deviation
                } else {
                    0.0
                };
                build_anomaly(
                    index,
                    point,
                    expected,
                    Severity::from_ratio(ratio),
                    (ratio / 5.0).min(1.0),
                    AnomalyType::from_direction(point.value, expected),
                    format!(
                        "Value {:.2} deviates {:.2} from the {}-period moving average ({:.2})",
                        point.value, deviations[index], window, expected
                    ),
                )
            })
            .collect();

        let mean = statistics::mean(&values);
        let range = NormalRange {
            min: mean - threshold,
            max: mean + threshold,
            mean,
            std_dev: statistics::std_dev(&values),
        };
        Ok(AnomalyDetectionResult::new(anomalies, range, points.len()))
    }

    /// 季節性ベースラインによる異常検知
    fn detect_seasonal(&self, points: &[DataPoint]) -> Result<AnomalyDetectionResult> {
        let values = self.values(AnomalyMethod::Seasonal, points)?;
        let period = self.config.seasonal_period;

        let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); period];
        for (i, &value) in values.iter().enumerate() {
            buckets[i % period].push(value);
        }
        let baselines: Vec<(f64, f64)> = buckets
            .iter()
            .map(|bucket| (statistics::mean(bucket), statistics::std_dev(bucket)))
            .collect();

        let threshold = SEASONAL_Z_THRESHOLD * (1.0 - self.config.sensitivity * 0.5);

        let anomalies = points
            .iter()
            .enumerate()
            .filter_map(|(index, point)| {
                let (bucket_mean, bucket_std) = baselines[index % period];
                let z = statistics::z_score(point.value, bucket_mean, bucket_std);
                if z.abs() <= threshold {
                    return None;
                }
                Some(build_anomaly(
                    index,
                    point,
                    bucket_mean,
                    Severity::from_ratio(z),
                    (z.abs() / 5.0).min(1.0),
                    AnomalyType::PatternBreak,
                    format!(
                        "Value {:.2} breaks the seasonal pattern for phase {} (expected {:.2}, z = {:.2})",
                        point.value,
                        index % period,
                        bucket_mean,
                        z
                    ),
                ))
            })
            .collect();

        let mean = statistics::mean(&values);
        let std_dev = statistics::std_dev(&values);
        let range = NormalRange {
            min: mean - threshold * std_dev,
            max: mean + threshold * std_dev,
            mean,
            std_dev,
        };
        Ok(AnomalyDetectionResult::new(anomalies, range, points.len()))
    }

    /// 隣接ウィンドウの傾き比較によるトレンド反転検知
    fn detect_trend_change(&self, points: &[DataPoint]) -> Result<AnomalyDetectionResult> {
        let window = self.config.effective_lookback(AnomalyMethod::TrendChange);
        if window < 2 {
            return Err(Error::InvalidArgument(format!(
                "trend_change lookback window must be at least 2, got {}",
                window
            )));
        }
        let values = self.values(AnomalyMethod::TrendChange, points)?;
        let n = values.len();

        let mut anomalies = Vec::new();
        for index in window..n - window {
            let before = statistics::linear_regression(&values[index - window..index]);
            let after = statistics::linear_regression(&values[index..index + window]);
            let delta = after.slope - before.slope;

            if slope_sign(before.slope) == slope_sign(after.slope)
                || delta.abs() <= TREND_CHANGE_MIN_DELTA
            {
                continue;
            }

            let point = &points[index];
            let expected = before.predict(window as f64);
            anomalies.push(build_anomaly(
                index,
                point,
                expected,
                Severity::Medium,
                delta.abs().min(1.0),
                AnomalyType::TrendChange,
                format!(
                    "Trend reversed from {:+.3} to {:+.3} per period",
                    before.slope, after.slope
                ),
            ));
        }

        let range = NormalRange {
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: statistics::mean(&values),
            std_dev: statistics::std_dev(&values),
        };
        Ok(AnomalyDetectionResult::new(anomalies, range, points.len()))
    }
}

fn slope_sign(slope: f64) -> i8 {
    if slope > 0.0 {
        1
    } else if slope < 0.0 {
        -1
    } else {
        0
    }
}

fn build_anomaly(
    index: usize,
    point: &DataPoint,
    expected_value: f64,
    severity: Severity,
    confidence: f64,
    anomaly_type: AnomalyType,
    description: String,
) -> Anomaly {
    Anomaly {
        index,
        timestamp: point.timestamp,
        value: point.value,
        expected_value,
        deviation: point.value - expected_value,
        severity,
        confidence: confidence.clamp(0.0, 1.0),
        anomaly_type,
        description,
    }
}
