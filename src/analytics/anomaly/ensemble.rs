//! Ensemble Anomaly Detection
//!
//! 複数手法の合議による異常検知

use super::detector::{required_points, AnomalyDetector};
use super::types::{AnomalyConfig, AnomalyDetectionResult, AnomalyMethod};
use crate::analytics::series::{ensure_min_len, DataPoint};
use crate::error::Result;
use std::collections::HashMap;
use tracing::debug;

/// 合議に参加する手法
pub const ENSEMBLE_METHODS: [AnomalyMethod; 3] = [
    AnomalyMethod::ZScore,
    AnomalyMethod::Iqr,
    AnomalyMethod::MovingAverage,
];

/// 異常と確定するのに必要な票数
pub const MIN_VOTES: usize = 2;

/// Z-スコア法・IQR法・移動平均法を同じ設定で実行し、2手法以上が検出した
/// Z-スコア法の異常のみを残す。正常範囲は Z-スコア法の結果を用いる。
pub fn detect_ensemble(
    points: &[DataPoint],
    config: &AnomalyConfig,
) -> Result<AnomalyDetectionResult> {
    let mut required = 0;
    for &method in &ENSEMBLE_METHODS {
        required = required.max(required_points(method, config)?);
    }
    ensure_min_len("ensemble", points, required)?;

    let detector = AnomalyDetector::new(config.clone());
    let zscore = detector.with_method(AnomalyMethod::ZScore).detect(points)?;
    let iqr = detector.with_method(AnomalyMethod::Iqr).detect(points)?;
    let moving_average = detector
        .with_method(AnomalyMethod::MovingAverage)
        .detect(points)?;

    let mut votes: HashMap<usize, usize> = HashMap::new();
    for result in [&zscore, &iqr, &moving_average] {
        for anomaly in &result.anomalies {
            *votes.entry(anomaly.index).or_insert(0) += 1;
        }
    }

    let candidates = zscore.anomaly_count;
    let confirmed = zscore
        .anomalies
        .into_iter()
        .filter(|anomaly| votes.get(&anomaly.index).copied().unwrap_or(0) >= MIN_VOTES)
        .collect();

    let result = AnomalyDetectionResult::new(confirmed, zscore.normal_range, points.len());
    debug!(
        candidates,
        confirmed = result.anomaly_count,
        "Ensemble detection complete"
    );
    Ok(result)
}
