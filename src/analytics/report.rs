//! Series Report
//!
//! 1系列に対する異常検知・予測・トレンド・リスクの一括分析

use crate::analytics::anomaly::{detect_ensemble, AnomalyDetectionResult};
use crate::analytics::prediction::{forecast, ForecastResult, TrendAnalysis, TrendAnalyzer};
use crate::analytics::risk::{RiskScore, RiskScorer};
use crate::analytics::series::{ensure_finite, DataPoint};
use crate::config::AnalyticsConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// 一括分析結果
///
/// データ不足で実行できなかった分析は `None` になる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesReport {
    pub total_data_points: usize,
    pub anomalies: Option<AnomalyDetectionResult>,
    pub forecast: Option<ForecastResult>,
    pub trend: Option<TrendAnalysis>,
    pub risk: Option<RiskScore>,
}

impl SeriesReport {
    /// JSON 文字列に変換
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// データ不足のみを「結果なし」として扱う
fn skip_insufficient<T>(component: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::InsufficientData {
            required, actual, ..
        }) => {
            info!(component, required, actual, "Skipping analysis: insufficient data");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// 設定に従って系列を一括分析
#[instrument(skip(points, config), fields(len = points.len()))]
pub fn analyze_series(points: &[DataPoint], config: &AnalyticsConfig) -> Result<SeriesReport> {
    ensure_finite(points)?;

    let anomalies = skip_insufficient("anomalies", detect_ensemble(points, &config.anomaly))?;
    let forecast = skip_insufficient("forecast", forecast(points, &config.forecast))?;
    let trend = skip_insufficient("trend", TrendAnalyzer::default().analyze(points))?;

    let risk = match (&trend, points.last()) {
        (Some(analysis), Some(latest)) => {
            Some(RiskScorer::new(config.risk).score_analysis(analysis, latest.value))
        }
        _ => None,
    };

    Ok(SeriesReport {
        total_data_points: points.len(),
        anomalies,
        forecast,
        trend,
        risk,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::risk::score_risk;
    use crate::analytics::series::from_values;

    #[test]
    fn test_full_report() {
        let values: Vec<f64> = (0..30)
            .map(|i| if i == 17 { 90.0 } else { 20.0 + (i % 3) as f64 })
            .collect();
        let points = from_values(&values);
        let config = AnalyticsConfig::default();

        let report = analyze_series(&points, &config).unwrap();
        assert_eq!(report.total_data_points, 30);
        assert!(report.anomalies.as_ref().unwrap().contains_index(17));
        assert_eq!(report.forecast.as_ref().unwrap().forecast.len(), config.forecast.horizon);

        // 一括分析のリスクは単独評価と一致する
        let standalone = score_risk(&points, &config.risk).unwrap();
        assert_eq!(report.risk.unwrap(), standalone);
    }

    #[test]
    fn test_short_series_skips_components() {
        let report = analyze_series(&from_values(&[1.0, 2.0]), &AnalyticsConfig::default()).unwrap();
        assert!(report.anomalies.is_none());
        assert!(report.forecast.is_none());
        assert!(report.trend.is_some());
        assert!(report.risk.is_some());
    }

    #[test]
    fn test_invalid_values_fail_the_report() {
        let err = analyze_series(&from_values(&[1.0, f64::NAN, 2.0, 3.0]), &AnalyticsConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_report_json_uses_camel_case() {
        let report = analyze_series(
            &from_values(&[5.0, 6.0, 7.0, 8.0, 9.0]),
            &AnalyticsConfig::default(),
        )
        .unwrap();
        let json = report.to_json().unwrap();
        assert!(json.contains("totalDataPoints"));
        assert!(json.contains("rSquared"));
        assert!(json.contains("lowerBound"));
    }
}
