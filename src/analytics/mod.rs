//! Analytics Module
//!
//! 時系列分析エンジン（異常検知・予測・トレンド分析・リスク評価）

pub mod anomaly;
pub mod prediction;
pub mod report;
pub mod risk;
pub mod series;
pub mod statistics;

pub use anomaly::{
    detect_anomalies, detect_ensemble, Anomaly, AnomalyConfig, AnomalyDetectionResult,
    AnomalyDetector, AnomalyMethod, AnomalyType, NormalRange, Severity,
};
pub use prediction::{
    forecast, ForecastAccuracy, ForecastConfig, ForecastMethod, ForecastPoint, ForecastResult,
    ForecastTrend, Forecaster, Projections, Seasonality, TrendAnalysis, TrendAnalyzer,
    TrendDirection,
};
pub use report::{analyze_series, SeriesReport};
pub use risk::{score_risk, RiskFactor, RiskLevel, RiskScore, RiskScorer, RiskThresholds};
pub use series::DataPoint;
