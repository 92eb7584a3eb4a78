//! # task-analytics
//!
//! Time-series analytics engine for task-management dashboards.
//!
//! This crate turns an ordered sequence of observations into plain, serializable
//! results: anomaly lists (five detection strategies plus a consensus ensemble),
//! forecasts with confidence bounds, trend analysis and a bounded risk score.
//! Every entry point is a synchronous, side-effect-free function of its input.

pub mod analytics;
pub mod config;
pub mod error;
pub mod logging;

pub use crate::analytics::{
    analyze_series, detect_anomalies, detect_ensemble, forecast, score_risk, Anomaly,
    AnomalyConfig, AnomalyDetectionResult, AnomalyDetector, AnomalyMethod, DataPoint,
    ForecastConfig, ForecastMethod, ForecastPoint, ForecastResult, Forecaster, RiskScore,
    RiskScorer, RiskThresholds, SeriesReport, TrendAnalysis, TrendAnalyzer,
};
pub use crate::config::AnalyticsConfig;
pub use crate::error::{Error, Result};
