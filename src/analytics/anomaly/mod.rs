//! Anomaly Detection Module
//!
//! 異常検知システム

mod detector;
mod ensemble;
mod types;

pub use detector::{detect_anomalies, required_points, AnomalyDetector};
pub use ensemble::{detect_ensemble, ENSEMBLE_METHODS, MIN_VOTES};
pub use types::{
    Anomaly, AnomalyConfig, AnomalyDetectionResult, AnomalyMethod, AnomalyType, NormalRange,
    Severity, DEFAULT_MOVING_AVERAGE_WINDOW, DEFAULT_TREND_CHANGE_WINDOW,
};
