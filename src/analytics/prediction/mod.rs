//! Prediction Analytics Module
//!
//! 予測分析システム

pub mod accuracy;
pub mod decomposition;
mod forecaster;
mod trend;
mod types;

pub use forecaster::{forecast, required_points, z_for_confidence, Forecaster};
pub use trend::{volatility, TrendAnalyzer, MIN_TREND_POINTS};
pub use types::{
    ForecastAccuracy, ForecastConfig, ForecastMethod, ForecastPoint, ForecastResult,
    ForecastTrend, Projections, Seasonality, TrendAnalysis, TrendDirection, TREND_DEADBAND,
};
