//! Risk Scoring Module
//!
//! リスク評価システム

mod scorer;
mod types;

pub use scorer::{score_risk, RiskScorer};
pub use types::{RiskFactor, RiskLevel, RiskScore, RiskThresholds};
