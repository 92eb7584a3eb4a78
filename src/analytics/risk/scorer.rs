//! Risk Scorer
//!
//! トレンド・ボラティリティ・閾値超過からリスクスコアを算出する

use super::types::{RiskFactor, RiskLevel, RiskScore, RiskThresholds};
use crate::analytics::prediction::{TrendAnalysis, TrendAnalyzer, TrendDirection};
use crate::analytics::series::DataPoint;
use crate::error::Result;
use tracing::debug;

const BASE_SCORE: f64 = 50.0;
const DECLINE_WEIGHT: f64 = 20.0;
const VOLATILITY_WEIGHT: f64 = 15.0;
/// ボラティリティ（%）がこれを超えるとリスク要因
const VOLATILITY_LIMIT: f64 = 10.0;
const CRITICAL_BREACH_POINTS: f64 = 30.0;
const WARNING_BREACH_POINTS: f64 = 15.0;

/// 系列のリスクを評価
pub fn score_risk(points: &[DataPoint], thresholds: &RiskThresholds) -> Result<RiskScore> {
    RiskScorer::new(*thresholds).score(points)
}

/// リスク評価器
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    thresholds: RiskThresholds,
    analyzer: TrendAnalyzer,
}

impl RiskScorer {
    /// 新しいリスク評価器を作成
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self {
            thresholds,
            analyzer: TrendAnalyzer::default(),
        }
    }

    /// トレンド分析器を差し替え
    pub fn with_analyzer(mut self, analyzer: TrendAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// 系列を分析してスコアを算出
    pub fn score(&self, points: &[DataPoint]) -> Result<RiskScore> {
        let analysis = self.analyzer.analyze(points)?;
        // analyze が 2 点以上を保証する
        let latest = points.last().map(|p| p.value).unwrap_or_default();
        Ok(self.score_analysis(&analysis, latest))
    }

    /// 分析済みのトレンドと最新値からスコアを算出
    pub fn score_analysis(&self, analysis: &TrendAnalysis, latest: f64) -> RiskScore {
        let mut score = BASE_SCORE;
        let mut factors = Vec::new();

        if analysis.direction == TrendDirection::Down {
            let impact = (analysis.change_rate.abs() / 10.0).min(1.0);
            score += impact * DECLINE_WEIGHT;
            factors.push(RiskFactor::new(
                "declining_trend",
                -impact,
                format!(
                    "Values are declining by {:.1}% per period",
                    analysis.change_rate.abs()
                ),
            ));
        }

        if analysis.volatility > VOLATILITY_LIMIT {
            let impact = (analysis.volatility / 50.0).min(1.0);
            score += impact * VOLATILITY_WEIGHT;
            factors.push(RiskFactor::new(
                "high_volatility",
                -impact,
                format!(
                    "Period-over-period volatility is {:.1}%",
                    analysis.volatility
                ),
            ));
        }

        match (self.thresholds.critical, self.thresholds.warning) {
            (Some(critical), _) if latest < critical => {
                score += CRITICAL_BREACH_POINTS;
                factors.push(RiskFactor::new(
                    "critical_threshold_breach",
                    -1.0,
                    format!(
                        "Latest value {:.2} is below the critical threshold {:.2}",
                        latest, critical
                    ),
                ));
            }
            (_, Some(warning)) if latest < warning => {
                score += WARNING_BREACH_POINTS;
                factors.push(RiskFactor::new(
                    "warning_threshold_breach",
                    -0.5,
                    format!(
                        "Latest value {:.2} is below the warning threshold {:.2}",
                        latest, warning
                    ),
                ));
            }
            _ => {}
        }

        let score = score.clamp(0.0, 100.0);
        let level = RiskLevel::from_score(score);
        debug!(score, level = ?level, factors = factors.len(), "Risk score computed");

        RiskScore {
            score,
            level,
            factors,
            recommendation: level.recommendation().to_string(),
        }
    }
}
