//! Risk Scoring Types
//!
//! リスク評価用の型定義

use serde::{Deserialize, Serialize};

/// リスクレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// スコア帯からレベルを決定
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            RiskLevel::Critical
        } else if score >= 50.0 {
            RiskLevel::High
        } else if score >= 25.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// レベルごとの推奨アクション
    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::Critical => {
                "Immediate attention required: escalate to stakeholders and re-plan the affected work."
            }
            RiskLevel::High => {
                "Review progress closely and address the contributing factors this period."
            }
            RiskLevel::Medium => "Monitor the trend and prepare mitigation if it continues.",
            RiskLevel::Low => "No action needed; continue regular monitoring.",
        }
    }
}

/// リスク要因
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    /// 影響度（-1.0〜1.0、負の値は悪化要因）
    pub impact: f64,
    pub description: String,
}

impl RiskFactor {
    /// 新しいリスク要因を作成
    pub fn new(name: impl Into<String>, impact: f64, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            impact: impact.clamp(-1.0, 1.0),
            description: description.into(),
        }
    }
}

/// リスクスコア
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// スコア（0〜100）
    pub score: f64,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
    pub recommendation: String,
}

/// 最新値に対する下限閾値
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// 警告閾値（最新値がこれを下回ると加点）
    pub warning: Option<f64>,
    /// 危険閾値（警告より優先）
    pub critical: Option<f64>,
}

impl RiskThresholds {
    /// 閾値を指定して作成
    pub fn new(warning: Option<f64>, critical: Option<f64>) -> Self {
        Self { warning, critical }
    }
}
