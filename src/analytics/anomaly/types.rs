//! Anomaly Detection Types
//!
//! 異常検知用の型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// 移動平均法の既定ウィンドウ
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 10;
/// トレンド変化検知の既定ウィンドウ
pub const DEFAULT_TREND_CHANGE_WINDOW: usize = 5;

/// 異常検知アルゴリズム
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnomalyMethod {
    /// Z-スコア法
    #[default]
    ZScore,
    /// IQR法（四分位範囲）
    Iqr,
    /// 移動平均乖離法
    MovingAverage,
    /// 季節性ベースライン法
    Seasonal,
    /// トレンド反転検知
    TrendChange,
}

impl AnomalyMethod {
    /// 手法名
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyMethod::ZScore => "zscore",
            AnomalyMethod::Iqr => "iqr",
            AnomalyMethod::MovingAverage => "moving_average",
            AnomalyMethod::Seasonal => "seasonal",
            AnomalyMethod::TrendChange => "trend_change",
        }
    }

    /// 名前から手法を選択。未知の名前は Z-スコア法にフォールバックする。
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "zscore" | "z_score" | "" => AnomalyMethod::ZScore,
            "iqr" => AnomalyMethod::Iqr,
            "moving_average" | "movingaverage" | "ma" => AnomalyMethod::MovingAverage,
            "seasonal" => AnomalyMethod::Seasonal,
            "trend_change" | "trendchange" => AnomalyMethod::TrendChange,
            other => {
                tracing::warn!(method = other, "Unknown anomaly method, falling back to zscore");
                AnomalyMethod::ZScore
            }
        }
    }
}

impl fmt::Display for AnomalyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for AnomalyMethod {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<String> for AnomalyMethod {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<AnomalyMethod> for String {
    fn from(method: AnomalyMethod) -> Self {
        method.as_str().to_string()
    }
}

/// 異常検知設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AnomalyConfig {
    /// 検知手法
    pub method: AnomalyMethod,
    /// 感度（0.0-1.0）。高いほど閾値が下がる
    #[validate(range(min = 0.0, max = 1.0))]
    pub sensitivity: f64,
    /// 参照ウィンドウ。未指定時は手法ごとの既定値
    #[validate(range(min = 1))]
    pub lookback_window: Option<usize>,
    /// 季節周期
    #[validate(range(min = 2))]
    pub seasonal_period: usize,
    /// Z-スコア法の基準閾値
    #[validate(range(exclusive_min = 0.0))]
    pub min_anomaly_score: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            method: AnomalyMethod::ZScore,
            sensitivity: 0.5,
            lookback_window: None,
            seasonal_period: 7,
            min_anomaly_score: 2.5,
        }
    }
}

impl AnomalyConfig {
    /// 手法を指定して既定設定を作成
    pub fn for_method(method: AnomalyMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// 感度を設定
    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// 参照ウィンドウを設定
    pub fn with_lookback_window(mut self, window: usize) -> Self {
        self.lookback_window = Some(window);
        self
    }

    /// 季節周期を設定
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    /// 手法に応じた実効ウィンドウ
    pub fn effective_lookback(&self, method: AnomalyMethod) -> usize {
        self.lookback_window.unwrap_or(match method {
            AnomalyMethod::TrendChange => DEFAULT_TREND_CHANGE_WINDOW,
            _ => DEFAULT_MOVING_AVERAGE_WINDOW,
        })
    }
}

/// 異常の深刻度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// 正規化スコア（閾値 1 単位）から深刻度を決定
    pub fn from_ratio(ratio: f64) -> Self {
        let ratio = ratio.abs();
        if ratio > 3.0 {
            Severity::Critical
        } else if ratio > 2.0 {
            Severity::High
        } else if ratio > 1.5 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// 異常の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    /// 急上昇
    Spike,
    /// 急降下
    Drop,
    /// トレンド反転
    TrendChange,
    /// 外れ値
    Outlier,
    /// 季節パターンからの逸脱
    PatternBreak,
}

impl AnomalyType {
    /// 期待値との大小から急上昇/急降下を判定
    pub fn from_direction(value: f64, expected: f64) -> Self {
        if value > expected {
            AnomalyType::Spike
        } else {
            AnomalyType::Drop
        }
    }
}

/// 検出された異常
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    /// 入力系列内の位置
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub value: f64,
    pub expected_value: f64,
    /// value - expected_value
    pub deviation: f64,
    pub severity: Severity,
    /// 確信度（0.0-1.0）
    pub confidence: f64,
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    pub description: String,
}

/// 正常範囲
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// 異常検知結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyDetectionResult {
    pub anomalies: Vec<Anomaly>,
    pub normal_range: NormalRange,
    pub total_data_points: usize,
    pub anomaly_count: usize,
    pub anomaly_rate: f64,
}

impl AnomalyDetectionResult {
    /// 異常リストから結果を作成（件数と割合を導出）
    pub fn new(anomalies: Vec<Anomaly>, normal_range: NormalRange, total_data_points: usize) -> Self {
        let anomaly_count = anomalies.len();
        let anomaly_rate = if total_data_points == 0 {
            0.0
        } else {
            anomaly_count as f64 / total_data_points as f64
        };
        Self {
            anomalies,
            normal_range,
            total_data_points,
            anomaly_count,
            anomaly_rate,
        }
    }

    /// 異常として検出されたインデックス
    pub fn indices(&self) -> Vec<usize> {
        self.anomalies.iter().map(|a| a.index).collect()
    }

    /// 指定インデックスが異常か
    pub fn contains_index(&self, index: usize) -> bool {
        self.anomalies.iter().any(|a| a.index == index)
    }
}
