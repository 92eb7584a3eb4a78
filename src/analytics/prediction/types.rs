//! Prediction Types
//!
//! 予測分析用の型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// 予測トレンドで傾きを「横ばい」とみなす幅
pub const TREND_DEADBAND: f64 = 0.01;

/// 予測手法
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ForecastMethod {
    /// 線形回帰
    #[default]
    Linear,
    /// Holt の二重指数平滑化
    Exponential,
    /// 季節分解 + トレンド外挿
    Seasonal,
}

impl ForecastMethod {
    /// 手法名
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMethod::Linear => "linear",
            ForecastMethod::Exponential => "exponential",
            ForecastMethod::Seasonal => "seasonal",
        }
    }

    /// 名前から手法を選択。未知の名前は線形回帰にフォールバックする。
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" | "regression" | "" => ForecastMethod::Linear,
            "exponential" | "holt" => ForecastMethod::Exponential,
            "seasonal" => ForecastMethod::Seasonal,
            other => {
                tracing::warn!(method = other, "Unknown forecast method, falling back to linear");
                ForecastMethod::Linear
            }
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ForecastMethod {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<String> for ForecastMethod {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<ForecastMethod> for String {
    fn from(method: ForecastMethod) -> Self {
        method.as_str().to_string()
    }
}

/// 予測設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ForecastConfig {
    /// 予測手法
    pub method: ForecastMethod,
    /// 予測する将来ポイント数
    #[validate(range(min = 1))]
    pub horizon: usize,
    /// 信頼水準
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub confidence: f64,
    /// 季節周期
    #[validate(range(min = 2))]
    pub seasonal_period: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            method: ForecastMethod::Linear,
            horizon: 7,
            confidence: 0.95,
            seasonal_period: 7,
        }
    }
}

impl ForecastConfig {
    /// 手法と予測期間を指定して作成
    pub fn new(method: ForecastMethod, horizon: usize) -> Self {
        Self {
            method,
            horizon,
            ..Self::default()
        }
    }

    /// 信頼水準を設定
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// 季節周期を設定
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }
}

/// 予測ポイント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub confidence: f64,
}

impl ForecastPoint {
    /// 予測値と誤差幅から作成
    pub fn new(
        timestamp: Option<DateTime<Utc>>,
        value: f64,
        margin: f64,
        confidence: f64,
    ) -> Self {
        let margin = margin.abs();
        Self {
            timestamp,
            value,
            lower_bound: value - margin,
            upper_bound: value + margin,
            confidence,
        }
    }
}

/// 予測精度（学習データへの当てはまり）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastAccuracy {
    /// 平均絶対パーセント誤差（%）。`mape_points` が 0 の場合は算出不能を表す 0
    pub mape: f64,
    /// MAPE の算出に使ったポイント数（実測値 0 などを除外した後）
    pub mape_points: usize,
    /// 二乗平均平方根誤差
    pub rmse: f64,
    /// 平均絶対誤差
    pub mae: f64,
}

/// 予測のトレンド区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl ForecastTrend {
    /// 傾きから区分を決定
    pub fn from_slope(slope: f64) -> Self {
        match TrendDirection::from_slope(slope, TREND_DEADBAND) {
            TrendDirection::Up => ForecastTrend::Increasing,
            TrendDirection::Down => ForecastTrend::Decreasing,
            TrendDirection::Flat => ForecastTrend::Stable,
        }
    }
}

/// 季節性の強さ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seasonality {
    Strong,
    Weak,
    None,
}

/// 予測結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub forecast: Vec<ForecastPoint>,
    pub accuracy: ForecastAccuracy,
    pub trend: ForecastTrend,
    pub seasonality: Seasonality,
}

/// トレンド方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// 上昇トレンド
    Up,
    /// 下降トレンド
    Down,
    /// 横ばい
    Flat,
}

impl TrendDirection {
    /// 傾きと不感帯から方向を決定
    pub fn from_slope(slope: f64, deadband: f64) -> Self {
        if slope > deadband {
            TrendDirection::Up
        } else if slope < -deadband {
            TrendDirection::Down
        } else {
            TrendDirection::Flat
        }
    }
}

/// 回帰直線による将来値
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projections {
    pub next_period: f64,
    pub next_5_periods: f64,
    pub next_10_periods: f64,
}

/// トレンド分析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    pub slope: f64,
    pub r_squared: f64,
    /// 平均値に対する1期間あたりの変化率（%）
    pub change_rate: f64,
    /// 期間ごとの相対変化の二乗平均平方根（%）
    pub volatility: f64,
    pub projections: Projections,
}
