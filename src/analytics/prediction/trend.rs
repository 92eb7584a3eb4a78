//! Trend Analysis
//!
//! トレンド分析器の実装

use super::types::{Projections, TrendAnalysis, TrendDirection};
use crate::analytics::series::{checked_values, DataPoint};
use crate::analytics::statistics;
use crate::error::Result;
use tracing::{debug, warn};

/// トレンド分析に必要な最小データ数
pub const MIN_TREND_POINTS: usize = 2;

/// トレンド分析器
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    /// 横ばい判定の閾値（傾きの絶対値）。既定は 0 で、傾きの符号のみで判定する
    stability_threshold: f64,
}

impl TrendAnalyzer {
    /// 新しいトレンド分析器を作成
    pub fn new(stability_threshold: f64) -> Self {
        Self {
            stability_threshold: stability_threshold.abs(),
        }
    }

    /// 系列全体のトレンドを分析
    pub fn analyze(&self, points: &[DataPoint]) -> Result<TrendAnalysis> {
        let values = checked_values("trend", points, MIN_TREND_POINTS)?;
        let n = values.len();

        let regression = statistics::linear_regression(&values);
        let mean = statistics::mean(&values);
        let change_rate = if mean == 0.0 {
            0.0
        } else {
            regression.slope / mean * 100.0
        };

        let last_x = (n - 1) as f64;
        let analysis = TrendAnalysis {
            direction: TrendDirection::from_slope(regression.slope, self.stability_threshold),
            slope: regression.slope,
            r_squared: regression.r_squared,
            change_rate,
            volatility: volatility(&values),
            projections: Projections {
                next_period: regression.predict(last_x + 1.0),
                next_5_periods: regression.predict(last_x + 5.0),
                next_10_periods: regression.predict(last_x + 10.0),
            },
        };

        debug!(
            direction = ?analysis.direction,
            slope = analysis.slope,
            volatility = analysis.volatility,
            "Trend analysis complete"
        );
        Ok(analysis)
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// 期間ごとの相対変化の二乗平均平方根（%）
///
/// 直前の値が 0 のステップは相対変化が定義できないため除外する。
/// 直前の値が極端に小さく二乗が有限に収まらないステップも同様に除外する。
pub fn volatility(values: &[f64]) -> f64 {
    let mut mean_sq = 0.0;
    let mut counted = 0usize;
    let mut zero_base = 0usize;
    let mut overflowed = 0usize;

    for pair in values.windows(2) {
        let (prev, current) = (pair[0], pair[1]);
        if prev == 0.0 {
            zero_base += 1;
            continue;
        }
        let squared = ((current - prev) / prev).powi(2);
        if !squared.is_finite() {
            overflowed += 1;
            continue;
        }
        // 逐次平均で総和のオーバーフローを避ける
        counted += 1;
        mean_sq += (squared - mean_sq) / counted as f64;
    }

    if zero_base > 0 {
        warn!(skipped = zero_base, "Zero base values excluded from volatility");
    }
    if overflowed > 0 {
        warn!(
            skipped = overflowed,
            "Non-finite relative changes excluded from volatility"
        );
    }
    if counted == 0 {
        return 0.0;
    }
    mean_sq.sqrt() * 100.0
}
