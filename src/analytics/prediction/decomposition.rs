//! Seasonal Decomposition
//!
//! 系列をトレンド・季節成分・残差に分解する

use super::types::Seasonality;
use crate::analytics::statistics;
use serde::{Deserialize, Serialize};

/// 分解結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    /// 周期
    pub period: usize,
    /// トレンド成分（中心化移動平均。端点は元の値）
    pub trend: Vec<f64>,
    /// 位相ごとの季節成分（長さ = period）
    pub seasonal: Vec<f64>,
    /// 残差
    pub residual: Vec<f64>,
}

impl Decomposition {
    /// インデックス `index` の季節成分
    pub fn seasonal_at(&self, index: usize) -> f64 {
        self.seasonal[index % self.period]
    }

    /// トレンド + 季節成分による当てはめ値
    pub fn fitted(&self) -> Vec<f64> {
        self.trend
            .iter()
            .enumerate()
            .map(|(i, t)| t + self.seasonal_at(i))
            .collect()
    }

    /// 季節性の強さ F = max(0, 1 - Var(残差) / Var(季節 + 残差))
    pub fn strength(&self) -> f64 {
        let detrended: Vec<f64> = self
            .residual
            .iter()
            .enumerate()
            .map(|(i, r)| r + self.seasonal_at(i))
            .collect();
        let detrended_var = statistics::std_dev(&detrended).powi(2);
        if detrended_var < f64::EPSILON {
            return 0.0;
        }
        let residual_var = statistics::std_dev(&self.residual).powi(2);
        (1.0 - residual_var / detrended_var).max(0.0)
    }
}

/// 季節分解。`period` は 1 以上であること。
pub fn decompose(values: &[f64], period: usize) -> Decomposition {
    let period = period.max(1);
    let n = values.len();
    let half = period / 2;

    let trend: Vec<f64> = (0..n)
        .map(|i| {
            if i >= half && i - half + period <= n {
                let start = i - half;
                statistics::mean(&values[start..start + period])
            } else {
                values[i]
            }
        })
        .collect();

    let mut phase_values: Vec<Vec<f64>> = vec![Vec::new(); period];
    for (i, (value, t)) in values.iter().zip(&trend).enumerate() {
        phase_values[i % period].push(value - t);
    }
    let seasonal: Vec<f64> = phase_values.iter().map(|v| statistics::mean(v)).collect();

    let residual = values
        .iter()
        .zip(&trend)
        .enumerate()
        .map(|(i, (value, t))| value - t - seasonal[i % period])
        .collect();

    Decomposition {
        period,
        trend,
        seasonal,
        residual,
    }
}

/// 季節性の強さを区分する。2周期分に満たない系列は `None`。
pub fn classify_seasonality(values: &[f64], period: usize) -> Seasonality {
    if period < 2 || values.len() < 2 * period {
        return Seasonality::None;
    }
    let strength = decompose(values, period).strength();
    if strength >= 0.6 {
        Seasonality::Strong
    } else if strength >= 0.3 {
        Seasonality::Weak
    } else {
        Seasonality::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly_pattern(weeks: usize) -> Vec<f64> {
        let pattern = [10.0, 12.0, 14.0, 13.0, 11.0, 3.0, 2.0];
        (0..weeks * 7).map(|i| pattern[i % 7] + 0.1 * i as f64).collect()
    }

    #[test]
    fn test_edges_fall_back_to_raw_values() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let decomposition = decompose(&values, 3);
        assert_eq!(decomposition.trend, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(decomposition.seasonal.len(), 3);
    }

    #[test]
    fn test_fitted_reconstructs_with_residual() {
        let values = weekly_pattern(4);
        let decomposition = decompose(&values, 7);
        let fitted = decomposition.fitted();
        for i in 0..values.len() {
            let rebuilt = fitted[i] + decomposition.residual[i];
            assert!((rebuilt - values[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_classify_strong_weekly_pattern() {
        assert_eq!(classify_seasonality(&weekly_pattern(6), 7), Seasonality::Strong);
    }

    #[test]
    fn test_classify_linear_series_has_no_seasonality() {
        let values: Vec<f64> = (0..30).map(|i| 2.0 * i as f64 + 1.0).collect();
        assert_eq!(classify_seasonality(&values, 7), Seasonality::None);
    }

    #[test]
    fn test_classify_short_series() {
        assert_eq!(classify_seasonality(&[1.0, 2.0, 3.0], 7), Seasonality::None);
    }
}
