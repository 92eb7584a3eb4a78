//! Time Series Forecaster
//!
//! 時系列予測器の実装（線形回帰 / Holt 指数平滑化 / 季節分解）

use super::accuracy;
use super::decomposition::{classify_seasonality, decompose};
use super::types::{
    ForecastConfig, ForecastMethod, ForecastPoint, ForecastResult, ForecastTrend,
};
use crate::analytics::series::{checked_values, future_timestamp, DataPoint};
use crate::analytics::statistics;
use crate::error::{Error, Result};
use tracing::debug;
use validator::Validate;

/// Holt 法の水準平滑化係数
const HOLT_ALPHA: f64 = 0.3;
/// Holt 法のトレンド平滑化係数
const HOLT_BETA: f64 = 0.1;
/// 季節予測でトレンド外挿に使う末尾ポイント数
const SEASONAL_TREND_TAIL: usize = 10;

/// 信頼水準に対応する z 値（表にない水準は 95%）
pub fn z_for_confidence(confidence: f64) -> f64 {
    const TABLE: [(f64, f64); 3] = [(0.99, 2.576), (0.95, 1.96), (0.90, 1.645)];
    TABLE
        .iter()
        .find(|(level, _)| (confidence - level).abs() < 1e-9)
        .map(|&(_, z)| z)
        .unwrap_or(1.96)
}

/// 手法ごとに必要な最小データ数
pub fn required_points(config: &ForecastConfig) -> usize {
    match config.method {
        ForecastMethod::Linear => 3,
        ForecastMethod::Exponential => 2,
        ForecastMethod::Seasonal => config.seasonal_period.max(3),
    }
}

/// 設定の手法で予測
pub fn forecast(points: &[DataPoint], config: &ForecastConfig) -> Result<ForecastResult> {
    Forecaster::new(config.clone()).forecast(points)
}

/// 時系列予測器
#[derive(Debug, Clone, Default)]
pub struct Forecaster {
    config: ForecastConfig,
}

/// 手法ごとのモデル当てはめ結果
struct FittedModel {
    fitted: Vec<f64>,
    predictions: Vec<(f64, f64)>,
    slope: f64,
}

impl Forecaster {
    /// 新しい予測器を作成
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// 予測設定
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// `horizon` 期間先までを予測
    pub fn forecast(&self, points: &[DataPoint]) -> Result<ForecastResult> {
        if self.config.horizon < 1 {
            return Err(Error::InvalidArgument(
                "forecast horizon must be at least 1".to_string(),
            ));
        }
        self.config.validate()?;

        let method = self.config.method;
        let values = checked_values(method.as_str(), points, required_points(&self.config))?;
        let z = z_for_confidence(self.config.confidence);

        let model = match method {
            ForecastMethod::Linear => self.fit_linear(&values, z),
            ForecastMethod::Exponential => self.fit_exponential(&values, z),
            ForecastMethod::Seasonal => self.fit_seasonal(&values, z),
        };

        let forecast = model
            .predictions
            .iter()
            .enumerate()
            .map(|(i, &(value, margin))| {
                ForecastPoint::new(
                    future_timestamp(points, i + 1),
                    value,
                    margin,
                    self.config.confidence,
                )
            })
            .collect();

        let result = ForecastResult {
            forecast,
            accuracy: accuracy::evaluate(&values, &model.fitted),
            trend: ForecastTrend::from_slope(model.slope),
            seasonality: classify_seasonality(&values, self.config.seasonal_period),
        };

        debug!(
            method = %method,
            horizon = self.config.horizon,
            rmse = result.accuracy.rmse,
            "Forecast complete"
        );
        Ok(result)
    }

    /// 最小二乗法による線形予測。誤差幅は期間によらず一定。
    fn fit_linear(&self, values: &[f64], z: f64) -> FittedModel {
        let n = values.len();
        let regression = statistics::linear_regression(values);
        let fitted: Vec<f64> = (0..n).map(|i| regression.predict(i as f64)).collect();

        let sum_sq: f64 = values
            .iter()
            .zip(&fitted)
            .map(|(v, f)| (v - f).powi(2))
            .sum();
        let std_err = (sum_sq / (n - 2) as f64).sqrt();
        let margin = z * std_err;

        let predictions = (1..=self.config.horizon)
            .map(|h| (regression.predict((n - 1 + h) as f64), margin))
            .collect();

        FittedModel {
            fitted,
            predictions,
            slope: regression.slope,
        }
    }

    /// Holt の二重指数平滑化。誤差幅は sqrt(h + 1) で広がる。
    fn fit_exponential(&self, values: &[f64], z: f64) -> FittedModel {
        let mut level = values[0];
        let mut trend = values[1] - values[0];
        let mut fitted = Vec::with_capacity(values.len());
        fitted.push(values[0]);

        for &value in &values[1..] {
            // 1期先予測を当てはめ値とする
            fitted.push(level + trend);
            let next_level = HOLT_ALPHA * value + (1.0 - HOLT_ALPHA) * (level + trend);
            trend = HOLT_BETA * (next_level - level) + (1.0 - HOLT_BETA) * trend;
            level = next_level;
        }

        let residuals: Vec<f64> = values.iter().zip(&fitted).map(|(v, f)| v - f).collect();
        let residual_std = statistics::std_dev(&residuals);

        let predictions = (1..=self.config.horizon)
            .map(|h| {
                let steps = h as f64;
                (
                    level + steps * trend,
                    z * residual_std * (steps + 1.0).sqrt(),
                )
            })
            .collect();

        FittedModel {
            fitted,
            predictions,
            slope: trend,
        }
    }

    /// 季節分解 + トレンド外挿による予測。誤差幅は残差の標準偏差から一定。
    fn fit_seasonal(&self, values: &[f64], z: f64) -> FittedModel {
        let n = values.len();
        let decomposition = decompose(values, self.config.seasonal_period);

        let tail_start = n.saturating_sub(SEASONAL_TREND_TAIL);
        let tail = &decomposition.trend[tail_start..];
        let trend_line = statistics::linear_regression(tail);
        let last_x = (tail.len() - 1) as f64;

        let fitted = decomposition.fitted();
        let residuals: Vec<f64> = values.iter().zip(&fitted).map(|(v, f)| v - f).collect();
        let margin = z * statistics::std_dev(&residuals);

        let predictions = (1..=self.config.horizon)
            .map(|h| {
                let trend = trend_line.predict(last_x + h as f64);
                (trend + decomposition.seasonal_at(n - 1 + h), margin)
            })
            .collect();

        FittedModel {
            fitted,
            predictions,
            slope: trend_line.slope,
        }
    }
}
