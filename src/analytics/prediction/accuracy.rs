//! Forecast Accuracy Metrics
//!
//! 学習データに対する当てはまり指標（MAPE / RMSE / MAE）

use super::types::ForecastAccuracy;
use tracing::warn;

/// 平均絶対パーセント誤差（%）
///
/// 実測値が 0 のポイントは割合が定義できないため除外する。
/// 有効なポイントが 1 つもない場合は 0 を返す（`mape_points` も参照）。
pub fn mean_absolute_percentage_error(actual: &[f64], fitted: &[f64]) -> f64 {
    percentage_error(actual, fitted).0
}

/// MAPE と、その計算に使ったポイント数
fn percentage_error(actual: &[f64], fitted: &[f64]) -> (f64, usize) {
    let mut mean = 0.0;
    let mut counted = 0usize;
    let mut zero_actual = 0usize;
    let mut overflowed = 0usize;

    for (a, f) in actual.iter().zip(fitted) {
        if *a == 0.0 {
            zero_actual += 1;
            continue;
        }
        let percent = ((a - f) / a).abs() * 100.0;
        if !percent.is_finite() {
            overflowed += 1;
            continue;
        }
        counted += 1;
        mean += (percent - mean) / counted as f64;
    }

    if zero_actual > 0 {
        warn!(skipped = zero_actual, "Zero actual values excluded from MAPE");
    }
    if overflowed > 0 {
        warn!(skipped = overflowed, "Non-finite percentage errors excluded from MAPE");
    }
    (mean, counted)
}

/// 二乗平均平方根誤差
pub fn root_mean_squared_error(actual: &[f64], fitted: &[f64]) -> f64 {
    let n = actual.len().min(fitted.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = actual
        .iter()
        .zip(fitted)
        .map(|(a, f)| (a - f).powi(2))
        .sum();
    (sum / n as f64).sqrt()
}

/// 平均絶対誤差
pub fn mean_absolute_error(actual: &[f64], fitted: &[f64]) -> f64 {
    let n = actual.len().min(fitted.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = actual.iter().zip(fitted).map(|(a, f)| (a - f).abs()).sum();
    sum / n as f64
}

/// 3指標をまとめて計算
pub fn evaluate(actual: &[f64], fitted: &[f64]) -> ForecastAccuracy {
    let (mape, mape_points) = percentage_error(actual, fitted);
    ForecastAccuracy {
        mape,
        mape_points,
        rmse: root_mean_squared_error(actual, fitted),
        mae: mean_absolute_error(actual, fitted),
    }
}
