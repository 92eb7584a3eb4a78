//! Statistics Kernel
//!
//! 基本統計関数群。全て純粋関数で、空入力に対しては 0 を返す。

use serde::{Deserialize, Serialize};

/// 四分位数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

impl Quartiles {
    /// 四分位範囲（Q3 - Q1）
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// 最小二乗法による線形回帰の結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearRegression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearRegression {
    /// インデックス `x` における回帰直線の値
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// 算術平均
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 母標準偏差（N で割る）
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// 中央値（偶数長では中央2要素の平均）
pub fn median(values: &[f64]) -> f64 {
    median_of_sorted(&sorted(values))
}

/// 四分位数（前半・後半の中央値。奇数長では中央要素を除外）
pub fn quartiles(values: &[f64]) -> Quartiles {
    let sorted = sorted(values);
    let n = sorted.len();
    if n < 2 {
        let only = sorted.first().copied().unwrap_or(0.0);
        return Quartiles {
            q1: only,
            q2: only,
            q3: only,
        };
    }

    let half = n / 2;
    let lower = &sorted[..half];
    let upper = if n % 2 == 0 {
        &sorted[half..]
    } else {
        &sorted[half + 1..]
    };

    Quartiles {
        q1: median_of_sorted(lower),
        q2: median_of_sorted(&sorted),
        q3: median_of_sorted(upper),
    }
}

/// Z-スコア（標準偏差 0 のときは 0）
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        return 0.0;
    }
    (value - mean) / std_dev
}

/// 移動平均。先頭は利用可能な分だけの拡張ウィンドウで計算する。
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut result = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        let count = window.min(i + 1);
        result.push(sum / count as f64);
    }
    result
}

/// 指数移動平均（k = 2 / (period + 1)）
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    for &value in values {
        let next = match result.last() {
            Some(&prev) => value * k + prev * (1.0 - k),
            None => value,
        };
        result.push(next);
    }
    result
}

/// インデックスを説明変数とする線形回帰
pub fn linear_regression(values: &[f64]) -> LinearRegression {
    let n = values.len();
    if n == 0 {
        return LinearRegression {
            slope: 0.0,
            intercept: 0.0,
            r_squared: 0.0,
        };
    }

    // 定数系列は丸め誤差で傾きが出ないよう厳密に 0 とする
    if values.iter().all(|&v| v == values[0]) {
        return LinearRegression {
            slope: 0.0,
            intercept: values[0],
            r_squared: 0.0,
        };
    }

    let x_mean = (n as f64 - 1.0) / 2.0;
    let y_mean = mean(values);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let x_diff = i as f64 - x_mean;
        numerator += x_diff * (y - y_mean);
        denominator += x_diff * x_diff;
    }

    let slope = if denominator.abs() < f64::EPSILON {
        0.0
    } else {
        numerator / denominator
    };
    let intercept = y_mean - slope * x_mean;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let predicted = slope * i as f64 + intercept;
        ss_res += (y - predicted).powi(2);
        ss_tot += (y - y_mean).powi(2);
    }

    // 定数系列は説明すべき変動がない
    let r_squared = if ss_tot.abs() < f64::EPSILON {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    LinearRegression {
        slope,
        intercept,
        r_squared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_empty_input_is_fail_soft() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(median(&[]), 0.0);
        assert!(moving_average(&[], 3).is_empty());
        assert!(ema(&[], 3).is_empty());
        assert_eq!(linear_regression(&[]).slope, 0.0);
    }

    #[test]
    fn test_population_std_dev() {
        // 母分散 = 4
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < EPS);
        assert!((std_dev(&values) - 2.0).abs() < EPS);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_quartiles_odd_length_excludes_middle() {
        let q = quartiles(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(q.q1, 2.0);
        assert_eq!(q.q2, 4.0);
        assert_eq!(q.q3, 6.0);
        assert_eq!(q.iqr(), 4.0);
    }

    #[test]
    fn test_quartiles_even_length() {
        let q = quartiles(&[8.0, 1.0, 6.0, 3.0, 5.0, 2.0, 7.0, 4.0]);
        assert_eq!(q.q1, 2.5);
        assert_eq!(q.q2, 4.5);
        assert_eq!(q.q3, 6.5);
    }

    #[test]
    fn test_quartiles_single_value() {
        let q = quartiles(&[42.0]);
        assert_eq!(q.q1, 42.0);
        assert_eq!(q.q3, 42.0);
    }

    #[test]
    fn test_z_score_zero_std_dev() {
        assert_eq!(z_score(10.0, 5.0, 0.0), 0.0);
        assert_eq!(z_score(9.0, 5.0, 2.0), 2.0);
    }

    #[test]
    fn test_moving_average_expanding_window() {
        let ma = moving_average(&[10.0, 20.0, 30.0, 40.0], 2);
        assert_eq!(ma, vec![10.0, 15.0, 25.0, 35.0]);
    }

    #[test]
    fn test_ema() {
        // period 3 => k = 0.5
        let result = ema(&[10.0, 20.0, 30.0], 3);
        assert_eq!(result, vec![10.0, 15.0, 22.5]);
    }

    #[test]
    fn test_linear_regression_exact_line() {
        let values: Vec<f64> = (0..10).map(|i| 3.0 * i as f64 + 7.0).collect();
        let fit = linear_regression(&values);
        assert!((fit.slope - 3.0).abs() < EPS);
        assert!((fit.intercept - 7.0).abs() < EPS);
        assert!((fit.r_squared - 1.0).abs() < EPS);
        assert!((fit.predict(10.0) - 37.0).abs() < EPS);
    }

    #[test]
    fn test_linear_regression_constant_series() {
        let fit = linear_regression(&[5.0, 5.0, 5.0]);
        assert_eq!(fit.slope, 0.0);
        assert!((fit.intercept - 5.0).abs() < EPS);
        assert_eq!(fit.r_squared, 0.0);

        let fit = linear_regression(&[0.1; 7]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 0.1);
    }
}
