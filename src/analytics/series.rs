//! Time Series Input
//!
//! 入力データポイントと系列の検証ヘルパー

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 観測データポイント
///
/// 系列内の位置（インデックス）が時間軸上の位置を表す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// 観測時刻
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// 観測値
    pub value: f64,
    /// 表示用ラベル
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DataPoint {
    /// 値のみのデータポイントを作成
    pub fn new(value: f64) -> Self {
        Self {
            timestamp: None,
            value,
            label: None,
        }
    }

    /// 時刻付きのデータポイントを作成
    pub fn at(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            value,
            label: None,
        }
    }

    /// ラベルを設定
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl From<f64> for DataPoint {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// 値の列からデータポイント列を作成
pub fn from_values(values: &[f64]) -> Vec<DataPoint> {
    values.iter().copied().map(DataPoint::new).collect()
}

/// データポイント列から値の列を取り出す
pub fn values(points: &[DataPoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}

/// 全ての値が有限であることを確認
pub fn ensure_finite(points: &[DataPoint]) -> Result<()> {
    match points.iter().position(|p| !p.value.is_finite()) {
        Some(index) => Err(Error::InvalidArgument(format!(
            "non-finite value {} at index {}",
            points[index].value, index
        ))),
        None => Ok(()),
    }
}

/// 手法ごとの最小データ数を確認
pub fn ensure_min_len(method: &str, points: &[DataPoint], required: usize) -> Result<()> {
    if points.len() < required {
        return Err(Error::insufficient_data(method, required, points.len()));
    }
    Ok(())
}

/// 検証済みの値の列を取得
pub(crate) fn checked_values(
    method: &str,
    points: &[DataPoint],
    required: usize,
) -> Result<Vec<f64>> {
    ensure_min_len(method, points, required)?;
    ensure_finite(points)?;
    Ok(values(points))
}

/// 先頭と末尾の時刻から平均サンプリング間隔を推定
pub fn sampling_interval(points: &[DataPoint]) -> Option<Duration> {
    if points.len() < 2 {
        return None;
    }
    let first = points.first()?.timestamp?;
    let last = points.last()?.timestamp?;
    let steps = i32::try_from(points.len() - 1).ok()?;
    let interval = (last - first) / steps;
    if interval <= Duration::zero() {
        return None;
    }
    Some(interval)
}

/// 末尾から `steps` 期間先の時刻
pub fn future_timestamp(points: &[DataPoint], steps: usize) -> Option<DateTime<Utc>> {
    let interval = sampling_interval(points)?;
    let last = points.last()?.timestamp?;
    let steps = i32::try_from(steps).ok()?;
    last.checked_add_signed(interval * steps)
}
