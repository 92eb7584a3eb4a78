//! Analytics configuration
//!
//! 既定値 → 設定ファイル → 環境変数（ANALYTICS__*）の順で読み込む

use crate::analytics::{AnomalyConfig, ForecastConfig, RiskThresholds};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// 設定ファイルの探索先
const CONFIG_PATHS: [&str; 2] = ["analytics.toml", "config/analytics.toml"];

/// 環境変数のプレフィックス
const ENV_PREFIX: &str = "ANALYTICS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AnalyticsConfig {
    #[validate(nested)]
    pub anomaly: AnomalyConfig,
    #[validate(nested)]
    pub forecast: ForecastConfig,
    pub risk: RiskThresholds,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AnalyticsConfig {
    /// 設定ファイルを探索して読み込み、環境変数で上書き
    pub fn load() -> Result<Self> {
        let path = CONFIG_PATHS
            .iter()
            .map(Path::new)
            .find(|path| path.exists());
        if let Some(path) = path {
            tracing::info!("Loading analytics configuration: {}", path.display());
        }
        Self::build(path)
    }

    /// 指定した設定ファイルを読み込み、環境変数で上書き
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(Some(path.as_ref()))
    }

    fn build(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AnalyticsConfig::default())?);

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path).required(true));
        }

        // 例: ANALYTICS__ANOMALY__SENSITIVITY=0.8
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: AnalyticsConfig = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// サンプル設定ファイルの内容を生成
    pub fn sample_toml() -> Result<String> {
        let sample = AnalyticsConfig {
            risk: RiskThresholds::new(Some(60.0), Some(40.0)),
            ..AnalyticsConfig::default()
        };
        let toml_content = toml::to_string_pretty(&sample)?;

        Ok(format!(
            r#"# task-analytics configuration
#
# analytics.toml として保存してください
# 環境変数での上書きも可能です (例: ANALYTICS__ANOMALY__SENSITIVITY=0.8)
#
# [anomaly]
# method = zscore | iqr | moving_average | seasonal | trend_change
# sensitivity = 0.0〜1.0 (高いほど検出が増える)
# lookback_window = 移動平均/トレンド変化のウィンドウ (省略時 10 / 5)
#
# [forecast]
# method = linear | exponential | seasonal
# horizon = 予測ポイント数 (1 以上)
# confidence = 0.90 | 0.95 | 0.99
#
# [risk]
# warning / critical = 最新値の下限閾値

{}"#,
            toml_content
        ))
    }
}
