//! 编辑会话配置
//!
//! JSON 格式，缺省的字段取默认值。加载后统一校验。

use liftcad_core::snap::SnapSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// 会话配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub snap: SnapSettings,
    /// 初始缩放（每世界单位的像素数）
    pub zoom: f64,
    /// 每次放大/缩小的倍数
    pub zoom_step: f64,
    /// 拾取图元的容差（屏幕像素）
    pub pick_tolerance_px: f64,
    /// 合并时端点重合的容差（世界单位）
    pub join_tolerance: f64,
    /// 新图纸的默认图层名
    pub default_layer: String,
    /// 命令别名 -> 完整命令
    pub aliases: BTreeMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            snap: SnapSettings::default(),
            zoom: 1.0,
            zoom_step: 1.25,
            pick_tolerance_px: 5.0,
            join_tolerance: 1e-6,
            default_layer: "0".to_string(),
            aliases: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), "loaded session configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)))
            }
        };
        positive("zoom", self.zoom)?;
        positive("pick_tolerance_px", self.pick_tolerance_px)?;
        positive("join_tolerance", self.join_tolerance)?;
        positive("snap.tolerance", self.snap.tolerance)?;
        positive("snap.grid_spacing", self.snap.grid_spacing)?;
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(ConfigError::Invalid(format!(
                "zoom_step must be greater than 1, got {}",
                self.zoom_step
            )));
        }
        if self.default_layer.trim().is_empty() {
            return Err(ConfigError::Invalid("default_layer must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = SessionConfig::from_json_str(r#"{ "zoom": 4.0 }"#).unwrap();
        assert_eq!(config.zoom, 4.0);
        assert_eq!(config.snap, SnapSettings::default());
        assert_eq!(config.default_layer, "0");
    }

    #[test]
    fn test_snap_settings_from_json() {
        let config =
            SessionConfig::from_json_str(r#"{ "snap": { "tolerance": 6.0, "grid_spacing": 1.0 } }"#).unwrap();
        assert_eq!(config.snap.tolerance, 6.0);
        assert_eq!(config.snap.grid_spacing, 1.0);
        assert!(config.snap.show_indicators);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            SessionConfig::from_json_str(r#"{ "zoom_step": 0.5 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SessionConfig::from_json_str(r#"{ "pick_tolerance_px": -1 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(SessionConfig::from_json_str("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SessionConfig::load("/nonexistent/liftcad/session.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
