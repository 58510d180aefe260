//! 翻译配置管理模块
//!
//! 提供配置常量、默认值以及 TOML 配置文件的加载。

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{TranslateError, TranslateResult};
use crate::provider::Priority;

/// 翻译配置常量
pub mod constants {
    /// 默认的翻译后端地址
    pub const DEFAULT_API_URL: &str = "http://localhost:1188/translate";

    /// 默认的后端请求超时（秒）
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

    /// 任务内相邻条目之间的默认节流延迟（毫秒）
    pub const DEFAULT_ENTRY_DELAY_MS: u64 = 0;

    /// 配置文件查找路径（按顺序）
    pub const CONFIG_PATHS: &[&str] = &[
        "translator-config.toml",
        "config.toml",
        ".translator-config.toml",
    ];
}

/// 翻译核心配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// 翻译后端地址（HTTP 后端使用）
    pub api_url: String,

    /// 后端请求超时（秒）
    pub request_timeout_secs: u64,

    /// 未显式指定时使用的调度优先级
    pub default_priority: Priority,

    /// 任务内相邻条目之间的节流延迟（毫秒），0 表示不延迟
    pub entry_delay_ms: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_API_URL.to_string(),
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            default_priority: Priority::Normal,
            entry_delay_ms: constants::DEFAULT_ENTRY_DELAY_MS,
        }
    }
}

impl TranslatorConfig {
    /// 获取后端请求超时
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 获取条目节流延迟
    pub fn entry_delay(&self) -> Duration {
        Duration::from_millis(self.entry_delay_ms)
    }

    /// 从指定的 TOML 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> TranslateResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            TranslateError::Config(format!("读取配置文件失败 {}: {}", path.as_ref().display(), e))
        })?;
        let config: TranslatorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 按查找路径加载配置，未找到配置文件时返回默认配置
    pub fn load() -> TranslateResult<Self> {
        for path in constants::CONFIG_PATHS {
            if Path::new(path).exists() {
                tracing::info!("加载翻译配置文件: {}", path);
                return Self::from_file(path);
            }
        }
        tracing::debug!("未找到翻译配置文件，使用默认配置");
        Ok(Self::default())
    }

    /// 校验配置取值
    pub fn validate(&self) -> TranslateResult<()> {
        if self.api_url.is_empty() {
            return Err(TranslateError::Config("api_url 不能为空".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(TranslateError::Config(
                "request_timeout_secs 必须大于 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TranslatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_url, constants::DEFAULT_API_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.entry_delay().is_zero());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: TranslatorConfig =
            toml::from_str("api_url = \"http://translate.internal/api\"").unwrap();
        assert_eq!(config.api_url, "http://translate.internal/api");
        assert_eq!(
            config.request_timeout_secs,
            constants::DEFAULT_REQUEST_TIMEOUT_SECS
        );
        assert_eq!(config.default_priority, Priority::Normal);
    }

    #[test]
    fn empty_api_url_is_rejected() {
        let mut config = TranslatorConfig::default();
        config.api_url.clear();
        assert!(config.validate().is_err());
    }
}
