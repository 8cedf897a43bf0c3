use crate::adapters::http::DEFAULT_SYNC_TIMEOUT;
use crate::core::connectivity::{DEFAULT_HEALTH_PATH, DEFAULT_INITIAL_DELAY};
use crate::core::sync::SyncTarget;
use crate::core::viewer::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
use crate::utils::error::{AwmsError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_STORE_PATH: &str = "awms-offline.db";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub store: Option<StoreConfig>,
    pub server: Option<ServerConfig>,
    pub sync: Option<SyncConfig>,
    pub viewer: Option<ViewerConfig>,
    pub connectivity: Option<ConnectivityConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub enabled: bool,
    /// 留空時使用 /upload
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    pub health_path: Option<String>,
    pub initial_delay_ms: Option<u64>,
    pub interval_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AwmsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AwmsError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AWMS_SERVER})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AwmsError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn store_path(&self) -> &str {
        self.store
            .as_ref()
            .map(|s| s.path.as_str())
            .unwrap_or(DEFAULT_STORE_PATH)
    }

    pub fn base_url(&self) -> &str {
        self.server
            .as_ref()
            .map(|s| s.base_url.as_str())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn sync_enabled(&self) -> bool {
        self.sync.as_ref().map(|s| s.enabled).unwrap_or(false)
    }

    pub fn sync_endpoint(&self) -> Option<&str> {
        self.sync.as_ref().and_then(|s| s.endpoint.as_deref())
    }

    pub fn sync_timeout(&self) -> Duration {
        self.sync
            .as_ref()
            .and_then(|s| s.timeout_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SYNC_TIMEOUT)
    }

    /// 停用時回傳 None；啟用但未指定端點時使用預設 /upload
    pub fn sync_target(&self) -> Result<Option<SyncTarget>> {
        if !self.sync_enabled() {
            return Ok(None);
        }
        SyncTarget::resolve(self.base_url(), self.sync_endpoint()).map(Some)
    }

    pub fn page_size(&self) -> usize {
        self.viewer
            .as_ref()
            .and_then(|v| v.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn health_path(&self) -> &str {
        self.connectivity
            .as_ref()
            .and_then(|c| c.health_path.as_deref())
            .unwrap_or(DEFAULT_HEALTH_PATH)
    }

    pub fn connectivity_initial_delay(&self) -> Duration {
        self.connectivity
            .as_ref()
            .and_then(|c| c.initial_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_INITIAL_DELAY)
    }

    pub fn connectivity_interval(&self) -> Duration {
        let secs = self
            .connectivity
            .as_ref()
            .and_then(|c| c.interval_seconds)
            .unwrap_or(30);
        Duration::from_secs(secs)
    }

    pub fn connectivity_timeout(&self) -> Duration {
        let secs = self
            .connectivity
            .as_ref()
            .and_then(|c| c.timeout_seconds)
            .unwrap_or(5);
        Duration::from_secs(secs)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .and_then(LogFormat::from_name)
            .unwrap_or_default()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("store.path", self.store_path())?;
        validation::validate_path("store.path", self.store_path())?;
        validation::validate_url("server.base_url", self.base_url())?;

        if let Some(endpoint) = self.sync_endpoint() {
            validation::validate_endpoint("sync.endpoint", endpoint)?;
        }
        if let Some(timeout) = self.sync.as_ref().and_then(|s| s.timeout_seconds) {
            validation::validate_range("sync.timeout_seconds", timeout, 1, 600)?;
        }

        validation::validate_one_of("viewer.page_size", self.page_size(), &PAGE_SIZE_OPTIONS)?;
        validation::validate_non_empty_string("connectivity.health_path", self.health_path())?;

        if let Some(interval) = self.connectivity.as_ref().and_then(|c| c.interval_seconds) {
            validation::validate_range("connectivity.interval_seconds", interval, 1, 3600)?;
        }

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            if LogFormat::from_name(format).is_none() {
                return Err(AwmsError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.to_string(),
                    reason: "Supported formats: compact, json".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
