use crate::domain::model::SyncStatus;
use crate::domain::ports::Uploader;
use crate::utils::error::{AwmsError, Result};
use url::Url;

pub const DEFAULT_UPLOAD_PATH: &str = "/upload";

/// 已啟用的同步目標。停用同步以 `Option<SyncTarget>` 的 `None` 表示，
/// 與「端點留空」（預設為 /upload）是兩種不同的輸入。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    endpoint: String,
}

impl SyncTarget {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// 解析端點：空值 -> /upload；相對路徑 -> 接在 base_url 之後；絕對 URL 原樣使用
    pub fn resolve(base_url: &str, endpoint: Option<&str>) -> Result<Self> {
        let endpoint = endpoint
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_PATH);

        if let Ok(url) = Url::parse(endpoint) {
            return Ok(Self::new(url.to_string()));
        }

        let base = Url::parse(base_url).map_err(|e| AwmsError::InvalidConfigValueError {
            field: "server.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        let joined = base
            .join(endpoint)
            .map_err(|e| AwmsError::InvalidConfigValueError {
                field: "sync.endpoint".to_string(),
                value: endpoint.to_string(),
                reason: format!("Cannot resolve against base URL: {}", e),
            })?;

        Ok(Self::new(joined.to_string()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// 盡力而為的鏡像上傳：只嘗試一次，失敗只記錄警告
pub async fn sync_upload<U: Uploader + ?Sized>(
    uploader: &U,
    filename: &str,
    bytes: &[u8],
    target: &SyncTarget,
) -> SyncStatus {
    match uploader.upload(filename, bytes, target.endpoint()).await {
        Ok(receipt) => {
            tracing::info!("☁️ Server upload ok: {} -> {}", filename, target.endpoint());
            SyncStatus::Synced(receipt)
        }
        Err(e) => {
            tracing::warn!("⚠️ Server upload failed for {}: {}", filename, e);
            SyncStatus::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_endpoint_defaults_to_upload() {
        let target = SyncTarget::resolve("http://localhost:3000", Some("")).unwrap();
        assert_eq!(target.endpoint(), "http://localhost:3000/upload");

        let target = SyncTarget::resolve("http://localhost:3000", None).unwrap();
        assert_eq!(target.endpoint(), "http://localhost:3000/upload");
    }

    #[test]
    fn test_relative_and_absolute_endpoints() {
        let target = SyncTarget::resolve("http://localhost:3000/", Some("/api/files")).unwrap();
        assert_eq!(target.endpoint(), "http://localhost:3000/api/files");

        let target =
            SyncTarget::resolve("http://localhost:3000", Some("https://mirror.example.com/in"))
                .unwrap();
        assert_eq!(target.endpoint(), "https://mirror.example.com/in");
    }

    #[test]
    fn test_bad_base_url_is_config_error() {
        let err = SyncTarget::resolve("not a url", Some("/upload")).unwrap_err();
        assert!(matches!(err, AwmsError::InvalidConfigValueError { .. }));
    }
}
