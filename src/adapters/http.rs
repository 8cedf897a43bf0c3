use crate::domain::model::UploadReceipt;
use crate::domain::ports::Uploader;
use crate::utils::error::{AwmsError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: String,
}

/// 以 multipart `file` 欄位將原始檔案 POST 到伺服器
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: Client,
}

impl HttpUploader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(
        &self,
        filename: &str,
        bytes: &[u8],
        endpoint: &str,
    ) -> Result<Option<UploadReceipt>> {
        let part = Part::bytes(bytes.to_vec()).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        tracing::debug!("POST {} ({} bytes) to {}", filename, bytes.len(), endpoint);
        let response = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AwmsError::SyncWarning {
                message: e.to_string(),
            })?;

        let status = response.status();
        tracing::debug!("Upload response status: {}", status);

        if status.is_success() {
            // 回應內容只是附帶資訊，解析失敗不影響結果
            let receipt = response.json::<UploadReceipt>().await.ok();
            return Ok(receipt);
        }

        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => format!("status {}: {}", status.as_u16(), body.error),
            Err(_) => format!("status {}", status.as_u16()),
        };
        Err(AwmsError::SyncWarning { message: detail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_upload_parses_receipt() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/upload")
                .body_contains("name=\"file\"; filename=\"staff.xlsx\"");
            then.status(200).json_body(serde_json::json!({
                "success": true,
                "filename": "staff.xlsx",
                "sheets": [{"name": "Staff", "rowCount": 4}]
            }));
        });

        let uploader = HttpUploader::new(DEFAULT_SYNC_TIMEOUT).unwrap();
        let receipt = uploader
            .upload("staff.xlsx", b"PK\x03\x04", &server.url("/upload"))
            .await
            .unwrap()
            .unwrap();

        mock.assert();
        assert!(receipt.success);
        assert_eq!(receipt.sheets[0].row_count, 4);
    }

    #[tokio::test]
    async fn test_non_success_status_is_sync_warning() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/upload");
            then.status(400).json_body(serde_json::json!({"error": "No file uploaded"}));
        });

        let uploader = HttpUploader::new(DEFAULT_SYNC_TIMEOUT).unwrap();
        let err = uploader
            .upload("staff.xlsx", b"data", &server.url("/upload"))
            .await
            .unwrap_err();

        match err {
            AwmsError::SyncWarning { message } => {
                assert_eq!(message, "status 400: No file uploaded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_without_json_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/upload");
            then.status(204);
        });

        let uploader = HttpUploader::new(DEFAULT_SYNC_TIMEOUT).unwrap();
        let receipt = uploader
            .upload("staff.xlsx", b"data", &server.url("/upload"))
            .await
            .unwrap();
        assert!(receipt.is_none());
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/upload");
            then.status(200).delay(Duration::from_secs(5));
        });

        let uploader = HttpUploader::new(Duration::from_millis(300)).unwrap();
        let started = std::time::Instant::now();
        let err = uploader
            .upload("staff.xlsx", b"data", &server.url("/upload"))
            .await
            .unwrap_err();

        assert!(matches!(err, AwmsError::SyncWarning { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
