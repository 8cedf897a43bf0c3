use crate::core::parser::parse_workbook;
use crate::core::sync::{sync_upload, SyncTarget};
use crate::domain::model::{IngestReport, NewFileRecord, SyncStatus};
use crate::domain::ports::{RecordStore, Uploader};
use crate::utils::error::{AwmsError, Result};
use std::path::Path;

/// 上傳流程：讀檔 -> 解析 -> 寫入本地 store -> （選用）同步到伺服器。
///
/// 本地寫入是提交點；同步失敗不會回滾，也不會讓 `ingest` 失敗。
pub struct IngestionPipeline<S: RecordStore, U: Uploader> {
    store: S,
    uploader: U,
}

impl<S: RecordStore, U: Uploader> IngestionPipeline<S, U> {
    pub fn new(store: S, uploader: U) -> Self {
        Self { store, uploader }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn ingest(
        &self,
        path: impl AsRef<Path>,
        sync: Option<&SyncTarget>,
    ) -> Result<IngestReport> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| AwmsError::ReadError {
                path: path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            })?;

        tracing::debug!("Reading {}", path.display());
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AwmsError::ReadError {
                path: path.display().to_string(),
                source,
            })?;

        self.ingest_bytes(&filename, bytes, sync).await
    }

    pub async fn ingest_bytes(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        sync: Option<&SyncTarget>,
    ) -> Result<IngestReport> {
        if filename.trim().is_empty() {
            return Err(AwmsError::ReadError {
                path: filename.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty file name"),
            });
        }

        tracing::info!("📥 Parsing {} ({} bytes)", filename, bytes.len());
        let sheets = parse_workbook(&bytes)?;
        let uploaded_at = chrono::Utc::now().timestamp_millis();
        let sheet_names: Vec<String> = sheets.iter().map(|s| s.name.clone()).collect();

        // 同步時還需要原始檔案，寫入前先保留一份
        let sync_bytes = sync.map(|_| bytes.clone());

        let record = NewFileRecord {
            filename: filename.to_string(),
            uploaded_at,
            sheets,
            original_bytes: bytes,
        };
        let id = self.store.add(record).await?;
        tracing::info!(
            "💾 Saved {} locally as #{} (sheets: {})",
            filename,
            id,
            sheet_names.join(", ")
        );

        let sync_status = match (sync, sync_bytes) {
            (Some(target), Some(bytes)) => {
                sync_upload(&self.uploader, filename, &bytes, target).await
            }
            _ => SyncStatus::Skipped,
        };

        Ok(IngestReport {
            id,
            filename: filename.to_string(),
            sheet_names,
            sync: sync_status,
        })
    }
}
