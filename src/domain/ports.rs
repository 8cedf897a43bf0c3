use crate::domain::model::{FileRecord, NewFileRecord, RecordId, UploadReceipt};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 本地記錄儲存：單一 "files" 集合，id 由實作指派
pub trait RecordStore: Send + Sync {
    fn add(&self, record: NewFileRecord)
        -> impl std::future::Future<Output = Result<RecordId>> + Send;

    /// 依 id 遞增排序
    fn get_all(&self) -> impl std::future::Future<Output = Result<Vec<FileRecord>>> + Send;

    fn get(&self, id: RecordId)
        -> impl std::future::Future<Output = Result<Option<FileRecord>>> + Send;

    /// 不存在的 id 不算錯誤
    fn delete(&self, id: RecordId) -> impl std::future::Future<Output = Result<()>> + Send;

    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    fn count(&self) -> impl std::future::Future<Output = Result<usize>> + Send;
}

#[async_trait]
pub trait Uploader: Send + Sync {
    /// 單次上傳，不重試；失敗回傳 `AwmsError::SyncWarning`
    async fn upload(
        &self,
        filename: &str,
        bytes: &[u8],
        endpoint: &str,
    ) -> Result<Option<UploadReceipt>>;
}
