use serde::{Deserialize, Serialize};

/// 單列資料：欄位名稱 -> 值，保持欄位順序
pub type Row = serde_json::Map<String, serde_json::Value>;

pub type RecordId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetData {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl SheetData {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// 尚未寫入的記錄；id 一律由 store 指派
#[derive(Debug, Clone, PartialEq)]
pub struct NewFileRecord {
    pub filename: String,
    pub uploaded_at: i64,
    pub sheets: Vec<SheetData>,
    pub original_bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub id: RecordId,
    pub filename: String,
    /// ms since epoch
    pub uploaded_at: i64,
    pub sheets: Vec<SheetData>,
    pub original_bytes: Vec<u8>,
}

impl FileRecord {
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id,
            filename: self.filename.clone(),
            uploaded_at: self.uploaded_at,
            sheet_count: self.sheets.len(),
            sheet_names: self.sheet_names(),
            size_bytes: self.original_bytes.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    pub id: RecordId,
    pub filename: String,
    pub uploaded_at: i64,
    pub sheet_count: usize,
    pub sheet_names: Vec<String>,
    pub size_bytes: usize,
}

/// 伺服器 /upload 回傳的內容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub sheets: Vec<SheetSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub name: String,
    #[serde(rename = "rowCount")]
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    /// 未啟用同步
    Skipped,
    Synced(Option<UploadReceipt>),
    Failed(String),
}

impl SyncStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, SyncStatus::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub id: RecordId,
    pub filename: String,
    pub sheet_names: Vec<String>,
    pub sync: SyncStatus,
}

impl IngestReport {
    pub fn status_message(&self) -> String {
        let mut message = format!(
            "Saved locally as #{}. Sheets: {}",
            self.id,
            self.sheet_names.join(", ")
        );
        match &self.sync {
            SyncStatus::Skipped => {}
            SyncStatus::Synced(_) => message.push_str(" (uploaded to server)"),
            SyncStatus::Failed(_) => message.push_str(" (server upload failed, kept locally)"),
        }
        message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Offline,
}
