pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::TomlConfig;

pub use crate::adapters::{HttpUploader, SqliteRecordStore};
pub use crate::app::Workspace;
pub use crate::core::{
    connectivity::ConnectivityMonitor,
    parser::parse_workbook,
    pipeline::IngestionPipeline,
    sync::SyncTarget,
    viewer::{DetailView, Viewer},
};
pub use crate::domain::model::{
    Connectivity, FileRecord, IngestReport, NewFileRecord, RecordId, RecordSummary, Row,
    SheetData, SyncStatus, UploadReceipt,
};
pub use crate::domain::ports::{RecordStore, Uploader};
pub use crate::utils::error::{AwmsError, Result};
