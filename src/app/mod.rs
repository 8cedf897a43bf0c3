// Application wiring: one store handle shared by the pipeline and the viewer.

use crate::adapters::{HttpUploader, SqliteRecordStore};
use crate::config::TomlConfig;
use crate::core::connectivity::ConnectivityMonitor;
use crate::core::pipeline::IngestionPipeline;
use crate::core::sync::SyncTarget;
use crate::core::viewer::Viewer;
use crate::domain::model::IngestReport;
use crate::utils::error::Result;
use std::path::Path;

pub struct Workspace {
    store: SqliteRecordStore,
    pipeline: IngestionPipeline<SqliteRecordStore, HttpUploader>,
    viewer: Viewer<SqliteRecordStore>,
    sync_target: Option<SyncTarget>,
}

impl Workspace {
    /// 開啟本地 store 並建立各元件；結束時呼叫 `close`
    pub fn open(config: &TomlConfig) -> Result<Self> {
        let store = SqliteRecordStore::open(config.store_path())?;
        Self::with_store(store, config)
    }

    pub fn with_store(store: SqliteRecordStore, config: &TomlConfig) -> Result<Self> {
        let uploader = HttpUploader::new(config.sync_timeout())?;
        let sync_target = config.sync_target()?;
        if let Some(target) = &sync_target {
            tracing::debug!("Server upload enabled: {}", target.endpoint());
        }

        Ok(Self {
            pipeline: IngestionPipeline::new(store.clone(), uploader),
            viewer: Viewer::with_page_size(store.clone(), config.page_size()),
            store,
            sync_target,
        })
    }

    pub async fn ingest(&self, path: impl AsRef<Path>) -> Result<IngestReport> {
        self.pipeline.ingest(path, self.sync_target.as_ref()).await
    }

    pub fn pipeline(&self) -> &IngestionPipeline<SqliteRecordStore, HttpUploader> {
        &self.pipeline
    }

    pub fn viewer(&self) -> &Viewer<SqliteRecordStore> {
        &self.viewer
    }

    pub fn store(&self) -> &SqliteRecordStore {
        &self.store
    }

    pub fn sync_target(&self) -> Option<&SyncTarget> {
        self.sync_target.as_ref()
    }

    pub async fn close(self) -> Result<()> {
        self.store.close().await
    }
}

pub fn connectivity_monitor(config: &TomlConfig) -> Result<ConnectivityMonitor> {
    ConnectivityMonitor::new(
        config.base_url(),
        config.health_path(),
        config.connectivity_timeout(),
    )
}
