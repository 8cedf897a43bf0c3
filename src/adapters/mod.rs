// Adapters layer: concrete implementations for external systems (local store, http).

pub mod http;
pub mod storage;

pub use http::HttpUploader;
pub use storage::SqliteRecordStore;
