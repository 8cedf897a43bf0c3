pub mod connectivity;
pub mod export;
pub mod parser;
pub mod pipeline;
pub mod sync;
pub mod viewer;

pub use crate::domain::model::{FileRecord, NewFileRecord, RecordId, Row, SheetData};
pub use crate::domain::ports::{RecordStore, Uploader};
pub use crate::utils::error::Result;
