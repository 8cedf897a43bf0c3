use crate::domain::model::{FileRecord, NewFileRecord, RecordId, SheetData};
use crate::domain::ports::RecordStore;
use crate::utils::error::{AwmsError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS files (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    filename       TEXT    NOT NULL,
    uploaded_at    INTEGER NOT NULL,
    sheets         TEXT    NOT NULL,
    original_bytes BLOB    NOT NULL
);
";

/// SQLite 實作的 `RecordStore`。
///
/// 所有 handle 共用同一個連線；互斥鎖讓每筆交易依序執行，
/// `AUTOINCREMENT` 確保 id 遞增且刪除後不會被重複使用。
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteRecordStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::debug!("Opened local store at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// 關閉連線；之後任何操作都會回傳 StoreError
    pub async fn close(&self) -> Result<()> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&conn)?;
            if let Some(conn) = guard.take() {
                conn.close().map_err(|(_, e)| AwmsError::from(e))?;
            }
            Ok(())
        })
        .await
        .map_err(join_error)?
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&conn)?;
            let conn = guard.as_mut().ok_or_else(|| AwmsError::StoreError {
                message: "store is closed".to_string(),
            })?;
            f(conn)
        })
        .await
        .map_err(join_error)?
    }
}

fn lock(conn: &Mutex<Option<Connection>>) -> Result<MutexGuard<'_, Option<Connection>>> {
    conn.lock().map_err(|_| AwmsError::StoreError {
        message: "store mutex poisoned".to_string(),
    })
}

fn join_error(err: tokio::task::JoinError) -> AwmsError {
    AwmsError::StoreError {
        message: format!("store task failed: {}", err),
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(RecordId, String, i64, String, Vec<u8>)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn decode_record(
    (id, filename, uploaded_at, sheets, original_bytes): (RecordId, String, i64, String, Vec<u8>),
) -> Result<FileRecord> {
    let sheets: Vec<SheetData> = serde_json::from_str(&sheets)?;
    Ok(FileRecord {
        id,
        filename,
        uploaded_at,
        sheets,
        original_bytes,
    })
}

impl RecordStore for SqliteRecordStore {
    async fn add(&self, record: NewFileRecord) -> Result<RecordId> {
        let sheets = serde_json::to_string(&record.sheets)?;
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO files (filename, uploaded_at, sheets, original_bytes) VALUES (?1, ?2, ?3, ?4)",
                params![record.filename, record.uploaded_at, sheets, record.original_bytes],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(id)
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<FileRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, filename, uploaded_at, sheets, original_bytes FROM files ORDER BY id ASC",
            )?;
            let raw = stmt
                .query_map([], row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            raw.into_iter().map(decode_record).collect()
        })
        .await
    }

    async fn get(&self, id: RecordId) -> Result<Option<FileRecord>> {
        self.with_conn(move |conn| {
            let raw = conn
                .query_row(
                    "SELECT id, filename, uploaded_at, sheets, original_bytes FROM files WHERE id = ?1",
                    params![id],
                    row_to_record,
                )
                .optional()?;
            raw.map(decode_record).transpose()
        })
        .await
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        self.with_conn(move |conn| {
            let removed = conn.execute("DELETE FROM files WHERE id = ?1", params![id])?;
            tracing::debug!("Delete #{} removed {} record(s)", id, removed);
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM files", [])?;
            Ok(())
        })
        .await
    }

    async fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |r| r.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(name: &str) -> NewFileRecord {
        let mut row = crate::domain::model::Row::new();
        row.insert("Name".to_string(), json!("Al"));
        row.insert("Age".to_string(), json!(30));
        NewFileRecord {
            filename: name.to_string(),
            uploaded_at: 1_700_000_000_000,
            sheets: vec![SheetData {
                name: "Sheet1".to_string(),
                columns: vec!["Name".to_string(), "Age".to_string()],
                rows: vec![row],
            }],
            original_bytes: vec![0x50, 0x4b, 0x03, 0x04],
        }
    }

    #[tokio::test]
    async fn test_add_assigns_ascending_ids() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        let first = store.add(sample("a.xlsx")).await.unwrap();
        let second = store.add(sample("b.xlsx")).await.unwrap();
        assert!(second > first);

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first);
        assert_eq!(all[0].filename, "a.xlsx");
        assert_eq!(all[1].filename, "b.xlsx");
        assert_eq!(all[0].sheets[0].rows[0]["Age"], json!(30));
        assert_eq!(all[0].original_bytes, vec![0x50, 0x4b, 0x03, 0x04]);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        let first = store.add(sample("a.xlsx")).await.unwrap();
        store.delete(first).await.unwrap();
        let second = store.add(sample("b.xlsx")).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_not_an_error() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        store.add(sample("a.xlsx")).await.unwrap();

        store.delete(9_999).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_and_clear() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        let id = store.add(sample("a.xlsx")).await.unwrap();

        assert!(store.get(id).await.unwrap().is_some());
        assert!(store.get(id + 1).await.unwrap().is_none());

        store.clear().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_store_reports_store_error() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        store.close().await.unwrap();

        let err = store.add(sample("a.xlsx")).await.unwrap_err();
        assert!(matches!(err, AwmsError::StoreError { .. }));
    }
}
