use crate::domain::model::{FileRecord, Row};
use crate::utils::error::{AwmsError, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;
use std::collections::HashSet;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const ARCHIVE_FILENAME: &str = "awms-files.zip";

/// 儲存格的文字形式：null -> 空字串，字串不加引號
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 標題列只在必要時加引號，資料列的每個欄位都加引號（內部引號加倍）
pub fn rows_to_csv(columns: &[String], rows: &[Row]) -> Result<String> {
    let mut out = Vec::new();

    {
        let mut header = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut out);
        header.write_record(columns)?;
        header.flush()?;
    }

    {
        let mut body = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut out);
        for row in rows {
            let fields: Vec<String> = columns
                .iter()
                .map(|c| row.get(c).map(cell_text).unwrap_or_default())
                .collect();
            body.write_record(&fields)?;
        }
        body.flush()?;
    }

    String::from_utf8(out).map_err(|e| AwmsError::ExportError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

/// 將每筆記錄的原始檔案以原檔名打包成 ZIP
pub fn build_archive(records: &[FileRecord]) -> Result<Vec<u8>> {
    if records.is_empty() {
        return Err(AwmsError::ExportError {
            message: "No files to export".to_string(),
        });
    }

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let mut used = HashSet::new();

    for record in records {
        let name = unique_entry_name(&record.filename, record.id, &used);
        zip.start_file(name.as_str(), SimpleFileOptions::default())?;
        zip.write_all(&record.original_bytes)?;
        used.insert(name);
    }

    let cursor = zip.finish()?;
    let data = cursor.into_inner();
    tracing::debug!("Built archive with {} file(s), {} bytes", records.len(), data.len());
    Ok(data)
}

/// 重複的檔名在副檔名前加上 ` (id)`
fn unique_entry_name(filename: &str, id: i64, used: &HashSet<String>) -> String {
    if !used.contains(filename) {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, id, ext),
        _ => format!("{} ({})", filename, id),
    }
}
