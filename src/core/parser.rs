use crate::domain::model::{Row, SheetData};
use crate::utils::error::{AwmsError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Cursor;

const CSV_SHEET_NAME: &str = "Sheet1";

/// 將整個活頁簿解析為依序排列的工作表。
///
/// 每張工作表的第一列為標題列；之後每一列都會有完整的欄位集合，
/// 空白儲存格以 `null` 表示。完全空白的資料列會被略過。
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<SheetData>> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = match open_workbook_auto_from_rs(cursor) {
        Ok(workbook) => workbook,
        Err(e) => {
            // 不是試算表容器時，UTF-8 文字改以 CSV 解析（單一工作表）
            return match std::str::from_utf8(bytes) {
                Ok(text) if !text.trim().is_empty() => parse_csv(text),
                _ => Err(AwmsError::ParseError {
                    message: format!("unrecognized spreadsheet container ({})", e),
                }),
            };
        }
    };

    let sheet_names = workbook.sheet_names().to_owned();
    tracing::debug!("Workbook contains {} sheet(s)", sheet_names.len());

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| AwmsError::ParseError {
                message: format!("sheet '{}' could not be decoded ({})", name, e),
            })?;
        sheets.push(build_sheet(name, range.rows()));
    }

    Ok(sheets)
}

/// CSV 文字視為名為 `Sheet1` 的單一工作表，欄位值依內容推斷型別
fn parse_csv(text: &str) -> Result<Vec<SheetData>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid: Vec<Vec<Data>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AwmsError::ParseError {
            message: format!("CSV could not be decoded ({})", e),
        })?;
        grid.push(record.iter().map(text_cell).collect());
    }

    // 較長的資料列也要有對應的標題欄
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    if let Some(header) = grid.first_mut() {
        header.resize(width, Data::Empty);
    }

    tracing::debug!("Parsed CSV text as a single sheet");
    Ok(vec![build_sheet(
        CSV_SHEET_NAME.to_string(),
        grid.iter().map(Vec::as_slice),
    )])
}

fn build_sheet<'a>(name: String, mut rows_iter: impl Iterator<Item = &'a [Data]>) -> SheetData {
    let columns = match rows_iter.next() {
        Some(header) => header_names(header),
        None => {
            return SheetData {
                name,
                columns: Vec::new(),
                rows: Vec::new(),
            }
        }
    };

    let mut rows = Vec::new();
    for cells in rows_iter {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let mut row = Row::new();
        for (idx, column) in columns.iter().enumerate() {
            let value = cells.get(idx).map(cell_to_value).unwrap_or(Value::Null);
            row.insert(column.clone(), value);
        }
        rows.push(row);
    }

    tracing::debug!("Sheet '{}': {} column(s), {} row(s)", name, columns.len(), rows.len());
    SheetData {
        name,
        columns,
        rows,
    }
}

/// 空字串 -> 空白；TRUE/FALSE -> 布林；有限數字 -> 數值；其餘為字串
fn text_cell(field: &str) -> Data {
    if field.is_empty() {
        return Data::Empty;
    }
    if field.eq_ignore_ascii_case("true") {
        return Data::Bool(true);
    }
    if field.eq_ignore_ascii_case("false") {
        return Data::Bool(false);
    }
    let looks_numeric = field
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
    if looks_numeric {
        if let Ok(f) = field.parse::<f64>() {
            if f.is_finite() {
                return Data::Float(f);
            }
        }
    }
    Data::String(field.to_string())
}

/// 空白標題 -> `__EMPTY`, `__EMPTY_1`...；重複標題 -> `Name_1`, `Name_2`...
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(header.len());

    for cell in header {
        let base = match cell_to_value(cell) {
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Null => "__EMPTY".to_string(),
            Value::String(s) if s.trim().is_empty() => "__EMPTY".to_string(),
            Value::String(s) => s,
            other => other.to_string(),
        };

        let mut candidate = base.clone();
        while let Some(count) = seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{}_{}", base, count);
            if !seen.contains_key(&candidate) {
                break;
            }
        }
        seen.insert(candidate.clone(), 0);
        names.push(candidate);
    }

    names
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => number_value(*f),
        // 日期保留 Excel 序列值
        Data::DateTime(dt) => number_value(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(e) => Value::String(e.to_string()),
    }
}

fn number_value(f: f64) -> Value {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return Value::from(f as i64);
    }
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
