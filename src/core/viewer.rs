use crate::core::export::{build_archive, cell_text, rows_to_csv};
use crate::domain::model::{FileRecord, RecordId, RecordSummary, Row, SheetData};
use crate::domain::ports::RecordStore;
use crate::utils::error::{AwmsError, Result};

pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// 列表與明細檢視。只透過 store 讀取，唯一的寫入是刪除。
pub struct Viewer<S: RecordStore> {
    store: S,
    default_page_size: usize,
}

impl<S: RecordStore> Viewer<S> {
    pub fn new(store: S) -> Self {
        Self::with_page_size(store, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(store: S, page_size: usize) -> Self {
        Self {
            store,
            default_page_size: page_size.max(1),
        }
    }

    pub async fn list_records(&self) -> Result<Vec<RecordSummary>> {
        let records = self.store.get_all().await?;
        Ok(records.iter().map(FileRecord::summary).collect())
    }

    pub async fn open_detail(&self, id: RecordId) -> Result<DetailView> {
        let record = self.fetch(id).await?;
        tracing::debug!("Opening #{} ({} sheet(s))", id, record.sheets.len());
        Ok(DetailView::new(record, self.default_page_size))
    }

    pub async fn delete_record(&self, id: RecordId) -> Result<()> {
        self.store.delete(id).await?;
        tracing::info!("🗑️ Deleted #{}", id);
        Ok(())
    }

    /// 取回原始檔案（檔名、位元組）
    pub async fn download(&self, id: RecordId) -> Result<(String, Vec<u8>)> {
        let record = self.fetch(id).await?;
        Ok((record.filename, record.original_bytes))
    }

    pub async fn export_archive(&self) -> Result<Vec<u8>> {
        let records = self.store.get_all().await?;
        build_archive(&records)
    }

    async fn fetch(&self, id: RecordId) -> Result<FileRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AwmsError::NotFound { id: id.to_string() })
    }
}

/// 單筆記錄的明細狀態：選定工作表、篩選、分頁
#[derive(Debug, Clone)]
pub struct DetailView {
    record: FileRecord,
    sheet_index: usize,
    query: String,
    /// 目前工作表中符合篩選的列索引
    filtered: Vec<usize>,
    page_size: usize,
    page: usize,
}

impl DetailView {
    pub fn new(record: FileRecord, page_size: usize) -> Self {
        let mut view = Self {
            record,
            sheet_index: 0,
            query: String::new(),
            filtered: Vec::new(),
            page_size: page_size.max(1),
            page: 1,
        };
        view.refilter();
        view
    }

    pub fn record(&self) -> &FileRecord {
        &self.record
    }

    pub fn sheet_index(&self) -> usize {
        self.sheet_index
    }

    pub fn sheet(&self) -> Option<&SheetData> {
        self.record.sheets.get(self.sheet_index)
    }

    pub fn columns(&self) -> &[String] {
        self.sheet().map(|s| s.columns.as_slice()).unwrap_or(&[])
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 切換工作表會清除篩選並回到第 1 頁
    pub fn select_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.record.sheets.len() {
            return Err(AwmsError::NotFound {
                id: format!("{} sheet {}", self.record.id, index),
            });
        }
        self.sheet_index = index;
        self.query.clear();
        self.page = 1;
        self.refilter();
        Ok(())
    }

    pub fn select_sheet_by_name(&mut self, name: &str) -> Result<()> {
        let index = self
            .record
            .sheets
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| AwmsError::NotFound {
                id: format!("{} sheet '{}'", self.record.id, name),
            })?;
        self.select_sheet(index)
    }

    pub fn set_filter(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
        self.page = 1;
        self.refilter();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn next_page(&mut self) {
        self.page = (self.page + 1).min(self.page_count());
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count());
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn page_count(&self) -> usize {
        self.filtered.len().div_ceil(self.page_size).max(1)
    }

    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.rows_at(&self.filtered)
    }

    pub fn current_page_rows(&self) -> Vec<&Row> {
        self.page_rows(self.page)
    }

    /// 第 `page` 頁（從 1 開始）；超出範圍回傳空集合
    pub fn page_rows(&self, page: usize) -> Vec<&Row> {
        if page == 0 {
            return Vec::new();
        }
        let start = (page - 1).saturating_mul(self.page_size);
        if start >= self.filtered.len() {
            return Vec::new();
        }
        let end = (start + self.page_size).min(self.filtered.len());
        self.rows_at(&self.filtered[start..end])
    }

    /// 匯出目前篩選結果（不受分頁影響）
    pub fn export_csv(&self) -> Result<String> {
        if self.filtered.is_empty() {
            return Err(AwmsError::ExportError {
                message: "No rows to export".to_string(),
            });
        }
        let rows: Vec<Row> = self.filtered_rows().into_iter().cloned().collect();
        rows_to_csv(self.columns(), &rows)
    }

    pub fn csv_filename(&self) -> String {
        let sheet = self.sheet().map(|s| s.name.as_str()).unwrap_or("sheet");
        format!("{}-{}.csv", self.record.filename, sheet)
    }

    /// 純文字表格，給 CLI 使用
    pub fn render_page(&self) -> String {
        let sheet_name = self.sheet().map(|s| s.name.as_str()).unwrap_or("");
        let mut out = format!(
            "{} [{}] {} row(s)\n",
            self.record.filename,
            sheet_name,
            self.filtered.len()
        );

        let rows = self.current_page_rows();
        if rows.is_empty() {
            out.push_str("No rows match\n");
        } else {
            let columns = self.columns();
            let table: Vec<Vec<String>> = rows
                .iter()
                .map(|r| {
                    columns
                        .iter()
                        .map(|c| r.get(c).map(cell_text).unwrap_or_default())
                        .collect()
                })
                .collect();
            let widths: Vec<usize> = columns
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    table
                        .iter()
                        .map(|r| r[i].chars().count())
                        .chain(std::iter::once(c.chars().count()))
                        .max()
                        .unwrap_or(0)
                })
                .collect();

            out.push_str(&pad_line(columns, &widths));
            out.push('\n');
            for row in &table {
                out.push_str(&pad_line(row, &widths));
                out.push('\n');
            }
        }

        out.push_str(&format!("Page {} / {}\n", self.page, self.page_count()));
        out
    }

    fn refilter(&mut self) {
        let Some(sheet) = self.record.sheets.get(self.sheet_index) else {
            self.filtered.clear();
            return;
        };
        self.filtered = sheet
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, &self.query))
            .map(|(i, _)| i)
            .collect();
    }

    fn rows_at(&self, indices: &[usize]) -> Vec<&Row> {
        match self.sheet() {
            Some(sheet) => indices.iter().filter_map(|&i| sheet.rows.get(i)).collect(),
            None => Vec::new(),
        }
    }
}

fn pad_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// 以整列的 JSON 文字（小寫）做子字串比對；空查詢全部符合
pub fn row_matches(row: &Row, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    serde_json::to_string(row)
        .map(|text| text.to_lowercase().contains(&query))
        .unwrap_or(false)
}
