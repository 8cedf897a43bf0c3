mod common;

use awms_offline::{parse_workbook, AwmsError, IngestionPipeline, Row, SqliteRecordStore, Viewer};
use awms_offline::{HttpUploader, RecordStore};
use common::{roster_workbook, workbook_bytes, Cell};
use std::io::Read;
use std::time::Duration;

fn pipeline(store: &SqliteRecordStore) -> IngestionPipeline<SqliteRecordStore, HttpUploader> {
    let uploader = HttpUploader::new(Duration::from_secs(5)).unwrap();
    IngestionPipeline::new(store.clone(), uploader)
}

#[tokio::test]
async fn test_pagination_over_two_sheets() -> anyhow::Result<()> {
    let store = SqliteRecordStore::open_in_memory()?;
    let report = pipeline(&store)
        .ingest_bytes("roster.xlsx", roster_workbook(), None)
        .await?;

    let viewer = Viewer::new(store.clone());
    let mut view = viewer.open_detail(report.id).await?;

    assert_eq!(view.sheet().unwrap().name, "A");
    assert_eq!(view.page_count(), 3);
    let sizes: Vec<usize> = (1..=3).map(|p| view.page_rows(p).len()).collect();
    assert_eq!(sizes, vec![10, 10, 5]);
    assert_eq!(view.current_page_rows()[0]["Name"], "Worker 1");

    view.go_to_page(3);
    assert_eq!(view.current_page_rows()[0]["Name"], "Worker 21");
    view.next_page();
    assert_eq!(view.page(), 3);

    view.select_sheet_by_name("B")?;
    assert_eq!(view.page_count(), 1);
    assert_eq!(view.current_page_rows().len(), 3);
    assert_eq!(view.current_page_rows()[2]["Done"], serde_json::Value::Null);

    Ok(())
}

#[tokio::test]
async fn test_filter_then_export_csv_round_trip() -> anyhow::Result<()> {
    let store = SqliteRecordStore::open_in_memory()?;
    let report = pipeline(&store)
        .ingest_bytes("roster.xlsx", roster_workbook(), None)
        .await?;
    let mut view = Viewer::new(store).open_detail(report.id).await?;

    view.set_filter("  WORKER 1 ");
    assert_eq!(view.query(), "worker 1");
    // Worker 1 與 Worker 10..19
    assert_eq!(view.filtered_count(), 11);
    assert_eq!(view.page_count(), 2);

    view.next_page();
    let csv_text = view.export_csv()?;
    assert!(csv_text.starts_with("Name,Age,Shift\n\"Worker 1\",\"21\",\"Day\"\n"));

    // 匯出的 CSV 可以再次作為活頁簿匯入，欄位與值都相同
    let reparsed = parse_workbook(csv_text.as_bytes())?;
    assert_eq!(reparsed.len(), 1);
    assert_eq!(reparsed[0].columns, view.columns());
    assert_eq!(reparsed[0].row_count(), view.filtered_count());
    let expected: Vec<Row> = view.filtered_rows().into_iter().cloned().collect();
    assert_eq!(reparsed[0].rows, expected);
    assert_eq!(view.csv_filename(), "roster.xlsx-A.csv");

    // 布林值與空白儲存格也能還原
    view.select_sheet_by_name("B")?;
    let reparsed = parse_workbook(view.export_csv()?.as_bytes())?;
    let expected: Vec<Row> = view.filtered_rows().into_iter().cloned().collect();
    assert_eq!(reparsed[0].rows, expected);
    assert_eq!(reparsed[0].rows[2]["Done"], serde_json::Value::Null);

    Ok(())
}

#[tokio::test]
async fn test_filter_with_no_match_cannot_export() -> anyhow::Result<()> {
    let store = SqliteRecordStore::open_in_memory()?;
    let report = pipeline(&store)
        .ingest_bytes("roster.xlsx", roster_workbook(), None)
        .await?;
    let mut view = Viewer::new(store).open_detail(report.id).await?;

    view.set_filter("nobody here");
    assert_eq!(view.filtered_count(), 0);
    assert_eq!(view.page_count(), 1);
    assert!(view.render_page().contains("No rows match"));
    assert!(matches!(
        view.export_csv(),
        Err(AwmsError::ExportError { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_blank_cells_become_null_with_consistent_keys() -> anyhow::Result<()> {
    let bytes = workbook_bytes(vec![(
        "Sheet1",
        vec!["Name", "Note", "Score"],
        vec![
            vec![Cell::Text("Al"), Cell::Blank, Cell::Number(3.5)],
            vec![Cell::Blank, Cell::Text("late"), Cell::Blank],
        ],
    )]);

    let sheets = parse_workbook(&bytes)?;
    assert_eq!(sheets.len(), 1);
    let rows = &sheets[0].rows;
    assert_eq!(rows.len(), 2);
    for row in rows {
        let keys: Vec<&String> = row.keys().collect();
        assert_eq!(keys, vec!["Name", "Note", "Score"]);
    }
    assert_eq!(rows[0]["Note"], serde_json::Value::Null);
    assert_eq!(rows[0]["Score"], serde_json::json!(3.5));
    assert_eq!(rows[1]["Name"], serde_json::Value::Null);

    Ok(())
}

#[tokio::test]
async fn test_download_and_archive_keep_original_bytes() -> anyhow::Result<()> {
    let store = SqliteRecordStore::open_in_memory()?;
    let bytes = roster_workbook();
    let pipeline = pipeline(&store);
    let first = pipeline.ingest_bytes("roster.xlsx", bytes.clone(), None).await?;
    let second = pipeline.ingest_bytes("roster.xlsx", bytes.clone(), None).await?;

    let viewer = Viewer::new(store.clone());
    let (filename, downloaded) = viewer.download(first.id).await?;
    assert_eq!(filename, "roster.xlsx");
    assert_eq!(downloaded, bytes);

    let archive = viewer.export_archive().await?;
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive))?;
    assert_eq!(zip.len(), 2);

    let renamed = format!("roster ({}).xlsx", second.id);
    for name in ["roster.xlsx", renamed.as_str()] {
        let mut entry = zip.by_name(name)?;
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        assert_eq!(content, bytes);
    }

    Ok(())
}

#[tokio::test]
async fn test_delete_through_viewer() -> anyhow::Result<()> {
    let store = SqliteRecordStore::open_in_memory()?;
    let report = pipeline(&store)
        .ingest_bytes("roster.xlsx", roster_workbook(), None)
        .await?;
    let viewer = Viewer::new(store.clone());

    viewer.delete_record(report.id).await?;
    viewer.delete_record(report.id).await?;
    assert!(viewer.list_records().await?.is_empty());
    assert!(matches!(
        viewer.open_detail(report.id).await,
        Err(AwmsError::NotFound { .. })
    ));
    assert!(matches!(
        viewer.export_archive().await,
        Err(AwmsError::ExportError { .. })
    ));
    assert_eq!(store.count().await?, 0);

    Ok(())
}
