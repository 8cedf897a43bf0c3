#![allow(dead_code)]

use rust_xlsxwriter::Workbook;

/// 欄位值：字串、數字、布林或空白
pub enum Cell {
    Text(&'static str),
    Owned(String),
    Number(f64),
    Bool(bool),
    Blank,
}

/// 以 (工作表名稱, 標題, 資料列) 產生 xlsx 位元組
pub fn workbook_bytes(sheets: Vec<(&str, Vec<&str>, Vec<Vec<Cell>>)>) -> Vec<u8> {
    let mut workbook = Workbook::new();

    for (name, headers, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).unwrap();

        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            let r = (r + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Cell::Text(s) => {
                        sheet.write_string(r, c, *s).unwrap();
                    }
                    Cell::Owned(s) => {
                        sheet.write_string(r, c, s.as_str()).unwrap();
                    }
                    Cell::Number(n) => {
                        sheet.write_number(r, c, *n).unwrap();
                    }
                    Cell::Bool(b) => {
                        sheet.write_boolean(r, c, *b).unwrap();
                    }
                    Cell::Blank => {}
                }
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}

/// 兩張工作表：A 有 25 列、B 有 3 列
pub fn roster_workbook() -> Vec<u8> {
    let a_rows = (1..=25)
        .map(|i| {
            vec![
                Cell::Owned(format!("Worker {}", i)),
                Cell::Number(20.0 + i as f64),
                Cell::Text(if i % 5 == 0 { "Night" } else { "Day" }),
            ]
        })
        .collect();
    let b_rows = vec![
        vec![Cell::Text("Inventory"), Cell::Bool(true)],
        vec![Cell::Text("Payroll"), Cell::Bool(false)],
        vec![Cell::Text("Audit"), Cell::Blank],
    ];

    workbook_bytes(vec![
        ("A", vec!["Name", "Age", "Shift"], a_rows),
        ("B", vec!["Task", "Done"], b_rows),
    ])
}
