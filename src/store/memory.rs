// In-memory grid with the read/append shape of the Sheets values API.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};
use crate::store::{
    CellSpan, CellValue, Grid, GridStore, Row, RowReference, column_index_to_letter, sheet_range,
};

#[derive(Default)]
pub struct MemoryGrid {
    sheets: Mutex<HashMap<String, Grid>>,
    fail_writes: AtomicBool,
}

impl MemoryGrid {
    pub fn with_sheet(name: &str, rows: &[&[&str]]) -> Self {
        let grid: Grid = rows
            .iter()
            .map(|r| r.iter().map(|&c| CellValue::from(c)).collect())
            .collect();
        let grid_store = MemoryGrid::default();
        grid_store
            .sheets
            .lock()
            .unwrap()
            .insert(name.to_string(), grid);
        grid_store
    }

    /// Current contents as display strings.
    pub fn rows(&self, name: &str) -> Vec<Vec<String>> {
        self.sheets.lock().unwrap()[name]
            .iter()
            .map(|r| r.iter().map(CellValue::as_string).collect())
            .collect()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self, range: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::sheets(range, "503 Service Unavailable"));
        }
        Ok(())
    }
}

fn trim_trailing(row: &mut Row) {
    while row.last().is_some_and(CellValue::is_empty) {
        row.pop();
    }
}

impl GridStore for MemoryGrid {
    async fn read_range(
        &self,
        _spreadsheet_id: &str,
        sheet_name: &str,
        cell_range: &str,
    ) -> Result<Grid> {
        let range = sheet_range(sheet_name, cell_range);
        let span =
            CellSpan::parse(cell_range).ok_or_else(|| Error::sheets(&range, "bad range"))?;
        let sheets = self.sheets.lock().unwrap();
        let grid = sheets
            .get(sheet_name)
            .ok_or_else(|| Error::sheets(&range, "sheet not found"))?;

        let mut out: Grid = grid
            .iter()
            .enumerate()
            .filter(|(i, _)| span.contains_row(*i))
            .map(|(_, row)| {
                let mut cells: Row = row
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| span.contains_col(*j))
                    .map(|(_, c)| c.clone())
                    .collect();
                trim_trailing(&mut cells);
                cells
            })
            .collect();
        while out.last().is_some_and(|r| r.is_empty()) {
            out.pop();
        }
        Ok(out)
    }

    async fn append_row(
        &self,
        _spreadsheet_id: &str,
        sheet_name: &str,
        row: Row,
    ) -> Result<RowReference> {
        self.check_writable(sheet_name)?;
        let mut sheets = self.sheets.lock().unwrap();
        let grid = sheets.entry(sheet_name.to_string()).or_default();
        while grid
            .last()
            .is_some_and(|r| r.iter().all(CellValue::is_empty))
        {
            grid.pop();
        }
        let last_col = column_index_to_letter(row.len().max(1) - 1);
        grid.push(row);
        let n = grid.len();
        Ok(RowReference::from_range(format!(
            "{}!A{}:{}{}",
            sheet_name, n, last_col, n
        )))
    }

    async fn update_row(
        &self,
        _spreadsheet_id: &str,
        sheet_name: &str,
        cell_range: &str,
        row: Row,
    ) -> Result<RowReference> {
        let range = sheet_range(sheet_name, cell_range);
        self.check_writable(&range)?;
        let span =
            CellSpan::parse(cell_range).ok_or_else(|| Error::sheets(&range, "bad range"))?;
        let r = span.first_row.unwrap_or(0);
        let c0 = span.first_col.unwrap_or(0);

        let mut sheets = self.sheets.lock().unwrap();
        let grid = sheets.entry(sheet_name.to_string()).or_default();
        if grid.len() <= r {
            grid.resize(r + 1, Vec::new());
        }
        let target = &mut grid[r];
        for (k, cell) in row.into_iter().enumerate() {
            // Null leaves the existing cell as it is.
            if cell == CellValue::Empty {
                continue;
            }
            if target.len() <= c0 + k {
                target.resize(c0 + k + 1, CellValue::Empty);
            }
            target[c0 + k] = cell;
        }
        Ok(RowReference::from_range(range))
    }
}
