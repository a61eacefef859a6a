//! # Spreadsheet Record Store
//!
//! Treats one sheet of a spreadsheet as a minimal table: row 1 holds the
//! column names, column A holds an integer id, and every other row is a record.
//!
//! The store talks to the grid only through [`GridStore`], so the same logic
//! runs against the Sheets API ([`crate::gcp::sheets::SheetsClient`]) or an
//! in-memory grid in tests.
//!
//! ## Consistency
//!
//! Nothing here is transactional. Id allocation reads column A and then
//! appends, so two writers racing on the same sheet can allocate the same id,
//! and [`RecordStore::get_or_create`] is only idempotent for a single writer.
//! A failed write is not rolled back; callers retry from the lookup.

use std::collections::BTreeMap;
use std::future::Future;

use tracing::{debug, info};

use crate::error::{Error, Result};

pub mod a1;
pub mod cell;
pub mod codec;
pub mod id;

#[cfg(test)]
pub(crate) mod memory;

pub use a1::{CellSpan, column_index_to_letter, sheet_range};
pub use cell::CellValue;
pub use codec::{Header, merge_header_and_row, order_values_by_header};
pub use id::next_id;

pub type Row = Vec<CellValue>;
pub type Grid = Vec<Row>;
pub type Record = BTreeMap<String, CellValue>;
/// Column name to expected (trimmed) cell text.
pub type Filter = BTreeMap<String, String>;

/// Where a write landed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RowReference {
    /// A1 range reported by the service, e.g. `Sheet1!A5:C5`.
    pub updated_range: String,
    /// 1-based row number, when the range names one.
    pub row_number: Option<u32>,
}

impl RowReference {
    pub fn from_range(updated_range: impl Into<String>) -> Self {
        let updated_range = updated_range.into();
        let row_number = a1::first_row_number(&updated_range);
        RowReference {
            updated_range,
            row_number,
        }
    }
}

/// Raw cell access to a spreadsheet.
///
/// Ranges are relative to `sheet_name`; implementations address
/// `sheet_name + "!" + cell_range`. Reads follow the Sheets API shape: trailing
/// empty cells of a row and trailing empty rows are omitted.
pub trait GridStore {
    fn read_range(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        cell_range: &str,
    ) -> impl Future<Output = Result<Grid>> + Send;

    /// Appends `row` after the last used row of the sheet.
    fn append_row(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        row: Row,
    ) -> impl Future<Output = Result<RowReference>> + Send;

    /// Overwrites the cells of `cell_range` starting at its top-left corner.
    fn update_row(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        cell_range: &str,
        row: Row,
    ) -> impl Future<Output = Result<RowReference>> + Send;
}

pub struct RecordStore<'a, G> {
    grid: &'a G,
}

impl<'a, G: GridStore> RecordStore<'a, G> {
    pub fn new(grid: &'a G) -> Self {
        RecordStore { grid }
    }

    /// Reads a raw range of the sheet.
    pub async fn read(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        cell_range: &str,
    ) -> Result<Grid> {
        self.grid
            .read_range(spreadsheet_id, sheet_name, cell_range)
            .await
    }

    /// Overwrites one row of cells at `cell_range`.
    pub async fn update(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        cell_range: &str,
        row: Row,
    ) -> Result<RowReference> {
        if CellSpan::parse(cell_range).is_none() {
            return Err(Error::sheets(
                sheet_range(sheet_name, cell_range),
                "not an A1 range",
            ));
        }
        let reference = self
            .grid
            .update_row(spreadsheet_id, sheet_name, cell_range, row)
            .await?;
        info!(range = %reference.updated_range, "updated row");
        Ok(reference)
    }

    /// Returns the first record, top to bottom, whose cells equal every filter value.
    ///
    /// `None` when nothing matches, when a filter column does not exist, or
    /// when the sheet is empty.
    pub async fn get_by_filter(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        filter: &Filter,
    ) -> Result<Option<Record>> {
        let (header, rows) = self.read_table(spreadsheet_id, sheet_name).await?;
        let found = find_first(&header, &rows, filter)?;
        debug!(
            sheet = sheet_name,
            rows = rows.len(),
            found = found.is_some(),
            "filter lookup"
        );
        Ok(found)
    }

    /// Appends `record` laid out by the current header. No id is assigned.
    pub async fn append(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        record: &Record,
    ) -> Result<RowReference> {
        let header = self.read_header(spreadsheet_id, sheet_name).await?;
        let row = order_values_by_header(&header, record)?;
        let reference = self
            .grid
            .append_row(spreadsheet_id, sheet_name, row)
            .await?;
        info!(range = %reference.updated_range, "appended row");
        Ok(reference)
    }

    /// Appends `record` under a freshly allocated id and returns the id.
    ///
    /// The id is written to the first header column, replacing any value the
    /// record carried for it. See the module docs for the concurrency caveat.
    pub async fn append_with_unique_id(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        record: &Record,
    ) -> Result<i64> {
        let header = self.read_header(spreadsheet_id, sheet_name).await?;
        self.insert_with_next_id(spreadsheet_id, sheet_name, &header, record)
            .await
    }

    /// Returns the id of the first record matching `filter`, appending
    /// `record` under a new id when there is none.
    pub async fn get_or_create(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        filter: &Filter,
        record: &Record,
    ) -> Result<i64> {
        let (header, rows) = self.read_table(spreadsheet_id, sheet_name).await?;
        if let Some(found) = find_first(&header, &rows, filter)? {
            let id_column = header
                .id_column()
                .ok_or_else(|| Error::MissingHeader(sheet_name.to_string()))?;
            let id = found
                .get(id_column)
                .unwrap_or(&CellValue::Empty)
                .as_int()?;
            debug!(sheet = sheet_name, id, "existing row matched");
            return Ok(id);
        }
        self.insert_with_next_id(spreadsheet_id, sheet_name, &header, record)
            .await
    }

    async fn insert_with_next_id(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        header: &Header,
        record: &Record,
    ) -> Result<i64> {
        let id_column = header
            .id_column()
            .ok_or_else(|| Error::MissingHeader(sheet_name.to_string()))?;

        let ids = self.grid.read_range(spreadsheet_id, sheet_name, "A:A").await?;
        let id = next_id(&ids)?;

        let mut record = record.clone();
        record.insert(id_column.to_string(), CellValue::from(id));
        let row = order_values_by_header(header, &record)?;
        let reference = self
            .grid
            .append_row(spreadsheet_id, sheet_name, row)
            .await?;
        info!(
            sheet = sheet_name,
            id,
            range = %reference.updated_range,
            "appended row with unique id"
        );
        Ok(id)
    }

    async fn read_header(&self, spreadsheet_id: &str, sheet_name: &str) -> Result<Header> {
        let rows = self.grid.read_range(spreadsheet_id, sheet_name, "1:1").await?;
        match rows.first() {
            Some(row) => Header::from_row(row),
            None => Ok(Header::default()),
        }
    }

    /// Reads the used range and splits off its first row as the header.
    ///
    /// The width comes from row 1; the header itself is taken from the same
    /// read as the data so both agree.
    async fn read_table(&self, spreadsheet_id: &str, sheet_name: &str) -> Result<(Header, Grid)> {
        let width = self.read_header(spreadsheet_id, sheet_name).await?.len();
        if width == 0 {
            return Ok((Header::default(), Vec::new()));
        }
        let range = format!("A:{}", column_index_to_letter(width - 1));
        let mut rows = self.grid.read_range(spreadsheet_id, sheet_name, &range).await?;
        if rows.is_empty() {
            return Ok((Header::default(), rows));
        }
        let header = Header::from_row(&rows.remove(0))?;
        Ok((header, rows))
    }
}

fn find_first(header: &Header, rows: &[Row], filter: &Filter) -> Result<Option<Record>> {
    let mut columns = Vec::with_capacity(filter.len());
    for (name, expected) in filter {
        match header.position(name) {
            Some(i) => columns.push((i, expected.as_str())),
            None => return Ok(None),
        }
    }
    for row in rows {
        let hit = columns.iter().all(|&(i, expected)| {
            row.get(i)
                .is_some_and(|cell| cell.as_string().trim() == expected)
        });
        if hit {
            return merge_padded(header, row).map(Some);
        }
    }
    Ok(None)
}

/// Merges a data row that may have lost its trailing empty cells in transit.
fn merge_padded(header: &Header, row: &[CellValue]) -> Result<Record> {
    if row.len() >= header.len() {
        return merge_header_and_row(header, row);
    }
    let mut padded = row.to_vec();
    padded.resize(header.len(), CellValue::Empty);
    merge_header_and_row(header, &padded)
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryGrid;
    use super::*;

    const SID: &str = "spreadsheet";
    const SHEET: &str = "people";

    fn filter(pairs: &[(&str, &str)]) -> Filter {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), CellValue::from(v)))
            .collect()
    }

    fn people() -> MemoryGrid {
        MemoryGrid::with_sheet(
            SHEET,
            &[&["id", "name", "status"], &["1", "alice", "active"]],
        )
    }

    #[tokio::test]
    async fn filter_on_header_only_sheet_is_not_found() {
        let grid = MemoryGrid::with_sheet(SHEET, &[&["id", "name"]]);
        let store = RecordStore::new(&grid);
        let found = store
            .get_by_filter(SID, SHEET, &filter(&[("name", "alice")]))
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn filter_on_empty_sheet_is_not_found() {
        let grid = MemoryGrid::with_sheet(SHEET, &[]);
        let store = RecordStore::new(&grid);
        let found = store.get_by_filter(SID, SHEET, &Filter::new()).await.unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn filter_returns_merged_record() {
        let grid = people();
        let store = RecordStore::new(&grid);
        let found = store
            .get_by_filter(SID, SHEET, &filter(&[("name", "alice")]))
            .await
            .unwrap();
        assert_eq!(
            found,
            Some(record(&[("id", "1"), ("name", "alice"), ("status", "active")]))
        );
    }

    #[tokio::test]
    async fn filter_returns_first_match_top_to_bottom() {
        let grid = MemoryGrid::with_sheet(
            SHEET,
            &[
                &["id", "name", "status"],
                &["1", "alice", "active"],
                &["2", "bob", "new"],
                &["3", "carol", "new"],
            ],
        );
        let store = RecordStore::new(&grid);
        let found = store
            .get_by_filter(SID, SHEET, &filter(&[("status", "new")]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["name"], CellValue::from("bob"));

        // Every key has to match.
        let found = store
            .get_by_filter(SID, SHEET, &filter(&[("status", "new"), ("name", "carol")]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["id"], CellValue::from("3"));
    }

    #[tokio::test]
    async fn filter_trims_cells_and_ignores_unknown_columns() {
        let grid = MemoryGrid::with_sheet(
            SHEET,
            &[&[" id ", "name", "status"], &["1", "  alice ", "active"]],
        );
        let store = RecordStore::new(&grid);
        let found = store
            .get_by_filter(SID, SHEET, &filter(&[("name", "alice")]))
            .await
            .unwrap()
            .unwrap();
        // The stored cell is returned untouched; only the comparison trims.
        assert_eq!(found["name"], CellValue::from("  alice "));
        assert_eq!(found["id"], CellValue::from("1"));

        let missing = store
            .get_by_filter(SID, SHEET, &filter(&[("email", "a@example.com")]))
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn short_rows_are_padded_to_the_header() {
        let grid = MemoryGrid::with_sheet(
            SHEET,
            &[&["id", "name", "status"], &["1", "alice", ""]],
        );
        let store = RecordStore::new(&grid);
        let found = store
            .get_by_filter(SID, SHEET, &filter(&[("id", "1")]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found["status"], CellValue::Empty);
    }

    #[tokio::test]
    async fn duplicate_headers_are_rejected() {
        let grid = MemoryGrid::with_sheet(SHEET, &[&["id", "name", "name"], &["1", "a", "b"]]);
        let store = RecordStore::new(&grid);
        let err = store
            .get_by_filter(SID, SHEET, &filter(&[("id", "1")]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateHeader { .. }));
    }

    #[tokio::test]
    async fn append_orders_by_header() {
        let grid = people();
        let store = RecordStore::new(&grid);
        let reference = store
            .append(SID, SHEET, &record(&[("status", "new"), ("name", "dave")]))
            .await
            .unwrap();
        assert_eq!(reference.row_number, Some(3));
        assert_eq!(grid.rows(SHEET)[2], vec!["", "dave", "new"]);
    }

    #[tokio::test]
    async fn append_rejects_unknown_columns() {
        let grid = people();
        let store = RecordStore::new(&grid);
        let err = store
            .append(SID, SHEET, &record(&[("age", "3")]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownColumn(c) if c == "age"));
        assert_eq!(grid.rows(SHEET).len(), 2);
    }

    #[tokio::test]
    async fn unique_ids_follow_the_last_row() {
        let grid = people();
        let store = RecordStore::new(&grid);
        let id = store
            .append_with_unique_id(SID, SHEET, &record(&[("id", "99"), ("name", "erin")]))
            .await
            .unwrap();
        assert_eq!(id, 2);
        let id = store
            .append_with_unique_id(SID, SHEET, &record(&[("name", "frank")]))
            .await
            .unwrap();
        assert_eq!(id, 3);
        let rows = grid.rows(SHEET);
        assert_eq!(rows[2], vec!["2", "erin"]);
        assert_eq!(rows[3], vec!["3", "frank"]);
    }

    #[tokio::test]
    async fn first_unique_id_is_one() {
        let grid = MemoryGrid::with_sheet(SHEET, &[&["id", "name"]]);
        let store = RecordStore::new(&grid);
        let id = store
            .append_with_unique_id(SID, SHEET, &record(&[("name", "alice")]))
            .await
            .unwrap();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn unique_id_needs_a_header() {
        let grid = MemoryGrid::with_sheet(SHEET, &[]);
        let store = RecordStore::new(&grid);
        let err = store
            .append_with_unique_id(SID, SHEET, &Record::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingHeader(s) if s == SHEET));
    }

    #[tokio::test]
    async fn unique_id_fails_on_non_numeric_last_id() {
        let grid = MemoryGrid::with_sheet(SHEET, &[&["id", "name"], &["abc", "x"]]);
        let store = RecordStore::new(&grid);
        let err = store
            .append_with_unique_id(SID, SHEET, &record(&[("name", "y")]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert_eq!(grid.rows(SHEET).len(), 2);
    }

    #[tokio::test]
    async fn get_or_create_end_to_end() {
        let grid = people();
        let store = RecordStore::new(&grid);

        let id = store
            .get_or_create(
                SID,
                SHEET,
                &filter(&[("name", "bob")]),
                &record(&[("name", "bob"), ("status", "new")]),
            )
            .await
            .unwrap();
        assert_eq!(id, 2);
        assert_eq!(grid.rows(SHEET)[2], vec!["2", "bob", "new"]);

        // Same call again finds the row instead of appending.
        let again = store
            .get_or_create(
                SID,
                SHEET,
                &filter(&[("name", "bob")]),
                &record(&[("name", "bob"), ("status", "new")]),
            )
            .await
            .unwrap();
        assert_eq!(again, 2);
        assert_eq!(grid.rows(SHEET).len(), 3);

        let alice = store
            .get_or_create(SID, SHEET, &filter(&[("name", "alice")]), &Record::new())
            .await
            .unwrap();
        assert_eq!(alice, 1);
    }

    #[tokio::test]
    async fn get_or_create_fails_on_unparsable_existing_id() {
        let grid = MemoryGrid::with_sheet(SHEET, &[&["id", "name"], &["x1", "alice"]]);
        let store = RecordStore::new(&grid);
        let err = store
            .get_or_create(SID, SHEET, &filter(&[("name", "alice")]), &Record::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[tokio::test]
    async fn get_or_create_needs_a_named_id_column() {
        let grid = MemoryGrid::with_sheet(SHEET, &[&["", "name"], &["1", "alice"]]);
        let store = RecordStore::new(&grid);
        for name in ["alice", "bob"] {
            let err = store
                .get_or_create(SID, SHEET, &filter(&[("name", name)]), &record(&[("name", name)]))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::MissingHeader(s) if s == SHEET));
        }
        assert_eq!(grid.rows(SHEET).len(), 2);

        let found = store
            .get_by_filter(SID, SHEET, &filter(&[("name", "alice")]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, record(&[("name", "alice")]));
    }

    #[tokio::test]
    async fn get_or_create_surfaces_write_failures() {
        let grid = people();
        grid.fail_writes(true);
        let store = RecordStore::new(&grid);
        let err = store
            .get_or_create(
                SID,
                SHEET,
                &filter(&[("name", "bob")]),
                &record(&[("name", "bob")]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Sheets { .. }));

        // A retry after the failure starts over from the lookup.
        grid.fail_writes(false);
        let id = store
            .get_or_create(
                SID,
                SHEET,
                &filter(&[("name", "bob")]),
                &record(&[("name", "bob")]),
            )
            .await
            .unwrap();
        assert_eq!(id, 2);
    }

    #[tokio::test]
    async fn raw_read_and_update() {
        let grid = people();
        let store = RecordStore::new(&grid);
        let header = store.read(SID, SHEET, "1:1").await.unwrap();
        assert_eq!(header.len(), 1);
        assert_eq!(header[0].len(), 3);

        store
            .update(
                SID,
                SHEET,
                "B2:C2",
                vec![CellValue::from("alicia"), CellValue::from("inactive")],
            )
            .await
            .unwrap();
        assert_eq!(grid.rows(SHEET)[1], vec!["1", "alicia", "inactive"]);

        let err = store
            .update(SID, SHEET, "not a range", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Sheets { range, .. } if range == "people!not a range"));
    }
}
