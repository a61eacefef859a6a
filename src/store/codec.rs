//! # Row Codec
//!
//! Converts between the positional rows the Sheets API speaks and
//! header-keyed [`Record`]s.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::store::{CellValue, Record, Row};

/// Column names taken from row 1 of a sheet, trimmed.
///
/// Non-empty names must be unique. Blank header cells are kept so that column
/// positions stay aligned, but they cannot be addressed by name and their
/// cells are left out of merged records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Header {
    /// Builds a header from the cells of the header row.
    pub fn from_row(row: &[CellValue]) -> Result<Self> {
        let names: Vec<String> = row.iter().map(|c| c.as_string().trim().to_string()).collect();
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            if let Some(&first) = index.get(name) {
                return Err(Error::DuplicateHeader {
                    name: name.clone(),
                    first,
                    second: i,
                });
            }
            index.insert(name.clone(), i);
        }
        Ok(Header { names, index })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of `name`, compared against the trimmed header names.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Name of the first column, which holds the unique id of each row.
    /// `None` when the header is empty or its first cell is blank.
    pub fn id_column(&self) -> Option<&str> {
        self.names.first().map(String::as_str).filter(|n| !n.is_empty())
    }
}

/// Zips header names with row cells positionally, skipping blank-named columns.
pub fn merge_header_and_row(header: &Header, row: &[CellValue]) -> Result<Record> {
    if header.len() != row.len() {
        return Err(Error::Shape {
            header: header.len(),
            row: row.len(),
        });
    }
    Ok(header
        .names()
        .iter()
        .zip(row)
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, cell)| (name.clone(), cell.clone()))
        .collect())
}

/// Lays out `record` in header order.
///
/// Columns missing from the record become [`CellValue::Empty`]. The row ends
/// at the last supplied column; it is not padded to the header width.
pub fn order_values_by_header(header: &Header, record: &Record) -> Result<Row> {
    let mut row: Row = Vec::new();
    for (name, value) in record {
        let i = header
            .position(name)
            .ok_or_else(|| Error::UnknownColumn(name.clone()))?;
        if row.len() <= i {
            row.resize(i + 1, CellValue::Empty);
        }
        row[i] = value.clone();
    }
    Ok(row)
}
