use crate::error::{Error, Result};
use crate::store::{CellValue, Row};

/// Computes the id for the next row from the rows of column A (header included).
///
/// Only the last row is consulted: its id is trusted to be the maximum.
/// Rows inserted out of order, or by a concurrent writer between the read and
/// the append, can therefore produce a duplicate id.
pub fn next_id(rows: &[Row]) -> Result<i64> {
    if rows.len() <= 1 {
        return Ok(1);
    }
    let last = rows[rows.len() - 1].first().unwrap_or(&CellValue::Empty);
    last.as_int()?
        .checked_add(1)
        .ok_or_else(|| Error::parse(last.as_string(), "id overflow"))
}
