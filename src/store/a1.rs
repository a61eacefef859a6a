//! A1 notation helpers: column letters, sheet-qualified ranges and spans.

/// Converts a zero-based column index to its letters (`0` -> `A`, `26` -> `AA`).
pub fn column_index_to_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Converts column letters back to a zero-based index. Case-insensitive.
pub fn column_letter_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let v = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(v)?;
    }
    Some(n - 1)
}

/// `sheet_name + "!" + cell_range`, verbatim.
pub fn sheet_range(sheet_name: &str, cell_range: &str) -> String {
    format!("{}!{}", sheet_name, cell_range)
}

/// Splits an optional `Sheet!` prefix off a range.
pub fn split_sheet(range: &str) -> (Option<&str>, &str) {
    match range.rsplit_once('!') {
        Some((sheet, cells)) => (Some(sheet), cells),
        None => (None, range),
    }
}

/// A rectangular span with open ends, parsed from `A1:B2`, `A:C`, `1:1` or `B3`.
///
/// Rows and columns are zero-based and inclusive; `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellSpan {
    pub first_col: Option<usize>,
    pub last_col: Option<usize>,
    pub first_row: Option<usize>,
    pub last_row: Option<usize>,
}

impl CellSpan {
    pub fn parse(range: &str) -> Option<CellSpan> {
        let (_, cells) = split_sheet(range);
        let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
        let (first_col, first_row) = parse_ref(start)?;
        let (last_col, last_row) = parse_ref(end)?;
        // `A:3` mixes a column-only and a row-only reference.
        if first_col.is_some() != last_col.is_some() && first_row.is_some() != last_row.is_some()
        {
            return None;
        }
        Some(CellSpan {
            first_col,
            last_col,
            first_row,
            last_row,
        })
    }

    pub fn contains_row(&self, row: usize) -> bool {
        self.first_row.is_none_or(|r| row >= r) && self.last_row.is_none_or(|r| row <= r)
    }

    pub fn contains_col(&self, col: usize) -> bool {
        self.first_col.is_none_or(|c| col >= c) && self.last_col.is_none_or(|c| col <= c)
    }
}

/// Parses `B3`, `B` or `3` into (column, row), both zero-based.
fn parse_ref(s: &str) -> Option<(Option<usize>, Option<usize>)> {
    let s = s.trim().replace('$', "");
    if s.is_empty() {
        return None;
    }
    let split = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
    let (letters, digits) = s.split_at(split);
    let col = if letters.is_empty() {
        None
    } else {
        Some(column_letter_to_index(letters)?)
    };
    let row = if digits.is_empty() {
        None
    } else {
        let n: usize = digits.parse().ok()?;
        Some(n.checked_sub(1)?)
    };
    Some((col, row))
}

/// 1-based row number of the first cell of a range such as `Sheet1!A5:C5`.
pub fn first_row_number(range: &str) -> Option<u32> {
    let span = CellSpan::parse(range)?;
    span.first_row.map(|r| r as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(column_index_to_letter(0), "A");
        assert_eq!(column_index_to_letter(2), "C");
        assert_eq!(column_index_to_letter(25), "Z");
        assert_eq!(column_index_to_letter(26), "AA");
        assert_eq!(column_index_to_letter(701), "ZZ");
        assert_eq!(column_index_to_letter(702), "AAA");
        for i in [0, 1, 25, 26, 27, 51, 52, 701, 702, 16383] {
            assert_eq!(column_letter_to_index(&column_index_to_letter(i)), Some(i));
        }
        assert_eq!(column_letter_to_index("a"), Some(0));
        assert_eq!(column_letter_to_index("A1"), None);
    }

    #[test]
    fn ranges() {
        assert_eq!(sheet_range("Sheet1", "A:Z"), "Sheet1!A:Z");
        assert_eq!(sheet_range("People", "1:1"), "People!1:1");
        assert_eq!(split_sheet("Sheet!A1:B2"), (Some("Sheet"), "A1:B2"));
        assert_eq!(split_sheet("A:A"), (None, "A:A"));
    }

    #[test]
    fn spans() {
        let header = CellSpan::parse("1:1").unwrap();
        assert!(header.contains_row(0) && !header.contains_row(1));
        assert!(header.contains_col(500));

        let ids = CellSpan::parse("Sheet!A:A").unwrap();
        assert!(ids.contains_col(0) && !ids.contains_col(1));
        assert!(ids.contains_row(1000));

        let block = CellSpan::parse("B2:$C$3").unwrap();
        assert_eq!(
            block,
            CellSpan {
                first_col: Some(1),
                last_col: Some(2),
                first_row: Some(1),
                last_row: Some(2),
            }
        );
        assert_eq!(CellSpan::parse("A:3"), None);
        assert_eq!(CellSpan::parse("0:0"), None);
        assert_eq!(CellSpan::parse(""), None);
    }

    #[test]
    fn appended_row_number() {
        assert_eq!(first_row_number("Sheet1!A5:C5"), Some(5));
        assert_eq!(first_row_number("'My Sheet'!B12"), Some(12));
        assert_eq!(first_row_number("Sheet1!A:C"), None);
    }
}
