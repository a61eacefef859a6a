use std::collections::BTreeMap;

use anyhow::{Result, bail};
use itertools::Itertools;
use gcpkit::store::{CellValue, Record, Row};

/// Parses `name=value` arguments. Later duplicates win.
pub fn parse_pairs(args: &[String]) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for arg in args {
        let Some((k, v)) = arg.split_once('=') else {
            bail!("expected name=value, got {:?}", arg);
        };
        if k.trim().is_empty() {
            bail!("empty column name in {:?}", arg);
        }
        out.insert(k.trim().to_string(), v.to_string());
    }
    Ok(out)
}

pub fn parse_record(args: &[String]) -> Result<Record> {
    Ok(parse_pairs(args)?
        .into_iter()
        .map(|(k, v)| (k, CellValue::from(v)))
        .collect())
}

/// Positional cell values; an empty argument leaves its cell untouched.
pub fn parse_row(args: &[String]) -> Row {
    args.iter()
        .map(|a| {
            if a.is_empty() {
                CellValue::Empty
            } else {
                CellValue::from(a.as_str())
            }
        })
        .collect()
}

/// Lays out `rows` under `headers` with columns padded to their widest cell.
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for (i, h) in headers.iter().enumerate() {
        widths[i] = widths[i].max(display_width(h));
    }
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    let mut out = String::new();
    let mut line = |cells: &mut dyn Iterator<Item = String>| {
        let text = cells.join("  ");
        out.push_str(text.trim_end());
        out.push('\n');
    };
    line(&mut (0..columns).map(|i| pad(headers.get(i).map_or("", |s| s), widths[i])));
    line(&mut widths.iter().map(|w| "-".repeat(*w)));
    for row in rows {
        line(&mut (0..columns).map(|i| pad(row.get(i).map_or("", |s| s), widths[i])));
    }
    out
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(fill))
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}
