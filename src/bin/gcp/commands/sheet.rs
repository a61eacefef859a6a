use anyhow::{Context, Result};
use clap::Subcommand;
use gcpkit::Gcp;
use gcpkit::store::{Filter, Grid};

use crate::common::{format_table, parse_pairs, parse_record, parse_row};

#[derive(Subcommand, Debug)]
pub enum SheetCommand {
    /// Print a range of cells
    Get {
        spreadsheet_id: String,
        sheet: String,
        /// A1 range within the sheet, e.g. A1:C10 or A:C
        range: String,
        /// Print the raw grid as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Append a record laid out by the header row
    Append {
        spreadsheet_id: String,
        sheet: String,
        /// name=value pairs
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Append cell values as given, ignoring the header row
    AppendRow {
        spreadsheet_id: String,
        sheet: String,
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Append a record under the next free id and print the id
    Insert {
        spreadsheet_id: String,
        sheet: String,
        /// name=value pairs; any value for the id column is replaced
        fields: Vec<String>,
    },

    /// Print the first record matching every filter as JSON
    Find {
        spreadsheet_id: String,
        sheet: String,
        /// name=value filters
        #[arg(required = true)]
        filters: Vec<String>,
    },

    /// Print the id of the first matching record, inserting one if none matches
    GetOrCreate {
        spreadsheet_id: String,
        sheet: String,
        /// name=value filter (repeatable)
        #[arg(long = "filter", required = true)]
        filters: Vec<String>,
        /// name=value field of the record to insert (repeatable)
        #[arg(long = "set")]
        fields: Vec<String>,
    },

    /// Overwrite one row of cells starting at the range's top-left cell
    Update {
        spreadsheet_id: String,
        sheet: String,
        range: String,
        /// Cell values; an empty value leaves its cell unchanged
        #[arg(required = true)]
        values: Vec<String>,
    },
}

pub async fn run(gcp: &Gcp, cmd: SheetCommand) -> Result<()> {
    match cmd {
        SheetCommand::Get {
            spreadsheet_id,
            sheet,
            range,
            json,
        } => {
            let grid = gcp
                .spreadsheet_get(&spreadsheet_id, &sheet, &range)
                .await
                .with_context(|| format!("Failed to read {}!{}", sheet, range))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&grid)?);
            } else {
                print!("{}", render_grid(&grid));
            }
        }
        SheetCommand::Append {
            spreadsheet_id,
            sheet,
            fields,
        } => {
            let record = parse_record(&fields)?;
            let reference = gcp
                .spreadsheet_append(&spreadsheet_id, &sheet, &record)
                .await?;
            println!("{}", reference.updated_range);
        }
        SheetCommand::AppendRow {
            spreadsheet_id,
            sheet,
            values,
        } => {
            let reference = gcp
                .spreadsheet_append_row(&spreadsheet_id, &sheet, parse_row(&values))
                .await?;
            println!("{}", reference.updated_range);
        }
        SheetCommand::Insert {
            spreadsheet_id,
            sheet,
            fields,
        } => {
            let record = parse_record(&fields)?;
            let id = gcp
                .spreadsheet_append_with_unique_id(&spreadsheet_id, &sheet, &record)
                .await?;
            println!("{id}");
        }
        SheetCommand::Find {
            spreadsheet_id,
            sheet,
            filters,
        } => {
            let filter: Filter = parse_pairs(&filters)?;
            match gcp
                .spreadsheet_get_row_by_filters(&spreadsheet_id, &sheet, &filter)
                .await?
            {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => eprintln!("No matching row in {}", sheet),
            }
        }
        SheetCommand::GetOrCreate {
            spreadsheet_id,
            sheet,
            filters,
            fields,
        } => {
            let filter: Filter = parse_pairs(&filters)?;
            let record = parse_record(&fields)?;
            let id = gcp
                .spreadsheet_get_or_create(&spreadsheet_id, &sheet, &filter, &record)
                .await?;
            println!("{id}");
        }
        SheetCommand::Update {
            spreadsheet_id,
            sheet,
            range,
            values,
        } => {
            let reference = gcp
                .spreadsheet_update(&spreadsheet_id, &sheet, &range, parse_row(&values))
                .await?;
            println!("{}", reference.updated_range);
        }
    }
    Ok(())
}

/// First row as the table header, the rest as its body.
fn render_grid(grid: &Grid) -> String {
    let text = |row: &[gcpkit::store::CellValue]| -> Vec<String> {
        row.iter().map(|c| c.as_string()).collect()
    };
    match grid.split_first() {
        Some((header, rows)) => format_table(
            &text(header),
            &rows.iter().map(|r| text(r)).collect::<Vec<_>>(),
        ),
        None => String::new(),
    }
}
