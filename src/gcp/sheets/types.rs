use serde::{Deserialize, Serialize};

use crate::store::Row;

/// A block of cells, the request and response body of the values endpoints.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(rename = "majorDimension")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Absent in responses when the range holds no data.
    #[serde(default)]
    pub values: Vec<Row>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateValuesResponse {
    #[serde(rename = "spreadsheetId")]
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(rename = "updatedRange")]
    #[serde(default)]
    pub updated_range: String,
    #[serde(rename = "updatedRows")]
    #[serde(default)]
    pub updated_rows: Option<u32>,
    #[serde(rename = "updatedColumns")]
    #[serde(default)]
    pub updated_columns: Option<u32>,
    #[serde(rename = "updatedCells")]
    #[serde(default)]
    pub updated_cells: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppendValuesResponse {
    #[serde(rename = "spreadsheetId")]
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    /// The table the service detected and appended after.
    #[serde(rename = "tableRange")]
    #[serde(default)]
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: UpdateValuesResponse,
}
