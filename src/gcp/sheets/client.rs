//! # Sheets API Client Logic
//!
//! Calls to the `spreadsheets.values` endpoints of the Sheets API v4. Values
//! are written with `valueInputOption=RAW` so strings are stored verbatim and
//! never parsed as formulas.

use std::sync::Arc;

use tracing::debug;

use crate::client::{check_status, encode_path_segment};
use crate::error::{Error, Result};
use crate::gcp::auth::TokenSource;
use crate::gcp::sheets::types::{AppendValuesResponse, UpdateValuesResponse, ValueRange};
use crate::store::{Grid, GridStore, Row, RowReference, sheet_range};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

pub struct SheetsClient {
    http: reqwest::Client,
    tokens: Arc<TokenSource>,
    base_url: String,
}

impl SheetsClient {
    /// Creates the client and fetches a first token, so bad credentials
    /// surface here rather than on the first read.
    pub async fn connect(http: reqwest::Client, tokens: Arc<TokenSource>) -> Result<Self> {
        tokens.bearer().await?;
        debug!("sheets client ready");
        Ok(SheetsClient {
            http,
            tokens,
            base_url: SHEETS_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        values_url(&self.base_url, spreadsheet_id, range)
    }

    async fn authorization(&self) -> Result<String> {
        Ok(self.tokens.bearer().await?.header_value())
    }

    /// Reads `range` (already sheet-qualified). An empty range is an empty grid.
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Grid> {
        let res = self
            .http
            .get(self.values_url(spreadsheet_id, range))
            .header("Authorization", self.authorization().await?)
            .send()
            .await
            .map_err(|e| Error::sheets(range, e))?;
        let res = check_status(res)
            .await
            .map_err(|e| Error::sheets(range, e))?;
        let body: ValueRange = res.json().await.map_err(|e| Error::sheets(range, e))?;
        if body.values.is_empty() {
            debug!(range, "no data found");
        }
        Ok(body.values)
    }

    /// Appends `rows` after the last row of the table the service finds in `range`.
    pub async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Row>,
    ) -> Result<RowReference> {
        let body = ValueRange {
            values: rows,
            ..Default::default()
        };
        let res = self
            .http
            .post(format!("{}:append", self.values_url(spreadsheet_id, range)))
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .header("Authorization", self.authorization().await?)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::sheets(range, e))?;
        let res = check_status(res)
            .await
            .map_err(|e| Error::sheets(range, e))?;
        let body: AppendValuesResponse = res.json().await.map_err(|e| Error::sheets(range, e))?;
        Ok(RowReference::from_range(body.updates.updated_range))
    }

    /// Overwrites the cells of `range` with `rows`.
    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Row>,
    ) -> Result<RowReference> {
        let body = ValueRange {
            range: Some(range.to_string()),
            values: rows,
            ..Default::default()
        };
        let res = self
            .http
            .put(self.values_url(spreadsheet_id, range))
            .query(&[("valueInputOption", "RAW")])
            .header("Authorization", self.authorization().await?)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::sheets(range, e))?;
        let res = check_status(res)
            .await
            .map_err(|e| Error::sheets(range, e))?;
        let body: UpdateValuesResponse = res.json().await.map_err(|e| Error::sheets(range, e))?;
        Ok(RowReference::from_range(body.updated_range))
    }
}

fn values_url(base_url: &str, spreadsheet_id: &str, range: &str) -> String {
    format!(
        "{}/spreadsheets/{}/values/{}",
        base_url.trim_end_matches('/'),
        encode_path_segment(spreadsheet_id),
        encode_path_segment(range)
    )
}

impl GridStore for SheetsClient {
    async fn read_range(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        cell_range: &str,
    ) -> Result<Grid> {
        self.get_values(spreadsheet_id, &sheet_range(sheet_name, cell_range))
            .await
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        row: Row,
    ) -> Result<RowReference> {
        // The bare sheet name lets the service pick the table and its last row.
        self.append_values(spreadsheet_id, sheet_name, vec![row])
            .await
    }

    async fn update_row(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        cell_range: &str,
        row: Row,
    ) -> Result<RowReference> {
        self.update_values(
            spreadsheet_id,
            &sheet_range(sheet_name, cell_range),
            vec![row],
        )
        .await
    }
}
