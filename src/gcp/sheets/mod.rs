//! # Google Sheets Client
//!
//! Raw grid access to spreadsheets through the Sheets API values endpoints.
//! [`SheetsClient`] implements [`crate::store::GridStore`], which is how the
//! record store reaches a real spreadsheet.
//!
//! ## Submodules
//! - `client`: request logic for reading, appending and updating cell ranges.
//! - `types`: the JSON bodies exchanged with the API.

/// Core client for Sheets API requests.
pub mod client;
/// Data structures for the Sheets API.
pub mod types;

pub use client::{SHEETS_API_BASE, SheetsClient};
pub use types::*;
