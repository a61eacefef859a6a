//! # Error Types
//!
//! Every fallible operation in the crate returns [`Result`]. Remote failures
//! keep the lowest-level message and are annotated with the resource the
//! operation was working on (range, topic, subscription, project or scope).
//! A filter lookup that matches nothing is not an error; it is `Ok(None)`.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed key material or a failed token exchange.
    #[error("credential error: {0}")]
    Credential(String),

    /// Missing or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A header and a row could not be zipped positionally.
    #[error("header has {header} columns but row has {row}")]
    Shape { header: usize, row: usize },

    /// A record key that is not a header column.
    #[error("column '{0}' not found in the sheet header")]
    UnknownColumn(String),

    #[error("duplicate header '{name}' at columns {first} and {second}")]
    DuplicateHeader {
        name: String,
        first: usize,
        second: usize,
    },

    /// The sheet has no header row, or its first header cell is blank.
    #[error("sheet '{0}' has no header row naming an id column")]
    MissingHeader(String),

    #[error("cannot parse {value:?} as an integer: {reason}")]
    Parse { value: String, reason: String },

    #[error("sheets request for range {range} failed: {message}")]
    Sheets { range: String, message: String },

    #[error("failed to publish to {topic}: {message}")]
    Publish { topic: String, message: String },

    #[error("failed to receive from {subscription}: {message}")]
    Receive {
        subscription: String,
        message: String,
    },

    #[error("time series query for {project} failed: {message}")]
    Query { project: String, message: String },
}

impl Error {
    pub(crate) fn parse(value: impl Into<String>, reason: impl ToString) -> Self {
        Error::Parse {
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn sheets(range: impl Into<String>, message: impl ToString) -> Self {
        Error::Sheets {
            range: range.into(),
            message: message.to_string(),
        }
    }
}
