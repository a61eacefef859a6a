//! Shared HTTP plumbing for the REST clients.

use std::fmt::Write;
use std::time::Duration;

use crate::error::{Error, Result};

/// Request timeout used when the configuration does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Builds the client shared by every service of one [`crate::gcp::Gcp`].
pub fn build(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))
}

/// Percent-encodes `s` as a single URL path segment.
///
/// Google APIs take resource names such as `Sheet1!A:C` inside one segment,
/// so everything but unreserved characters is escaped, `/` included.
pub(crate) fn encode_path_segment(segment: &str) -> String {
    segment.bytes().fold(String::with_capacity(segment.len()), |mut out, b| {
        if is_unreserved(b) {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{:02X}", b);
        }
        out
    })
}

/// RFC 3986 unreserved characters.
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-_.~".contains(&b)
}

/// Turns a non-success response into `"<status>: <body>"`, or passes it through.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> std::result::Result<reqwest::Response, String> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(format!("{}: {}", status, body.trim()))
}
