//! # Cloud Monitoring Client
//!
//! MQL time-series queries against the Monitoring API.
//!
//! ## Submodules
//! - `client`: the paginated query request.
//! - `types`: query results as returned by the service.

pub mod client;
pub mod types;

pub use client::{MONITORING_API_BASE, MonitoringClient};
pub use types::{LabelValue, PointData, TimeInterval, TimeSeriesData, TypedValue};
