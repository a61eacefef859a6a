// # gcpkit: Google Cloud Access for Load Scripts and Tools
//
// One object, `gcp::Gcp`, exposes service-account tokens, Pub/Sub publish and
// receive, Monitoring queries and a record store layered on a spreadsheet.
//
// The record store (`store`) is plain logic over the `store::GridStore` trait
// and builds without any feature. Everything that talks to the network sits
// behind the `reqwest` and `tokio` features, both on by default.

pub mod error;

/// Spreadsheet-as-database: header-indexed rows, id allocation and lookups.
pub mod store;

/// HTTP client construction shared by the service clients.
#[cfg(feature = "reqwest")]
pub mod client;

/// Explicit configuration, optionally read from the environment.
#[cfg(all(feature = "reqwest", feature = "tokio"))]
pub mod config;

/// Google Cloud clients and the `Gcp` facade.
#[cfg(all(feature = "reqwest", feature = "tokio"))]
pub mod gcp;

pub use error::{Error, Result};

#[cfg(all(feature = "reqwest", feature = "tokio"))]
pub use config::{Config, CredentialSource};
#[cfg(all(feature = "reqwest", feature = "tokio"))]
pub use gcp::Gcp;
