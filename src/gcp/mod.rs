//! # Google Cloud Services
//!
//! Service-account authentication and thin REST clients for the services the
//! crate drives, tied together by [`Gcp`].
//!
//! ## Submodules
//! - `auth`: the OAuth 2.0 service-account token source.
//! - `cache`: remote clients built once on first use.
//! - `facade`: [`Gcp`], the object a host program holds.
//! - `sheets`, `pubsub`, `monitoring`: one client per service.
//! - `types`: key file and token types shared across services.

pub mod auth;
pub mod cache;
pub mod facade;
pub mod monitoring;
pub mod pubsub;
pub mod sheets;
pub mod types;

pub use auth::{DEFAULT_SCOPE, TokenSource};
pub use cache::{ClientCache, ServiceKind};
pub use facade::Gcp;
pub use types::{AccessToken, ServiceAccountKey};
