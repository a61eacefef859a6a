use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Generic GCP types shared across services (service-agnostic).

/// A service-account key file as downloaded from the Cloud console.
///
/// Only `client_email`, `private_key`, `token_uri` and `project_id` are needed;
/// [`crate::gcp::auth::TokenSource::new`] checks them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub account_type: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub auth_uri: String,
    #[serde(default)]
    pub token_uri: String,
    #[serde(default)]
    pub auth_provider_x509_cert_url: String,
    #[serde(default)]
    pub client_x509_cert_url: String,
    #[serde(default)]
    pub universe_domain: String,
}

/// Body of a successful response from the OAuth2 token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

fn bearer() -> String {
    "Bearer".to_string()
}

/// A bearer token together with its absolute expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub expiry: DateTime<Utc>,
}

impl AccessToken {
    /// True if the token is still valid `margin_secs` from now.
    pub fn valid_for(&self, margin_secs: i64) -> bool {
        self.expiry - chrono::Duration::seconds(margin_secs) > Utc::now()
    }

    /// Value for an `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}
