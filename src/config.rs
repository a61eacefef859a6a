//! Explicit configuration for [`crate::gcp::Gcp`].
//!
//! Nothing in the library reads the environment implicitly; [`Config::from_env`]
//! is a convenience that does it once, up front.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::DEFAULT_TIMEOUT;
use crate::error::{Error, Result};

pub const ENV_SERVICE_ACCOUNT_KEY: &str = "GOOGLE_SERVICE_ACCOUNT_KEY";
pub const ENV_SCOPES: &str = "GCP_SCOPES";
pub const ENV_PROJECT_ID: &str = "GCP_PROJECT_ID";
pub const ENV_PUBSUB_EMULATOR_HOST: &str = "PUBSUB_EMULATOR_HOST";

/// Where the service-account key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Json(String),
    File(PathBuf),
}

impl CredentialSource {
    /// Literal JSON when `value` starts with `{`, otherwise a path to a key file.
    pub fn parse(value: &str) -> Self {
        if value.trim_start().starts_with('{') {
            CredentialSource::Json(value.to_string())
        } else {
            CredentialSource::File(PathBuf::from(value))
        }
    }

    pub fn load(&self) -> Result<Vec<u8>> {
        match self {
            CredentialSource::Json(json) => Ok(json.clone().into_bytes()),
            CredentialSource::File(path) => std::fs::read(path).map_err(|e| {
                Error::Config(format!("failed to read key file {}: {}", path.display(), e))
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` leaves only the Pub/Sub emulator usable.
    pub credentials: Option<CredentialSource>,
    /// Empty means the cloud-platform scope.
    pub scopes: Vec<String>,
    /// Overrides the key's `project_id` for Pub/Sub.
    pub project_id: Option<String>,
    /// `host:port` of a Pub/Sub emulator.
    pub pubsub_emulator_host: Option<String>,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            credentials: None,
            scopes: Vec::new(),
            project_id: None,
            pubsub_emulator_host: None,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Config {
            credentials: get(ENV_SERVICE_ACCOUNT_KEY).map(|v| CredentialSource::parse(&v)),
            scopes: get(ENV_SCOPES).map(|v| split_scopes(&v)).unwrap_or_default(),
            project_id: get(ENV_PROJECT_ID),
            pubsub_emulator_host: get(ENV_PUBSUB_EMULATOR_HOST),
            ..Default::default()
        }
    }
}

/// Splits a comma-separated scope list, dropping blanks.
pub fn split_scopes(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn credential_source_detects_literal_json() {
        assert_eq!(
            CredentialSource::parse(" {\"type\":\"service_account\"}"),
            CredentialSource::Json(" {\"type\":\"service_account\"}".to_string())
        );
        assert_eq!(
            CredentialSource::parse("/etc/key.json"),
            CredentialSource::File(PathBuf::from("/etc/key.json"))
        );
    }

    #[test]
    fn loads_key_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"project_id\":\"p\"}").unwrap();
        let source = CredentialSource::File(file.path().to_path_buf());
        assert_eq!(source.load().unwrap(), b"{\"project_id\":\"p\"}");

        let dir = tempfile::tempdir().unwrap();
        let missing = CredentialSource::File(dir.path().join("missing.json"));
        assert!(matches!(missing.load(), Err(Error::Config(m)) if m.contains("missing.json")));
    }

    #[test]
    fn reads_environment() {
        let env: HashMap<&str, &str> = [
            (ENV_SERVICE_ACCOUNT_KEY, "/secrets/key.json"),
            (
                ENV_SCOPES,
                "https://www.googleapis.com/auth/spreadsheets, ,https://www.googleapis.com/auth/pubsub",
            ),
            (ENV_PUBSUB_EMULATOR_HOST, "localhost:8085"),
            (ENV_PROJECT_ID, ""),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(
            config.credentials,
            Some(CredentialSource::File(PathBuf::from("/secrets/key.json")))
        );
        assert_eq!(
            config.scopes,
            vec![
                "https://www.googleapis.com/auth/spreadsheets",
                "https://www.googleapis.com/auth/pubsub"
            ]
        );
        assert_eq!(config.project_id, None);
        assert_eq!(config.pubsub_emulator_host.as_deref(), Some("localhost:8085"));
        assert_eq!(config.request_timeout, DEFAULT_TIMEOUT);

        let empty = Config::from_lookup(|_| None);
        assert!(empty.credentials.is_none());
        assert!(empty.scopes.is_empty());
    }
}
