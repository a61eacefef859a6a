//! # GCP Authentication
//!
//! Service-account credentials for the OAuth 2.0 server-to-server flow. A
//! [`TokenSource`] is built once from key material and a scope list and then
//! hands out bearer tokens:
//! 1. Creates a JWT asserting the service account's identity and the scopes.
//! 2. Signs it with the account's private key (RS256).
//! 3. Exchanges it at the key's `token_uri` for an access token.
//!
//! [`TokenSource::self_signed_token`] skips the exchange and returns the signed
//! JWT itself, which Google APIs accept as a scoped access token.

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::gcp::types::{AccessToken, ServiceAccountKey, TokenResponse};

/// Scope used when none is given.
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime requested for every assertion, the maximum Google allows.
const TOKEN_LIFETIME_SECS: i64 = 3600;
/// Cached tokens closer than this to expiry are refreshed.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Claims of the assertion exchanged at the token endpoint.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    exp: i64,
    iat: i64,
}

/// Claims of a self-signed JWT access token.
#[derive(Debug, Serialize, Deserialize)]
struct SelfSignedClaims {
    iss: String,
    sub: String,
    scope: String,
    exp: i64,
    iat: i64,
}

pub struct TokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scopes: Vec<String>,
    http: reqwest::Client,
    cached: Mutex<Option<AccessToken>>,
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSource")
            .field("client_email", &self.key.client_email)
            .field("project_id", &self.key.project_id)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl TokenSource {
    /// Parses service-account key JSON and prepares a token source for `scopes`.
    ///
    /// An empty scope list means [`DEFAULT_SCOPE`].
    pub fn new(key_material: &[u8], scopes: Vec<String>) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_slice(key_material)
            .map_err(|e| Error::Credential(format!("malformed service account key: {}", e)))?;
        Self::from_key(key, scopes)
    }

    pub fn from_key(key: ServiceAccountKey, scopes: Vec<String>) -> Result<Self> {
        let missing: Vec<&str> = [
            ("client_email", &key.client_email),
            ("private_key", &key.private_key),
            ("token_uri", &key.token_uri),
            ("project_id", &key.project_id),
        ]
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
        if !missing.is_empty() {
            return Err(Error::Credential(format!(
                "service account key is missing {}",
                missing.join(", ")
            )));
        }

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| Error::Credential(format!("invalid private key: {}", e)))?;

        let scopes = if scopes.is_empty() {
            vec![DEFAULT_SCOPE.to_string()]
        } else {
            scopes
        };

        Ok(TokenSource {
            key,
            encoding_key,
            scopes,
            http: reqwest::Client::new(),
            cached: Mutex::new(None),
        })
    }

    /// Uses `http` for token exchanges instead of a private client.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// A token source for the same key with a different scope list.
    pub fn with_scopes(&self, scopes: Vec<String>) -> Result<TokenSource> {
        Ok(TokenSource::from_key(self.key.clone(), scopes)?.with_http_client(self.http.clone()))
    }

    pub fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    pub fn project_id(&self) -> &str {
        &self.key.project_id
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        if !self.key.private_key_id.is_empty() {
            header.kid = Some(self.key.private_key_id.clone());
        }
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| Error::Credential(format!("failed to sign JWT: {}", e)))
    }

    fn exchange_failure(&self, e: impl fmt::Display) -> Error {
        Error::Credential(format!(
            "failed to obtain access token for scope {}: {}",
            self.scope_string(),
            e
        ))
    }

    /// Exchanges a freshly signed assertion for an access token.
    ///
    /// Always one round trip to the token endpoint; failures are not retried.
    pub async fn token(&self) -> Result<AccessToken> {
        let now = Utc::now();
        let claims = Claims {
            iss: self.key.client_email.clone(),
            scope: self.scope_string(),
            aud: self.key.token_uri.clone(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECS,
            iat: now.timestamp(),
        };
        let jwt = self.sign(&claims)?;

        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", jwt.as_str())];
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| self.exchange_failure(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self.exchange_failure(format!("{}: {}", status, body)));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| self.exchange_failure(e))?;
        debug!(
            client_email = %self.key.client_email,
            expires_in = body.expires_in,
            "obtained access token"
        );
        Ok(AccessToken {
            expiry: Utc::now() + Duration::seconds(body.expires_in as i64),
            access_token: body.access_token,
            token_type: body.token_type,
            expires_in: body.expires_in,
        })
    }

    /// Returns a self-signed JWT access token. No network call is made.
    pub fn self_signed_token(&self) -> Result<AccessToken> {
        let now = Utc::now();
        let claims = SelfSignedClaims {
            iss: self.key.client_email.clone(),
            sub: self.key.client_email.clone(),
            scope: self.scope_string(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECS,
            iat: now.timestamp(),
        };
        Ok(AccessToken {
            access_token: self.sign(&claims)?,
            token_type: "Bearer".to_string(),
            expires_in: TOKEN_LIFETIME_SECS as u64,
            expiry: now + Duration::seconds(TOKEN_LIFETIME_SECS),
        })
    }

    /// Returns a cached token while it has time left, otherwise exchanges a new one.
    pub async fn bearer(&self) -> Result<AccessToken> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && token.valid_for(REFRESH_MARGIN_SECS)
        {
            return Ok(token.clone());
        }
        let token = self.token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}
