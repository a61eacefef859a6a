//! Remote clients built on first use and kept for the life of their owner.
//!
//! Each slot is a [`tokio::sync::OnceCell`], so concurrent first calls run a
//! single initialization and every caller gets the same client. A failed
//! initialization leaves the slot empty and the next call tries again.

use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::{Error, Result};
use crate::gcp::auth::TokenSource;
use crate::gcp::monitoring::MonitoringClient;
use crate::gcp::pubsub::PubsubClient;
use crate::gcp::sheets::SheetsClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    PubSub,
    Sheets,
    Monitoring,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceKind::PubSub => "pubsub",
            ServiceKind::Sheets => "sheets",
            ServiceKind::Monitoring => "monitoring",
        })
    }
}

pub struct ClientCache {
    http: reqwest::Client,
    tokens: Option<Arc<TokenSource>>,
    project_id: Option<String>,
    pubsub_emulator_host: Option<String>,
    sheets: OnceCell<SheetsClient>,
    pubsub: OnceCell<PubsubClient>,
    monitoring: OnceCell<MonitoringClient>,
}

impl ClientCache {
    /// `project_id` overrides the one named by the credentials.
    pub fn new(
        http: reqwest::Client,
        tokens: Option<Arc<TokenSource>>,
        project_id: Option<String>,
        pubsub_emulator_host: Option<String>,
    ) -> Self {
        ClientCache {
            http,
            tokens,
            project_id,
            pubsub_emulator_host,
            sheets: OnceCell::new(),
            pubsub: OnceCell::new(),
            monitoring: OnceCell::new(),
        }
    }

    pub fn token_source(&self, kind: ServiceKind) -> Result<Arc<TokenSource>> {
        self.tokens.clone().ok_or_else(|| {
            Error::Credential(format!("no service account key configured for {}", kind))
        })
    }

    /// The configured project, falling back to the credentials' project.
    pub fn project_id(&self) -> Result<String> {
        if let Some(p) = &self.project_id {
            return Ok(p.clone());
        }
        match &self.tokens {
            Some(tokens) => Ok(tokens.project_id().to_string()),
            None => Err(Error::Config(
                "no project id configured and no credentials to take it from".to_string(),
            )),
        }
    }

    pub fn is_ready(&self, kind: ServiceKind) -> bool {
        match kind {
            ServiceKind::PubSub => self.pubsub.initialized(),
            ServiceKind::Sheets => self.sheets.initialized(),
            ServiceKind::Monitoring => self.monitoring.initialized(),
        }
    }

    pub async fn sheets(&self) -> Result<&SheetsClient> {
        self.sheets
            .get_or_try_init(|| async move {
                SheetsClient::connect(self.http.clone(), self.token_source(ServiceKind::Sheets)?)
                    .await
            })
            .await
    }

    /// With an emulator host configured, the client talks to it unauthenticated.
    pub async fn pubsub(&self) -> Result<&PubsubClient> {
        self.pubsub
            .get_or_try_init(|| async move {
                let project_id = self.project_id()?;
                match &self.pubsub_emulator_host {
                    Some(host) => Ok(PubsubClient::emulator(self.http.clone(), host, project_id)),
                    None => {
                        let tokens = self.token_source(ServiceKind::PubSub)?;
                        PubsubClient::connect(self.http.clone(), tokens, project_id).await
                    }
                }
            })
            .await
    }

    pub async fn monitoring(&self) -> Result<&MonitoringClient> {
        self.monitoring
            .get_or_try_init(|| async move {
                MonitoringClient::connect(
                    self.http.clone(),
                    self.token_source(ServiceKind::Monitoring)?,
                )
                .await
            })
            .await
    }
}
