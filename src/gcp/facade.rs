//! The single entry point a host program holds.
//!
//! [`Gcp`] owns the configuration, the credentials and the client cache, and
//! forwards every operation to the component that implements it. Remote
//! clients are built on first use, so a `Gcp` used only for Sheets never
//! contacts Pub/Sub.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::client;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::gcp::auth::TokenSource;
use crate::gcp::cache::{ClientCache, ServiceKind};
use crate::gcp::monitoring::TimeSeriesData;
use crate::gcp::pubsub::{ReceiveSettings, ReceivedMessage, SubscriptionHandle, TopicHandle};
use crate::gcp::sheets::SheetsClient;
use crate::gcp::types::AccessToken;
use crate::store::{Filter, Grid, GridStore, Record, RecordStore, Row, RowReference};

pub struct Gcp {
    config: Config,
    tokens: Option<Arc<TokenSource>>,
    cache: ClientCache,
}

impl Gcp {
    /// Loads and validates the credentials. No network call is made.
    pub fn new(config: Config) -> Result<Self> {
        let http = client::build(config.request_timeout)?;
        let tokens = match &config.credentials {
            Some(source) => {
                let key = source.load()?;
                let tokens =
                    TokenSource::new(&key, config.scopes.clone())?.with_http_client(http.clone());
                info!(
                    client_email = %tokens.key().client_email,
                    project_id = tokens.project_id(),
                    "loaded service account"
                );
                Some(Arc::new(tokens))
            }
            None => {
                debug!("no service account configured");
                None
            }
        };
        let cache = ClientCache::new(
            http,
            tokens.clone(),
            config.project_id.clone(),
            config.pubsub_emulator_host.clone(),
        );
        Ok(Gcp {
            config,
            tokens,
            cache,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clients(&self) -> &ClientCache {
        &self.cache
    }

    fn token_source(&self) -> Result<&TokenSource> {
        self.tokens
            .as_deref()
            .ok_or_else(|| Error::Credential("no service account key configured".to_string()))
    }

    /// `scopes` overrides the configured scope list for this one token.
    fn scoped(&self, scopes: Option<Vec<String>>) -> Result<Option<TokenSource>> {
        let tokens = self.token_source()?;
        match scopes {
            Some(scopes) if !scopes.is_empty() => Ok(Some(tokens.with_scopes(scopes)?)),
            _ => Ok(None),
        }
    }

    /// A fresh OAuth 2.0 access token from the token endpoint.
    pub async fn access_token(&self, scopes: Option<Vec<String>>) -> Result<AccessToken> {
        match self.scoped(scopes)? {
            Some(tokens) => tokens.token().await,
            None => self.token_source()?.token().await,
        }
    }

    /// A self-signed JWT access token. No network call is made.
    pub fn self_signed_token(&self, scopes: Option<Vec<String>>) -> Result<AccessToken> {
        match self.scoped(scopes)? {
            Some(tokens) => tokens.self_signed_token(),
            None => self.token_source()?.self_signed_token(),
        }
    }

    async fn records(&self) -> Result<RecordStore<'_, SheetsClient>> {
        Ok(RecordStore::new(self.cache.sheets().await?))
    }

    pub async fn spreadsheet_get(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        cell_range: &str,
    ) -> Result<Grid> {
        self.records()
            .await?
            .read(spreadsheet_id, sheet_name, cell_range)
            .await
    }

    /// Appends `row` as given, without consulting the header.
    pub async fn spreadsheet_append_row(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        row: Row,
    ) -> Result<RowReference> {
        self.cache
            .sheets()
            .await?
            .append_row(spreadsheet_id, sheet_name, row)
            .await
    }

    pub async fn spreadsheet_append(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        record: &Record,
    ) -> Result<RowReference> {
        self.records()
            .await?
            .append(spreadsheet_id, sheet_name, record)
            .await
    }

    pub async fn spreadsheet_update(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        cell_range: &str,
        row: Row,
    ) -> Result<RowReference> {
        self.records()
            .await?
            .update(spreadsheet_id, sheet_name, cell_range, row)
            .await
    }

    pub async fn spreadsheet_get_row_by_filters(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        filter: &Filter,
    ) -> Result<Option<Record>> {
        self.records()
            .await?
            .get_by_filter(spreadsheet_id, sheet_name, filter)
            .await
    }

    pub async fn spreadsheet_append_with_unique_id(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        record: &Record,
    ) -> Result<i64> {
        self.records()
            .await?
            .append_with_unique_id(spreadsheet_id, sheet_name, record)
            .await
    }

    /// See [`RecordStore::get_or_create`] for the single-writer caveat.
    pub async fn spreadsheet_get_or_create(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        filter: &Filter,
        record: &Record,
    ) -> Result<i64> {
        self.records()
            .await?
            .get_or_create(spreadsheet_id, sheet_name, filter, record)
            .await
    }

    pub async fn pubsub_topic(&self, name: &str) -> Result<TopicHandle> {
        Ok(self.cache.pubsub().await?.topic(name))
    }

    pub async fn pubsub_subscription(&self, name: &str) -> Result<SubscriptionHandle> {
        Ok(self.cache.pubsub().await?.subscription(name))
    }

    pub async fn pubsub_publish(
        &self,
        topic: &TopicHandle,
        message: &Map<String, Value>,
    ) -> Result<String> {
        self.cache.pubsub().await?.publish(topic, message).await
    }

    pub async fn pubsub_receive(
        &self,
        subscription: &SubscriptionHandle,
        settings: &ReceiveSettings,
    ) -> Result<Vec<ReceivedMessage>> {
        self.cache
            .pubsub()
            .await?
            .receive(subscription, settings)
            .await
    }

    pub async fn query_time_series(
        &self,
        project_id: &str,
        query: &str,
    ) -> Result<Vec<TimeSeriesData>> {
        self.cache
            .monitoring()
            .await?
            .query_time_series(project_id, query)
            .await
    }

    pub fn is_ready(&self, kind: ServiceKind) -> bool {
        self.cache.is_ready(kind)
    }
}
