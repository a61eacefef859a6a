//! # Pub/Sub API Client Logic
//!
//! Publishing and pulling through the Pub/Sub REST API v1. Message payloads
//! are JSON objects, base64-encoded on the wire.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::check_status;
use crate::error::{Error, Result};
use crate::gcp::auth::TokenSource;
use crate::gcp::pubsub::types::*;

pub const PUBSUB_API_BASE: &str = "https://pubsub.googleapis.com/v1";

/// Pause between empty pulls.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct PubsubClient {
    http: reqwest::Client,
    /// `None` when talking to the emulator, which does not authenticate.
    tokens: Option<Arc<TokenSource>>,
    base_url: String,
    project_id: String,
}

impl PubsubClient {
    /// Creates an authenticated client, fetching a first token up front.
    pub async fn connect(
        http: reqwest::Client,
        tokens: Arc<TokenSource>,
        project_id: impl Into<String>,
    ) -> Result<Self> {
        tokens.bearer().await?;
        let project_id = project_id.into();
        debug!(%project_id, "pubsub client ready");
        Ok(PubsubClient {
            http,
            tokens: Some(tokens),
            base_url: PUBSUB_API_BASE.to_string(),
            project_id,
        })
    }

    /// Creates an unauthenticated client for the emulator at `host` (`localhost:8085`).
    pub fn emulator(http: reqwest::Client, host: &str, project_id: impl Into<String>) -> Self {
        let project_id = project_id.into();
        debug!(host, %project_id, "pubsub emulator client ready");
        PubsubClient {
            http,
            tokens: None,
            base_url: format!("http://{}/v1", host.trim_end_matches('/')),
            project_id,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn topic(&self, name: &str) -> TopicHandle {
        TopicHandle {
            name: resource_name(&self.project_id, "topics", name),
        }
    }

    pub fn subscription(&self, name: &str) -> SubscriptionHandle {
        SubscriptionHandle {
            name: resource_name(&self.project_id, "subscriptions", name),
        }
    }

    async fn post(&self, url: String) -> Result<reqwest::RequestBuilder> {
        let req = self.http.post(url);
        match &self.tokens {
            Some(tokens) => Ok(req.header("Authorization", tokens.bearer().await?.header_value())),
            None => Ok(req),
        }
    }

    /// Publishes `message` as JSON and waits for the service to assign an id.
    pub async fn publish(&self, topic: &TopicHandle, message: &Map<String, Value>) -> Result<String> {
        let fail = |message: String| Error::Publish {
            topic: topic.name.clone(),
            message,
        };

        let data = serde_json::to_vec(message)
            .map_err(|e| fail(format!("failed to marshal data to JSON: {}", e)))?;
        let body = PublishRequest {
            messages: vec![PubsubMessage {
                data: STANDARD.encode(data),
                ..Default::default()
            }],
        };

        let res = self
            .post(format!("{}/{}:publish", self.base_url, topic.name))
            .await?
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;
        let res = check_status(res).await.map_err(fail)?;
        let body: PublishResponse = res.json().await.map_err(|e| fail(e.to_string()))?;

        let id = body
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| fail("no message id returned".to_string()))?;
        info!(topic = %topic.name, message_id = %id, "published message");
        Ok(id)
    }

    /// Pulls and acknowledges messages until `max_messages` have arrived or
    /// `timeout` has passed.
    ///
    /// Every pulled message is acknowledged, including ones whose payload
    /// cannot be decoded; those come back with an `Err` in
    /// [`ReceivedMessage::data`].
    ///
    /// A failed pull or acknowledge is an error only while nothing has been
    /// received. Later failures end the loop and the messages already
    /// acknowledged are returned. A batch whose acknowledge failed is left
    /// for redelivery and is not returned.
    pub async fn receive(
        &self,
        subscription: &SubscriptionHandle,
        settings: &ReceiveSettings,
    ) -> Result<Vec<ReceivedMessage>> {
        let deadline = Instant::now() + settings.timeout;
        let mut received = Vec::new();

        while received.len() < settings.max_messages {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let want = settings.max_messages - received.len();
            let batch = match tokio::time::timeout(remaining, self.pull(subscription, want)).await {
                Ok(Ok(batch)) => batch,
                Ok(Err(e)) if !received.is_empty() => {
                    warn!(
                        subscription = %subscription.name,
                        received = received.len(),
                        "pull failed, returning messages received so far: {}",
                        e
                    );
                    break;
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => break,
            };
            if batch.is_empty() {
                tokio::time::sleep(POLL_INTERVAL.min(remaining)).await;
                continue;
            }

            let ack_ids = batch.iter().map(|m| m.ack_id.clone()).collect();
            if let Err(e) = self.acknowledge(subscription, ack_ids).await {
                if received.is_empty() {
                    return Err(e);
                }
                // The unacknowledged batch is redelivered by the service.
                warn!(
                    subscription = %subscription.name,
                    received = received.len(),
                    dropped = batch.len(),
                    "{}",
                    e
                );
                break;
            }

            for envelope in batch {
                let message = decode_envelope(envelope);
                if let Err(e) = &message.data {
                    warn!(subscription = %subscription.name, "{}", e);
                }
                received.push(message);
            }
        }

        info!(
            subscription = %subscription.name,
            received = received.len(),
            "receive finished"
        );
        Ok(received)
    }

    async fn pull(
        &self,
        subscription: &SubscriptionHandle,
        max_messages: usize,
    ) -> Result<Vec<ReceivedEnvelope>> {
        let fail = |message: String| Error::Receive {
            subscription: subscription.name.clone(),
            message,
        };
        let res = self
            .post(format!("{}/{}:pull", self.base_url, subscription.name))
            .await?
            .json(&PullRequest { max_messages })
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;
        let res = check_status(res).await.map_err(fail)?;
        let body: PullResponse = res.json().await.map_err(|e| fail(e.to_string()))?;
        Ok(body.received_messages)
    }

    async fn acknowledge(&self, subscription: &SubscriptionHandle, ack_ids: Vec<String>) -> Result<()> {
        let fail = |message: String| Error::Receive {
            subscription: subscription.name.clone(),
            message: format!("acknowledge failed: {}", message),
        };
        let res = self
            .post(format!("{}/{}:acknowledge", self.base_url, subscription.name))
            .await?
            .json(&AcknowledgeRequest { ack_ids })
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;
        check_status(res).await.map_err(fail)?;
        Ok(())
    }
}

/// `projects/{project}/{kind}/{name}`, unless `name` is already a full path.
fn resource_name(project_id: &str, kind: &str, name: &str) -> String {
    if name.starts_with("projects/") {
        name.to_string()
    } else {
        format!("projects/{}/{}/{}", project_id, kind, name)
    }
}

fn decode_envelope(envelope: ReceivedEnvelope) -> ReceivedMessage {
    let message_id = envelope.message.message_id.unwrap_or_default();
    let data = decode_payload(&envelope.message.data).map_err(|reason| DecodeError {
        message_id: message_id.clone(),
        reason,
    });
    ReceivedMessage {
        message_id,
        publish_time: envelope.message.publish_time,
        attributes: envelope.message.attributes,
        data,
    }
}

fn decode_payload(data: &str) -> std::result::Result<Map<String, Value>, String> {
    let bytes = STANDARD.decode(data).map_err(|e| format!("invalid base64: {}", e))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("invalid JSON object: {}", e))
}
