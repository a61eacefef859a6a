use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A topic resolved to its full resource name. Existence is not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicHandle {
    pub name: String,
}

/// A subscription resolved to its full resource name. Existence is not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    pub name: String,
}

/// Bounds for one call to [`crate::gcp::pubsub::PubsubClient::receive`].
#[derive(Debug, Clone, Copy)]
pub struct ReceiveSettings {
    /// Stop once this many messages have been received.
    pub max_messages: usize,
    /// Stop once this much time has passed, however many messages arrived.
    pub timeout: Duration,
}

impl Default for ReceiveSettings {
    fn default() -> Self {
        ReceiveSettings {
            max_messages: 100,
            timeout: Duration::from_secs(10),
        }
    }
}

/// A payload that was not a base64-encoded JSON object.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("message {message_id} has an undecodable payload: {reason}")]
pub struct DecodeError {
    pub message_id: String,
    pub reason: String,
}

/// One delivered message. Decoding failures are per message, so one bad
/// payload does not end the receive loop.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub message_id: String,
    pub publish_time: Option<DateTime<Utc>>,
    pub attributes: HashMap<String, String>,
    pub data: Result<Map<String, Value>, DecodeError>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct PubsubMessage {
    /// Base64-encoded payload.
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
    #[serde(rename = "messageId")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(rename = "publishTime")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct PublishRequest {
    pub messages: Vec<PubsubMessage>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PublishResponse {
    #[serde(rename = "messageIds")]
    #[serde(default)]
    pub message_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PullRequest {
    #[serde(rename = "maxMessages")]
    pub max_messages: usize,
}

#[derive(Debug, Deserialize, Default)]
pub struct PullResponse {
    #[serde(rename = "receivedMessages")]
    #[serde(default)]
    pub received_messages: Vec<ReceivedEnvelope>,
}

#[derive(Debug, Deserialize)]
pub struct ReceivedEnvelope {
    #[serde(rename = "ackId")]
    pub ack_id: String,
    #[serde(default)]
    pub message: PubsubMessage,
    #[serde(rename = "deliveryAttempt")]
    #[serde(default)]
    pub delivery_attempt: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct AcknowledgeRequest {
    #[serde(rename = "ackIds")]
    pub ack_ids: Vec<String>,
}
