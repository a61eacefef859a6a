//! # Pub/Sub Client
//!
//! Publishes JSON objects to topics and drains subscriptions with a bounded
//! receive loop. Works against the real service or, without credentials,
//! against the emulator.
//!
//! ## Submodules
//! - `client`: publish, pull and acknowledge requests.
//! - `types`: handles, receive settings and wire bodies.

pub mod client;
pub mod types;

pub use client::{PUBSUB_API_BASE, PubsubClient};
pub use types::{DecodeError, ReceiveSettings, ReceivedMessage, SubscriptionHandle, TopicHandle};
