use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use gcpkit::Gcp;
use gcpkit::gcp::pubsub::{ReceiveSettings, ReceivedMessage};
use serde_json::{Value, json};

#[derive(Subcommand, Debug)]
pub enum PubsubCommand {
    /// Publish one JSON object and print its message id
    Publish {
        topic: String,
        /// JSON object, e.g. '{"foo":"bar"}'
        message: String,
    },

    /// Pull and acknowledge messages, printing them as JSON lines
    Receive {
        subscription: String,
        #[arg(long, default_value_t = 100)]
        max_messages: usize,
        /// Seconds to wait for messages
        #[arg(long, default_value_t = 10)]
        wait: u64,
    },
}

pub async fn run(gcp: &Gcp, cmd: PubsubCommand) -> Result<()> {
    match cmd {
        PubsubCommand::Publish { topic, message } => {
            let Value::Object(message) =
                serde_json::from_str::<Value>(&message).context("Message is not valid JSON")?
            else {
                bail!("Message must be a JSON object");
            };
            let topic = gcp.pubsub_topic(&topic).await?;
            let id = gcp.pubsub_publish(&topic, &message).await?;
            println!("{id}");
        }
        PubsubCommand::Receive {
            subscription,
            max_messages,
            wait,
        } => {
            let subscription = gcp.pubsub_subscription(&subscription).await?;
            let settings = ReceiveSettings {
                max_messages,
                timeout: Duration::from_secs(wait),
            };
            let messages = gcp.pubsub_receive(&subscription, &settings).await?;
            for m in &messages {
                println!("{}", serde_json::to_string(&to_json(m))?);
            }
        }
    }
    Ok(())
}

fn to_json(m: &ReceivedMessage) -> Value {
    let mut out = json!({
        "message_id": m.message_id,
        "publish_time": m.publish_time.map(|t| t.to_rfc3339()),
        "attributes": m.attributes,
    });
    match &m.data {
        Ok(data) => out["data"] = Value::Object(data.clone()),
        Err(e) => out["error"] = Value::String(e.reason.clone()),
    }
    out
}
