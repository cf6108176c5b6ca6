//! Slack webhook notifications.
//!
//! Delivery is at-least-once: a failed post is logged and the event stays
//! emitted (the ledger already recorded it), matching the chosen model of
//! idempotent suppression over transport guarantees.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::alerts::AlertEvent;
use crate::error::{PulseError, Result};

/// Where newly-qualifying alert events go.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, event: &AlertEvent) -> Result<()>;
}

#[derive(Serialize)]
struct SlackMessage<'a> {
    text: &'a str,
}

/// Slack incoming-webhook client
#[derive(Clone)]
pub struct SlackWebhook {
    client: Client,
    webhook_url: String,
}

impl SlackWebhook {
    pub fn new(webhook_url: String) -> Arc<Self> {
        Arc::new(Self {
            client: Client::new(),
            webhook_url,
        })
    }

    /// Create from the conventional environment variable, if set
    pub fn from_env() -> Option<Arc<Self>> {
        std::env::var("SLACK_WEBHOOK_URL").ok().map(|url| {
            info!("Slack notifications enabled");
            Self::new(url)
        })
    }
}

#[async_trait]
impl AlertSink for SlackWebhook {
    async fn deliver(&self, event: &AlertEvent) -> Result<()> {
        let message = SlackMessage {
            text: &event.message,
        };

        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await?;

        if resp.status().is_success() {
            debug!(key = %event.dedup_key, "Slack alert sent");
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(%status, body, "Slack webhook failed");
            Err(PulseError::AlertDelivery(format!("HTTP {status}: {body}")))
        }
    }
}

/// Log-only sink for dry runs and unconfigured webhooks
#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<()> {
        info!(
            athlete = %event.athlete,
            criterion = %event.criterion,
            count = event.count,
            "ALERT (dry run): {}",
            event.message.replace('\n', " / ")
        );
        Ok(())
    }
}
