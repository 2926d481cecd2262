use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::Notifier;

/// Delivery timeout for webhook posts.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

/// Posts messages to a Slack incoming webhook.
pub struct SlackWebhook {
    client: Client,
    webhook_url: String,
}

impl SlackWebhook {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }
}

#[async_trait]
impl Notifier for SlackWebhook {
    fn name(&self) -> &str {
        "slack"
    }

    async fn send_message(&self, text: &str, channel: Option<&str>, thread_ts: Option<&str>) -> bool {
        let payload = WebhookPayload {
            text,
            channel,
            thread_ts,
        };

        let result = self
            .client
            .post(&self.webhook_url)
            .timeout(SEND_TIMEOUT)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::info!("Slack message sent successfully");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%status, %body, "Failed to send Slack message");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Error sending Slack message");
                false
            }
        }
    }
}

/// Logs messages instead of delivering them. Used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        "console"
    }

    async fn send_message(&self, text: &str, channel: Option<&str>, thread_ts: Option<&str>) -> bool {
        tracing::info!(
            channel = channel.unwrap_or("-"),
            thread = thread_ts.unwrap_or("-"),
            "[MOCK SLACK] {text}"
        );
        true
    }
}
