//! Alert delivery sinks
//!
//! A destination for alert messages that abstracts away delivery details.
//! Failures surface as `Notification` errors; the orchestrator logs and
//! swallows them, so a flaky channel never stalls evaluation.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::config::NotifierConfig;
use crate::error::{MonitorError, Result};

/// A destination for alert messages.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver a single alert message.
    async fn send(&self, message: &str) -> Result<()>;
}

/// Push-API sink: POSTs each alert as a text message to a configured
/// recipient. Credentials come in through `NotifierConfig`, never from
/// constants in code.
pub struct PushSink {
    config: NotifierConfig,
    client: reqwest::Client,
}

impl PushSink {
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AlertSink for PushSink {
    async fn send(&self, message: &str) -> Result<()> {
        let body = json!({
            "to": self.config.recipient_id,
            "messages": [{ "type": "text", "text": message }],
        });

        let response = self
            .client
            .post(&self.config.push_url)
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| MonitorError::Notification {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MonitorError::Notification {
                message: format!("push API returned {status}: {detail}"),
            });
        }

        debug!("Push message sent successfully");
        Ok(())
    }
}

/// Log-only sink used when no notifier is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn send(&self, message: &str) -> Result<()> {
        info!("ALERT: {message}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_always_delivers() {
        assert!(LogSink.send("time: ..., RSI: 55.00 (no signal)").await.is_ok());
    }
}
