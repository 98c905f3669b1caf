//! Slack workflow-webhook channel.
//!
//! Slack workflow triggers take `{"message": ...}` and answer `{"ok": bool}`.
//! A 2xx answer with `ok: false` is still a failed delivery.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{format_message, Notifier, NotifyError, WebhookClient};
use crate::config::{HttpConfig, WebhookConfig};

pub const LABEL: &str = "slack";

#[derive(Serialize)]
struct SlackPayload<'a> {
    message: &'a str,
}

#[derive(Deserialize, Debug)]
struct SlackResponse {
    ok: bool,
}

/// A client for sending messages to a Slack webhook.
pub struct SlackNotifier {
    config: Option<WebhookConfig>,
    client: WebhookClient,
}

impl SlackNotifier {
    pub fn new(config: Option<WebhookConfig>, http: &HttpConfig) -> Self {
        Self {
            config,
            client: WebhookClient::new(http),
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn label(&self) -> &'static str {
        LABEL
    }

    #[instrument(skip_all, fields(channel = LABEL))]
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let config = self.config.as_ref().ok_or(NotifyError::MissingConfig(LABEL))?;
        if config.webhook_url.is_empty() {
            return Err(NotifyError::MissingWebhookUrl(LABEL));
        }
        let formatted = format_message(&config.message_format, message)?;
        let payload = SlackPayload {
            message: &formatted,
        };

        let response = self
            .client
            .execute(LABEL, |client| client.post(&config.webhook_url).json(&payload))
            .await?;

        let body = response.text().await?;
        match serde_json::from_str::<SlackResponse>(&body) {
            Ok(SlackResponse { ok: true }) => Ok(()),
            parsed => {
                debug!(?parsed, "Slack did not acknowledge the message");
                Err(NotifyError::NotOk {
                    channel: LABEL,
                    body,
                })
            }
        }
    }
}
