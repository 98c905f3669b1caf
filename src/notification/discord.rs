//! Discord incoming-webhook channel.

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use super::{format_message, Notifier, NotifyError, WebhookClient};
use crate::config::{HttpConfig, WebhookConfig};

pub const LABEL: &str = "discord";

#[derive(Serialize)]
struct DiscordPayload<'a> {
    content: &'a str,
}

/// Posts `{"content": ...}` to a Discord webhook.
pub struct DiscordNotifier {
    config: Option<WebhookConfig>,
    client: WebhookClient,
}

impl DiscordNotifier {
    pub fn new(config: Option<WebhookConfig>, http: &HttpConfig) -> Self {
        Self {
            config,
            client: WebhookClient::new(http),
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn label(&self) -> &'static str {
        LABEL
    }

    #[instrument(skip_all, fields(channel = LABEL))]
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let config = self.config.as_ref().ok_or(NotifyError::MissingConfig(LABEL))?;
        if config.webhook_url.is_empty() {
            return Err(NotifyError::MissingWebhookUrl(LABEL));
        }
        let content = format_message(&config.message_format, message)?;
        let payload = DiscordPayload { content: &content };

        self.client
            .execute(LABEL, |client| client.post(&config.webhook_url).json(&payload))
            .await?;
        Ok(())
    }
}
