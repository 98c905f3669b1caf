//! The request/retry/status skeleton shared by the webhook channels.

use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::NotifyError;
use crate::config::HttpConfig;

const INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// An HTTP client with a request timeout and transport-level retries.
///
/// Each notifier owns one, and every attempt goes through the same
/// `reqwest::Client` so connections are reused across retries. A client that
/// cannot be built is kept as an error and reported by that channel alone.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Result<Client, String>,
    retries: u32,
    initial_backoff: Duration,
}

impl WebhookClient {
    pub fn new(config: &HttpConfig) -> Self {
        Self::with_backoff(config.timeout(), config.retries, INITIAL_BACKOFF)
    }

    fn with_backoff(timeout: Duration, retries: u32, initial_backoff: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| e.to_string());
        Self {
            client,
            retries,
            initial_backoff,
        }
    }

    /// Sends the request built by `build`, retrying transport failures.
    ///
    /// `build` is called once per attempt. A status of 400 or above is turned
    /// into [`NotifyError::Rejected`] with the body inlined.
    pub async fn execute<F>(&self, channel: &'static str, build: F) -> Result<Response, NotifyError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let client = self
            .client
            .as_ref()
            .map_err(|e| NotifyError::ClientSetup(e.clone()))?;

        let mut attempt = 0;
        let response = loop {
            match build(client).send().await {
                Ok(response) => break response,
                Err(e) if attempt < self.retries && is_transient(&e) => {
                    let backoff = self.initial_backoff.saturating_mul(2_u32.saturating_pow(attempt));
                    debug!(channel, attempt, error = %e, ?backoff, "Retrying after transport error");
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(channel, error = %e, "HTTP request failed");
                    return Err(e.into());
                }
            }
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                channel,
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    !err.is_builder() && (err.is_connect() || err.is_timeout() || err.is_request())
}
