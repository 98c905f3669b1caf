//! A fully user-templated HTTP call.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument};

use super::format::substitute;
use super::{Notifier, NotifyError, WebhookClient};
use crate::config::{CustomConfig, HttpConfig};

pub const LABEL: &str = "custom";

const ALLOWED_METHODS: [&str; 7] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// GET, HEAD and OPTIONS go out without the payload.
fn carries_body(method: &Method) -> bool {
    [Method::POST, Method::PUT, Method::PATCH, Method::DELETE].contains(method)
}

enum Body {
    Json(Value),
    Text(String),
}

/// Sends `payloadTemplate` with the message substituted to `targetUrl`.
pub struct CustomNotifier {
    config: Option<CustomConfig>,
    client: WebhookClient,
}

impl CustomNotifier {
    pub fn new(config: Option<CustomConfig>, http: &HttpConfig) -> Self {
        Self {
            config,
            client: WebhookClient::new(http),
        }
    }
}

/// Uppercases `method`, defaulting to POST, and checks it against the allow-list.
pub fn resolve_method(method: &str) -> Result<Method, NotifyError> {
    let upper = method.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Ok(Method::POST);
    }
    if !ALLOWED_METHODS.contains(&upper.as_str()) {
        return Err(NotifyError::InvalidMethod(method.to_string()));
    }
    Method::from_bytes(upper.as_bytes()).map_err(|_| NotifyError::InvalidMethod(method.to_string()))
}

#[async_trait]
impl Notifier for CustomNotifier {
    fn label(&self) -> &'static str {
        LABEL
    }

    #[instrument(skip_all, fields(channel = LABEL))]
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let config = self.config.as_ref().ok_or(NotifyError::MissingConfig(LABEL))?;
        if config.target_url.is_empty() {
            return Err(NotifyError::MissingTargetUrl);
        }
        if config.payload_template.is_empty() {
            return Err(NotifyError::MissingPayloadTemplate);
        }
        let payload = substitute(&config.payload_template, message)
            .ok_or(NotifyError::MissingPlaceholder("payloadTemplate"))?;
        let method = resolve_method(&config.method)?;

        let body = match serde_json::from_str::<Value>(&payload) {
            Ok(json) => Body::Json(json),
            Err(e) => {
                debug!(error = %e, "Payload is not JSON, sending as plain text");
                Body::Text(payload)
            }
        };
        let with_body = carries_body(&method);
        if !with_body {
            debug!(%method, "Method takes no body, payload not sent");
        }
        let has_content_type = config
            .headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));

        self.client
            .execute(LABEL, |client| {
                let mut request = client.request(method.clone(), &config.target_url);
                for (name, value) in &config.headers {
                    request = request.header(name, value);
                }
                if !with_body {
                    return request;
                }
                match &body {
                    Body::Json(json) => request.json(json),
                    Body::Text(text) if has_content_type => request.body(text.clone()),
                    Body::Text(text) => request
                        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                        .body(text.clone()),
                }
            })
            .await?;
        Ok(())
    }
}
