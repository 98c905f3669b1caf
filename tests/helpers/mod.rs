#![allow(dead_code)]

pub mod mock_desktop;

use mock_desktop::MockDesktop;
use ncli::config::{Config, CustomConfig, HttpConfig, WebhookConfig};
use ncli::notification::Dispatcher;
use std::sync::Arc;

/// Builds a dispatcher over a fixed config and a mock desktop backend.
pub fn dispatcher(config: Config, desktop: &MockDesktop) -> Dispatcher<Config> {
    Dispatcher::new(config).with_desktop_backend(Arc::new(desktop.clone()))
}

/// A config with no optional channels and fast HTTP settings.
pub fn base_config() -> Config {
    Config {
        http: HttpConfig {
            timeout_seconds: 2,
            retries: 0,
        },
        ..Default::default()
    }
}

pub fn webhook(url: String) -> WebhookConfig {
    WebhookConfig {
        webhook_url: url,
        message_format: String::new(),
    }
}

pub fn custom(url: String, template: &str) -> CustomConfig {
    CustomConfig {
        target_url: url,
        payload_template: template.to_string(),
        ..Default::default()
    }
}
