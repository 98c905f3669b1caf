use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;

/// Why a single channel failed to deliver.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("missing {0} config")]
    MissingConfig(&'static str),

    #[error("missing webhookUrl in {0} config")]
    MissingWebhookUrl(&'static str),

    #[error("missing targetUrl in custom config")]
    MissingTargetUrl,

    #[error("missing payloadTemplate in custom config")]
    MissingPayloadTemplate,

    #[error("{{{{message}}}} placeholder is missing from {0}")]
    MissingPlaceholder(&'static str),

    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("cannot build HTTP client: {0}")]
    ClientSetup(String),

    #[error("failed to call {channel}: status {status}, body: {body}")]
    Rejected {
        channel: &'static str,
        status: u16,
        body: String,
    },

    #[error("{channel} response not ok: {body}")]
    NotOk { channel: &'static str, body: String },

    #[error("system notification failed: {0}")]
    System(String),

    #[error("gave up after the {0:?} deadline")]
    DeadlineExceeded(Duration),

    #[error("notifier task panicked: {0}")]
    TaskPanicked(String),
}

/// Coarse classification of [`NotifyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The channel is enabled but a required field is missing or invalid.
    Configuration,
    /// A format or template lacks the `{{message}}` placeholder.
    Template,
    /// Network failure or timeout, after the client's own retries.
    Transport,
    /// The remote end answered, but with an error status or `ok: false`.
    DeliveryRejected,
    /// The notifier itself crashed.
    Internal,
}

impl NotifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NotifyError::MissingConfig(_)
            | NotifyError::MissingWebhookUrl(_)
            | NotifyError::MissingTargetUrl
            | NotifyError::MissingPayloadTemplate
            | NotifyError::InvalidMethod(_) => ErrorKind::Configuration,
            NotifyError::MissingPlaceholder(_) => ErrorKind::Template,
            NotifyError::Transport(_)
            | NotifyError::ClientSetup(_)
            | NotifyError::DeadlineExceeded(_) => ErrorKind::Transport,
            NotifyError::Rejected { .. } | NotifyError::NotOk { .. } | NotifyError::System(_) => {
                ErrorKind::DeliveryRejected
            }
            NotifyError::TaskPanicked(_) => ErrorKind::Internal,
        }
    }
}

/// Outcome of a whole dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Configuration could not be loaded; no channel was attempted.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// At least one channel failed. Labels are sorted.
    #[error("one or more notifiers failed: {}", .channels.join(", "))]
    ChannelsFailed { channels: Vec<String> },
}

impl DispatchError {
    /// Labels of the failed channels; empty for a configuration failure.
    pub fn failed_channels(&self) -> &[String] {
        match self {
            DispatchError::ChannelsFailed { channels } => channels,
            DispatchError::Config(_) => &[],
        }
    }
}
