//! Delivers a message to every configured notification channel.
//!
//! Each channel implements [`Notifier`]. The [`Dispatcher`] resolves the
//! active channels from configuration on every call, runs them concurrently
//! under one deadline, and folds their outcomes into a single result without
//! letting one channel's failure affect another.

pub mod custom;
pub mod discord;
pub mod dispatcher;
mod error;
pub mod format;
pub mod http;
pub mod slack;
pub mod system;

use async_trait::async_trait;

pub use custom::CustomNotifier;
pub use discord::DiscordNotifier;
pub use dispatcher::{fan_out, resolve_notifiers, ChannelOutcome, DispatchReport, Dispatcher, NotifierSet};
pub use error::{DispatchError, ErrorKind, NotifyError};
pub use format::{format_message, MESSAGE_PLACEHOLDER};
pub use http::WebhookClient;
pub use slack::SlackNotifier;
pub use system::{CommandBackend, DesktopBackend, SystemNotifier};

/// A single notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Stable channel name used in logs and aggregate errors.
    fn label(&self) -> &'static str;

    /// Delivers `message`, or reports exactly one error.
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}
