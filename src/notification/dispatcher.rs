//! Fans one message out to every configured channel.

use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{error, info};

use super::{
    CustomNotifier, DesktopBackend, DiscordNotifier, DispatchError, Notifier, NotifyError,
    SlackNotifier, SystemNotifier,
};
use crate::config::{Config, ConfigSource};
use crate::notification::system::CommandBackend;

/// The channels active for one dispatch, keyed (and ordered) by label.
pub type NotifierSet = BTreeMap<&'static str, Box<dyn Notifier>>;

/// The result of one channel within a dispatch.
#[derive(Debug)]
pub struct ChannelOutcome {
    pub label: &'static str,
    pub result: Result<(), NotifyError>,
}

/// Every channel's outcome for one dispatch, sorted by label.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    /// Labels of every channel that ran.
    pub fn channels(&self) -> Vec<&'static str> {
        self.outcomes.iter().map(|o| o.label).collect()
    }

    /// Labels of the channels that failed.
    pub fn failed(&self) -> Vec<&'static str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.label)
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// The error for `label`, if that channel ran and failed.
    pub fn error(&self, label: &str) -> Option<&NotifyError> {
        self.outcomes
            .iter()
            .find(|o| o.label == label)
            .and_then(|o| o.result.as_ref().err())
    }

    /// Folds the outcomes into a single result.
    pub fn into_result(self) -> Result<(), DispatchError> {
        let failed = self.failed();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::ChannelsFailed {
                channels: failed.into_iter().map(str::to_string).collect(),
            })
        }
    }
}

/// Builds the active channels from `config`.
///
/// `system` is always present; the others only when their block is set.
pub fn resolve_notifiers(config: &Config, desktop: Arc<dyn DesktopBackend>) -> NotifierSet {
    let mut notifiers: NotifierSet = BTreeMap::new();
    notifiers.insert(super::system::LABEL, Box::new(SystemNotifier::new(desktop)));
    if let Some(discord) = &config.discord {
        notifiers.insert(
            super::discord::LABEL,
            Box::new(DiscordNotifier::new(Some(discord.clone()), &config.http)),
        );
    }
    if let Some(slack) = &config.slack {
        notifiers.insert(
            super::slack::LABEL,
            Box::new(SlackNotifier::new(Some(slack.clone()), &config.http)),
        );
    }
    if let Some(custom) = &config.custom {
        notifiers.insert(
            super::custom::LABEL,
            Box::new(CustomNotifier::new(Some(custom.clone()), &config.http)),
        );
    }
    notifiers
}

/// Runs every notifier on its own task under one shared deadline and waits
/// for all of them.
///
/// A notifier still running at the deadline is dropped and reported as
/// [`NotifyError::DeadlineExceeded`]; one that panics is reported as
/// [`NotifyError::TaskPanicked`]. Neither affects its siblings.
pub async fn fan_out(notifiers: NotifierSet, message: &str, budget: Duration) -> DispatchReport {
    let deadline = Instant::now() + budget;
    let message: Arc<str> = Arc::from(message);

    let labels: Vec<&'static str> = notifiers.keys().copied().collect();
    info!(
        "Sending notification to {} channels: {}",
        labels.len(),
        labels.join(", ")
    );

    let handles = notifiers.into_iter().map(|(label, notifier)| {
        let message = message.clone();
        tokio::spawn(async move {
            let result = match timeout_at(deadline, notifier.notify(&message)).await {
                Ok(result) => result,
                Err(_) => Err(NotifyError::DeadlineExceeded(budget)),
            };
            match &result {
                Ok(()) => info!("Sent notification to {}...OK", label),
                Err(e) => error!("Sent notification to {}...ERROR ({})", label, e),
            }
            result
        })
    });

    let results = join_all(handles).await;

    let outcomes = labels
        .into_iter()
        .zip(results)
        .map(|(label, joined)| {
            let result = joined.unwrap_or_else(|e| {
                error!(channel = label, "Notifier task panicked: {}", e);
                Err(NotifyError::TaskPanicked(e.to_string()))
            });
            ChannelOutcome { label, result }
        })
        .collect();

    DispatchReport { outcomes }
}

/// Loads configuration and fans a message out to every active channel.
pub struct Dispatcher<S> {
    source: S,
    desktop: Arc<dyn DesktopBackend>,
}

impl<S: ConfigSource> Dispatcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            desktop: Arc::new(CommandBackend),
        }
    }

    /// Replaces the desktop notification backend.
    pub fn with_desktop_backend(mut self, desktop: Arc<dyn DesktopBackend>) -> Self {
        self.desktop = desktop;
        self
    }

    /// Sends `message` everywhere and returns each channel's outcome.
    ///
    /// Fails without attempting any channel if configuration cannot be loaded.
    pub async fn dispatch(&self, message: &str) -> Result<DispatchReport, DispatchError> {
        let started = Instant::now();
        let config = self.source.load()?;
        let budget = config.dispatch_timeout().saturating_sub(started.elapsed());
        let notifiers = resolve_notifiers(&config, self.desktop.clone());
        Ok(fan_out(notifiers, message, budget).await)
    }

    /// Sends `message` everywhere; fails naming every channel that failed.
    pub async fn notify(&self, message: &str) -> Result<(), DispatchError> {
        self.dispatch(message).await?.into_result()
    }
}
