//! n-cli - send a notification to yourself from the command line.
//!
//! This library holds the notification channels, the dispatcher that fans a
//! message out to them, the configuration layer, the command runner and the
//! editor hook setup used by the `n-cli` binary.

pub mod app;
pub mod cli;
pub mod config;
pub mod formatting;
pub mod notification;
pub mod runner;
pub mod setup;

// Re-export the main entry points for convenience
pub use config::{Config, ConfigSource, FileConfigSource};
pub use notification::{DispatchError, Dispatcher, Notifier, NotifyError};
