//! Configuration management for n-cli
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to load configuration from a `config.yaml` file and merge it
//! with environment variables and command-line overrides.

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    value::{Uncased, UncasedStr},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::cli::GlobalArgs;

/// Directory under the user's home that holds the configuration file.
pub const CONFIG_DIR: &str = ".n-cli";
/// Name of the configuration file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";
/// Prefix for environment overrides, e.g. `N_CLI_SLACK__WEBHOOKURL`.
pub const ENV_PREFIX: &str = "N_CLI_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("cannot locate home directory")]
    HomeDirectory,

    #[error("cannot write config to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Tracing filter directive, e.g. `info` or `ncli=debug`.
    pub log_level: String,
    /// Budget in seconds shared by every channel of one dispatch.
    pub timeout_seconds: u64,
    /// Settings for the HTTP client owned by each webhook channel.
    #[serde(default)]
    pub http: HttpConfig,
    /// Discord webhook channel. Absent or null disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<WebhookConfig>,
    /// Slack workflow webhook channel. Absent or null disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<WebhookConfig>,
    /// User-templated HTTP call. Absent or null disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomConfig>,
}

/// HTTP transport settings shared by the webhook channels.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// How many times a request is re-sent after a transport failure.
    pub retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            retries: 3,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Configuration for a Discord or Slack webhook.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    /// The incoming webhook URL.
    #[serde(default)]
    pub webhook_url: String,
    /// Optional template; must contain `{{message}}` when set.
    #[serde(default)]
    pub message_format: String,
}

/// Configuration for the generic custom webhook.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomConfig {
    #[serde(default)]
    pub target_url: String,
    /// Request body with a `{{message}}` placeholder. Sent as JSON when the
    /// substituted text parses as JSON, as plain text otherwise.
    #[serde(default)]
    pub payload_template: String,
    /// HTTP verb, case-insensitive. Empty means POST.
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Config {
    /// Builds the layered figment: defaults, YAML file, environment, CLI.
    pub fn figment(path: &Path, overrides: Option<&GlobalArgs>) -> Figment {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .split("__")
                    .map(camel_case_key)
                    .lowercase(false),
            );
        match overrides {
            Some(args) => figment.merge(args.clone()),
            None => figment,
        }
    }

    /// Loads the application configuration from the specified file.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: &Path, overrides: Option<&GlobalArgs>) -> Result<Self, ConfigError> {
        Ok(Self::figment(path, overrides).extract()?)
    }

    /// The deadline budget shared by all channels of one dispatch.
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            timeout_seconds: 10,
            http: HttpConfig::default(),
            discord: None,
            slack: None,
            custom: None,
        }
    }
}

/// Anything that can hand the dispatcher a fresh configuration.
///
/// The dispatcher calls [`ConfigSource::load`] on every dispatch, so file
/// edits take effect without restarting anything.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<Config, ConfigError>;
}

/// A fixed, in-memory configuration.
impl ConfigSource for Config {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(self.clone())
    }
}

/// Reads the YAML file (plus environment and CLI layers) on every load.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
    overrides: Option<GlobalArgs>,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            overrides: None,
        }
    }

    /// Resolves the file from `--config` or the default location.
    pub fn from_args(args: &GlobalArgs) -> Result<Self, ConfigError> {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => default_config_path()?,
        };
        Ok(Self {
            path,
            overrides: Some(args.clone()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load_from(&self.path, self.overrides.as_ref())
    }
}

/// Environment variables carry no case, so `N_CLI_SLACK__WEBHOOKURL` arrives
/// as `SLACK.WEBHOOKURL` and has to be mapped back onto the camelCase keys.
fn camel_case_key(key: &UncasedStr) -> Uncased<'_> {
    key.as_str()
        .split('.')
        .map(|segment| {
            let segment = segment.to_ascii_lowercase();
            match segment.as_str() {
                "loglevel" => "logLevel".to_string(),
                "timeoutseconds" => "timeoutSeconds".to_string(),
                "webhookurl" => "webhookUrl".to_string(),
                "messageformat" => "messageFormat".to_string(),
                "targeturl" => "targetUrl".to_string(),
                "payloadtemplate" => "payloadTemplate".to_string(),
                _ => segment,
            }
        })
        .collect::<Vec<_>>()
        .join(".")
        .into()
}

/// `~/.n-cli/config.yaml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeDirectory)?;
    Ok(config_path_in(&home))
}

/// The config file location under a given home directory.
pub fn config_path_in(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR).join(CONFIG_FILE)
}

const STARTER_CONFIG: &str = r#"# n-cli configuration.
# The system notification is always sent. Uncomment a block to enable
# another channel; every format or template must contain {{message}}.

logLevel: info
timeoutSeconds: 10

http:
  timeoutSeconds: 10
  retries: 3

# discord:
#   webhookUrl: https://discord.com/api/webhooks/<id>/<token>
#   messageFormat: "{{message}}"

# slack:
#   webhookUrl: https://hooks.slack.com/triggers/<id>
#   messageFormat: "{{message}}"

# custom:
#   targetUrl: https://example.com/webhook
#   payloadTemplate: '{"text": "{{message}}"}'
#   method: POST
#   headers:
#     Authorization: Bearer <token>
"#;

/// Writes the starter configuration to `path`.
///
/// Returns `Ok(false)` without touching anything when the file exists and
/// `overwrite` is not set.
pub fn write_starter_config(path: &Path, overwrite: bool) -> Result<bool, ConfigError> {
    if path.exists() && !overwrite {
        return Ok(false);
    }
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(write_err)?;
    }
    std::fs::write(path, STARTER_CONFIG).map_err(write_err)?;
    Ok(true)
}
