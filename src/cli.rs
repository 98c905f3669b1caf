//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. The global flags are merged on top of the configuration from
//! the `config.yaml` file and environment variables.

use clap::{Args, Parser, Subcommand};
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Send messages to yourself.
///
/// N is a utility CLI that sends you a push notification with any arbitrary
/// message, or tells you when a long-running command has finished.
#[derive(Parser, Debug, Clone)]
#[command(name = "n-cli", author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (default is $HOME/.n-cli/config.yaml).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `ncli=trace`.
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sends your notification.
    #[command(visible_alias = "s")]
    Send(SendArgs),

    /// Run shell commands and get notified once they're done.
    ///
    /// Example: n-cli run echo Hello, world!
    ///
    /// To pass flags to your shell command, put them after `--`:
    /// n-cli run mycommand -- --flag1=true --flag2
    ///
    /// CPU time and peak memory are only reported on Unix-like systems.
    #[command(visible_alias = "r", verbatim_doc_comment)]
    Run(RunArgs),

    /// Write a starter configuration file.
    Init(InitArgs),

    /// Set up integrations (e.g. Cursor hooks).
    Setup {
        #[command(subcommand)]
        target: SetupTarget,
    },

    /// Prints out where everything related to n-cli is.
    Where {
        #[command(subcommand)]
        target: Option<WhereTarget>,
    },

    /// Get n-cli version.
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Read message from stdin instead of arguments.
    #[arg(long)]
    pub stdin: bool,

    /// The message; multiple words are joined with spaces.
    #[arg(value_name = "MESSAGE")]
    pub message: Vec<String>,
}

impl SendArgs {
    /// The message given as arguments, if any.
    pub fn joined(&self) -> Option<String> {
        if self.message.is_empty() {
            None
        } else {
            Some(self.message.join(" "))
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// The program to run followed by its arguments.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

impl RunArgs {
    /// The child's argv with the first `--` separator removed.
    ///
    /// Clap keeps a `--` that follows the program name in the trailing
    /// values, so `run cargo -- test` arrives as `[cargo, --, test]`.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.command.clone();
        if let Some(pos) = argv.iter().position(|a| a == "--") {
            argv.remove(pos);
        }
        argv
    }
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SetupTarget {
    /// Set up Cursor hooks so you get n-cli notifications when the agent
    /// finishes or the session ends.
    ///
    /// Writes user-level hooks to ~/.cursor/ so that when the agent loop ends
    /// (stop) or the session ends (sessionEnd), a script runs and calls
    /// `n-cli send --stdin` to notify you. Requires n-cli to be on PATH.
    #[command(verbatim_doc_comment)]
    Cursor(CursorArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CursorArgs {
    /// Overwrite an existing hook script and accept newer hooks.json versions.
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum WhereTarget {
    /// Prints out where your config is.
    Config,
}

impl Provider for GlobalArgs {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("logLevel".into(), Value::from(level.clone()));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
