//! Runs a child command and describes how it went.
//!
//! Resource usage comes from `getrusage(RUSAGE_CHILDREN)` on Unix. Anything
//! that goes wrong while collecting it only drops those lines from the
//! message; it never affects the command's own exit status.

use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::formatting::{format_duration, pretty_print_i64};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("cannot start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot wait for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum UsageError {
    #[error("resource usage is not supported on this platform")]
    Unsupported,

    #[error("getrusage failed: {0}")]
    Syscall(std::io::Error),
}

/// CPU time and peak memory of the finished child processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUsage {
    /// User plus system CPU time.
    pub cpu_time: Duration,
    /// Peak resident set size in kilobytes.
    pub max_rss_kb: i64,
}

impl ResourceUsage {
    /// Usage accumulated by all waited-for children of this process.
    #[cfg(unix)]
    pub fn children() -> Result<Self, UsageError> {
        // SAFETY: `rusage` is plain old data and getrusage only writes into it.
        let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::getrusage(libc::RUSAGE_CHILDREN, &mut usage) };
        if rc != 0 {
            return Err(UsageError::Syscall(std::io::Error::last_os_error()));
        }
        let timeval = |tv: libc::timeval| {
            Duration::from_secs(tv.tv_sec.max(0) as u64)
                + Duration::from_micros(tv.tv_usec.max(0) as u64)
        };
        // macOS reports bytes, everyone else kilobytes.
        let max_rss_kb = if cfg!(target_os = "macos") {
            usage.ru_maxrss as i64 / 1024
        } else {
            usage.ru_maxrss as i64
        };
        Ok(Self {
            cpu_time: timeval(usage.ru_utime) + timeval(usage.ru_stime),
            max_rss_kb,
        })
    }

    #[cfg(not(unix))]
    pub fn children() -> Result<Self, UsageError> {
        Err(UsageError::Unsupported)
    }
}

/// How the child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Code(i32),
    /// Killed by a signal; carries no exit code.
    Signal,
}

impl From<ExitStatus> for Exit {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Exit::Code(code),
            None => Exit::Signal,
        }
    }
}

/// Everything the completion message is built from.
#[derive(Debug, Clone)]
pub struct CommandReport {
    pub command: String,
    pub exit: Exit,
    pub elapsed: Duration,
    pub usage: Option<ResourceUsage>,
}

impl CommandReport {
    /// The process exit code to hand back to the shell.
    pub fn exit_code(&self) -> i32 {
        match self.exit {
            Exit::Code(code) => code,
            Exit::Signal => 1,
        }
    }

    /// The notification text.
    pub fn message(&self) -> String {
        let headline = match self.exit {
            Exit::Code(0) => format!("Command `{}` COMPLETE.", self.command),
            Exit::Code(code) => format!("Command `{}` FAILED. Status={}.", self.command, code),
            Exit::Signal => format!("Command `{}` TERMINATED.", self.command),
        };
        let mut msg = format!("{}\nElapsed: {}", headline, format_duration(self.elapsed));
        if let Some(usage) = &self.usage {
            msg.push_str(&format!(
                "\nCPU Time: {}\nMaxrss: {} KB",
                format_duration(usage.cpu_time),
                pretty_print_i64(usage.max_rss_kb)
            ));
        }
        msg
    }
}

/// Runs `program` with `args`, inheriting stdio, and waits for it.
///
/// Ctrl-C reaches the child through the terminal; this process keeps waiting
/// so the outcome can still be reported.
pub async fn run_command(program: &str, args: &[String]) -> Result<CommandReport, RunError> {
    let command = std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");

    let started = Instant::now();
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| RunError::Spawn {
            command: command.clone(),
            source,
        })?;

    let status = loop {
        tokio::select! {
            status = child.wait() => break status,
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupt received, waiting for the child to exit");
            }
        }
    }
    .map_err(|source| RunError::Wait {
        command: command.clone(),
        source,
    })?;
    let elapsed = started.elapsed();

    let usage = match ResourceUsage::children() {
        Ok(usage) => Some(usage),
        Err(e) => {
            warn!("Skipping resource usage: {}", e);
            None
        }
    };

    Ok(CommandReport {
        command,
        exit: status.into(),
        elapsed,
        usage,
    })
}
