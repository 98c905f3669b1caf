//! Desktop notifications through the host operating system.
//!
//! The notification is handed to the platform's own helper program:
//! `notify-send` (libnotify) on Linux and the BSDs, `osascript` on macOS and
//! a PowerShell toast on Windows.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::{Notifier, NotifyError};

pub const LABEL: &str = "system";

/// Title shown on every desktop notification.
pub const TITLE: &str = "N: New Notification";

/// Shows a notification on the desktop.
#[async_trait]
pub trait DesktopBackend: Send + Sync {
    async fn show(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// The default backend: runs the platform's notification helper.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandBackend;

impl CommandBackend {
    #[cfg(target_os = "macos")]
    fn command(title: &str, body: &str) -> Result<Command, NotifyError> {
        let mut cmd = Command::new("osascript");
        cmd.args([
            "-e",
            "on run argv",
            "-e",
            "display notification (item 2 of argv) with title (item 1 of argv)",
            "-e",
            "end run",
            title,
            body,
        ]);
        Ok(cmd)
    }

    #[cfg(windows)]
    fn command(title: &str, body: &str) -> Result<Command, NotifyError> {
        const SCRIPT: &str = r#"
$ErrorActionPreference = 'Stop'
[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] | Out-Null
$template = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02)
$text = $template.GetElementsByTagName('text')
$text.Item(0).AppendChild($template.CreateTextNode($env:N_CLI_TOAST_TITLE)) | Out-Null
$text.Item(1).AppendChild($template.CreateTextNode($env:N_CLI_TOAST_BODY)) | Out-Null
$toast = [Windows.UI.Notifications.ToastNotification]::new($template)
[Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier('n-cli').Show($toast)
"#;
        let mut cmd = Command::new("powershell");
        cmd.args(["-NoProfile", "-NonInteractive", "-Command", SCRIPT])
            .env("N_CLI_TOAST_TITLE", title)
            .env("N_CLI_TOAST_BODY", body);
        Ok(cmd)
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn command(title: &str, body: &str) -> Result<Command, NotifyError> {
        let mut cmd = Command::new("notify-send");
        cmd.args(["--app-name=n-cli", "--", title, body]);
        Ok(cmd)
    }

    #[cfg(not(any(unix, windows)))]
    fn command(_title: &str, _body: &str) -> Result<Command, NotifyError> {
        Err(NotifyError::System(
            "desktop notifications are not supported on this platform".to_string(),
        ))
    }
}

#[async_trait]
impl DesktopBackend for CommandBackend {
    async fn show(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        let mut cmd = Self::command(title, body)?;
        let program = cmd.as_std().get_program().to_string_lossy().into_owned();
        debug!(%program, "Running desktop notification helper");

        let output = cmd
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| NotifyError::System(format!("cannot run {program}: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(NotifyError::System(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }
}

/// Always-on channel that pops up a desktop notification.
pub struct SystemNotifier {
    backend: Arc<dyn DesktopBackend>,
}

impl SystemNotifier {
    pub fn new(backend: Arc<dyn DesktopBackend>) -> Self {
        Self { backend }
    }
}

impl Default for SystemNotifier {
    fn default() -> Self {
        Self::new(Arc::new(CommandBackend))
    }
}

#[async_trait]
impl Notifier for SystemNotifier {
    fn label(&self) -> &'static str {
        LABEL
    }

    #[instrument(skip_all, fields(channel = LABEL))]
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.backend.show(TITLE, message).await
    }
}
