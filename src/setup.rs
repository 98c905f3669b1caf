//! Editor integrations that call `n-cli send` from hooks.
//!
//! `setup cursor` installs a user-level Cursor hook: a shell script under
//! `~/.cursor/hooks/` plus an entry for the `stop` and `sessionEnd` events in
//! `~/.cursor/hooks.json`. Existing entries in `hooks.json` are kept and
//! running the setup twice does not duplicate ours.

use serde_json::{json, Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const CURSOR_DIR: &str = ".cursor";
pub const HOOKS_DIR: &str = "hooks";
pub const HOOKS_JSON: &str = "hooks.json";
pub const HOOK_SCRIPT_NAME: &str = "n-cli-notify.sh";
/// How `hooks.json` refers to the script, relative to `~/.cursor`.
pub const HOOK_COMMAND: &str = "./hooks/n-cli-notify.sh";
/// Newest `hooks.json` format this integration is known to work with.
pub const MAX_HOOKS_VERSION: u64 = 1;

const HOOK_EVENTS: [&str; 2] = ["stop", "sessionEnd"];

const HOOK_SCRIPT: &str = r#"#!/bin/sh
# n-cli Cursor hook: notifies via n-cli send --stdin when agent stops or session ends.
# Receives JSON on stdin from Cursor (hook_event_name, status for stop, etc.).
input=""
while IFS= read -r line || [ -n "$line" ]; do
  input="${input}${line}"
done

event=$(echo "$input" | sed -n 's/.*"hook_event_name"[[:space:]]*:[[:space:]]*"\([^"]*\)".*/\1/p')
status=$(echo "$input" | sed -n 's/.*"status"[[:space:]]*:[[:space:]]*"\([^"]*\)".*/\1/p')

case "$event" in
  stop)
    msg="Done: agent finished (status: ${status:-unknown})"
    ;;
  sessionEnd)
    msg="Session ended"
    ;;
  *)
    msg="Cursor hook: ${event:-unknown}\nFull payload: ${input:-no_input}"
    ;;
esac

echo "$msg" | n-cli send --stdin 2>/dev/null || true
exit 0
"#;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("cannot locate home directory")]
    HomeDirectory,

    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse existing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} does not hold a JSON object")]
    NotAnObject(PathBuf),

    #[error("hooks.json version {0} is not supported yet (use --force to proceed anyway)")]
    UnsupportedVersion(Value),

    #[error("cannot encode hooks.json: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Where the Cursor integration lives under a home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPaths {
    pub hooks_dir: PathBuf,
    pub hooks_json: PathBuf,
    pub script: PathBuf,
}

impl CursorPaths {
    pub fn under(home: &Path) -> Self {
        let root = home.join(CURSOR_DIR);
        let hooks_dir = root.join(HOOKS_DIR);
        Self {
            script: hooks_dir.join(HOOK_SCRIPT_NAME),
            hooks_json: root.join(HOOKS_JSON),
            hooks_dir,
        }
    }
}

#[derive(Debug)]
pub struct CursorSetup {
    pub paths: CursorPaths,
    /// False when an existing script was left alone.
    pub script_written: bool,
}

/// Installs the Cursor hook under `home`.
///
/// `force` overwrites an existing hook script and accepts a `hooks.json`
/// version newer than [`MAX_HOOKS_VERSION`].
pub fn setup_cursor(home: &Path, force: bool) -> Result<CursorSetup, SetupError> {
    let paths = CursorPaths::under(home);
    std::fs::create_dir_all(&paths.hooks_dir).map_err(|source| SetupError::Io {
        path: paths.hooks_dir.clone(),
        source,
    })?;

    merge_hooks_json(&paths.hooks_json, force)?;
    let script_written = write_hook_script(&paths.script, force)?;
    info!(hooks_json = %paths.hooks_json.display(), "Cursor hooks configured");

    Ok(CursorSetup {
        paths,
        script_written,
    })
}

/// Adds our command to every hook event in `hooks.json`, creating the file
/// if needed.
pub fn merge_hooks_json(path: &Path, accept_newer: bool) -> Result<(), SetupError> {
    let mut root = match std::fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str::<Value>(&data) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(SetupError::NotAnObject(path.to_path_buf())),
            Err(source) => {
                return Err(SetupError::Parse {
                    path: path.to_path_buf(),
                    source,
                })
            }
        },
        Err(e) if e.kind() == ErrorKind::NotFound => Map::new(),
        Err(source) => {
            return Err(SetupError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match root.get("version") {
        None => {
            root.insert("version".to_string(), json!(1));
        }
        Some(version) if !is_supported_version(version) => {
            if !accept_newer {
                return Err(SetupError::UnsupportedVersion(version.clone()));
            }
            debug!(%version, "Proceeding with unsupported hooks.json version");
        }
        Some(_) => {}
    }

    let hooks = root
        .entry("hooks")
        .or_insert_with(|| Value::Object(Map::new()));
    if !hooks.is_object() {
        *hooks = Value::Object(Map::new());
    }
    if let Value::Object(hooks) = hooks {
        for event in HOOK_EVENTS {
            let merged = merge_hook_entry(hooks.remove(event), HOOK_COMMAND);
            hooks.insert(event.to_string(), merged);
        }
    }

    let out = serde_json::to_string_pretty(&Value::Object(root)).map_err(SetupError::Encode)?;
    std::fs::write(path, out).map_err(|source| SetupError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_supported_version(version: &Value) -> bool {
    version
        .as_f64()
        .is_some_and(|v| v <= MAX_HOOKS_VERSION as f64)
}

/// Appends `{"command": command}` to an event's hook list unless it is there.
///
/// Anything other than a list is replaced by a fresh one.
fn merge_hook_entry(existing: Option<Value>, command: &str) -> Value {
    match existing {
        Some(Value::Array(mut entries)) => {
            let present = entries
                .iter()
                .any(|e| e.get("command").and_then(Value::as_str) == Some(command));
            if !present {
                entries.push(json!({ "command": command }));
            }
            Value::Array(entries)
        }
        _ => json!([{ "command": command }]),
    }
}

/// Writes the hook script, leaving an existing one alone unless `force`.
fn write_hook_script(path: &Path, force: bool) -> Result<bool, SetupError> {
    if path.exists() && !force {
        return Ok(false);
    }
    let io_err = |source| SetupError::Io {
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(path, HOOK_SCRIPT).map_err(io_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(io_err)?;
    }
    Ok(true)
}
