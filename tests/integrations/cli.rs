use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;

fn n_cli_bin() -> Result<Command> {
    Ok(Command::cargo_bin("n-cli")?)
}

#[test]
fn test_version_prints_crate_version() -> Result<()> {
    let mut cmd = n_cli_bin()?;
    cmd.arg("version");
    cmd.assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", env!("CARGO_PKG_VERSION"))));
    Ok(())
}

#[test]
fn test_send_without_message_exits_one() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut cmd = n_cli_bin()?;
    cmd.arg("send")
        .arg("--config")
        .arg(dir.path().join("config.yaml"));

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("message required"));
    Ok(())
}

#[test]
fn test_send_with_empty_stdin_exits_one() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut cmd = n_cli_bin()?;
    cmd.arg("s")
        .arg("--stdin")
        .arg("--config")
        .arg(dir.path().join("config.yaml"))
        .write_stdin("\n");

    cmd.assert().code(1);
    Ok(())
}

#[test]
fn test_init_writes_starter_config_once() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("config.yaml");

    n_cli_bin()?
        .arg("init")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Config written to"));
    assert!(std::fs::read_to_string(&path)?.contains("timeoutSeconds"));

    std::fs::write(&path, "logLevel: warn\n")?;
    n_cli_bin()?
        .arg("init")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
    assert_eq!(std::fs::read_to_string(&path)?, "logLevel: warn\n");
    Ok(())
}

#[test]
fn test_where_config_prints_path() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.yaml");

    n_cli_bin()?
        .args(["where", "config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", path.display())));
    Ok(())
}

#[test]
fn test_run_requires_a_command() -> Result<()> {
    n_cli_bin()?.arg("run").assert().failure();
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_run_strips_separator_and_keeps_exit_code() -> Result<()> {
    let dir = tempfile::tempdir()?;

    n_cli_bin()?
        .arg("--config")
        .arg(dir.path().join("config.yaml"))
        .args(["run", "sh", "--", "-c", "exit 3"])
        .assert()
        .code(3);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_setup_cursor_writes_hooks_under_home() -> Result<()> {
    let home = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("n-cli");
    let bin_dir = bin.parent().expect("binary has a parent directory");

    n_cli_bin()?
        .args(["setup", "cursor"])
        .env("HOME", home.path())
        .env("PATH", bin_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cursor hooks configured."));

    let hooks = std::fs::read_to_string(home.path().join(".cursor").join("hooks.json"))?;
    assert!(hooks.contains("./hooks/n-cli-notify.sh"));
    assert!(home
        .path()
        .join(".cursor/hooks/n-cli-notify.sh")
        .exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_setup_cursor_requires_n_cli_on_path() -> Result<()> {
    let home = tempfile::tempdir()?;
    let empty = tempfile::tempdir()?;

    n_cli_bin()?
        .args(["setup", "cursor"])
        .env("HOME", home.path())
        .env("PATH", empty.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not on PATH"));

    assert!(!home.path().join(".cursor").exists());
    Ok(())
}
