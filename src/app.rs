//! The subcommand handlers, decoupled from the entry point.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::{
    cli::{Cli, Command, CursorArgs, InitArgs, RunArgs, SendArgs, SetupTarget, WhereTarget},
    config::{write_starter_config, ConfigSource, FileConfigSource},
    notification::{DispatchError, Dispatcher},
    runner::{run_command, RunError},
    setup::{setup_cursor, SetupError},
};

/// Printed after any failed send.
pub const CONFIG_HINT: &str = "\n---\nSend failed. Please check the error message(s) above, and verify that your configuration file is correct.\n---\n";

/// Exit code used when `run` cannot start the command at all.
pub const EXIT_CANNOT_EXECUTE: i32 = 127;

/// Runs the parsed command line and returns the process exit code.
pub async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Send(args) => {
            let source = FileConfigSource::from_args(&cli.global)?;
            send(&Dispatcher::new(source), args).await
        }
        Command::Run(args) => {
            let source = FileConfigSource::from_args(&cli.global)?;
            run_and_notify(&Dispatcher::new(source), args).await
        }
        Command::Init(args) => {
            let source = FileConfigSource::from_args(&cli.global)?;
            init(source.path(), args)
        }
        Command::Setup {
            target: SetupTarget::Cursor(args),
        } => setup_cursor_hooks(args),
        Command::Where { target } => {
            let source = FileConfigSource::from_args(&cli.global)?;
            where_is(source.path(), target)
        }
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}

/// Sends the message given on the command line or stdin.
pub async fn send<S: ConfigSource>(dispatcher: &Dispatcher<S>, args: SendArgs) -> Result<i32> {
    let message = if args.stdin {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("cannot read message from stdin")?;
        Some(buf.trim_end_matches(['\n', '\r']).to_string()).filter(|m| !m.is_empty())
    } else {
        args.joined()
    };

    let Some(message) = message else {
        eprintln!("message required: pass arguments or use --stdin");
        return Ok(1);
    };

    match dispatcher.notify(&message).await {
        Ok(()) => Ok(0),
        Err(e) => {
            report_failure(&e);
            Ok(1)
        }
    }
}

/// Runs the command, notifies about its outcome and hands back its exit code.
pub async fn run_and_notify<S: ConfigSource>(
    dispatcher: &Dispatcher<S>,
    args: RunArgs,
) -> Result<i32> {
    let argv = args.argv();
    let Some((program, rest)) = argv.split_first() else {
        eprintln!("n-cli run error: no command given");
        return Ok(1);
    };

    let report = match run_command(program, rest).await {
        Ok(report) => report,
        Err(e @ RunError::Spawn { .. }) => {
            eprintln!("n-cli run error: {}", e);
            return Ok(EXIT_CANNOT_EXECUTE);
        }
        Err(e) => return Err(e.into()),
    };
    debug!(exit_code = report.exit_code(), "Command finished");

    if let Err(e) = dispatcher.notify(&report.message()).await {
        report_failure(&e);
    }
    Ok(report.exit_code())
}

fn init(path: &Path, args: InitArgs) -> Result<i32> {
    if write_starter_config(path, args.force)? {
        info!("Wrote starter config");
        println!("Config written to {}", path.display());
    } else {
        println!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    Ok(0)
}

fn setup_cursor_hooks(args: CursorArgs) -> Result<i32> {
    if which::which("n-cli").is_err() {
        eprintln!("n-cli is not on PATH; add it to your PATH so Cursor can run it from hooks.");
        eprintln!("Check your shell profile (e.g. ~/.zshrc) and restart Cursor after setup.");
        return Ok(1);
    }
    let home = dirs::home_dir().ok_or(SetupError::HomeDirectory)?;
    let setup = setup_cursor(&home, args.force)?;

    if !setup.script_written {
        println!("Hook script already exists, left unchanged. Run with --force to overwrite.");
    }
    println!("Cursor hooks configured.");
    println!("  {}", setup.paths.hooks_json.display());
    println!("  {}", setup.paths.script.display());
    println!("Restart Cursor for hooks to take effect. Ensure n-cli stays on PATH in the shell Cursor uses.");
    Ok(0)
}

fn where_is(config_path: &Path, target: Option<WhereTarget>) -> Result<i32> {
    match target {
        Some(WhereTarget::Config) => println!("{}", config_path.display()),
        None => {
            let executable = std::env::current_exe()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("Executable: {}", executable);
            println!("Config file: {}", config_path.display());
        }
    }
    Ok(0)
}

fn report_failure(err: &DispatchError) {
    eprintln!("ERROR: {}", err);
    eprintln!("{}", CONFIG_HINT);
}
