// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{EffectiveConfig, load_effective_config, schema_json};
use jal_console::{Acknowledge, EncodingMode, LineAcknowledger, NoPause, init_encoding};
use jal_supervisor::{Home, Launcher, OperatorIo, TokioRunner, preflight, resolve_home};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "jamovi-assistant",
    version,
    about = "Launches the Jamovi Assistant service and reports if it stops unexpectedly"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory to run from (default: $JAL_HOME, then the launcher's own directory).
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Configuration file (default: launcher.toml in home).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the service and wait for it (the default).
    Run {
        /// Exit straight away after a failure instead of waiting for Enter.
        #[arg(long)]
        no_pause: bool,
    },

    /// Report what a launch would find, without launching.
    Check {
        /// Print JSON instead of the table.
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML.
    Config {
        /// Print the JSON schema of the configuration file instead.
        #[arg(long)]
        schema: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run { no_pause: false });

    // Nothing is written before the console is switched.
    let prepared = prepare(cli.home.as_deref(), cli.config.as_deref());
    let switched = init_encoding(wants_utf8(prepared.as_ref().ok().map(|(_, e)| e)));

    if let Commands::Config { schema: true } = command {
        println!("{}", schema_json()?);
        return Ok(());
    }

    let (home, effective) = prepared?;
    init_tracing(cli.debug, effective.config.log_level());

    let encoding = switched.unwrap_or_else(|e| {
        warn!(target: "jal.console", error = %e, "keeping the current console encoding");
        EncodingMode::Inherited
    });

    debug!(
        target: "jal.cli",
        home = %home.path().display(),
        home_source = %home.source(),
        config = %effective.source,
        "configuration loaded"
    );
    for w in &effective.warnings {
        warn!(target: "jal.cli", "{w}");
    }

    match command {
        Commands::Run { no_pause } => {
            let code = cmd_run(home, effective, encoding, no_pause).await?;
            std::process::exit(code);
        }
        Commands::Check { json } => {
            let ok = cmd_check(&home, &effective, json)?;
            if !ok {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Config { .. } => {
            print!("{}", jal_config::to_toml(&effective.config)?);
            Ok(())
        }
    }
}

fn prepare(home: Option<&Path>, config: Option<&Path>) -> Result<(Home, EffectiveConfig)> {
    let home = resolve_home(home).context("resolve launcher home")?;
    let effective = load_effective_config(home.path(), config)?;
    Ok((home, effective))
}

/// The loaded configuration decides; without one, `JAL_UTF8_CONSOLE` or on.
fn wants_utf8(effective: Option<&EffectiveConfig>) -> bool {
    effective.map_or_else(jal_config::utf8_console_from_env, |e| {
        e.config.utf8_console()
    })
}

/// `RUST_LOG` wins; otherwise `--debug`, otherwise the configured level.
fn init_tracing(debug: bool, level: &str) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if debug => EnvFilter::new("jal=debug"),
        Err(_) => EnvFilter::new(format!("jal={level}")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn cmd_run(
    home: Home,
    effective: EffectiveConfig,
    encoding: EncodingMode,
    no_pause: bool,
) -> Result<i32> {
    let pause = effective.config.pause_on_failure() && !no_pause;

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let ack: Box<dyn Acknowledge> = if pause {
        Box::new(LineAcknowledger::stdio())
    } else {
        Box::new(NoPause)
    };

    let report = Launcher::new(home, effective.config, TokioRunner)
        .with_encoding(encoding)
        .run(OperatorIo {
            stdout: &mut stdout,
            stderr: &mut stderr,
            ack,
        })
        .await
        .context("supervise service")?;

    debug!(
        target: "jal.cli",
        outcome = ?report.outcome,
        encoding = %report.encoding,
        "run finished"
    );
    Ok(report.exit_code())
}

fn cmd_check(home: &Home, effective: &EffectiveConfig, json: bool) -> Result<bool> {
    let report = preflight(home.path(), &effective.config.service_spec());
    let ok = report.is_ok();

    if json {
        let value = serde_json::json!({
            "config": effective.source.to_string(),
            "ok": ok,
            "report": &report,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        let mut out = std::io::stdout().lock();
        write!(out, "{report}")?;
        writeln!(out, "config: {}", effective.source)?;
        for w in &effective.warnings {
            writeln!(out, "note: {w}")?;
        }
        out.flush()?;
    }

    Ok(ok)
}
