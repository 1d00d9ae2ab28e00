// SPDX-License-Identifier: MIT OR Apache-2.0
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jal_config::{CONFIG_FILE_NAME, LauncherConfig};
use schemars::schema_for;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "xtask", version, about = "Repo maintenance tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the JSON Schema for launcher.toml.
    Schema {
        /// Output directory.
        #[arg(long, default_value = "contracts/schemas")]
        out_dir: PathBuf,
    },

    /// Write a launcher.toml holding the built-in defaults, for packaging.
    SampleConfig {
        /// Output directory.
        #[arg(long, default_value = "dist")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Schema { out_dir } => schema(&out_dir),
        Command::SampleConfig { out_dir } => sample_config(&out_dir),
    }
}

fn schema(out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir).context("create schema output dir")?;

    let config = schema_for!(LauncherConfig);
    let path = out_dir.join("launcher_config.schema.json");
    let s = serde_json::to_string_pretty(&config)?;
    std::fs::write(&path, s).with_context(|| format!("write {}", path.display()))?;

    eprintln!("wrote schema to {}", path.display());
    Ok(())
}

fn sample_config(out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir).context("create output dir")?;

    let text = jal_config::to_toml(&LauncherConfig::default())?;
    let path = out_dir.join(CONFIG_FILE_NAME);
    std::fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;

    eprintln!("wrote {}", path.display());
    Ok(())
}
