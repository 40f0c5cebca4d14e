#![deny(unsafe_code)]

mod commands;
mod exit_code;
mod output;
mod session;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oxcrypt_unlock::{ConfigError, DialogConfig};

use crate::commands::{config, simulate};
use crate::session::ScriptError;

/// Scriptable driver for the OxCrypt multi-vault unlock dialog
#[derive(Parser)]
#[command(name = "oxunlock")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # Unlock the second of two vaults
    oxunlock simulate ~/work.vault ~/home.vault --step next --step accept

    # Merge cycle, cycling tabs with the keyboard, JSON output
    oxunlock simulate --intent merge a b c --step key:Ctrl+PageUp --step accept --json

    # Show the effective dialog settings
    oxunlock config
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress logging, error messages and result summaries
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Dialog config file (defaults to unlock-dialog.toml in the OxCrypt config dir)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scripted unlock cycle and print what the dialog did
    Simulate(simulate::Args),

    /// Print the effective dialog configuration
    Config(config::Args),
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            let code = categorize_error(&e);

            let args: Vec<String> = std::env::args().collect();
            let is_quiet = args.iter().any(|a| a == "-q" || a == "--quiet");
            if !is_quiet {
                eprintln!("Error: {e:#}");
            }

            ExitCode::from(code)
        }
    }
}

fn run() -> Result<u8> {
    let cli = Cli::parse();

    if !cli.quiet {
        setup_tracing(cli.verbose);
    }

    let dialog_config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate(args) => simulate::execute(&args, &dialog_config, cli.quiet),
        Commands::Config(args) => {
            config::execute(&args, &dialog_config)?;
            Ok(exit_code::SUCCESS)
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<DialogConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: io::Error::from(io::ErrorKind::NotFound),
                });
            }
            DialogConfig::load_from(path).context("Failed to load dialog config")
        }
        None => DialogConfig::load().context("Failed to load dialog config"),
    }
}

/// Map an error to the exit code scripts should see
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.downcast_ref::<ScriptError>().is_some() {
            return exit_code::USAGE_ERROR;
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return exit_code::CONFIG_ERROR;
        }
    }
    exit_code::GENERAL_ERROR
}

fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
