//! Collab CLI - command line client for the collaboration platform

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use collab_core::StateDir;
use commands::Commands;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "collab")]
#[command(about = "Command line client for the Collab platform")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// State directory for configuration, tokens and logs
    #[arg(short = 'd', long, global = true, env = "COLLAB_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Client configuration file (JSON, TOML or YAML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let state_dir = match &cli.state_dir {
        Some(dir) => StateDir::with_override(dir),
        None => StateDir::new(),
    };
    logging::init_logging(cli.log_level.into(), &state_dir, cli.no_file_log)?;

    debug!("Starting Collab CLI");

    let run = cli.command.execute(state_dir, cli.config);
    let outcome = if cli.timeout == 0 {
        run.await
    } else {
        match tokio::time::timeout(Duration::from_secs(cli.timeout), run).await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = outcome {
        error!("Command failed: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
