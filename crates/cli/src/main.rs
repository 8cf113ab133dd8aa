//! authdash - terminal dashboard for an auth service

mod commands;
mod config;
mod logging;
mod shell;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "authdash")]
#[command(about = "Manage logins and sessions of an auth service from the terminal")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Data directory for the default config file and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to <data-dir>/config.toml when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Auth service base URL, overrides the configuration
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = config::resolve_data_dir(cli.data_dir);

    let component = match &cli.command {
        Commands::Shell => "shell",
        Commands::Config { .. } => "cli",
    };
    logging::init_logging(cli.log_level.into(), &data_dir, component, cli.no_file_log)?;

    debug!(data_dir = %data_dir.display(), "Starting authdash");

    let options = commands::GlobalOptions {
        data_dir,
        config: cli.config,
        base_url: cli.base_url,
    };

    if let Err(e) = cli.command.execute(options).await {
        error!("Command failed: {e:#}");
        eprintln!("Error: {e:#}");
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
