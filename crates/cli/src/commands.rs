//! CLI commands

use anyhow::{Context, Result};
use authdash_dashboard::SessionController;
use clap::Subcommand;
use std::io::IsTerminal;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::info;

use crate::config;
use crate::shell::{SecretInput, Shell};

/// Flags shared by every command
pub struct GlobalOptions {
    pub data_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive dashboard
    Shell,

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate a default configuration file
    Init {
        /// Output file path (defaults to <data-dir>/config.toml)
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

impl Commands {
    pub async fn execute(self, options: GlobalOptions) -> Result<()> {
        match self {
            Self::Shell => run_shell(options).await,
            Self::Config { command } => command.execute(&options),
        }
    }
}

impl ConfigCommands {
    pub fn execute(self, options: &GlobalOptions) -> Result<()> {
        match self {
            Self::Init { output, force } => {
                let path = output.unwrap_or_else(|| config::default_config_path(&options.data_dir));
                config::generate_default_config(&path, force)?;
                info!(path = %path.display(), "Generated configuration file");
                println!("Generated configuration file: {}", path.display());
                Ok(())
            }
            Self::Show => {
                let config = config::load_config(
                    options.config.as_deref(),
                    &options.data_dir,
                    options.base_url.clone(),
                )?;
                print!("{}", config.to_toml()?);
                Ok(())
            }
        }
    }
}

async fn run_shell(options: GlobalOptions) -> Result<()> {
    let config = config::load_config(
        options.config.as_deref(),
        &options.data_dir,
        options.base_url,
    )?;
    info!(base_url = %config.api.base_url, "Connecting to auth service");

    let controller =
        SessionController::from_config(&config.api).context("Failed to create HTTP client")?;

    let input = BufReader::new(tokio::io::stdin());
    let secrets = SecretInput::for_terminal(std::io::stdin().is_terminal());
    Shell::new(controller, input, std::io::stdout())
        .with_secret_input(secrets)
        .run()
        .await
}
