//! scanctl: command-line client for the plugin secret scanner
//!
//! Resolves the signed-in account, gates protected commands on it, and
//! submits repositories or `.zip` archives to the scan intake service.

mod commands;
mod config;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;

use commands::SubmitArgs;
use config::Config;

#[derive(Parser)]
#[command(name = "scanctl")]
#[command(about = "Submit plugins to the secret scanner")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "SCANCTL_CONFIG", default_value = "scanctl.toml")]
    config: PathBuf,

    /// Intake service base URL (overrides config file)
    #[arg(long, env = "SCANCTL_INTAKE_URL")]
    intake_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the signed-in account
    Whoami,

    /// Submit a repository URL or archive for scanning
    Submit(SubmitArgs),

    /// Check that the intake service is reachable
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scanctl=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(url) = cli.intake_url {
        config.intake.base_url = url;
    }
    info!("Intake service: {}", config.intake.base_url);

    let outcome = match cli.command {
        Commands::Whoami => commands::whoami(&config).await?,
        Commands::Submit(args) => commands::submit(&config, args).await?,
        Commands::Ping => commands::ping(&config).await?,
    };

    Ok(outcome.into())
}
