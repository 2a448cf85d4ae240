//! StatusWatch - service status polling and alerting
//!
//! Main entry point for the StatusWatch CLI.

mod cli;
mod cmd_alert;
mod cmd_monitor;
mod cmd_targets;
mod config;
mod signal;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};

/// Default log directory: `~/.statuswatch/logs`.
fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".statuswatch"))
        .unwrap_or_else(|| PathBuf::from(".statuswatch"))
        .join("logs")
}

/// Initialize tracing with console and file output.
///
/// Log files rotate daily and the last 30 are kept.
fn init_tracing(log_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("statuswatch")
        .filename_suffix("log")
        .max_log_files(30)
        .build(log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the background writer alive for the program duration
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Load the env file, letting it override the process environment.
///
/// Returns whether the file existed.
fn load_env_file(path: &Path) -> Result<bool, dotenvy::Error> {
    match dotenvy::from_path_override(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Before tracing, so RUST_LOG may come from the env file
    let env_loaded = load_env_file(&cli.env_file)?;

    let log_dir = cli.log_dir.clone().unwrap_or_else(default_log_dir);
    init_tracing(&log_dir)?;

    if env_loaded {
        debug!("Loaded environment from {}", cli.env_file.display());
    } else if cli.env_file != Path::new(".env") {
        warn!("Environment file {} not found", cli.env_file.display());
    }

    match cli.command() {
        Commands::Run { targets, cycles } => cmd_monitor::run(targets.as_deref(), cycles).await,
        Commands::Check { targets } => cmd_monitor::check(targets.as_deref()).await,
        Commands::TestAlert => cmd_alert::test_alert().await,
        Commands::Targets { targets } => cmd_targets::list_targets(targets.as_deref()),
    }
}
