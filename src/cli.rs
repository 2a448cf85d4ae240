//! CLI definitions for StatusWatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// StatusWatch CLI.
#[derive(Parser, Debug)]
#[command(name = "statuswatch")]
#[command(about = "Poll service status pages and alert on status changes")]
#[command(version)]
pub(crate) struct Cli {
    /// Log directory (default: ~/.statuswatch/logs)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Environment file loaded before reading settings
    #[arg(long, default_value = ".env", global = true)]
    pub env_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Commands {
    /// Run the monitoring loop in foreground (default)
    Run {
        /// Target registry file (default: built-in targets)
        #[arg(short, long)]
        targets: Option<PathBuf>,

        /// Stop after this many cycles
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        cycles: Option<u64>,
    },

    /// Check every target once and print verdicts, without sending alerts
    Check {
        /// Target registry file (default: built-in targets)
        #[arg(short, long)]
        targets: Option<PathBuf>,
    },

    /// Send a test alert through every configured channel
    TestAlert,

    /// Validate and list the target registry
    Targets {
        /// Target registry file (default: built-in targets)
        #[arg(short, long)]
        targets: Option<PathBuf>,
    },
}

impl Cli {
    /// The subcommand to execute; `run` with defaults when none is given.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run {
            targets: None,
            cycles: None,
        })
    }
}
