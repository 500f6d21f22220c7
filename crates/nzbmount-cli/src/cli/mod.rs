//! CLI for nzbmount: offline inspection of configuration and event traces.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use nzbmount_core::config;
use std::path::PathBuf;

use commands::{run_replay, run_show_config};

/// Top-level CLI for nzbmount.
#[derive(Debug, Parser)]
#[command(name = "nzbmount")]
#[command(about = "nzbmount: mount-session and server status from engine events", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Feed a captured engine-event trace (JSON lines) through the model and
    /// print the resulting mount and server status.
    Replay {
        /// Path to the trace file, one engine event per line.
        trace: PathBuf,

        /// Also print the engine commands the model issued during replay.
        #[arg(long)]
        commands: bool,
    },

    /// Print the resolved configuration.
    ShowConfig,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Replay { trace, commands } => run_replay(&cfg, &trace, commands).await?,
            CliCommand::ShowConfig => run_show_config(&cfg)?,
        }

        Ok(())
    }
}
