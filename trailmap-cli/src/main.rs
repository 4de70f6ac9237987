//! Trailmap CLI
//!
//! Replays recorded tracks through the tracking core with simulated platform
//! services, and manages the configuration file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod error;

use commands::config::ConfigCommands;
use commands::replay::ReplayArgs;

#[derive(Parser)]
#[command(name = "trailmap")]
#[command(version, about = "Live position tracking with a follow-me map camera", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.trailmap/config.ini
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded track (CSV of latitude,longitude) through the core
    Replay(ReplayArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay(args) => commands::replay::run(args, cli.config.as_deref()).await,
        Commands::Config(command) => commands::config::run(command, cli.config.as_deref()),
    };

    if let Err(e) = result {
        e.exit();
    }
}
