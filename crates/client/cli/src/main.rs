//! Command-line driver for the vault contestation runtime.
mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Duel, Inspect, Simulate};

/// Clan vault contestation tools
#[derive(Parser)]
#[command(name = "vault")]
#[command(about = "Simulate and inspect clan vault contests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Replay a scenario through the runtime with seeded randomness
    Simulate(Simulate),

    /// Resolve one duel between two scenario players
    Duel(Duel),

    /// Print a stored vault snapshot
    Inspect(Inspect),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let session_id = std::env::var("VAULT_SESSION_ID")
        .unwrap_or_else(|_| format!("session_{}", chrono::Utc::now().timestamp()));
    let log_dir = std::env::var_os("VAULT_LOG_DIR").map(PathBuf::from);
    let _guard = logging::setup_logging(log_dir, &session_id)?;

    match cli.command {
        Command::Simulate(cmd) => cmd.execute().await,
        Command::Duel(cmd) => cmd.execute(),
        Command::Inspect(cmd) => cmd.execute(),
    }
}
