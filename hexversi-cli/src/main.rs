//! HEXVERSI CLI - Command-line interface
//!
//! Commands:
//! - match: Play two strategies against each other
//! - suggest: Show what every strategy would play on a saved board

mod match_cmd;
mod suggest_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexversi")]
#[command(about = "HEXVERSI hex-board disc-flipping engine")]
struct Cli {
    /// Seed for reproducible random openings
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a series of games between two strategies
    Match(match_cmd::MatchArgs),
    /// Ask every strategy for a move on a board snapshot
    Suggest(suggest_cmd::SuggestArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Match(args) => match_cmd::run(args, cli.seed),
        Commands::Suggest(args) => suggest_cmd::run(args),
    }
}
