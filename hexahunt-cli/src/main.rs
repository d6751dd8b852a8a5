//! HexaHunt CLI - Command-line interface
//!
//! Commands:
//! - play: Play against the AI in the terminal
//! - selfplay: Let the AI play itself over many boards
//! - config: Write a match config file with default settings

mod play;
mod selfplay;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hexahunt_core::MatchConfig;

#[derive(Parser)]
#[command(name = "hexahunt")]
#[command(about = "HexaHunt: draw edges, enclose cells, dig up treasure")]
struct Cli {
    /// Random seed for board generation
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the AI
    Play(play::PlayArgs),
    /// AI plays both seats
    Selfplay(selfplay::SelfplayArgs),
    /// Write a default config file
    Config {
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG=hexahunt_core=debug shows search and item events
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Selfplay(args) => selfplay::run(args, cli.seed),
        Commands::Config { output } => {
            let mut config = MatchConfig::default();
            config.seed = cli.seed;
            config
                .save(&output)
                .with_context(|| format!("Failed to write config: {}", output.display()))?;
            println!("Wrote {}", output.display());
            Ok(())
        }
    }
}
