mod commands;
mod render;

use anyhow::Result;
use cares_core::config::CaresConfig;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cares")]
#[command(about = "Browse and add Bengaluru Cares volunteer events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List upcoming events
    Events {
        /// Include events that already happened
        #[arg(long)]
        all: bool,
    },
    /// Add an event (asks for the admin password)
    Add {
        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        organization: Option<String>,

        /// Date of the event (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Comma-separated, e.g. "environment, cleanup"
        #[arg(long)]
        tags: Option<String>,

        /// Number of volunteers wanted
        #[arg(short, long)]
        spots: Option<u32>,
    },
    /// Show where configuration and events live
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CaresConfig::load()?;

    match cli.command {
        Commands::Events { all } => commands::events::run(&config, all),
        Commands::Add {
            title,
            organization,
            date,
            tags,
            spots,
        } => commands::add::run(
            &config,
            commands::add::AddArgs {
                title,
                organization,
                date,
                tags,
                spots,
            },
        ),
        Commands::Config => commands::config::run(&config),
    }
}
