// src/cli/mod.rs — CLI definition (clap derive)

pub mod ask;
pub mod history;
pub mod migrate;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "aggregator",
    about = "Ask two models, let a judge merge the answers",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// History database path (overrides config)
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Ask one question and print the merged answer
    Ask {
        /// The question (remaining arguments are joined with spaces)
        #[arg(trailing_var_arg = true, required = true)]
        question: Vec<String>,
        /// Print the API response JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Per-model request counts and latencies
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Most recent history records
    History {
        /// Number of records to show
        #[arg(short = 'n', long)]
        limit: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// Delete all history records
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show service name, version and configured models
    Info,
    /// Inspect or roll back database migrations
    Migrate {
        /// Show the current schema version
        #[arg(long)]
        status: bool,
        /// Revert the latest migration
        #[arg(long)]
        rollback: bool,
    },
}
