use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod utils;

#[derive(Parser)]
#[command(name = "quarry-cmd")]
#[command(about = "Command-line utility for inspecting stored documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the storage key of a document as hex
    Key {
        /// Logical index name
        #[arg(long)]
        index: String,

        /// Document ordinal
        #[arg(long)]
        ordinal: u32,
    },

    /// Decode a single stored column value
    Decode {
        /// Column (field) name
        #[arg(long)]
        column: String,

        /// Raw column value, hex encoded, including the trailing type tag
        #[arg(long)]
        hex: String,
    },

    /// Materialize a document from a JSON row snapshot
    Show {
        /// Path to the JSON row snapshot
        #[arg(long)]
        snapshot: String,

        /// Path to the JSON reader configuration
        #[arg(long)]
        config: String,

        /// Additional ordinals to prefetch (can be specified multiple times)
        #[arg(short, long)]
        prefetch: Vec<u32>,

        /// Restrict the read to these fields (can be specified multiple times)
        #[arg(short, long)]
        field: Vec<String>,

        /// Document ordinal
        ordinal: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Key { index, ordinal } => commands::key::run(index, ordinal),
        Commands::Decode { column, hex } => commands::decode::run(column, hex),
        Commands::Show {
            snapshot,
            config,
            prefetch,
            field,
            ordinal,
        } => commands::show::run(snapshot, config, prefetch, field, ordinal),
    }
}
