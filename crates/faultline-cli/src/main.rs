//! Faultline CLI - Command-line interface for Faultline
//!
//! Builds the code graph of a directory and reports structural smells and
//! the blast radius of changing a file.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "faultline")]
#[command(author = "Faultline Contributors")]
#[command(version)]
#[command(about = "Structural risk analysis for codebases", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip the semantic oracle even if one is configured
    #[arg(long, global = true)]
    no_oracle: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Faultline in the current directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Index the codebase and build the graph
    Index {
        /// Path to index (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output file for the graph JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report cycles, hubs, orphans and redundant API clients
    Audit {
        /// Path to analyze (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show which files directly depend on a file
    Impact {
        /// The file to change, relative to the project root
        file: String,

        /// Project root (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Export the graph to JSON
    Export {
        /// Output file
        #[arg(short, long, default_value = "faultline-graph.json")]
        output: PathBuf,

        /// Path to index (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let use_oracle = !cli.no_oracle;
    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Index { path, output } => {
            commands::index(&path, output.as_deref(), use_oracle).await
        }
        Commands::Audit { path, json } => commands::audit(&path, json, use_oracle).await,
        Commands::Impact { file, path, json } => {
            commands::impact(&path, &file, json, use_oracle).await
        }
        Commands::Export { output, path } => commands::export(&path, &output, use_oracle).await,
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
