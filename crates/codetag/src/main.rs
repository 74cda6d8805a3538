//! Codetag CLI - symbol trees for source files from the command line.
//!
//! Parses files with on-demand tree-sitter grammars and addresses their
//! symbols by tag path (`file#Outer>inner`).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// Codetag: addressable symbol trees for source files.
#[derive(Parser)]
#[command(name = "codetag")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tag tree of a file
    Tags {
        /// Source file to parse
        file: PathBuf,

        /// Emit JSON instead of an indented tree
        #[arg(long)]
        json: bool,
    },

    /// Print the source of a linked symbol
    Show {
        /// Link in `file#Outer>inner` form
        link: String,
    },

    /// Rank a file's symbols against a query
    Suggest {
        /// Source file to parse
        file: PathBuf,

        /// Partial tag path, tags separated by commas
        query: Option<String>,

        /// Maximum number of results
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// List supported languages
    Langs,

    /// Download grammars ahead of time
    Fetch {
        /// Languages to fetch (defaults to the configured preload list)
        langs: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli::Context::load(cli.config).await {
        Ok(ctx) => match cli.command {
            Commands::Tags { file, json } => cli::tags::run(&ctx, &file, json).await,
            Commands::Show { link } => cli::show::run(&ctx, &link).await,
            Commands::Suggest { file, query, limit } => {
                cli::suggest::run(&ctx, &file, query.as_deref(), limit).await
            }
            Commands::Langs => cli::langs::run(&ctx).await,
            Commands::Fetch { langs } => cli::fetch::run(&ctx, &langs).await,
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
