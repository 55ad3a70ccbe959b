//! # Review Harness CLI (`prr`)
//!
//! The `prr` binary drives the retrieval-grounded review pipeline: database
//! initialization, repository indexing, context inspection, and full pull
//! request reviews.
//!
//! ## Usage
//!
//! ```bash
//! prr --config ./config/prr.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `prr init` | Create the SQLite database and schema |
//! | `prr index <path>` | Embed a repository tree into the store |
//! | `prr review <owner> <repo> <number>` | Review a pull request end to end |
//! | `prr context <diff-file>` | Print the context a diff would retrieve |
//! | `prr list` | Dump the indexed documents |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use review_harness::{config, context, indexer, inspect, migrate, review};

/// Review Harness — retrieval-grounded pull request review.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with database, indexing, embedding, GitHub, and LLM settings.
#[derive(Parser)]
#[command(
    name = "prr",
    about = "Review Harness — retrieval-grounded pull request review",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/prr.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Idempotent.
    Init,

    /// Index a repository tree: normalize, embed, and store every
    /// supported file. Re-runs skip unchanged files.
    Index {
        /// Root directory to index.
        root: PathBuf,

        /// Re-embed every file even if its content is unchanged.
        #[arg(long)]
        full: bool,

        /// Show the file count without embedding or writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Fetch a pull request, retrieve relevant indexed files, run the LLM
    /// analysis, and write the review report.
    Review {
        /// Repository owner (user or organization).
        owner: String,

        /// Repository name.
        repo: String,

        /// Pull request number.
        number: u64,
    },

    /// Build and print the review context for a diff read from a file.
    /// Useful for checking index quality without calling the LLM.
    Context {
        /// Path to a unified diff on disk.
        diff: PathBuf,
    },

    /// List all indexed documents.
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Index {
            root,
            full,
            dry_run,
        } => {
            indexer::run_index(&cfg, &root, full, dry_run).await?;
        }
        Commands::Review {
            owner,
            repo,
            number,
        } => {
            review::run_review(&cfg, &owner, &repo, number).await?;
        }
        Commands::Context { diff } => {
            context::run_context(&cfg, &diff).await?;
        }
        Commands::List => {
            inspect::run_list(&cfg).await?;
        }
    }

    Ok(())
}
