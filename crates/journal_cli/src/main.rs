//! Journal CLI
//!
//! Command-line tools for the offline journal cache.
//!
//! # Commands
//!
//! - `inspect` - Display cache statistics
//! - `list` - Show a page of entries
//! - `pending` - Show entries waiting for reconciliation
//! - `add` - Create an entry (pending when no server is reachable)
//! - `delete` - Delete an entry
//! - `verify` - Check the cache for corrupt records
//! - `evict` - Drop old confirmed entries from the cache
//! - `sync` - Reconcile pending entries with a server

mod client;
mod commands;
mod session;

use clap::{Parser, Subcommand};
use session::RemoteArgs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Offline journal cache tools.
#[derive(Parser)]
#[command(name = "journal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the cache directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display cache statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show a page of entries, newest first
    List {
        /// 0-based page index
        #[arg(long, default_value = "0")]
        page: usize,

        /// Entries per page
        #[arg(long, default_value = "10")]
        size: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Show entries waiting for reconciliation
    Pending,

    /// Create an entry
    Add {
        /// Entry text
        content: String,

        /// Prompt the entry answers
        #[arg(long, default_value = "")]
        prompt: String,

        /// Tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Delete an entry
    Delete {
        /// Entry id (`offline_<n>` for pending entries)
        id: String,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Check the cache for corrupt records
    Verify {
        /// Delete corrupt records
        #[arg(long)]
        repair: bool,
    },

    /// Drop the oldest confirmed entries from the cache
    Evict {
        /// Number of confirmed entries to keep
        #[arg(long)]
        keep: usize,
    },

    /// Reconcile pending entries with a server
    Sync {
        /// Entries replayed per batch
        #[arg(long, default_value = "10")]
        batch_size: usize,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Cache path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::List {
            page,
            size,
            format,
            remote,
        } => {
            let path = cli.path.ok_or("Cache path required for list")?;
            commands::list::run(&path, &remote, page, size, &format)?;
        }
        Commands::Pending => {
            let path = cli.path.ok_or("Cache path required for pending")?;
            commands::pending::run(&path)?;
        }
        Commands::Add {
            content,
            prompt,
            tags,
            remote,
        } => {
            let path = cli.path.ok_or("Cache path required for add")?;
            commands::add::run(&path, &remote, content, prompt, tags)?;
        }
        Commands::Delete { id, remote } => {
            let path = cli.path.ok_or("Cache path required for delete")?;
            commands::delete::run(&path, &remote, &id)?;
        }
        Commands::Verify { repair } => {
            let path = cli.path.ok_or("Cache path required for verify")?;
            commands::verify::run(&path, repair)?;
        }
        Commands::Evict { keep } => {
            let path = cli.path.ok_or("Cache path required for evict")?;
            commands::evict::run(&path, keep)?;
        }
        Commands::Sync { batch_size, remote } => {
            let path = cli.path.ok_or("Cache path required for sync")?;
            commands::sync::run(&path, &remote, batch_size)?;
        }
        Commands::Version => {
            println!("Journal CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Journal Core v{}", journal_core::VERSION);
        }
    }

    Ok(())
}
