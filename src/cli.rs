//! Command-line interface definitions
//!
//! Argument parsing with `clap` derive. Running `bookmatch` without a
//! subcommand opens the explore screen for the configured default genre.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bookmatch")]
#[command(author, version, about = "Swipe through books by genre, keep the ones you like", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Use this database directory instead of the configured one
    #[arg(long = "db", value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Browse a JSON catalog file instead of Open Library
    #[arg(long = "offline", value_name = "FILE", global = true)]
    pub offline: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Browse books of a genre and decide on each one (default)
    #[command(visible_alias = "e")]
    Explore {
        /// Genre or subject to browse (e.g. fantasy, science_fiction)
        #[arg(value_name = "GENRE")]
        genre: Option<String>,
    },

    /// List saved books
    #[command(visible_alias = "ls")]
    Saved,

    /// Edit the saved list: remove books or file them into collections, with undo
    #[command(visible_alias = "r")]
    Review,

    /// Show how many books are saved and how many collections exist
    Count,

    /// Forget the decision on a book so it can be offered again
    #[command(visible_alias = "rm")]
    Remove {
        /// Book identifier as printed by `saved` or `rejected`
        #[arg(value_name = "ID")]
        id: String,
    },

    /// List rejected books
    Rejected,

    /// Forget every decision
    Reset {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// Manage collections of saved books
    #[command(visible_alias = "col")]
    Collection {
        #[command(subcommand)]
        command: CollectionCommands,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Collection subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CollectionCommands {
    /// Create an empty collection
    Create {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Add a saved book to a collection
    Add {
        #[arg(value_name = "NAME")]
        name: String,
        /// Book identifier as printed by `saved`
        #[arg(value_name = "ID")]
        id: String,
    },

    /// List collections, or the books of one collection
    #[command(visible_alias = "ls")]
    List {
        #[arg(value_name = "NAME")]
        name: Option<String>,
    },

    /// Show how many collections exist
    Count,
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Print the path of the configuration file
    Path,
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the command, defaulting to Explore if none specified
    #[must_use]
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Explore { genre: None })
    }
}
