//! Bookmatch CLI application entry point
//!
//! Browse books of a genre one at a time, like or reject each one, and review
//! the saved list later.
//!
//! # Usage
//!
//! ```bash
//! # Explore the default genre, or a given one
//! bookmatch
//! bookmatch explore fantasy
//!
//! # Review decisions
//! bookmatch saved
//! bookmatch rejected
//! bookmatch count
//! bookmatch remove /works/OL27448W
//!
//! # Edit the saved list with undo, and group books into collections
//! bookmatch review
//! bookmatch collection create "summer reads"
//! bookmatch collection add "summer reads" /works/OL27448W
//! bookmatch collection list "summer reads"
//!
//! # Browse an offline catalog file with a throwaway database
//! bookmatch --offline books.json --db /tmp/bookmatch explore horror
//! ```
//!
//! # Configuration
//!
//! On first run, bookmatch will prompt for initial setup. Configuration is
//! stored in the user's config directory (`~/.config/bookmatch/config.toml`
//! on Linux). Logs go to stderr; set `RUST_LOG` to override `log_level`.

use bookmatch::{
    BookmatchError,
    browse::{BrowseSession, SessionSettings},
    catalog::{CatalogSource, OpenLibraryCatalog, StaticCatalog},
    cli::{Cli, CollectionCommands, Commands, ConfigCommands},
    commands,
    config::BookmatchConfig,
    db::Database,
};
use dialoguer::Confirm;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, BookmatchError>;

/// Install the stderr subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

/// Build the catalog: an offline file when one is given, Open Library otherwise
fn open_catalog(config: &BookmatchConfig) -> Result<Arc<dyn CatalogSource>> {
    let catalog = &config.catalog;
    if let Some(path) = &catalog.offline_file {
        info!(path = %path.display(), "using offline catalog");
        return Ok(Arc::new(StaticCatalog::from_path(path, catalog.page_size)?));
    }

    debug!(base_url = %catalog.base_url, "using Open Library catalog");
    Ok(Arc::new(OpenLibraryCatalog::new(
        catalog.base_url.clone(),
        catalog.page_size,
        Duration::from_secs(catalog.timeout_secs),
    )?))
}

fn handle_explore_command(
    config: &BookmatchConfig,
    db: Database,
    genre: Option<String>,
    quiet: bool,
) -> Result<()> {
    let catalog = open_catalog(config)?;
    let settings = SessionSettings::from(&config.browse);
    let mut session = BrowseSession::new(catalog, Arc::new(db), settings)?;

    let genre = genre.or_else(|| config.browse.default_genre.clone());
    commands::explore(&mut session, genre.as_deref(), quiet)
}

fn confirmation_failed(e: dialoguer::Error) -> BookmatchError {
    BookmatchError::InvalidInput(format!("Failed to get confirmation: {e}"))
}

fn handle_reset_command(db: &Database, yes: bool, quiet: bool) -> Result<()> {
    let confirmed = yes
        || Confirm::new()
            .with_prompt(format!("Forget all {} decision(s)?", db.count()))
            .default(false)
            .interact()
            .map_err(confirmation_failed)?;
    commands::reset(db, confirmed, &mut io::stdout(), quiet)
}

fn open_database(config: &BookmatchConfig) -> Result<Database> {
    let db_path = config.database_path()?;
    debug!(path = %db_path.display(), "opening database");
    Ok(Database::open(&db_path)?)
}

fn handle_collection_command(db: &Database, command: &CollectionCommands, quiet: bool) -> Result<()> {
    let mut stdout = io::stdout();
    match command {
        CollectionCommands::Create { name } => commands::collections::create(db, name, &mut stdout, quiet),
        CollectionCommands::Add { name, id } => commands::collections::add(db, name, id, &mut stdout, quiet),
        CollectionCommands::List { name } => {
            commands::collections::list(db, name.as_deref(), &mut stdout, quiet)
        }
        CollectionCommands::Count => commands::collections::count(db, &mut stdout, quiet),
    }
}

fn handle_config_command(config: &BookmatchConfig, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => print!("{}", config.to_toml()?),
        ConfigCommands::Path => println!("{}", BookmatchConfig::config_path()?.display()),
    }
    Ok(())
}

/// Main entry point for the bookmatch application
///
/// Loads configuration, parses command-line arguments, and dispatches to the
/// appropriate command handler.
///
/// # Errors
///
/// Returns `BookmatchError` if configuration loading fails, the database
/// cannot be opened, or any command handler returns an error.
fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let mut config = BookmatchConfig::load_or_setup()?;
    init_tracing(&config.log_level);

    if let Some(db) = &cli.db {
        config.database_path = Some(db.clone());
    }
    if let Some(offline) = &cli.offline {
        config.catalog.offline_file = Some(offline.clone());
    }
    let quiet = cli.quiet || config.quiet;

    let command = cli.get_command();
    let mut stdout = io::stdout();

    match command {
        Commands::Config { command } => handle_config_command(&config, &command)?,
        Commands::Explore { genre } => {
            handle_explore_command(&config, open_database(&config)?, genre, quiet)?;
        }
        Commands::Saved => commands::saved(&open_database(&config)?, &mut stdout, quiet)?,
        Commands::Review => {
            let undo_timeout = Duration::from_millis(config.browse.undo_timeout_ms);
            commands::review(&open_database(&config)?, undo_timeout, quiet)?;
        }
        Commands::Collection { command } => {
            handle_collection_command(&open_database(&config)?, &command, quiet)?;
        }
        Commands::Rejected => commands::rejected(&open_database(&config)?, &mut stdout, quiet)?,
        Commands::Count => commands::count(&open_database(&config)?, &mut stdout, quiet)?,
        Commands::Remove { id } => commands::remove(&open_database(&config)?, &id, &mut stdout, quiet)?,
        Commands::Reset { yes } => handle_reset_command(&open_database(&config)?, yes, quiet)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_failure_is_invalid_input() {
        let error = confirmation_failed(dialoguer::Error::IO(io::Error::other("terminal closed")));
        match error {
            BookmatchError::InvalidInput(message) => {
                assert!(message.starts_with("Failed to get confirmation"));
                assert!(message.contains("terminal closed"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
