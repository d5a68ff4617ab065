//! Interactive setup wizard for first-time configuration
//!
//! Asks where the local store should live and which genre to open by
//! default when bookmatch is run for the first time.

use super::BookmatchConfig;
use config::ConfigError;
use dialoguer::{Input, theme::ColorfulTheme};
use std::path::PathBuf;

/// Interactive first-time setup - prompts for store location and default genre
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The system data directory cannot be determined
/// - User input cannot be read
/// - The configuration cannot be saved
pub fn first_time_setup() -> Result<BookmatchConfig, ConfigError> {
    println!("Welcome to bookmatch! Let's set up where your books are kept.\n");

    let default_path = BookmatchConfig::default_data_dir()?.join("db");
    let db_path_str: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Database location")
        .default(default_path.to_string_lossy().to_string())
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let genre: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Default genre (leave empty to choose each time)")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let config = build_config(&db_path_str, &genre);
    config.save()?;

    println!("\nConfiguration saved successfully!");
    Ok(config)
}

/// Configuration produced from the wizard's answers
fn build_config(db_path: &str, genre: &str) -> BookmatchConfig {
    let mut config = BookmatchConfig {
        database_path: Some(PathBuf::from(db_path.trim())),
        ..BookmatchConfig::default()
    };
    let genre = genre.trim();
    if !genre.is_empty() {
        config.browse.default_genre = Some(genre.to_string());
    }
    config
}
