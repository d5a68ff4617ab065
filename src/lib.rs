//! BookMatch - browse books by genre and keep the ones you like
//!
//! This library provides the browsing core of BookMatch: a queue of candidate
//! books fetched from a catalog, a decision recorder with a bounded undo window,
//! and an embedded database holding the books the user has decided on.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod browse;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod output;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum BookmatchError {
    /// Database error
    #[error("Database error: {0}")]
    DbError(#[from] db::DbError),
    /// Browse session error
    #[error("Browse error: {0}")]
    BrowseError(#[from] browse::BrowseError),
    /// Catalog error
    #[error("Catalog error: {0}")]
    CatalogError(#[from] catalog::FetchError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Whether the user has made a keep/reject decision on a book
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SavedState {
    /// Never decided on; only lives in browse queues, never in the store
    #[default]
    Unseen,
    /// Liked and kept in the saved list
    Saved,
    /// Explicitly rejected, never offered again
    Rejected,
}

impl SavedState {
    /// Map the boolean saved flag onto a decided state
    #[must_use]
    pub const fn from_flag(saved: bool) -> Self {
        if saved { Self::Saved } else { Self::Rejected }
    }

    #[must_use]
    pub const fn is_saved(self) -> bool {
        matches!(self, Self::Saved)
    }

    #[must_use]
    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::Unseen)
    }
}

/// A book as offered by a catalog and kept by the local store
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Book {
    /// Stable key assigned by the catalog (e.g. `/works/OL45804W`)
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub saved: SavedState,
    /// Cover image reference, usually a URL
    #[serde(default)]
    pub cover: Option<String>,
}

impl Book {
    /// Create a new, undecided book
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, authors: Vec<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors,
            saved: SavedState::Unseen,
            cover: None,
        }
    }

    #[must_use]
    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    /// Copy of this book carrying a different saved state
    #[must_use]
    pub fn with_state(&self, saved: SavedState) -> Self {
        Self {
            saved,
            ..self.clone()
        }
    }

    /// Authors joined for display, or `None` if the catalog listed none
    #[must_use]
    pub fn author_line(&self) -> Option<String> {
        if self.authors.is_empty() {
            None
        } else {
            Some(self.authors.join(", "))
        }
    }
}
