//! Browse-specific error types
//!
//! # Error Types
//!
//! - **`StaleDecision`**: A decision named a book that is not current; this is a
//!   desynchronization between the presentation layer and the session
//! - **`NothingToUndo`**: Undo requested with no open undo window; expected and
//!   recoverable
//! - **`NoSuchPosition`**: A saved-list edit pointed past the end of the list
//! - **`WorkerPool`**: Background worker threads could not be started

use thiserror::Error;

/// Browse session result type
pub type Result<T> = std::result::Result<T, BrowseError>;

/// Errors that can occur during a browse session
#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    /// Decision targeted a book other than the current one
    #[error("Decision on stale book {got} (current: {})", expected.as_deref().unwrap_or("none"))]
    StaleDecision {
        expected: Option<String>,
        got: String,
    },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Unknown decision: {0}")]
    InvalidDecision(String),

    /// A saved-list edit named a position past the end of the list
    #[error("No book at position {0}")]
    NoSuchPosition(usize),

    #[error("Browse session is closed")]
    SessionClosed,

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
