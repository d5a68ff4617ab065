//! Store abstraction used by browse sessions
//!
//! Browse sessions write through `LocalStore` from worker threads, so
//! implementations must be `Send + Sync`.

use super::{Database, DbError};
use crate::Book;

/// Persistence contract for decided books
pub trait LocalStore: Send + Sync {
    /// Insert or replace a book record
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the write fails.
    fn upsert(&self, book: &Book) -> Result<(), DbError>;

    /// Mark a stored book as saved (`true`) or rejected (`false`)
    ///
    /// # Errors
    ///
    /// Returns `DbError::BookNotFound` if the book is not stored.
    fn set_saved_flag(&self, id: &str, saved: bool) -> Result<(), DbError>;

    /// # Errors
    ///
    /// Returns `DbError` if the read fails.
    fn get(&self, id: &str) -> Result<Option<Book>, DbError>;

    /// Remove a book record, returning whether one existed
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the write fails.
    fn remove(&self, id: &str) -> Result<bool, DbError>;

    /// # Errors
    ///
    /// Returns `DbError` if the read fails.
    fn list_saved(&self) -> Result<Vec<Book>, DbError>;

    /// # Errors
    ///
    /// Returns `DbError` if the read fails.
    fn count_saved(&self) -> Result<usize, DbError>;
}

impl LocalStore for Database {
    fn upsert(&self, book: &Book) -> Result<(), DbError> {
        Self::upsert(self, book)
    }

    fn set_saved_flag(&self, id: &str, saved: bool) -> Result<(), DbError> {
        Self::set_saved_flag(self, id, saved)
    }

    fn get(&self, id: &str) -> Result<Option<Book>, DbError> {
        Self::get(self, id)
    }

    fn remove(&self, id: &str) -> Result<bool, DbError> {
        Self::remove(self, id)
    }

    fn list_saved(&self) -> Result<Vec<Book>, DbError> {
        Self::list_saved(self)
    }

    fn count_saved(&self) -> Result<usize, DbError> {
        Ok(Self::count_saved(self))
    }
}
