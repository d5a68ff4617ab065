//! Testing utilities for bookmatch
//!
//! This module provides helper types and functions for writing tests: a
//! `TestDb` wrapper for temporary databases, book builders, and catalog/store
//! doubles that fail or record their calls.
//!
//! Only available when compiled with `cfg(test)`.

use crate::Book;
use crate::catalog::{CatalogPage, CatalogSource, FetchError, PageToken};
use crate::db::{Database, DbError, LocalStore};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Wrapper for a temporary test database that cleans up on drop
///
/// The database lives in its own temporary directory, removed together with
/// the wrapper so tests don't leave artifacts behind.
pub struct TestDb {
    db: Arc<Database>,
    dir: TempDir,
}

impl TestDb {
    /// Create a new, empty test database
    ///
    /// # Panics
    /// Panics if the temporary directory or the database cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = Database::open(dir.path().join("db")).expect("Failed to open test database");
        Self {
            db: Arc::new(db),
            dir,
        }
    }

    /// Get a reference to the underlying database
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Shared handle for code that takes a `LocalStore`
    #[must_use]
    pub fn store(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }

    /// Get the path to the test database
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}

/// An undecided book whose title is derived from its id
#[must_use]
pub fn book(id: &str) -> Book {
    Book::new(id, format!("Title {id}"), vec![format!("Author {id}")])
}

/// Books for each id, in order
#[must_use]
pub fn books(ids: &[&str]) -> Vec<Book> {
    ids.iter().map(|id| book(id)).collect()
}

/// `count` books with ids `{prefix}0`, `{prefix}1`, ...
#[must_use]
pub fn numbered_books(prefix: &str, count: usize) -> Vec<Book> {
    (0..count).map(|i| book(&format!("{prefix}{i}"))).collect()
}

/// Catalog that is always unreachable
pub struct FailingCatalog;

impl CatalogSource for FailingCatalog {
    fn fetch_books(&self, _genre: &str, _page: Option<PageToken>) -> Result<CatalogPage, FetchError> {
        Err(FetchError::Unavailable("catalog offline".into()))
    }
}

/// Store that reads as empty and refuses every write
pub struct FailingStore;

impl LocalStore for FailingStore {
    fn upsert(&self, _book: &Book) -> Result<(), DbError> {
        Err(DbError::Unavailable("read-only store".into()))
    }

    fn set_saved_flag(&self, _id: &str, _saved: bool) -> Result<(), DbError> {
        Err(DbError::Unavailable("read-only store".into()))
    }

    fn get(&self, _id: &str) -> Result<Option<Book>, DbError> {
        Ok(None)
    }

    fn remove(&self, _id: &str) -> Result<bool, DbError> {
        Err(DbError::Unavailable("read-only store".into()))
    }

    fn list_saved(&self) -> Result<Vec<Book>, DbError> {
        Ok(Vec::new())
    }

    fn count_saved(&self) -> Result<usize, DbError> {
        Ok(0)
    }
}

/// Catalog call log: genre and requested page of every fetch
pub type CallLog = Arc<Mutex<Vec<(String, Option<PageToken>)>>>;

/// Catalog wrapper recording every request before delegating
pub struct RecordingCatalog<C> {
    inner: C,
    calls: CallLog,
}

impl<C: CatalogSource> RecordingCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the call log, usable after the catalog moved into a session
    #[must_use]
    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }
}

impl<C: CatalogSource> CatalogSource for RecordingCatalog<C> {
    fn fetch_books(&self, genre: &str, page: Option<PageToken>) -> Result<CatalogPage, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((genre.to_string(), page));
        }
        self.inner.fetch_books(genre, page)
    }
}

/// Store whose writes take `delay` before reaching the wrapped database
pub struct SlowStore {
    inner: Arc<Database>,
    delay: Duration,
}

impl SlowStore {
    pub fn new(inner: Arc<Database>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl LocalStore for SlowStore {
    fn upsert(&self, book: &Book) -> Result<(), DbError> {
        thread::sleep(self.delay);
        self.inner.upsert(book)
    }

    fn set_saved_flag(&self, id: &str, saved: bool) -> Result<(), DbError> {
        thread::sleep(self.delay);
        self.inner.set_saved_flag(id, saved)
    }

    fn get(&self, id: &str) -> Result<Option<Book>, DbError> {
        self.inner.get(id)
    }

    fn remove(&self, id: &str) -> Result<bool, DbError> {
        thread::sleep(self.delay);
        self.inner.remove(id)
    }

    fn list_saved(&self) -> Result<Vec<Book>, DbError> {
        self.inner.list_saved()
    }

    fn count_saved(&self) -> Result<usize, DbError> {
        Ok(self.inner.count_saved())
    }
}
