//! Local store for bookmatch
//!
//! Persists the books the user has decided on using sled as the embedded
//! database backend.
//!
//! Uses two sled trees:
//! - `books`: Main tree mapping book ids to the stored `Book`
//! - `saved`: Index of the ids whose saved state is `Saved`, kept so the saved
//!   count is a tree length instead of a scan
//! - `collections`: Named groups of saved books (see `collections.rs`)

use sled::{Db, Tree};
use std::path::Path;
use crate::{Book, SavedState};

pub mod collections;
pub mod error;
pub mod traits;
pub mod types;

pub use collections::Collection;
pub use error::DbError;
pub use traits::LocalStore;
pub use types::BookKey;

/// Database wrapper that encapsulates all store operations
pub struct Database {
    db: Db,
    books: Tree,  // id -> Book
    saved: Tree,  // id -> () for saved books
    collections: Tree,  // name -> Collection
}

impl Database {
    /// Opens or creates a database at the specified path
    ///
    /// # Examples
    /// ```no_run
    /// use bookmatch::db::Database;
    /// let db = Database::open("my_db").unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be opened or if the internal trees cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        Self::from_db(sled::open(path)?)
    }

    /// Opens a database that lives only as long as this handle
    ///
    /// # Errors
    ///
    /// Returns `DbError` if sled cannot create the temporary database.
    pub fn open_temporary() -> Result<Self, DbError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self, DbError> {
        let books = db.open_tree("books")?;
        let saved = db.open_tree("saved")?;
        let collections = db.open_tree("collections")?;
        Ok(Self {
            db,
            books,
            saved,
            collections,
        })
    }

    /// Insert or replace a book, keeping the saved index in step
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the id is empty, encoding fails or sled rejects the write.
    pub fn upsert(&self, book: &Book) -> Result<(), DbError> {
        let key = BookKey::new(book.id.as_str())?;
        let value = bincode::encode_to_vec(book, bincode::config::standard())?;
        self.books.insert(key.as_bytes(), value)?;

        if book.saved.is_saved() {
            self.saved.insert(key.as_bytes(), Vec::new())?;
        } else {
            self.saved.remove(key.as_bytes())?;
        }
        Ok(())
    }

    /// Get a stored book by id
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the id is empty, database operations fail or decoding fails.
    pub fn get(&self, id: &str) -> Result<Option<Book>, DbError> {
        let key = BookKey::new(id)?;
        match self.books.get(key.as_bytes())? {
            Some(value) => Ok(Some(decode_book(&value)?)),
            None => Ok(None),
        }
    }

    /// Flip the saved flag of a stored book
    ///
    /// `true` marks the book as saved, `false` as rejected.
    ///
    /// # Errors
    ///
    /// Returns `DbError::BookNotFound` if the store does not hold the book, or
    /// any error from reading or rewriting it.
    pub fn set_saved_flag(&self, id: &str, saved: bool) -> Result<(), DbError> {
        let book = self
            .get(id)?
            .ok_or_else(|| DbError::BookNotFound(id.to_string()))?;
        self.upsert(&book.with_state(SavedState::from_flag(saved)))
    }

    /// Remove a book, returning whether it was stored
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the id is empty or database operations fail.
    pub fn remove(&self, id: &str) -> Result<bool, DbError> {
        let key = BookKey::new(id)?;
        self.saved.remove(key.as_bytes())?;
        Ok(self.books.remove(key.as_bytes())?.is_some())
    }

    /// List all saved books, ordered by title
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration or decoding fails.
    pub fn list_saved(&self) -> Result<Vec<Book>, DbError> {
        let mut books = Vec::with_capacity(self.saved.len());
        for result in &self.saved {
            let (key, _) = result?;
            if let Some(value) = self.books.get(&key)? {
                books.push(decode_book(&value)?);
            }
        }
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    /// List all rejected books, ordered by title
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration or decoding fails.
    pub fn list_rejected(&self) -> Result<Vec<Book>, DbError> {
        let mut books: Vec<Book> = self
            .list_all()?
            .into_iter()
            .filter(|book| book.saved == SavedState::Rejected)
            .collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    /// List every stored book in key order
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration or decoding fails.
    pub fn list_all(&self) -> Result<Vec<Book>, DbError> {
        let mut books = Vec::new();
        for result in &self.books {
            let (_, value) = result?;
            books.push(decode_book(&value)?);
        }
        Ok(books)
    }

    /// Number of saved books
    #[must_use]
    pub fn count_saved(&self) -> usize {
        self.saved.len()
    }

    /// Number of stored books, saved or rejected
    #[must_use]
    pub fn count(&self) -> usize {
        self.books.len()
    }

    /// Check if a book is stored
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the id is empty or database operations fail.
    pub fn contains(&self, id: &str) -> Result<bool, DbError> {
        let key = BookKey::new(id)?;
        Ok(self.books.contains_key(key.as_bytes())?)
    }

    /// Flush all pending writes to disk
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the flush operation fails.
    pub fn flush(&self) -> Result<(), DbError> {
        self.db.flush()?;
        Ok(())
    }

    /// Clear all entries from the database
    ///
    /// # Warning
    /// This operation is irreversible!
    ///
    /// # Errors
    ///
    /// Returns `DbError` if clearing any tree fails.
    pub fn clear(&self) -> Result<(), DbError> {
        self.books.clear()?;
        self.saved.clear()?;
        self.collections.clear()?;
        Ok(())
    }
}

fn decode_book(bytes: &[u8]) -> Result<Book, DbError> {
    let (book, _): (Book, usize) = bincode::decode_from_slice(bytes, bincode::config::standard())?;
    Ok(book)
}

impl Drop for Database {
    fn drop(&mut self) {
        // Best-effort flush; callers needing durability call flush() themselves.
        let _ = self.db.flush();
    }
}
