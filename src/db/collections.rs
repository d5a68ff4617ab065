//! Collections: named groups of saved books
//!
//! Stored in the `collections` tree as `name -> Collection`. A collection
//! only records book ids; listing its books resolves them against the
//! `books` tree, so a book whose decision was forgotten drops out of every
//! collection until it is saved again.

use super::{Database, DbError};
use crate::Book;
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A named, ordered group of saved books
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
    /// Member ids in the order they were added
    pub book_ids: Vec<String>,
}

impl Collection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            book_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.book_ids.iter().any(|member| member == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.book_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.book_ids.is_empty()
    }
}

fn collection_key(name: &str) -> Result<&str, DbError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DbError::InvalidInput("Collection name cannot be empty".into()));
    }
    Ok(name)
}

fn decode_collection(bytes: &[u8]) -> Result<Collection, DbError> {
    let (collection, _): (Collection, usize) =
        bincode::decode_from_slice(bytes, bincode::config::standard())?;
    Ok(collection)
}

impl Database {
    /// Create an empty collection
    ///
    /// Returns `false` if a collection with that name already exists; it is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the name is blank or the write fails.
    pub fn create_collection(&self, name: &str) -> Result<bool, DbError> {
        let name = collection_key(name)?;
        if self.collections.contains_key(name.as_bytes())? {
            return Ok(false);
        }
        self.put_collection(&Collection::new(name))?;
        Ok(true)
    }

    /// Insert or replace a collection as a whole
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the name is blank, encoding fails or the write fails.
    pub fn put_collection(&self, collection: &Collection) -> Result<(), DbError> {
        let name = collection_key(&collection.name)?;
        let value = bincode::encode_to_vec(collection, bincode::config::standard())?;
        self.collections.insert(name.as_bytes(), value)?;
        Ok(())
    }

    /// Get a collection by name
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the name is blank or decoding fails.
    pub fn get_collection(&self, name: &str) -> Result<Option<Collection>, DbError> {
        let name = collection_key(name)?;
        match self.collections.get(name.as_bytes())? {
            Some(value) => Ok(Some(decode_collection(&value)?)),
            None => Ok(None),
        }
    }

    /// Add a saved book to a collection
    ///
    /// Returns `false` if the book was already a member.
    ///
    /// # Errors
    ///
    /// Returns `DbError::CollectionNotFound` for an unknown collection and
    /// `DbError::BookNotFound` if the book is not saved.
    pub fn add_to_collection(&self, name: &str, book_id: &str) -> Result<bool, DbError> {
        let mut collection = self
            .get_collection(name)?
            .ok_or_else(|| DbError::CollectionNotFound(name.trim().to_string()))?;

        let saved = self.get(book_id)?.is_some_and(|book| book.saved.is_saved());
        if !saved {
            return Err(DbError::BookNotFound(book_id.to_string()));
        }
        if collection.contains(book_id) {
            return Ok(false);
        }

        collection.book_ids.push(book_id.to_string());
        self.put_collection(&collection)?;
        Ok(true)
    }

    /// Take a book out of a collection, returning whether it was a member
    ///
    /// # Errors
    ///
    /// Returns `DbError::CollectionNotFound` for an unknown collection.
    pub fn remove_from_collection(&self, name: &str, book_id: &str) -> Result<bool, DbError> {
        let mut collection = self
            .get_collection(name)?
            .ok_or_else(|| DbError::CollectionNotFound(name.trim().to_string()))?;

        let before = collection.len();
        collection.book_ids.retain(|member| member != book_id);
        if collection.len() == before {
            return Ok(false);
        }
        self.put_collection(&collection)?;
        Ok(true)
    }

    /// All collections, ordered by name
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration or decoding fails.
    pub fn list_collections(&self) -> Result<Vec<Collection>, DbError> {
        let mut collections = Vec::with_capacity(self.collections.len());
        for result in &self.collections {
            let (_, value) = result?;
            collections.push(decode_collection(&value)?);
        }
        Ok(collections)
    }

    /// Number of collections
    #[must_use]
    pub fn count_collections(&self) -> usize {
        self.collections.len()
    }

    /// The stored books of a collection, in insertion order
    ///
    /// # Errors
    ///
    /// Returns `DbError::CollectionNotFound` for an unknown collection, or any
    /// error from reading the books.
    pub fn collection_books(&self, name: &str) -> Result<Vec<Book>, DbError> {
        let collection = self
            .get_collection(name)?
            .ok_or_else(|| DbError::CollectionNotFound(name.trim().to_string()))?;

        let mut books = Vec::with_capacity(collection.len());
        for id in &collection.book_ids {
            if let Some(book) = self.get(id)? {
                books.push(book);
            }
        }
        Ok(books)
    }
}
