//! Type wrappers for database keys
//!
//! Book identifiers are stored as their raw UTF-8 bytes so that sled's key
//! ordering matches the lexical ordering of catalog keys.
//!
//! # Examples
//!
//! ```
//! use bookmatch::db::types::BookKey;
//!
//! let key = BookKey::new("/works/OL45804W").unwrap();
//! let bytes = key.as_bytes().to_vec();
//! assert_eq!(BookKey::from_bytes(&bytes).unwrap(), key);
//! ```

use super::error::DbError;

/// Wrapper for a non-empty book identifier used as a database key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookKey(String);

impl BookKey {
    /// # Errors
    ///
    /// Returns `DbError::InvalidInput` if the identifier is empty or only whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, DbError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DbError::InvalidInput("Book id must not be empty".into()));
        }
        Ok(Self(id))
    }

    /// # Errors
    ///
    /// Returns `DbError` if the bytes are not valid UTF-8 or decode to an empty id.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DbError> {
        let id = std::str::from_utf8(bytes)
            .map_err(|e| DbError::SerializeError(format!("Invalid UTF-8 in book key: {e}")))?;
        Self::new(id)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<&str> for BookKey {
    type Error = DbError;

    fn try_from(id: &str) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl AsRef<str> for BookKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for BookKey {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
