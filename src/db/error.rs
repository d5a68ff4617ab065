//! Database-specific error types
//!
//! This module defines all error types that can occur during local store operations.
//!
//! # Error Types
//!
//! - **`SledError`**: Errors from the underlying sled embedded database
//! - **`DecodeError`**: Failures when deserializing a stored book
//! - **`EncodeError`**: Failures when serializing a book for storage
//! - **`SerializeError`**: Malformed keys (e.g. non UTF-8 book identifiers)
//! - **`BookNotFound`**: A flag update targeted a book the store does not hold
//! - **`CollectionNotFound`**: A collection operation named an unknown collection
//! - **`Unavailable`**: The store cannot currently accept writes

use thiserror::Error;

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Represents a sled database error
    #[error("Database error: {0}")]
    SledError(#[from] sled::Error),

    /// Represents a bincode decoding error
    #[error("Error while decoding data: {0}")]
    DecodeError(#[from] bincode::error::DecodeError),

    /// Represents a bincode encoding error
    #[error("Error while encoding data: {0}")]
    EncodeError(#[from] bincode::error::EncodeError),

    /// Generic serialization/deserialization error
    #[error("Error during serialization: {0}")]
    SerializeError(String),

    /// Book is not present in the store
    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Store refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Invalid input provided (e.g. an empty book identifier)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
