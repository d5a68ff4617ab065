//! Book catalog sources
//!
//! A catalog supplies candidate books for a genre, one page at a time. Browse
//! sessions call catalogs from worker threads, so every source is `Send + Sync`
//! and may block.
//!
//! # Sources
//!
//! - **`OpenLibraryCatalog`**: Open Library's subject search over HTTP
//! - **`StaticCatalog`**: In-memory or JSON-file catalog for offline use

pub mod error;
pub mod openlibrary;
pub mod static_catalog;

pub use error::FetchError;
pub use openlibrary::OpenLibraryCatalog;
pub use static_catalog::StaticCatalog;

use crate::Book;

/// Opaque cursor into a catalog's result pages (1-based page number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageToken(pub u32);

impl PageToken {
    /// Token for the first page of results
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub const fn number(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// One page of catalog results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub books: Vec<Book>,
    /// Token for the following page, `None` once the catalog has no more results
    pub next_page: Option<PageToken>,
}

impl CatalogPage {
    #[must_use]
    pub const fn new(books: Vec<Book>, next_page: Option<PageToken>) -> Self {
        Self { books, next_page }
    }
}

/// Source of candidate books
pub trait CatalogSource: Send + Sync {
    /// Fetch a page of books for `genre`; `None` requests the first page
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the catalog cannot be reached or answers with
    /// something that is not a page of books.
    fn fetch_books(&self, genre: &str, page: Option<PageToken>) -> Result<CatalogPage, FetchError>;
}

/// Canonical form of a genre as typed by the user
#[must_use]
pub fn normalize_genre(genre: &str) -> String {
    genre.trim().to_lowercase()
}
