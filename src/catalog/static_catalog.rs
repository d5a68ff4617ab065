//! Offline catalog backed by a fixed set of books
//!
//! The JSON file format maps genre names to arrays of books:
//!
//! ```json
//! {
//!   "fantasy": [
//!     { "id": "/works/OL27448W", "title": "The Lord of the Rings", "authors": ["J.R.R. Tolkien"] }
//!   ]
//! }
//! ```

use super::{CatalogPage, CatalogSource, FetchError, PageToken, normalize_genre};
use crate::Book;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Catalog serving pages from books held in memory
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    genres: HashMap<String, Vec<Book>>,
    page_size: usize,
}

impl StaticCatalog {
    /// Create an empty catalog; a zero page size is treated as one
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            genres: HashMap::new(),
            page_size: page_size.max(1),
        }
    }

    /// Add (or replace) the books of a genre
    #[must_use]
    pub fn with_genre(mut self, genre: &str, books: Vec<Book>) -> Self {
        self.genres.insert(normalize_genre(genre), books);
        self
    }

    /// Parse a catalog from its JSON representation
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidData` if the JSON is not a genre-to-books map.
    pub fn from_json(json: &str, page_size: usize) -> Result<Self, FetchError> {
        let raw: HashMap<String, Vec<Book>> = serde_json::from_str(json)?;
        Ok(raw
            .into_iter()
            .fold(Self::new(page_size), |catalog, (genre, books)| {
                catalog.with_genre(&genre, books)
            }))
    }

    /// Load a catalog file
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>, page_size: usize) -> Result<Self, FetchError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json, page_size)
    }

    /// Genres this catalog knows, sorted
    #[must_use]
    pub fn genres(&self) -> Vec<&str> {
        let mut genres: Vec<&str> = self.genres.keys().map(String::as_str).collect();
        genres.sort_unstable();
        genres
    }
}

impl CatalogSource for StaticCatalog {
    fn fetch_books(&self, genre: &str, page: Option<PageToken>) -> Result<CatalogPage, FetchError> {
        let Some(books) = self.genres.get(&normalize_genre(genre)) else {
            return Ok(CatalogPage::default());
        };

        let page = page.unwrap_or(PageToken::FIRST);
        let start = (page.number().saturating_sub(1) as usize).saturating_mul(self.page_size);
        if start >= books.len() {
            return Ok(CatalogPage::default());
        }

        let end = (start + self.page_size).min(books.len());
        let next_page = (end < books.len()).then(|| page.next());
        Ok(CatalogPage::new(books[start..end].to_vec(), next_page))
    }
}
