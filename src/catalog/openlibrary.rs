//! Open Library catalog client
//!
//! Queries the subject search of the Open Library API:
//!
//! ```text
//! GET {base}/search.json?subject=<genre>&page=<n>&limit=<page_size>&fields=key,title,author_name,cover_i
//! ```

use super::{CatalogPage, CatalogSource, FetchError, PageToken};
use crate::Book;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const SEARCH_FIELDS: &str = "key,title,author_name,cover_i";
const COVER_BASE: &str = "https://covers.openlibrary.org/b/id";

/// Blocking HTTP client for Open Library's subject search
pub struct OpenLibraryCatalog {
    http: Client,
    base_url: String,
    page_size: usize,
}

/// Raw search response, only the fields we ask for
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
}

/// One work in a search response
#[derive(Debug, Deserialize)]
pub struct SearchDoc {
    pub key: String,
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Vec<String>,
    pub cover_i: Option<u64>,
}

impl From<SearchDoc> for Book {
    fn from(doc: SearchDoc) -> Self {
        let title = doc.title.unwrap_or_else(|| "Untitled".to_string());
        let book = Self::new(doc.key, title, doc.author_name);
        match doc.cover_i {
            Some(cover) => book.with_cover(format!("{COVER_BASE}/{cover}-M.jpg")),
            None => book,
        }
    }
}

impl OpenLibraryCatalog {
    pub const DEFAULT_BASE_URL: &'static str = "https://openlibrary.org";

    /// Create a client against `base_url`
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidData` for a zero page size and
    /// `FetchError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, page_size: usize, timeout: Duration) -> Result<Self, FetchError> {
        if page_size == 0 {
            return Err(FetchError::InvalidData("page size must be positive".into()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bookmatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_size,
        })
    }

    #[must_use]
    pub fn search_url(&self) -> String {
        format!("{}/search.json", self.base_url)
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }
}

impl CatalogSource for OpenLibraryCatalog {
    fn fetch_books(&self, genre: &str, page: Option<PageToken>) -> Result<CatalogPage, FetchError> {
        let page = page.unwrap_or(PageToken::FIRST);
        let url = self.search_url();
        debug!(genre, page = page.number(), "querying open library");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("subject", genre.to_string()),
                ("page", page.number().to_string()),
                ("limit", self.page_size.to_string()),
                ("fields", SEARCH_FIELDS.to_string()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body: SearchResponse = response.json()?;
        Ok(into_page(body, page, self.page_size))
    }
}

/// Turn a search response into a page, working out whether another page exists
#[must_use]
pub fn into_page(response: SearchResponse, page: PageToken, page_size: usize) -> CatalogPage {
    let seen_so_far = u64::from(page.number()).saturating_mul(page_size as u64);
    let has_more = !response.docs.is_empty() && seen_so_far < response.num_found;

    let books = response
        .docs
        .into_iter()
        .filter(|doc| !doc.key.trim().is_empty())
        .map(Book::from)
        .collect();

    CatalogPage::new(books, has_more.then(|| page.next()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "numFound": 3,
        "start": 0,
        "docs": [
            {"key": "/works/OL1W", "title": "Dune", "author_name": ["Frank Herbert"], "cover_i": 12345},
            {"key": "/works/OL2W", "title": "Hyperion"},
            {"key": "", "title": "Broken"}
        ]
    }"#;

    #[test]
    fn test_parse_search_response() {
        let response: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(response.num_found, 3);
        assert_eq!(response.docs.len(), 3);
    }

    #[test]
    fn test_into_page_maps_docs() {
        let response: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        let page = into_page(response, PageToken::FIRST, 2);

        assert_eq!(page.books.len(), 2);
        let dune = &page.books[0];
        assert_eq!(dune.id, "/works/OL1W");
        assert_eq!(dune.authors, vec!["Frank Herbert".to_string()]);
        assert_eq!(
            dune.cover.as_deref(),
            Some("https://covers.openlibrary.org/b/id/12345-M.jpg")
        );
        assert!(page.books[1].authors.is_empty());
        assert!(page.books[1].cover.is_none());
    }

    #[test]
    fn test_into_page_next_token() {
        let response: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        let page = into_page(response, PageToken::FIRST, 2);
        assert_eq!(page.next_page, Some(PageToken(2)));

        let response: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        let page = into_page(response, PageToken(2), 2);
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn test_empty_docs_end_pagination() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"numFound": 100, "docs": []}"#).unwrap();
        let page = into_page(response, PageToken::FIRST, 20);
        assert!(page.books.is_empty());
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn test_missing_title_falls_back() {
        let doc = SearchDoc {
            key: "/works/OL9W".into(),
            title: None,
            author_name: vec![],
            cover_i: None,
        };
        assert_eq!(Book::from(doc).title, "Untitled");
    }

    #[test]
    fn test_search_url_strips_trailing_slash() {
        let catalog =
            OpenLibraryCatalog::new("https://example.org/", 10, Duration::from_secs(5)).unwrap();
        assert_eq!(catalog.search_url(), "https://example.org/search.json");
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let result = OpenLibraryCatalog::new(OpenLibraryCatalog::DEFAULT_BASE_URL, 0, Duration::from_secs(5));
        assert!(matches!(result, Err(FetchError::InvalidData(_))));
    }
}
