//! Catalog error types

use thiserror::Error;

/// Errors raised while fetching books from a catalog
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, timeout, body decoding)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status
    #[error("Catalog returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// The catalog payload could not be turned into books
    #[error("Invalid catalog data: {0}")]
    InvalidData(String),

    /// Reading a catalog file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog is temporarily not serving requests
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let error = FetchError::Status {
            status: 503,
            url: "https://openlibrary.org/search.json".into(),
        };
        assert_eq!(
            error.to_string(),
            "Catalog returned status 503 for https://openlibrary.org/search.json"
        );
    }

    #[test]
    fn test_json_error_becomes_invalid_data() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: FetchError = json_err.into();
        assert!(matches!(error, FetchError::InvalidData(_)));
    }
}
