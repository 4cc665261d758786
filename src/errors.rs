//! Error types for image grabbing
//!
//! Every failure here is recoverable: the augmenter coerces all of them into
//! "return the content unchanged". The variants exist so each component's
//! signature says how it can fail.

use thiserror::Error;

/// Result type alias for image grabbing operations
pub type GrabResult<T> = Result<T, GrabError>;

/// Error types for image grabbing operations
#[derive(Debug, Error)]
pub enum GrabError {
    /// Input or fetched content could not produce a usable document tree
    #[error("Failed to parse document: {0}")]
    ParseFailure(String),

    /// A query or query sequence yielded no usable element
    #[error("No matching element found")]
    NotFound,

    /// The remote page could not be retrieved
    #[error("Failed to fetch page: {0}")]
    FetchFailure(#[from] FetchError),

    /// A structural query could not be compiled
    #[error("Invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    /// A URL could not be parsed or made absolute
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl GrabError {
    pub(crate) fn invalid_query(query: &str, reason: impl Into<String>) -> Self {
        GrabError::InvalidQuery {
            query: query.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error means "nothing to augment with" rather than a
    /// malfunction (bad query, bad URL, network trouble)
    #[must_use]
    pub fn is_no_match(&self) -> bool {
        matches!(self, GrabError::NotFound | GrabError::ParseFailure(_))
    }
}

/// Error types for fetching the destination page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-success status
    #[error("Server responded with status {0}")]
    Status(u16),

    /// The body exceeded the configured size limit
    #[error("Response body exceeds limit of {limit} bytes")]
    TooLarge { limit: usize },

    /// Connection, TLS, DNS or body read failure
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = error.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}
