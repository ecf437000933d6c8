//! Error types shared across the crawler.
//!
//! A missing field is not an error; it is [`ExtractedValue::Absent`](crate::ExtractedValue).
//! Everything here signals that something went wrong for one page, one field, or the run.

use thiserror::Error;

use crate::extractors::ValueKind;

/// A page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("no document for {url}")]
    NotFound { url: String },
}

impl FetchError {
    /// URL of the page that failed.
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::NotFound { url } => url,
        }
    }
}

/// Text was found and transformed but is not a valid value of the expected kind.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("field {field}: cannot parse {text:?} as {kind}: {reason}")]
pub struct ParseError {
    pub field: String,
    pub text: String,
    pub kind: ValueKind,
    pub reason: String,
}

/// A sibling page URL could not be derived from a leaf URL.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("no path segment {segment:?} in {url}")]
pub struct DeriveError {
    pub url: String,
    pub segment: String,
}

/// Failure of one traversal branch or one leaf.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Derive(#[from] DeriveError),
}

/// Invalid catalog configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid CSS selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("catalog must declare at least one {0}")]
    Empty(&'static str),

    #[error("page {page:?}: {reason}")]
    Page { page: String, reason: String },

    #[error("duplicate field name {0:?}")]
    DuplicateField(String),

    #[error("field name {0:?} is reserved")]
    ReservedField(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// The output sink could not accept a record.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write record: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("sink lock poisoned")]
    Poisoned,
}
