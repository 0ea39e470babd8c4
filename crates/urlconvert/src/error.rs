//! Error types for urlconvert

use thiserror::Error;

/// Errors that can occur while fetching the title of a single URL
///
/// These never abort a batch: each one is stored as the result for the URL
/// that produced it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Response body could not be read as text
    #[error("Failed to read response body: {0}")]
    BodyError(String),

    /// Document has no title element, or the title is blank
    #[error("Document has no title")]
    MissingTitle,
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::ConnectError(err)
        } else {
            FetchError::RequestError(err.to_string())
        }
    }
}

/// Errors that fail a whole fetch batch
///
/// A failed batch produces no titles at all, so the command that started it
/// rewrites nothing.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Not every fetch finished before the batch deadline
    #[error("Title fetch timed out after {seconds} seconds")]
    Timeout { seconds: f64 },

    /// Settings could not be turned into fetch options
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP title source could not be set up
    #[error("Failed to create title fetcher")]
    Client(#[source] FetchError),
}

/// Invalid or unreadable settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `timeout_seconds` is not a non-negative finite number
    #[error("Invalid timeout_seconds: expected a non-negative number, got {0}")]
    InvalidTimeout(String),

    /// `max_concurrency` is zero
    #[error("Invalid max_concurrency: must be at least 1")]
    InvalidConcurrency,

    /// Settings file could not be read
    #[error("Failed to read settings file")]
    Read(#[source] std::io::Error),

    /// Settings file is not valid JSON for [`Settings`](crate::Settings)
    #[error("Failed to parse settings file")]
    Parse(#[source] serde_json::Error),
}

/// Invalid output template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template is empty")]
    Empty,

    /// Placeholder other than `{url}` or `{title}`
    #[error("Unknown template slot: {{{0}}}")]
    UnknownSlot(String),

    #[error("Unbalanced brace at byte {0}")]
    UnbalancedBrace(usize),
}

/// Replacements that cannot be applied to an in-memory document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("Span {start}..{end} is outside the document (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("Span {start}..{end} does not fall on character boundaries")]
    NotCharBoundary { start: usize, end: usize },

    #[error("Spans {first} and {second} overlap")]
    Overlap { first: String, second: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(FetchError::Timeout.to_string(), "Request timed out");
        assert_eq!(FetchError::MissingTitle.to_string(), "Document has no title");
        assert_eq!(
            BatchError::Timeout { seconds: 2.5 }.to_string(),
            "Title fetch timed out after 2.5 seconds"
        );
        assert_eq!(
            ConfigError::InvalidTimeout("\"ten\"".to_string()).to_string(),
            "Invalid timeout_seconds: expected a non-negative number, got \"ten\""
        );
        assert_eq!(
            TemplateError::UnknownSlot("name".to_string()).to_string(),
            "Unknown template slot: {name}"
        );
    }

    #[test]
    fn test_config_error_is_transparent_in_batch_error() {
        let err = BatchError::from(ConfigError::InvalidConcurrency);
        assert_eq!(err.to_string(), "Invalid max_concurrency: must be at least 1");
    }
}
