//! HTTP title source
//!
//! GETs the page with reqwest and parses the title out of whatever body comes
//! back. The status code is not checked: an error page with a title still
//! yields that title.

use crate::client::FetchOptions;
use crate::error::FetchError;
use crate::fetchers::TitleSource;
use crate::title::extract_title;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use tracing::debug;

/// Content type prefixes that never carry an HTML title
const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/x-tar",
    "application/x-rar",
    "application/x-7z",
    "application/vnd.ms-",
    "application/vnd.openxmlformats",
    "font/",
];

const ACCEPT_HTML: &str = "text/html, application/xhtml+xml, */*;q=0.8";

/// Fetches titles over HTTP/HTTPS
///
/// Holds one client, so connections are pooled across a batch.
pub struct HttpTitleSource {
    client: reqwest::Client,
}

impl HttpTitleSource {
    /// Build the HTTP client from `options`
    pub fn new(options: &FetchOptions) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        // Requests are bounded by the batch deadline in TitleFetcher
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(FetchError::ClientBuildError)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl TitleSource for HttpTitleSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_title(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        debug!(url = %url, status = status.as_u16(), content_type = ?content_type, "Received response");

        if let Some(ref ct) = content_type {
            if is_binary_content_type(ct) {
                return Err(FetchError::MissingTitle);
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::BodyError(e.to_string()))?;

        extract_title(&body).ok_or(FetchError::MissingTitle)
    }
}

/// Check if content type indicates binary content
fn is_binary_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.to_lowercase();
    BINARY_PREFIXES
        .iter()
        .any(|prefix| ct_lower.starts_with(prefix))
}
