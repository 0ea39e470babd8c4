//! Title fetching entry points
//!
//! This module provides the options and convenience functions for fetching
//! page titles. The concurrent batch logic lives in
//! [`TitleFetcher`](crate::fetchers::TitleFetcher).

use crate::fetchers::{TitleFetcher, TitleMap};
use crate::{DEFAULT_MAX_CONCURRENCY, DEFAULT_TIMEOUT_SECS};
use std::collections::HashSet;
use std::time::Duration;

/// Options for a title fetch batch
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Deadline for the whole batch, also used as the per-request timeout
    pub timeout: Duration,
    /// Maximum number of requests in flight
    pub max_concurrency: usize,
    /// Custom User-Agent
    pub user_agent: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            user_agent: None,
        }
    }
}

impl FetchOptions {
    /// Set the batch timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the concurrency limit (values below 1 are raised to 1)
    pub fn max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Set a custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }
}

/// Fetch the titles of `urls` with default options
///
/// For custom options, use [`fetch_titles_with_options`].
pub async fn fetch_titles(urls: &HashSet<String>) -> TitleMap {
    fetch_titles_with_options(urls, FetchOptions::default()).await
}

/// Fetch the titles of `urls` over HTTP
///
/// Returns an empty map when the HTTP client cannot be built or the batch
/// times out.
pub async fn fetch_titles_with_options(urls: &HashSet<String>, options: FetchOptions) -> TitleMap {
    match TitleFetcher::new(options) {
        Ok(fetcher) => fetcher.fetch(urls).await,
        Err(e) => {
            tracing::warn!("Cannot fetch titles: {}", e);
            TitleMap::new()
        }
    }
}
