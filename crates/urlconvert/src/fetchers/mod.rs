//! Concurrent title fetching
//!
//! Design: a [`TitleSource`] knows how to turn one URL into a title.
//! [`TitleFetcher`] fans a batch of URLs out over a source with a bounded
//! number of requests in flight and one deadline for the whole batch.

mod http;

pub use http::HttpTitleSource;

use crate::client::FetchOptions;
use crate::error::{BatchError, FetchError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Per-URL outcome of a batch, keyed by the URL as requested
pub type TitleMap = HashMap<String, Result<String, FetchError>>;

/// Something that can produce the title of a page
///
/// Implement this trait to fetch titles from somewhere other than plain
/// HTTP, or to stub the network out in tests.
#[async_trait]
pub trait TitleSource: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Fetch the page at `url` and return its trimmed, non-empty title
    async fn fetch_title(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches the titles of many URLs at once
pub struct TitleFetcher {
    source: Arc<dyn TitleSource>,
    timeout: Duration,
    max_concurrency: usize,
}

impl TitleFetcher {
    /// Create a fetcher backed by [`HttpTitleSource`]
    pub fn new(options: FetchOptions) -> Result<Self, FetchError> {
        let source = HttpTitleSource::new(&options)?;
        Ok(Self::with_source(Arc::new(source), &options))
    }

    /// Create a fetcher backed by a custom source
    pub fn with_source(source: Arc<dyn TitleSource>, options: &FetchOptions) -> Self {
        Self {
            source,
            timeout: options.timeout,
            max_concurrency: options.max_concurrency.max(1),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Fetch every URL, returning an empty map if the batch times out
    pub async fn fetch(&self, urls: &HashSet<String>) -> TitleMap {
        match self.try_fetch(urls).await {
            Ok(titles) => titles,
            Err(e) => {
                warn!("{}", e);
                TitleMap::new()
            }
        }
    }

    /// Fetch every URL concurrently
    ///
    /// Each URL gets exactly one entry: its title or the error that stopped
    /// it. Fails with [`BatchError::Timeout`] if the whole batch does not
    /// finish within the timeout; partial results are discarded and the
    /// outstanding requests are aborted.
    pub async fn try_fetch(&self, urls: &HashSet<String>) -> Result<TitleMap, BatchError> {
        if urls.is_empty() {
            return Ok(TitleMap::new());
        }

        // A timeout too large for the clock means no deadline
        let deadline = Instant::now().checked_add(self.timeout);
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for url in urls {
            let url = url.clone();
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                let result = source.fetch_title(&url).await;
                (url, result)
            });
        }

        debug!(
            source = self.source.name(),
            urls = urls.len(),
            max_concurrency = self.max_concurrency,
            "Fetching titles"
        );

        let collect = async {
            let mut titles = TitleMap::with_capacity(urls.len());
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((url, result)) => {
                        match &result {
                            Ok(title) => debug!(url = %url, title = %title, "Fetched title"),
                            Err(e) => debug!(url = %url, error = %e, "Title fetch failed"),
                        }
                        titles.insert(url, result);
                    }
                    Err(e) => warn!("Title fetch task did not complete: {}", e),
                }
            }
            titles
        };

        let Some(deadline) = deadline else {
            return Ok(collect.await);
        };
        match tokio::time::timeout_at(deadline, collect).await {
            // A batch that finished on or after the deadline still timed out
            Ok(titles) if Instant::now() < deadline => Ok(titles),
            _ => Err(BatchError::Timeout {
                seconds: self.timeout.as_secs_f64(),
            }),
        }
    }
}
