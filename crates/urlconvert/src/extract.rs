//! Selection filtering
//!
//! Turns raw selection text into the list of (span, url) pairs to convert and
//! the set of distinct URLs to fetch.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// A selection whose text is an absolute http(s) URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub span: Span,
    /// Trimmed selection text, exactly as the user wrote it
    pub url: String,
}

/// Output of [`extract`]
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Accepted selections in input order, duplicates included
    pub entries: Vec<SelectionEntry>,
    /// Distinct URLs across `entries`
    pub unique_urls: HashSet<String>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keep the selections that hold an http(s) URL
///
/// Text is trimmed before validation. Anything that is not an absolute URL
/// with an `http` or `https` scheme is skipped without error.
pub fn extract<S: AsRef<str>>(selections: &[(Span, S)]) -> Extraction {
    let mut extraction = Extraction::default();

    for (span, raw) in selections {
        let text = raw.as_ref().trim();
        if !is_http_url(text) {
            tracing::debug!(%span, "Skipping selection: not an http(s) URL");
            continue;
        }

        extraction.unique_urls.insert(text.to_string());
        extraction.entries.push(SelectionEntry {
            span: *span,
            url: text.to_string(),
        });
    }

    extraction
}

/// True if `text` parses as an absolute URL with an http or https scheme
pub fn is_http_url(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    // Url lowercases the scheme while parsing
    match Url::parse(text) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
