//! urlconvert - turn selected URLs into titled links
//!
//! This crate provides the core of a "convert URL to link" editor command:
//! given the current selections, it fetches the title of every selected
//! http(s) URL and rewrites each selection as an HTML, Markdown,
//! reStructuredText or custom-template link, or as the bare URL path.
//!
//! ## Pipeline
//!
//! 1. [`extract`] keeps selections that hold an http(s) URL and dedups them.
//! 2. [`TitleFetcher`] fetches all titles concurrently under one deadline.
//! 3. [`render()`] builds replacement text per selection.
//! 4. [`apply`] hands replacements to the document, last span first.
//!
//! [`Converter`] runs the whole pipeline for one [`Command`].

pub mod client;
mod config;
mod converter;
mod error;
mod extract;
pub mod fetchers;
mod render;
mod rewrite;
mod span;
mod template;
mod title;
mod types;

pub use client::{fetch_titles, fetch_titles_with_options, FetchOptions};
pub use config::Settings;
pub use converter::{Command, Conversion, ConvertStatus, Converter, ConverterBuilder};
pub use error::{BatchError, ConfigError, FetchError, RewriteError, TemplateError};
pub use extract::{extract, is_http_url, Extraction, SelectionEntry};
pub use fetchers::{HttpTitleSource, TitleFetcher, TitleMap, TitleSource};
pub use render::{escape_html, render, url_path, LinkFormat, RenderConfig};
pub use rewrite::{application_order, apply, apply_to_string, Replacement};
pub use span::Span;
pub use template::{Template, DEFAULT_FALLBACK_TEMPLATE};
pub use title::extract_title;
pub use types::{ConvertRequest, ConvertResponse, SelectionInput};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = concat!("urlconvert/", env!("CARGO_PKG_VERSION"));

/// Default batch timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// Default number of concurrent title requests
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Message reported when a conversion finishes
pub const STATUS_MESSAGE: &str = "UrlConverter: urls are converted successfully.";
