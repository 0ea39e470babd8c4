//! Conversion commands
//!
//! [`Converter`] runs one command over a selection snapshot: extract URLs,
//! fetch their titles, render replacements and hand them to the document in
//! a safe order.

use crate::config::Settings;
use crate::error::{BatchError, RewriteError};
use crate::extract::{extract, Extraction};
use crate::fetchers::{TitleFetcher, TitleMap, TitleSource};
use crate::render::{render, LinkFormat, RenderConfig};
use crate::rewrite::{self, apply_to_string, application_order, Replacement};
use crate::span::Span;
use crate::template::Template;
use crate::types::{ConvertRequest, ConvertResponse};
use crate::STATUS_MESSAGE;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// One of the five conversion commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Html,
    Markdown,
    Rst,
    Path,
    /// Custom template; falls back to the configured template when absent
    Custom { template: Option<String> },
}

impl Command {
    /// Build a command from a format and an optional template
    ///
    /// The template is only used by [`LinkFormat::Custom`].
    pub fn new(format: LinkFormat, template: Option<String>) -> Self {
        match format {
            LinkFormat::Html => Command::Html,
            LinkFormat::Markdown => Command::Markdown,
            LinkFormat::Rst => Command::Rst,
            LinkFormat::Path => Command::Path,
            LinkFormat::Custom => Command::Custom { template },
        }
    }

    pub fn format(&self) -> LinkFormat {
        match self {
            Command::Html => LinkFormat::Html,
            Command::Markdown => LinkFormat::Markdown,
            Command::Rst => LinkFormat::Rst,
            Command::Path => LinkFormat::Path,
            Command::Custom { .. } => LinkFormat::Custom,
        }
    }
}

/// Progress report during a conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConvertStatus {
    /// Current phase: "extract", "fetch", "render", "rewrite" or "complete"
    pub phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Estimated completion percentage (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<f32>,
}

impl ConvertStatus {
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            message: None,
            percent_complete: None,
        }
    }

    /// The notification sent once a run finishes
    pub fn complete() -> Self {
        Self::new("complete")
            .with_message(STATUS_MESSAGE)
            .with_percent(100.0)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_percent(mut self, percent: f32) -> Self {
        self.percent_complete = Some(percent);
        self
    }
}

/// Result of rendering one command, before it touches the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Conversion {
    /// Replacements in application order (last span first)
    pub replacements: Vec<Replacement>,
    /// Selections that held an http(s) URL
    pub selections: usize,
    /// Distinct URLs among them
    pub unique_urls: usize,
    /// URLs whose title was fetched
    pub titles: usize,
}

/// Builder for [`Converter`]
#[derive(Default)]
pub struct ConverterBuilder {
    settings: Settings,
    source: Option<Arc<dyn TitleSource>>,
}

impl ConverterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all settings at once
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn timeout_seconds(mut self, seconds: f64) -> Self {
        self.settings.timeout_seconds = serde_json::Value::from(seconds);
        self
    }

    pub fn max_concurrency(mut self, max: usize) -> Self {
        self.settings.max_concurrency = max;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.settings.user_agent = Some(ua.into());
        self
    }

    pub fn fallback_template(mut self, template: impl Into<String>) -> Self {
        self.settings.fallback_template = Some(template.into());
        self
    }

    /// Fetch titles from `source` instead of over HTTP
    pub fn title_source(mut self, source: Arc<dyn TitleSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn build(self) -> Converter {
        Converter {
            settings: self.settings,
            source: self.source,
        }
    }
}

/// Runs conversion commands
pub struct Converter {
    settings: Settings,
    source: Option<Arc<dyn TitleSource>>,
}

impl Default for Converter {
    fn default() -> Self {
        ConverterBuilder::new().build()
    }
}

impl Converter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    pub fn new(settings: Settings) -> Self {
        ConverterBuilder::new().settings(settings).build()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// JSON Schema of [`ConvertRequest`]
    pub fn input_schema() -> serde_json::Value {
        let schema = schema_for!(ConvertRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// JSON Schema of [`ConvertResponse`]
    pub fn output_schema() -> serde_json::Value {
        let schema = schema_for!(ConvertResponse);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Renderer configuration for `command`
    pub fn render_config(&self, command: &Command) -> RenderConfig {
        match command {
            Command::Custom { template } => RenderConfig::custom(Template::resolve(
                template.as_deref(),
                self.settings.fallback_template.as_deref(),
            )),
            other => RenderConfig::for_format(other.format()),
        }
    }

    /// Compute the replacements for `command` without applying them
    pub async fn convert<S: AsRef<str>>(&self, selections: &[(Span, S)], command: &Command) -> Conversion {
        self.convert_with_status(selections, command, |_| {}).await
    }

    /// Compute the replacements, reporting each phase to `status_callback`
    pub async fn convert_with_status<S, F>(
        &self,
        selections: &[(Span, S)],
        command: &Command,
        mut status_callback: F,
    ) -> Conversion
    where
        S: AsRef<str>,
        F: FnMut(ConvertStatus),
    {
        status_callback(ConvertStatus::new("extract").with_percent(0.0));
        let extraction = extract(selections);
        if extraction.is_empty() {
            return Conversion::default();
        }

        let config = self.render_config(command);

        status_callback(
            ConvertStatus::new("fetch")
                .with_message(format!("{} urls", extraction.unique_urls.len()))
                .with_percent(10.0),
        );
        let titles = if config.needs_titles() {
            match self.try_fetch_titles(&extraction).await {
                Ok(titles) => titles,
                Err(e) => {
                    warn!("Title fetch failed: {}", e);
                    TitleMap::new()
                }
            }
        } else {
            TitleMap::new()
        };

        status_callback(ConvertStatus::new("render").with_percent(80.0));
        let replacements = application_order(render(&extraction.entries, &titles, &config));

        Conversion {
            replacements,
            selections: extraction.entries.len(),
            unique_urls: extraction.unique_urls.len(),
            titles: titles.values().filter(|r| r.is_ok()).count(),
        }
    }

    /// Run `command` and apply the result through `mutate`
    ///
    /// Never fails: a batch that times out or has bad settings simply
    /// rewrites nothing. Returns the completion status.
    pub async fn run<S, F>(&self, selections: &[(Span, S)], command: &Command, mutate: F) -> ConvertStatus
    where
        S: AsRef<str>,
        F: FnMut(Span, &str),
    {
        self.run_with_status(selections, command, mutate, |_| {}).await
    }

    /// [`run`](Self::run), reporting each phase to `status_callback`
    pub async fn run_with_status<S, F, G>(
        &self,
        selections: &[(Span, S)],
        command: &Command,
        mutate: F,
        mut status_callback: G,
    ) -> ConvertStatus
    where
        S: AsRef<str>,
        F: FnMut(Span, &str),
        G: FnMut(ConvertStatus),
    {
        let conversion = self
            .convert_with_status(selections, command, &mut status_callback)
            .await;

        status_callback(ConvertStatus::new("rewrite").with_percent(90.0));
        let applied = rewrite::apply(conversion.replacements, mutate);
        info!(
            format = %command.format(),
            selections = conversion.selections,
            unique_urls = conversion.unique_urls,
            titles = conversion.titles,
            applied,
            "Conversion finished"
        );

        let status = ConvertStatus::complete();
        status_callback(status.clone());
        status
    }

    /// Handle a JSON request
    ///
    /// When the request carries the document text, the rewritten text is
    /// returned too.
    pub async fn execute(&self, request: ConvertRequest) -> Result<ConvertResponse, RewriteError> {
        let selections = request.resolved_selections();
        let command = Command::new(request.format, request.template.clone());
        let conversion = self.convert(&selections, &command).await;

        let text = match request.text {
            Some(mut text) => {
                apply_to_string(&mut text, conversion.replacements.clone())?;
                Some(text)
            }
            None => None,
        };

        Ok(ConvertResponse {
            replacements: conversion.replacements,
            text,
            selections: conversion.selections,
            unique_urls: conversion.unique_urls,
            titles: conversion.titles,
            status: ConvertStatus::complete(),
        })
    }

    async fn try_fetch_titles(&self, extraction: &Extraction) -> Result<TitleMap, BatchError> {
        let options = self.settings.fetch_options()?;
        let fetcher = match &self.source {
            Some(source) => TitleFetcher::with_source(Arc::clone(source), &options),
            None => TitleFetcher::new(options).map_err(BatchError::Client)?,
        };
        fetcher.try_fetch(&extraction.unique_urls).await
    }
}
