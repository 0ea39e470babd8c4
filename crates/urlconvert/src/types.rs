//! Request and response types for driving a conversion as JSON

use crate::converter::ConvertStatus;
use crate::render::LinkFormat;
use crate::rewrite::Replacement;
use crate::span::Span;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A selected range of the document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SelectionInput {
    /// Byte offset where the selection starts
    pub start: usize,
    /// Byte offset where the selection ends (exclusive)
    pub end: usize,
    /// Selected text; taken from the request `text` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Request to convert the URLs in a set of selections
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConvertRequest {
    /// Output link format
    pub format: LinkFormat,

    /// Template for the custom format (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Full document text (optional); when present the rewritten document
    /// is returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Selections to convert
    #[serde(default)]
    pub selections: Vec<SelectionInput>,
}

impl ConvertRequest {
    /// Create a request with the given format
    pub fn new(format: LinkFormat) -> Self {
        Self {
            format,
            template: None,
            text: None,
            selections: Vec::new(),
        }
    }

    /// Set the custom template
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Set the document text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add a selection whose text is looked up in the document
    pub fn select(mut self, start: usize, end: usize) -> Self {
        self.selections.push(SelectionInput {
            start,
            end,
            text: None,
        });
        self
    }

    /// Add a selection with explicit text
    pub fn select_text(mut self, start: usize, end: usize, text: impl Into<String>) -> Self {
        self.selections.push(SelectionInput {
            start,
            end,
            text: Some(text.into()),
        });
        self
    }

    /// Pair every selection with its text
    ///
    /// Selections without text of their own read it from the document. A
    /// selection that cannot be read that way gets empty text and is later
    /// skipped like any other non-URL selection.
    pub fn resolved_selections(&self) -> Vec<(Span, String)> {
        self.selections
            .iter()
            .map(|selection| {
                let span = Span::new(selection.start, selection.end);
                let text = match (&selection.text, &self.text) {
                    (Some(text), _) => text.clone(),
                    (None, Some(document)) => document
                        .get(span.start..span.end)
                        .unwrap_or_default()
                        .to_string(),
                    (None, None) => String::new(),
                };
                (span, text)
            })
            .collect()
    }
}

/// Response to a [`ConvertRequest`]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConvertResponse {
    /// Replacements in application order (last span first)
    pub replacements: Vec<Replacement>,

    /// Rewritten document, when the request carried text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Selections that held an http(s) URL
    pub selections: usize,

    /// Distinct URLs among them
    pub unique_urls: usize,

    /// URLs whose title was fetched
    pub titles: usize,

    /// Completion status
    pub status: ConvertStatus,
}
