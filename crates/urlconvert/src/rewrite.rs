//! Applying replacements to a document
//!
//! Replacements are applied from the last span to the first, so a
//! length-changing edit never shifts a span that is still waiting to be
//! applied.

use crate::error::RewriteError;
use crate::span::Span;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// New text for one span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Replacement {
    pub span: Span,
    pub text: String,
}

impl Replacement {
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }
}

/// Sort replacements into application order: descending by span, empty text
/// removed
pub fn application_order(mut replacements: Vec<Replacement>) -> Vec<Replacement> {
    replacements.retain(|r| !r.text.is_empty());
    replacements.sort_by(|a, b| b.span.cmp(&a.span));
    replacements
}

/// Apply replacements through `mutate`, highest span first
///
/// Returns the number of calls made to `mutate`. Replacements with empty text
/// are skipped.
pub fn apply<F>(replacements: Vec<Replacement>, mut mutate: F) -> usize
where
    F: FnMut(Span, &str),
{
    let ordered = application_order(replacements);
    for replacement in &ordered {
        mutate(replacement.span, &replacement.text);
    }
    ordered.len()
}

/// Apply replacements to an in-memory document
///
/// Spans are byte offsets into `text`. Every span is checked before anything
/// is changed; on error `text` is left untouched.
pub fn apply_to_string(text: &mut String, replacements: Vec<Replacement>) -> Result<usize, RewriteError> {
    let ordered = application_order(replacements);
    validate(text, &ordered)?;

    Ok(apply(ordered, |span, replacement| {
        text.replace_range(span.start..span.end, replacement);
    }))
}

/// Check spans against the document; `ordered` must be in application order
fn validate(text: &str, ordered: &[Replacement]) -> Result<(), RewriteError> {
    for replacement in ordered {
        let Span { start, end } = replacement.span;
        if end > text.len() {
            return Err(RewriteError::OutOfBounds {
                start,
                end,
                len: text.len(),
            });
        }
        if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            return Err(RewriteError::NotCharBoundary { start, end });
        }
    }

    // Descending order: each span must end where the next one to apply starts
    // or before it. This also rejects an insertion point inside another span.
    for pair in ordered.windows(2) {
        let (later, earlier) = (&pair[0].span, &pair[1].span);
        if earlier.end > later.start || later == earlier {
            return Err(RewriteError::Overlap {
                first: earlier.to_string(),
                second: later.to_string(),
            });
        }
    }

    Ok(())
}
