//! Link rendering
//!
//! Combines the selected URLs with their fetched titles into replacement text
//! for each selection.

use crate::extract::SelectionEntry;
use crate::fetchers::TitleMap;
use crate::rewrite::Replacement;
use crate::template::Template;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::{Position, Url};

const HTML_TEMPLATE: &str = r#"<a href="{url}">{title}</a>"#;
const MARKDOWN_TEMPLATE: &str = "[{title}]({url})";
const RST_TEMPLATE: &str = "`{title} <{url}>`_";

/// Output link format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LinkFormat {
    /// `<a href="url">title</a>`
    Html,
    /// `[title](url)`
    Markdown,
    /// `` `title <url>`_ ``
    Rst,
    /// Path, query and fragment of the URL; no title needed
    Path,
    /// User template
    Custom,
}

impl fmt::Display for LinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkFormat::Html => "html",
            LinkFormat::Markdown => "markdown",
            LinkFormat::Rst => "rst",
            LinkFormat::Path => "path",
            LinkFormat::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Everything the renderer needs to know about one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub format: LinkFormat,
    pub template: Template,
    /// HTML-escape the URL before substituting it
    pub escape_url: bool,
}

impl RenderConfig {
    pub fn html() -> Self {
        Self::builtin(LinkFormat::Html, HTML_TEMPLATE, true)
    }

    pub fn markdown() -> Self {
        Self::builtin(LinkFormat::Markdown, MARKDOWN_TEMPLATE, false)
    }

    pub fn rst() -> Self {
        Self::builtin(LinkFormat::Rst, RST_TEMPLATE, false)
    }

    /// Path mode ignores the template
    pub fn path() -> Self {
        Self {
            format: LinkFormat::Path,
            template: Template::fallback(),
            escape_url: false,
        }
    }

    pub fn custom(template: Template) -> Self {
        Self {
            format: LinkFormat::Custom,
            template,
            escape_url: false,
        }
    }

    /// Default config for a format; custom uses the fallback template
    pub fn for_format(format: LinkFormat) -> Self {
        match format {
            LinkFormat::Html => Self::html(),
            LinkFormat::Markdown => Self::markdown(),
            LinkFormat::Rst => Self::rst(),
            LinkFormat::Path => Self::path(),
            LinkFormat::Custom => Self::custom(Template::fallback()),
        }
    }

    /// Whether rendering depends on fetched titles
    pub fn needs_titles(&self) -> bool {
        self.format != LinkFormat::Path
    }

    fn builtin(format: LinkFormat, template: &str, escape_url: bool) -> Self {
        Self {
            format,
            template: Template::parse(template).unwrap_or_else(|_| Template::fallback()),
            escape_url,
        }
    }
}

/// Build the replacement for each selection
///
/// In title formats a selection whose URL has no successful title gets no
/// replacement, leaving the original text alone. Path format replaces every
/// selection and never looks at `titles`.
pub fn render(
    entries: &[SelectionEntry],
    titles: &TitleMap,
    config: &RenderConfig,
) -> Vec<Replacement> {
    entries
        .iter()
        .filter_map(|entry| {
            let text = if config.format == LinkFormat::Path {
                url_path(&entry.url)?
            } else {
                let title = titles.get(&entry.url)?.as_ref().ok()?;
                if config.escape_url {
                    config.template.render(&escape_html(&entry.url), title)
                } else {
                    config.template.render(&entry.url, title)
                }
            };
            Some(Replacement::new(entry.span, text))
        })
        .collect()
}

/// Everything after the authority: path, query and fragment
pub fn url_path(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    Some(parsed[Position::BeforePath..].to_string())
}

/// Escape text for use inside an HTML attribute value
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
