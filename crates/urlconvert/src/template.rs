//! Output templates with `{url}` and `{title}` slots
//!
//! `{{` and `}}` stand for literal braces.

use crate::error::TemplateError;
use std::fmt;
use std::str::FromStr;

/// Template used when neither an explicit nor a configured one is usable
pub const DEFAULT_FALLBACK_TEMPLATE: &str = "{title}\n{url}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Url,
    Title,
}

/// A parsed output template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        if source.is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' => {
                    if matches!(chars.peek(), Some((_, '{'))) {
                        chars.next();
                        literal.push('{');
                        continue;
                    }

                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::UnbalancedBrace(pos));
                    }

                    let slot = match name.as_str() {
                        "url" => Segment::Url,
                        "title" => Segment::Title,
                        _ => return Err(TemplateError::UnknownSlot(name)),
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(slot);
                }
                '}' => {
                    if matches!(chars.peek(), Some((_, '}'))) {
                        chars.next();
                        literal.push('}');
                    } else {
                        return Err(TemplateError::UnbalancedBrace(pos));
                    }
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Pick the first usable template
    ///
    /// Tries `explicit`, then `configured`, then [`DEFAULT_FALLBACK_TEMPLATE`].
    pub fn resolve(explicit: Option<&str>, configured: Option<&str>) -> Self {
        for candidate in [explicit, configured].into_iter().flatten() {
            match Self::parse(candidate) {
                Ok(template) => return template,
                Err(e) => tracing::debug!(template = %candidate, error = %e, "Ignoring template"),
            }
        }
        Self::fallback()
    }

    /// The built-in `{title}\n{url}` template
    pub fn fallback() -> Self {
        Self {
            source: DEFAULT_FALLBACK_TEMPLATE.to_string(),
            segments: vec![
                Segment::Title,
                Segment::Literal("\n".to_string()),
                Segment::Url,
            ],
        }
    }

    /// Substitute the slots
    pub fn render(&self, url: &str, title: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + url.len() + title.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Url => out.push_str(url),
                Segment::Title => out.push_str(title),
            }
        }
        out
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::parse(s)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_slots() {
        let template = Template::parse("[{title}]({url})").unwrap();
        assert_eq!(template.render("https://x.com", "Hi"), "[Hi](https://x.com)");
    }

    #[test]
    fn test_slots_can_repeat() {
        let template = Template::parse("{url} {url} {title}").unwrap();
        assert_eq!(template.render("u", "t"), "u u t");
    }

    #[test]
    fn test_escaped_braces() {
        let template = Template::parse("{{{title}}}").unwrap();
        assert_eq!(template.render("u", "t"), "{t}");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Template::parse(""), Err(TemplateError::Empty));
        assert_eq!(
            Template::parse("{name}"),
            Err(TemplateError::UnknownSlot("name".to_string()))
        );
        assert_eq!(
            Template::parse("{}"),
            Err(TemplateError::UnknownSlot(String::new()))
        );
        assert_eq!(
            Template::parse("{title"),
            Err(TemplateError::UnbalancedBrace(0))
        );
        assert_eq!(
            Template::parse("a}b"),
            Err(TemplateError::UnbalancedBrace(1))
        );
    }

    #[test]
    fn test_literal_only_template() {
        let template = Template::parse("no slots").unwrap();
        assert_eq!(template.render("u", "t"), "no slots");
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let template = Template::resolve(Some("<{url}>"), Some("{title}"));
        assert_eq!(template.as_str(), "<{url}>");
    }

    #[test]
    fn test_resolve_falls_back_to_configured() {
        assert_eq!(Template::resolve(None, Some("{title}")).as_str(), "{title}");
        assert_eq!(Template::resolve(Some(""), Some("{title}")).as_str(), "{title}");
        assert_eq!(
            Template::resolve(Some("{bogus}"), Some("{title}")).as_str(),
            "{title}"
        );
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let template = Template::resolve(None, None);
        assert_eq!(template, Template::parse(DEFAULT_FALLBACK_TEMPLATE).unwrap());
        assert_eq!(template.render("https://x.com", "X"), "X\nhttps://x.com");

        let template = Template::resolve(Some("{"), Some(""));
        assert_eq!(template.as_str(), DEFAULT_FALLBACK_TEMPLATE);
    }
}
