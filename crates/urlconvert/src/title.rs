//! HTML title extraction

use scraper::{Html, Selector};

/// Extract the trimmed text of the document's first `<title>` element
///
/// Returns `None` when there is no title element or its text is blank.
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;

    let title = document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())?;

    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}
