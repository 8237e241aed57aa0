//! Article page content extraction

use crate::crawler::selectors::SelectorSet;
use crate::crawler::text::collapse_whitespace;
use scraper::{ElementRef, Html, Selector};

/// Body and date extracted from an article page
///
/// Either field is empty when its selector matched nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleContent {
    pub content: String,
    pub date: String,
}

/// Everything read from an article page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub content: String,
    pub date: String,

    /// Headline from the article page, when a title selector is configured and matches
    pub title: Option<String>,
}

/// Extracts the body text and publication date from article HTML
///
/// The body is the text of every paragraph (`p`) under the content
/// selector's matches, each whitespace-collapsed, joined by single spaces.
/// A match without paragraphs contributes its whole text instead. The date
/// is the trimmed text of the date selector's first match.
///
/// # Example
///
/// ```
/// use scraper::Selector;
/// use tag_harvest::crawler::extract_content;
///
/// let html = r#"<div class="body"><p>One.</p><p>Two.</p></div><time>1 Mei 2024</time>"#;
/// let extracted = extract_content(
///     html,
///     &Selector::parse(".body").unwrap(),
///     &Selector::parse("time").unwrap(),
/// );
/// assert_eq!(extracted.content, "One. Two.");
/// assert_eq!(extracted.date, "1 Mei 2024");
/// ```
pub fn extract_content(
    html: &str,
    content_selector: &Selector,
    date_selector: &Selector,
) -> ArticleContent {
    let document = Html::parse_document(html);
    ArticleContent {
        content: body_text(&document, content_selector),
        date: first_text(&document, date_selector).unwrap_or_default(),
    }
}

/// Extracts body, date, and (optionally) headline in a single parse
pub fn extract_article(html: &str, selectors: &SelectorSet) -> ExtractedArticle {
    let document = Html::parse_document(html);
    ExtractedArticle {
        content: body_text(&document, &selectors.content),
        date: first_text(&document, &selectors.date).unwrap_or_default(),
        title: selectors
            .title
            .as_ref()
            .and_then(|selector| first_text(&document, selector)),
    }
}

fn body_text(document: &Html, content_selector: &Selector) -> String {
    let Ok(paragraph) = Selector::parse("p") else {
        return String::new();
    };

    let mut parts = Vec::new();
    for container in document.select(content_selector) {
        let mut found_paragraph = false;
        for p in container.select(&paragraph) {
            found_paragraph = true;
            push_text(&mut parts, p);
        }
        if !found_paragraph {
            push_text(&mut parts, container);
        }
    }

    parts.join(" ")
}

fn push_text(parts: &mut Vec<String>, element: ElementRef<'_>) {
    let text = collapse_whitespace(&element.text().collect::<String>());
    if !text.is_empty() {
        parts.push(text);
    }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}
