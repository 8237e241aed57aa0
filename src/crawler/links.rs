//! Listing page link extraction
//!
//! Turns the HTML of one listing page into the ordered list of candidate
//! article URLs it advertises. Candidates are not deduplicated here; that is
//! the registry's job, since a URL may reappear on a later page.

use crate::crawler::text::{collapse_whitespace, is_meaningful};
use crate::url::normalize_url;
use scraper::{ElementRef, Html, Selector};

/// An article URL found on a listing page, with its inline headline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// Normalized absolute URL
    pub url: String,

    /// Visible anchor text from the listing
    pub inline_title: String,
}

/// The links found on one listing page
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub page_number: u32,

    /// Number of elements the list selector matched, before filtering
    pub matched: usize,

    /// Surviving candidates in document order
    pub candidates: Vec<CandidateLink>,
}

impl ListingPage {
    /// Extracts candidate links from listing page `page_number`
    pub fn extract(page_number: u32, html: &str, list_selector: &Selector) -> Self {
        let document = Html::parse_document(html);
        let (matched, candidates) = scan(&document, list_selector);
        Self {
            page_number,
            matched,
            candidates,
        }
    }
}

/// Extracts candidate article links from listing HTML
///
/// For every element matched by `list_selector` the anchor is either the
/// element itself or its first descendant `<a href>`. A match is dropped
/// when:
/// - it has no anchor
/// - the href is relative, malformed, or not http(s)
/// - its visible text (or `title` attribute) is not meaningful
///
/// Document order is preserved and duplicates are kept.
///
/// # Example
///
/// ```
/// use scraper::Selector;
/// use tag_harvest::crawler::extract_links;
///
/// let html = r#"<div class="list"><a href="https://example.com/read/1">Harga beras naik lagi</a></div>"#;
/// let selector = Selector::parse("div.list a").unwrap();
/// let links = extract_links(html, &selector);
/// assert_eq!(links[0].url, "https://example.com/read/1");
/// assert_eq!(links[0].inline_title, "Harga beras naik lagi");
/// ```
pub fn extract_links(html: &str, list_selector: &Selector) -> Vec<CandidateLink> {
    let document = Html::parse_document(html);
    scan(&document, list_selector).1
}

fn scan(document: &Html, list_selector: &Selector) -> (usize, Vec<CandidateLink>) {
    let mut matched = 0;
    let mut candidates = Vec::new();

    for element in document.select(list_selector) {
        matched += 1;

        let Some(anchor) = find_anchor(element) else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        let url = match normalize_url(href) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Skipping listing href {}: {}", href, e);
                continue;
            }
        };

        let Some(inline_title) = inline_title(anchor) else {
            tracing::trace!("Skipping {} without a meaningful headline", url);
            continue;
        };

        candidates.push(CandidateLink {
            url: url.to_string(),
            inline_title,
        });
    }

    (matched, candidates)
}

/// Returns the element itself if it is an anchor, else its first anchor descendant
fn find_anchor(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "a" && e.value().attr("href").is_some())
}

fn inline_title(anchor: ElementRef<'_>) -> Option<String> {
    let text = collapse_whitespace(&anchor.text().collect::<String>());
    if is_meaningful(&text) {
        return Some(text);
    }

    anchor
        .value()
        .attr("title")
        .map(collapse_whitespace)
        .filter(|t| is_meaningful(t))
}
