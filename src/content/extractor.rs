//! HTML-to-text extraction
//!
//! Turns a fetched page into clean plain text: noise elements removed,
//! whitespace collapsed, truncated to the per-page budget.

use scraper::{Html, Selector};

/// Elements whose entire subtree is dropped during extraction
const NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "form", "iframe", "noscript", "aside",
];

/// Extract clean text from an HTML page
///
/// Walks the body in document order, skipping the subtrees of noise
/// elements, then collapses whitespace and truncates at a word boundary.
///
/// # Arguments
/// * `html` - Raw HTML string
/// * `max_chars` - Maximum characters to return
pub fn extract_page_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    let mut raw = String::new();
    if let Ok(selector) = Selector::parse("body") {
        if let Some(body) = document.select(&selector).next() {
            collect_text(body, &mut raw);
        }
    }

    let collapsed = collapse_whitespace(&raw);
    truncate_at_word(&collapsed, max_chars)
}

/// Concatenate text nodes under `root`, skipping noise subtrees
fn collect_text(root: scraper::ElementRef, out: &mut String) {
    for child in root.children() {
        match child.value() {
            scraper::Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            scraper::Node::Element(element) => {
                if NOISE_TAGS.contains(&element.name()) {
                    continue;
                }
                if let Some(child_ref) = scraper::ElementRef::wrap(child) {
                    collect_text(child_ref, out);
                }
            }
            _ => {}
        }
    }
}

/// Collapse runs of whitespace into single spaces
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to `max_chars` code points, backing up to a word boundary
fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(boundary) => format!("{}...", &cut[..boundary]),
        None => format!("{}...", cut),
    }
}
