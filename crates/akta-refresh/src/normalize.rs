//! Fetched bytes to heading-marked plain text.
//!
//! HTML is reduced to its block text: `h1`–`h6` become `#` headings, and
//! paragraphs, list items and preformatted blocks become lines. Attributes,
//! inline markup and layout never reach the text, so markup churn alone does
//! not change the `content_hash`.

use akta_core::CorpusDocument;
use akta_core::entities::normalize_text;
use akta_search::chunker::outline;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

use crate::error::FetchError;
use crate::fetch::Fetched;

const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "pre", "blockquote", "dt", "dd",
];

/// Normalized text of a fetched source.
///
/// # Errors
///
/// Returns [`FetchError::Empty`] if the source has no text.
pub fn to_text(fetched: &Fetched) -> Result<String, FetchError> {
    let raw = String::from_utf8_lossy(&fetched.body);
    let text = if fetched.is_html() || looks_like_html(&raw) {
        html_to_text(&raw)
    } else {
        raw.into_owned()
    };
    let text = normalize_text(&text);
    if text.is_empty() {
        return Err(FetchError::Empty {
            url: fetched.url.clone(),
        });
    }
    Ok(text)
}

fn looks_like_html(raw: &str) -> bool {
    let head: String = raw.trim_start().chars().take(15).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Block text of an HTML document, one block per paragraph.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let blocks = Selector::parse(&BLOCK_TAGS.join(", ")).expect("block selector is valid");

    let mut out: Vec<String> = Vec::new();
    for element in document.select(&blocks) {
        // Nested blocks are already part of their outer block's text.
        if has_block_ancestor(&element) {
            continue;
        }
        let text = collapse(&element);
        if text.is_empty() {
            continue;
        }
        match heading_level(element.value().name()) {
            Some(level) => out.push(format!("{} {text}", "#".repeat(level))),
            None => out.push(text),
        }
    }

    if out.is_empty() {
        let body = Selector::parse("body").expect("body selector is valid");
        if let Some(body) = document.select(&body).next() {
            let text = collapse(&body);
            if !text.is_empty() {
                out.push(text);
            }
        }
    }
    out.join("\n\n")
}

/// A corpus document for normalized `text`, its outline taken from the
/// statute headings (`#` lines, `PART` lines and numbered sections).
#[must_use]
pub fn statute_document(
    source_url: &str,
    title: impl Into<String>,
    text: &str,
    fetched_at: DateTime<Utc>,
) -> CorpusDocument {
    let document = CorpusDocument::new(source_url, title, text, fetched_at);
    let section_path = outline(&document.raw_text);
    document.with_section_path(section_path)
}

fn heading_level(tag: &str) -> Option<usize> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn has_block_ancestor(element: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|e| BLOCK_TAGS.contains(&e.name()))
    })
}

fn collapse(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
