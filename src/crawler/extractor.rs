//! Content extraction from fetched HTML
//!
//! This module turns a page into a title plus the fragment of markup that
//! counts as its content:
//! - Title resolution (`<title>`, first `<h1>`, then "Untitled")
//! - Selector-scoped extraction when the caller names a CSS selector
//! - Main-content detection with boilerplate removal otherwise

use crate::output::ContentFragment;
use crate::CrawlError;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Elements stripped from the page before main-content detection
const NOISE_SELECTOR: &str = "script, style, noscript, nav, header, footer, aside";

/// Main-content candidates, in priority order
const MAIN_CONTENT_SELECTORS: &[&str] = &["main", "article", ".content", "#content"];

const UNTITLED: &str = "Untitled";

/// Title and content of a page
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub title: String,
    pub fragment: ContentFragment,
}

/// Selects the content of a page
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the title and content fragment of an HTML page
    ///
    /// With a `selector`, the fragment is every element it matches (an element
    /// nested inside another match is only included once, through its
    /// ancestor). Matching runs against the page as fetched, so boilerplate
    /// inside a matched element is kept.
    ///
    /// Without a selector, scripts, styles and navigation chrome are removed
    /// and the fragment is the first `main`, `article`, `.content` or
    /// `#content` element, falling back to `body`.
    ///
    /// # Errors
    ///
    /// * `InvalidSelector` - The selector does not parse
    /// * `SelectorNotFound` - The selector matches nothing
    /// * `ParseEmpty` - The chosen content holds no text
    pub fn extract(
        &self,
        html: &str,
        selector: Option<&str>,
    ) -> Result<ExtractedContent, CrawlError> {
        let mut document = Html::parse_document(html);
        let title = resolve_title(&document);

        let fragment = match selector {
            Some(selector) => select_fragment(&document, selector)?,
            None => {
                remove_noise(&mut document);
                main_content(&document)
            }
        };

        if fragment.is_blank() {
            return Err(CrawlError::ParseEmpty);
        }

        Ok(ExtractedContent { title, fragment })
    }
}

fn resolve_title(document: &Html) -> String {
    first_text(document, "title")
        .or_else(|| first_text(document, "h1"))
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Trimmed text of the first element matching `selector`, if non-empty
fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn select_fragment(document: &Html, selector: &str) -> Result<ContentFragment, CrawlError> {
    let parsed = Selector::parse(selector).map_err(|e| CrawlError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })?;

    let matches: Vec<ElementRef<'_>> = document.select(&parsed).collect();
    if matches.is_empty() {
        return Err(CrawlError::SelectorNotFound {
            selector: selector.to_string(),
        });
    }

    let matched: HashSet<_> = matches.iter().map(|element| element.id()).collect();
    let outermost = matches.into_iter().filter(|element| {
        !element
            .ancestors()
            .any(|ancestor| matched.contains(&ancestor.id()))
    });

    Ok(ContentFragment::from_elements(outermost))
}

fn remove_noise(document: &mut Html) {
    let Ok(noise) = Selector::parse(NOISE_SELECTOR) else {
        return;
    };

    let ids: Vec<_> = document.select(&noise).map(|element| element.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn main_content(document: &Html) -> ContentFragment {
    let candidate = MAIN_CONTENT_SELECTORS
        .iter()
        .chain(std::iter::once(&"body"))
        .filter_map(|selector| Selector::parse(selector).ok())
        .find_map(|selector| document.select(&selector).next());

    match candidate {
        Some(element) => ContentFragment::from_elements(std::iter::once(element)),
        None => ContentFragment::from_elements(std::iter::once(document.root_element())),
    }
}
