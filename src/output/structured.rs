//! Structured content extraction shared by the XML and JSON renderers
//!
//! Headings, paragraphs, links, images and lists are collected from the
//! fragment in document order, independent of any output grammar.

use crate::output::fragment::{element_text, ContentFragment};
use scraper::ElementRef;
use serde::Serialize;

/// Structured view of a content fragment
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredContent {
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<String>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub lists: Vec<List>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub alt: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    #[serde(rename = "type")]
    pub kind: ListKind,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ordered => "ordered",
            Self::Unordered => "unordered",
        }
    }
}

/// Collects the structured content of a fragment
///
/// # Rules
///
/// - `h1`..`h6`: level from the tag, skipped when the text is empty
/// - `p`: skipped when the text is empty
/// - `a[href]`: skipped when href or text is empty
/// - `img[src]`: skipped without src; alt defaults to ""
/// - `ul`/`ol`: items are every non-empty `li` beneath the list (not only
///   direct children); a list without items is skipped. All unordered lists
///   come first, then all ordered lists, each group in document order
pub fn extract_structured(fragment: &ContentFragment) -> StructuredContent {
    let mut content = StructuredContent::default();
    let mut ordered_lists = Vec::new();

    for element in fragment.root().descendants().filter_map(ElementRef::wrap) {
        let tag = element.value().name();
        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let text = element_text(element);
                match heading_level(tag) {
                    Some(level) if !text.is_empty() => {
                        content.headings.push(Heading { level, text });
                    }
                    _ => {}
                }
            }
            "p" => {
                let text = element_text(element);
                if !text.is_empty() {
                    content.paragraphs.push(text);
                }
            }
            "a" => {
                let href = element.value().attr("href").unwrap_or("");
                let text = element_text(element);
                if !href.is_empty() && !text.is_empty() {
                    content.links.push(Link {
                        text,
                        url: href.to_string(),
                    });
                }
            }
            "img" => {
                if let Some(src) = element.value().attr("src").filter(|src| !src.is_empty()) {
                    content.images.push(Image {
                        alt: element.value().attr("alt").unwrap_or("").to_string(),
                        src: src.to_string(),
                    });
                }
            }
            "ul" => {
                let items = list_items(element);
                if !items.is_empty() {
                    content.lists.push(List {
                        kind: ListKind::Unordered,
                        items,
                    });
                }
            }
            "ol" => {
                let items = list_items(element);
                if !items.is_empty() {
                    ordered_lists.push(List {
                        kind: ListKind::Ordered,
                        items,
                    });
                }
            }
            _ => {}
        }
    }

    content.lists.append(&mut ordered_lists);
    content
}

/// Numeric level of a heading tag (`h3` -> 3)
pub(crate) fn heading_level(tag: &str) -> Option<u8> {
    tag.strip_prefix('h')?
        .parse::<u8>()
        .ok()
        .filter(|level| (1..=6).contains(level))
}

/// Non-empty trimmed texts of every `li` beneath a list element
fn list_items(list: ElementRef<'_>) -> Vec<String> {
    list.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "li")
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}
