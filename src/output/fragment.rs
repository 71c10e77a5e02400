//! Parsed content fragment handed from extraction to rendering

use scraper::{ElementRef, Html};

/// An in-memory parsed subtree of a page
///
/// Built from the serialized markup of the element(s) chosen as content, so
/// renderers see exactly that content and nothing of the surrounding page.
#[derive(Debug, Clone)]
pub struct ContentFragment {
    html: Html,
}

impl ContentFragment {
    /// Parses a markup fragment (body context)
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_fragment(markup),
        }
    }

    /// Builds a fragment from elements of an already parsed document, in order
    pub fn from_elements<'a, I>(elements: I) -> Self
    where
        I: IntoIterator<Item = ElementRef<'a>>,
    {
        let markup: String = elements.into_iter().map(|element| element.html()).collect();
        Self::parse(&markup)
    }

    /// The synthetic root element that holds the fragment's nodes
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// Concatenation of every text node, in document order, untouched
    pub fn raw_text(&self) -> String {
        self.root().text().collect()
    }

    /// True when the fragment holds no non-whitespace text
    pub fn is_blank(&self) -> bool {
        self.root().text().all(|text| text.trim().is_empty())
    }
}

/// Collapses every whitespace run to a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed text content of an element
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
