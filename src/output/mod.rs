//! Output module for rendering extracted page content
//!
//! This module handles:
//! - Plain text rendering
//! - Markdown rendering
//! - XML and JSON rendering over a shared structured extraction

mod fragment;
mod json;
mod markdown;
pub mod structured;
mod text;
mod xml;

pub use fragment::{collapse_whitespace, ContentFragment};
pub use json::format_json;
pub use markdown::format_markdown;
pub use structured::{extract_structured, StructuredContent};
pub use text::format_text;
pub use xml::format_xml;

use crate::CrawlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output representation selected by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Xml,
    Json,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [Self::Text, Self::Markdown, Self::Xml, Self::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| CrawlError::UnsupportedFormat(s.to_string()))
    }
}

/// Renders content fragments into the supported output formats
///
/// Rendering is a pure function of (fragment, format, title).
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentFormatter;

impl ContentFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Renders `fragment` in `format`, with an optional title
    pub fn render(
        &self,
        fragment: &ContentFragment,
        format: OutputFormat,
        title: Option<&str>,
    ) -> Result<String, CrawlError> {
        match format {
            OutputFormat::Text => Ok(format_text(fragment, title)),
            OutputFormat::Markdown => Ok(format_markdown(fragment, title)),
            OutputFormat::Xml => Ok(format_xml(&extract_structured(fragment), title)),
            OutputFormat::Json => format_json(&extract_structured(fragment), title)
                .map_err(|e| CrawlError::Unknown(format!("Failed to serialize JSON: {}", e))),
        }
    }
}
