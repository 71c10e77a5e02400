//! Structured JSON rendering

use crate::output::structured::StructuredContent;
use serde::Serialize;

#[derive(Serialize)]
struct JsonDocument<'a> {
    title: Option<&'a str>,
    content: &'a StructuredContent,
}

/// Renders structured content as pretty-printed JSON
///
/// Keys appear in a fixed order: `title`, then `content` with `headings`,
/// `paragraphs`, `links`, `images` and `lists`. A missing title is `null`.
pub fn format_json(
    content: &StructuredContent,
    title: Option<&str>,
) -> Result<String, serde_json::Error> {
    let document = JsonDocument {
        title: title.filter(|title| !title.is_empty()),
        content,
    };
    serde_json::to_string_pretty(&document)
}
