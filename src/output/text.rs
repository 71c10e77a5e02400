//! Plain text rendering

use crate::output::fragment::{collapse_whitespace, ContentFragment};

/// Renders a fragment as plain text
///
/// All text nodes are concatenated in document order, whitespace runs are
/// collapsed to one space and the ends trimmed. A title, when given, is
/// placed first followed by a blank line.
pub fn format_text(fragment: &ContentFragment, title: Option<&str>) -> String {
    let body = collapse_whitespace(&fragment.raw_text());

    match title.map(str::trim).filter(|title| !title.is_empty()) {
        Some(title) => format!("{}\n\n{}", title, body),
        None => body,
    }
}
