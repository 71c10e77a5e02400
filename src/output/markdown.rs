//! Markdown rendering
//!
//! Block elements (headings, paragraphs, lists, quotes, code blocks, images,
//! rules) each produce a block followed by a blank line. Inline elements
//! (links, code, emphasis, line breaks) render inside the text of the block
//! that contains them. Text sitting directly in a container element becomes a
//! paragraph of its own. Blocks whose text is empty after trimming are skipped.

use crate::output::fragment::ContentFragment;
use crate::output::structured::heading_level;
use scraper::{ElementRef, Node};

/// Elements rendered within the surrounding text rather than as blocks
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "del", "dfn", "em", "font", "i",
    "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup",
    "time", "u", "var",
];

/// Elements whose content never contributes to the Markdown output
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "meta", "link",
];

/// Renders a content fragment as Markdown
///
/// # Arguments
///
/// * `fragment` - The content to render
/// * `title` - Optional page title, emitted as a leading `#` heading
///
/// # Returns
///
/// The Markdown document; every block ends with a blank line
pub fn format_markdown(fragment: &ContentFragment, title: Option<&str>) -> String {
    let mut writer = MarkdownWriter::default();

    if let Some(title) = title.map(str::trim).filter(|title| !title.is_empty()) {
        writer.out.push_str(&format!("# {}\n\n", title));
    }

    writer.container(fragment.root());
    writer.flush_paragraph();
    writer.out
}

#[derive(Default)]
struct MarkdownWriter {
    out: String,
    /// Loose inline content waiting to be emitted as a paragraph
    pending: InlineText,
}

impl MarkdownWriter {
    fn container(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.pending.push_text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.element(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let tag = element.value().name();

        if SKIPPED_TAGS.contains(&tag) {
            return;
        }

        if let Some(level) = heading_level(tag) {
            self.flush_paragraph();
            let text = inline_text(element);
            if !text.is_empty() {
                self.out.push_str(&format!("{} {}\n\n", "#".repeat(level as usize), text));
            }
            return;
        }

        match tag {
            "p" => {
                self.flush_paragraph();
                self.block(inline_text(element));
            }
            "blockquote" => {
                self.flush_paragraph();
                let text = inline_text(element);
                if !text.is_empty() {
                    self.out.push_str(&format!("> {}\n\n", text));
                }
            }
            "pre" => {
                self.flush_paragraph();
                let code: String = element.text().collect();
                let code = code.trim_matches('\n');
                if !code.trim().is_empty() {
                    self.out.push_str(&format!("```\n{}\n```\n\n", code));
                }
            }
            "ul" | "ol" => {
                self.flush_paragraph();
                self.list(element, tag == "ol");
            }
            "img" => {
                self.flush_paragraph();
                if let Some(image) = image_markup(element) {
                    self.out.push_str(&format!("{}\n\n", image));
                }
            }
            "hr" => {
                self.flush_paragraph();
                self.out.push_str("---\n\n");
            }
            _ if INLINE_TAGS.contains(&tag) => inline_element(&mut self.pending, element),
            _ => {
                self.flush_paragraph();
                self.container(element);
                self.flush_paragraph();
            }
        }
    }

    fn list(&mut self, list: ElementRef<'_>, ordered: bool) {
        let items: Vec<String> = list
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| element.value().name() == "li")
            .map(inline_text)
            .filter(|text| !text.is_empty())
            .collect();

        if items.is_empty() {
            return;
        }

        for (index, item) in items.iter().enumerate() {
            if ordered {
                self.out.push_str(&format!("{}. {}\n", index + 1, item));
            } else {
                self.out.push_str(&format!("- {}\n", item));
            }
        }
        self.out.push('\n');
    }

    fn block(&mut self, text: String) {
        if !text.is_empty() {
            self.out.push_str(&text);
            self.out.push_str("\n\n");
        }
    }

    fn flush_paragraph(&mut self) {
        let text = self.pending.take();
        self.block(text);
    }
}

/// Whitespace-collapsing buffer for inline content
#[derive(Default)]
struct InlineText {
    buf: String,
    /// Whitespace was seen since the last visible character
    space: bool,
}

impl InlineText {
    fn push_text(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                self.space = true;
            } else {
                self.separate();
                self.buf.push(c);
            }
        }
    }

    /// Appends pre-rendered markup as one unit
    fn push_markup(&mut self, markup: &str) {
        if markup.is_empty() {
            return;
        }
        self.separate();
        self.buf.push_str(markup);
    }

    fn push_break(&mut self) {
        self.buf.push('\n');
        self.space = false;
    }

    fn separate(&mut self) {
        if self.space && !self.buf.is_empty() && !self.buf.ends_with('\n') {
            self.buf.push(' ');
        }
        self.space = false;
    }

    /// Returns the finished text and resets the buffer
    fn take(&mut self) -> String {
        let text = std::mem::take(&mut self.buf);
        self.space = false;
        text.lines()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

/// Renders the children of an element as inline Markdown
fn inline_text(element: ElementRef<'_>) -> String {
    let mut text = InlineText::default();
    inline_children(&mut text, element);
    text.take()
}

fn inline_children(text: &mut InlineText, element: ElementRef<'_>) {
    for child in element.children() {
        match child.value() {
            Node::Text(content) => text.push_text(content),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    inline_element(text, child);
                }
            }
            _ => {}
        }
    }
}

fn inline_element(text: &mut InlineText, element: ElementRef<'_>) {
    let tag = element.value().name();
    match tag {
        "a" => {
            let label = inline_text(element);
            match element.value().attr("href").map(str::trim) {
                Some(href) if !href.is_empty() && !label.is_empty() => {
                    text.push_markup(&format!("[{}]({})", label, href));
                }
                _ => text.push_markup(&label),
            }
        }
        "code" => {
            let code: String = element.text().collect();
            let code = code.trim();
            if !code.is_empty() {
                text.push_markup(&format!("`{}`", code));
            }
        }
        "strong" | "b" => wrap_emphasis(text, element, "**"),
        "em" | "i" => wrap_emphasis(text, element, "*"),
        "br" => text.push_break(),
        "img" => {
            if let Some(image) = image_markup(element) {
                text.push_markup(&image);
            }
        }
        _ if SKIPPED_TAGS.contains(&tag) => {}
        _ => inline_children(text, element),
    }
}

fn wrap_emphasis(text: &mut InlineText, element: ElementRef<'_>, marker: &str) {
    let inner = inline_text(element);
    if !inner.is_empty() {
        text.push_markup(&format!("{}{}{}", marker, inner, marker));
    }
}

fn image_markup(element: ElementRef<'_>) -> Option<String> {
    let src = element.value().attr("src").filter(|src| !src.is_empty())?;
    let alt = element.value().attr("alt").unwrap_or("");
    Some(format!("![{}]({})", alt, src))
}
