//! XML rendering
//!
//! Produces a fixed document shape:
//!
//! ```text
//! <document>
//!   <title>          optional
//!   <content>
//!     <headings>     each section present only when non-empty
//!     <paragraphs>
//!     <links>
//!     <images>
//!     <lists>
//! ```
//!
//! Text payloads are CDATA-wrapped; level, url, src, alt and type are attributes.

use crate::output::structured::StructuredContent;

/// Renders structured content as an XML document
pub fn format_xml(content: &StructuredContent, title: Option<&str>) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<document>\n");

    if let Some(title) = title.filter(|title| !title.is_empty()) {
        xml.push_str(&format!("  <title>{}</title>\n", cdata(title)));
    }

    xml.push_str("  <content>\n");

    if !content.headings.is_empty() {
        xml.push_str("    <headings>\n");
        for heading in &content.headings {
            xml.push_str(&format!(
                "      <heading level=\"{}\">{}</heading>\n",
                heading.level,
                cdata(&heading.text)
            ));
        }
        xml.push_str("    </headings>\n");
    }

    if !content.paragraphs.is_empty() {
        xml.push_str("    <paragraphs>\n");
        for paragraph in &content.paragraphs {
            xml.push_str(&format!("      <paragraph>{}</paragraph>\n", cdata(paragraph)));
        }
        xml.push_str("    </paragraphs>\n");
    }

    if !content.links.is_empty() {
        xml.push_str("    <links>\n");
        for link in &content.links {
            xml.push_str(&format!(
                "      <link url=\"{}\">{}</link>\n",
                escape_attribute(&link.url),
                cdata(&link.text)
            ));
        }
        xml.push_str("    </links>\n");
    }

    if !content.images.is_empty() {
        xml.push_str("    <images>\n");
        for image in &content.images {
            xml.push_str(&format!(
                "      <image src=\"{}\" alt=\"{}\"/>\n",
                escape_attribute(&image.src),
                escape_attribute(&image.alt)
            ));
        }
        xml.push_str("    </images>\n");
    }

    if !content.lists.is_empty() {
        xml.push_str("    <lists>\n");
        for list in &content.lists {
            xml.push_str(&format!("      <list type=\"{}\">\n", list.kind.as_str()));
            for item in &list.items {
                xml.push_str(&format!("        <item>{}</item>\n", cdata(item)));
            }
            xml.push_str("      </list>\n");
        }
        xml.push_str("    </lists>\n");
    }

    xml.push_str("  </content>\n");
    xml.push_str("</document>");
    xml
}

/// Wraps text in a CDATA section, splitting any embedded `]]>`
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
