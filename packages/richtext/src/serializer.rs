//! Markup serializer.
//!
//! The output is canonical: one spelling per construct (`strong`, `em`, `u`,
//! `a`, `p`, `ul`/`ol`/`li`) and a fixed nesting order for marks, so equal
//! documents always serialize to equal strings.

use crate::error::MarkupError;
use crate::model::{sanitize_href, BlockKind, RichTextDocument, Span, TextBlock};
use crate::parser::parse_markup;

/// Serialize a document to markup. An empty document serializes to `""`.
pub fn to_markup(doc: &RichTextDocument) -> String {
    if doc.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let mut open_list: Option<BlockKind> = None;

    for block in doc.blocks() {
        if open_list.is_some() && open_list != Some(block.kind) {
            close_list(&mut out, open_list.take());
        }

        match block.kind {
            BlockKind::Paragraph => {
                out.push_str("<p>");
                write_inline(&mut out, block);
                out.push_str("</p>");
            }
            BlockKind::BulletItem | BlockKind::OrderedItem => {
                if open_list.is_none() {
                    out.push_str(if block.kind == BlockKind::OrderedItem {
                        "<ol>"
                    } else {
                        "<ul>"
                    });
                    open_list = Some(block.kind);
                }
                out.push_str("<li>");
                write_inline(&mut out, block);
                out.push_str("</li>");
            }
        }
    }
    close_list(&mut out, open_list);

    out
}

/// Parse and re-serialize stored markup
pub fn canonicalize(source: &str) -> Result<String, MarkupError> {
    Ok(to_markup(&parse_markup(source)?))
}

fn close_list(out: &mut String, list: Option<BlockKind>) {
    match list {
        Some(BlockKind::OrderedItem) => out.push_str("</ol>"),
        Some(_) => out.push_str("</ul>"),
        None => {}
    }
}

fn write_inline(out: &mut String, block: &TextBlock) {
    for span in &block.spans {
        write_span(out, span);
    }
}

fn write_span(out: &mut String, span: &Span) {
    let marks = &span.marks;
    let link = marks.link.as_deref().and_then(sanitize_href);
    if let Some(href) = &link {
        out.push_str("<a href=\"");
        escape_into(out, href);
        out.push_str("\">");
    }
    if marks.bold {
        out.push_str("<strong>");
    }
    if marks.italic {
        out.push_str("<em>");
    }
    if marks.underline {
        out.push_str("<u>");
    }

    escape_into(out, &span.text);

    if marks.underline {
        out.push_str("</u>");
    }
    if marks.italic {
        out.push_str("</em>");
    }
    if marks.bold {
        out.push_str("</strong>");
    }
    if link.is_some() {
        out.push_str("</a>");
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
