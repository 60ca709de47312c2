//! Tolerant markup parser.
//!
//! Builds a [`RichTextDocument`] from stored markup. Tags the model has no
//! counterpart for are dropped while their text is kept, so any stored value
//! produces a document.

use crate::error::MarkupError;
use crate::lexer::{TagToken, Token};
use crate::model::{sanitize_href, BlockKind, ListKind, Marks, RichTextDocument, Span, TextBlock};
use logos::Logos;

/// Parse stored markup into a rich-text document
pub fn parse_markup(source: &str) -> Result<RichTextDocument, MarkupError> {
    let mut builder = Builder::default();
    let mut lexer = Token::lexer(source);

    while let Some(token) = lexer.next() {
        let token = token.map_err(|_| MarkupError::Lex {
            offset: lexer.span().start,
        })?;

        match token {
            Token::OpenTag(raw) => builder.open(TagToken::parse(raw)),
            Token::CloseTag(raw) => builder.close(&TagToken::parse(raw).name),
            Token::LessThan => builder.text("<"),
            Token::Text(raw) => builder.text(&decode_entities(raw)),
        }
    }

    Ok(builder.finish())
}

#[derive(Debug, Clone)]
enum MarkChange {
    Bold,
    Italic,
    Underline,
    Link(String),
}

#[derive(Default)]
struct Builder {
    blocks: Vec<TextBlock>,
    current: Option<TextBlock>,
    lists: Vec<ListKind>,
    marks: Vec<(String, MarkChange)>,
}

impl Builder {
    fn open(&mut self, tag: TagToken) {
        match tag.name.as_str() {
            "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" => {
                self.flush();
                self.current = Some(TextBlock::new(BlockKind::Paragraph));
            }
            "ul" | "ol" => {
                self.flush();
                self.lists.push(if tag.name == "ol" {
                    ListKind::Ordered
                } else {
                    ListKind::Bullet
                });
            }
            "li" => {
                self.flush();
                self.current = Some(TextBlock::new(self.item_kind()));
            }
            "br" => {
                let kind = self.current.as_ref().map_or(BlockKind::Paragraph, |b| b.kind);
                self.flush();
                self.current = Some(TextBlock::new(kind));
            }
            "strong" | "b" => self.push_mark(tag, MarkChange::Bold),
            "em" | "i" => self.push_mark(tag, MarkChange::Italic),
            "u" => self.push_mark(tag, MarkChange::Underline),
            "a" => {
                let href = tag.attribute("href").and_then(sanitize_href).unwrap_or_default();
                self.push_mark(tag, MarkChange::Link(href));
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "li" => {
                self.flush();
            }
            "ul" | "ol" => {
                self.flush();
                self.lists.pop();
            }
            _ => {
                if let Some(pos) = self.marks.iter().rposition(|(tag, _)| tag == name) {
                    self.marks.remove(pos);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.current.is_none() {
            if text.trim().is_empty() {
                return;
            }
            self.current = Some(TextBlock::new(self.item_kind()));
        }
        let marks = self.current_marks();
        if let Some(block) = self.current.as_mut() {
            block.spans.push(Span::with_marks(text, marks));
        }
    }

    fn push_mark(&mut self, tag: TagToken, change: MarkChange) {
        if !tag.self_closing {
            self.marks.push((tag.name, change));
        }
    }

    fn current_marks(&self) -> Marks {
        let mut marks = Marks::default();
        for (_, change) in &self.marks {
            match change {
                MarkChange::Bold => marks.bold = true,
                MarkChange::Italic => marks.italic = true,
                MarkChange::Underline => marks.underline = true,
                MarkChange::Link(href) if !href.is_empty() => marks.link = Some(href.clone()),
                MarkChange::Link(_) => {}
            }
        }
        marks
    }

    fn item_kind(&self) -> BlockKind {
        match self.lists.last() {
            Some(kind) => BlockKind::for_list(*kind),
            None => BlockKind::Paragraph,
        }
    }

    fn flush(&mut self) {
        if let Some(mut block) = self.current.take() {
            block.normalize();
            self.blocks.push(block);
        }
    }

    fn finish(mut self) -> RichTextDocument {
        self.flush();
        RichTextDocument::from_blocks(self.blocks)
    }
}

/// Decode the character references the serializer produces plus the common
/// named and numeric ones. Unknown references are kept verbatim.
pub(crate) fn decode_entities(source: &str) -> String {
    if !source.contains('&') {
        return source.to_string();
    }

    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').and_then(|semi| {
            let name = &rest[1..semi];
            let c = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            c.map(|c| (c, semi + 1))
        });

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
