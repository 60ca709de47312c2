//! Rich-text document model.
//!
//! Offsets are counted in chars, never bytes.

use serde::{Deserialize, Serialize};

/// Character formatting toggled from the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

/// Formatting carried by one span
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub link: Option<String>,
}

impl Marks {
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
        }
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
        }
    }
}

/// URL schemes a link may carry. Scheme-less (relative) hrefs are always kept.
const LINK_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Normalize a link target, rejecting empty and unsafe ones.
///
/// Browsers ignore whitespace and control characters inside a scheme, so
/// they are stripped before the scheme is checked.
pub fn sanitize_href(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let compact: String = href
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let scheme_end = compact.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(end) if compact[end..].starts_with(':') => {
            let scheme = compact[..end].to_ascii_lowercase();
            LINK_SCHEMES
                .contains(&scheme.as_str())
                .then(|| href.to_string())
        }
        _ => Some(href.to_string()),
    }
}

/// A run of text with uniform marks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub marks: Marks,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bullet,
    Ordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    BulletItem,
    OrderedItem,
}

impl BlockKind {
    pub fn list(&self) -> Option<ListKind> {
        match self {
            BlockKind::Paragraph => None,
            BlockKind::BulletItem => Some(ListKind::Bullet),
            BlockKind::OrderedItem => Some(ListKind::Ordered),
        }
    }

    pub fn for_list(kind: ListKind) -> Self {
        match kind {
            ListKind::Bullet => BlockKind::BulletItem,
            ListKind::Ordered => BlockKind::OrderedItem,
        }
    }
}

/// One paragraph or list item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub spans: Vec<Span>,
}

impl TextBlock {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            spans: Vec::new(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        let mut block = Self::new(BlockKind::Paragraph);
        block.spans.push(Span::plain(text));
        block.normalize();
        block
    }

    pub fn with_spans(kind: BlockKind, spans: Vec<Span>) -> Self {
        let mut block = Self { kind, spans };
        block.normalize();
        block
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.spans.iter().map(Span::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }

    /// Drop empty spans and merge neighbours with identical marks
    pub fn normalize(&mut self) {
        let mut merged: Vec<Span> = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if span.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.marks == span.marks => last.text.push_str(&span.text),
                _ => merged.push(span),
            }
        }
        self.spans = merged;
    }

    /// Ensure a span boundary at `offset` and return the index of the span
    /// starting there (`spans.len()` when `offset` is the end).
    pub(crate) fn split_at(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for i in 0..self.spans.len() {
            let len = self.spans[i].char_len();
            if offset == start {
                return i;
            }
            if offset < start + len {
                let byte = byte_index(&self.spans[i].text, offset - start);
                let right = self.spans[i].text.split_off(byte);
                let marks = self.spans[i].marks.clone();
                self.spans.insert(i + 1, Span::with_marks(right, marks));
                return i + 1;
            }
            start += len;
        }
        self.spans.len()
    }

    /// Spans covering `[from, to)`, with a boundary forced at both ends
    pub(crate) fn span_range(&mut self, from: usize, to: usize) -> std::ops::Range<usize> {
        let a = self.split_at(from);
        let b = self.split_at(to);
        a..b
    }

    /// Marks of the char just before `offset`, or just after it at the start
    pub fn marks_at(&self, offset: usize) -> Marks {
        let mut start = 0;
        let mut previous: Option<&Span> = None;
        for span in &self.spans {
            let len = span.char_len();
            if offset == 0 {
                return span.marks.clone();
            }
            if offset <= start + len {
                return span.marks.clone();
            }
            start += len;
            previous = Some(span);
        }
        previous.map(|s| s.marks.clone()).unwrap_or_default()
    }

    /// Split off everything from `offset` into a new block of the same kind
    pub(crate) fn split_off(&mut self, offset: usize) -> TextBlock {
        let idx = self.split_at(offset);
        let tail = self.spans.split_off(idx);
        self.normalize();
        TextBlock::with_spans(self.kind, tail)
    }
}

pub(crate) fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// A caret location: block index plus char offset within the block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Anchor/head pair; `head` moves while extending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub fn caret(at: Position) -> Self {
        Self { anchor: at, head: at }
    }

    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    pub fn start(&self) -> Position {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> Position {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }
}

/// Structured rich-text document. Always holds at least one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextDocument {
    blocks: Vec<TextBlock>,
}

impl Default for RichTextDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl RichTextDocument {
    /// Empty document: a single empty paragraph
    pub fn new() -> Self {
        Self {
            blocks: vec![TextBlock::new(BlockKind::Paragraph)],
        }
    }

    pub fn from_blocks(blocks: Vec<TextBlock>) -> Self {
        let mut doc = Self { blocks };
        if doc.blocks.is_empty() {
            doc.blocks.push(TextBlock::new(BlockKind::Paragraph));
        }
        for block in &mut doc.blocks {
            block.normalize();
        }
        doc
    }

    pub fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<TextBlock> {
        &mut self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.len() == 1
            && self.blocks[0].kind == BlockKind::Paragraph
            && self.blocks[0].is_empty()
    }

    /// Text content with blocks separated by newlines
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(TextBlock::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Position after the last char
    pub fn end(&self) -> Position {
        let last = self.blocks.len() - 1;
        Position::new(last, self.blocks[last].char_len())
    }

    /// Clamp a position into the document
    pub fn clamp(&self, pos: Position) -> Position {
        let block = pos.block.min(self.blocks.len() - 1);
        let offset = pos.offset.min(self.blocks[block].char_len());
        Position::new(block, offset)
    }

    /// Selection spanning the whole document
    pub fn select_all(&self) -> Selection {
        Selection::new(Position::new(0, 0), self.end())
    }
}
