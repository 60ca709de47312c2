//! Editing commands over a [`RichTextDocument`].
//!
//! Every command clamps the positions it receives and returns where the caret
//! ends up, so a host can keep its own selection in sync.

use crate::model::{
    sanitize_href, BlockKind, ListKind, Mark, Marks, Position, RichTextDocument, Selection, Span,
    TextBlock,
};

/// Formatting state at a selection, used to light up toolbar buttons
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFormats {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub link: Option<String>,
    pub list: Option<ListKind>,
}

impl RichTextDocument {
    /// Insert text at `at`. Newlines split blocks.
    pub fn insert_text(&mut self, at: Position, text: &str) -> Position {
        let mut pos = self.clamp(at);
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                pos = self.split_block(pos);
            }
            if line.is_empty() {
                continue;
            }
            let block = &mut self.blocks_mut()[pos.block];
            let marks = block.marks_at(pos.offset);
            let idx = block.split_at(pos.offset);
            block.spans.insert(idx, Span::with_marks(line, marks));
            block.normalize();
            pos.offset += line.chars().count();
        }
        pos
    }

    /// Delete the chars between two positions, merging blocks when the range
    /// crosses a block boundary.
    pub fn delete_range(&mut self, from: Position, to: Position) -> Position {
        let (start, end) = {
            let a = self.clamp(from);
            let b = self.clamp(to);
            (a.min(b), a.max(b))
        };

        let blocks = self.blocks_mut();
        if start.block == end.block {
            let block = &mut blocks[start.block];
            let range = block.span_range(start.offset, end.offset);
            block.spans.drain(range);
            block.normalize();
            return start;
        }

        let tail = blocks[end.block].split_off(end.offset);
        blocks.drain(start.block + 1..=end.block);
        let head = &mut blocks[start.block];
        head.split_off(start.offset);
        head.spans.extend(tail.spans);
        head.normalize();
        start
    }

    /// Delete the selected text; a collapsed selection is left alone
    pub fn delete_selection(&mut self, selection: Selection) -> Position {
        if selection.is_collapsed() {
            return self.clamp(selection.head);
        }
        self.delete_range(selection.start(), selection.end())
    }

    /// Enter key: split the block at `at`.
    ///
    /// Enter on an empty list item leaves the list instead of adding an item.
    pub fn split_block(&mut self, at: Position) -> Position {
        let pos = self.clamp(at);
        let blocks = self.blocks_mut();
        let block = &mut blocks[pos.block];

        if block.kind != BlockKind::Paragraph && block.is_empty() {
            block.kind = BlockKind::Paragraph;
            return pos;
        }

        let tail = block.split_off(pos.offset);
        blocks.insert(pos.block + 1, tail);
        Position::new(pos.block + 1, 0)
    }

    /// Toggle a mark over the selection.
    ///
    /// The mark is removed only when every selected char already carries it,
    /// otherwise it is applied to the whole range. Returns false for a
    /// collapsed selection.
    pub fn toggle_mark(&mut self, selection: Selection, mark: Mark) -> bool {
        if selection.is_collapsed() {
            return false;
        }
        let on = !self.range_all(selection, |m| m.has(mark));
        self.update_marks(selection, |m| m.set(mark, on));
        true
    }

    /// Set or clear the link over the selection.
    ///
    /// An href that fails [`sanitize_href`] clears the link instead.
    pub fn set_link(&mut self, selection: Selection, href: Option<&str>) -> bool {
        if selection.is_collapsed() {
            return false;
        }
        let href = href.and_then(sanitize_href);
        self.update_marks(selection, |m| m.link = href.clone());
        true
    }

    /// Toggle the list kind of every block the selection touches.
    ///
    /// When all touched blocks already are items of `kind` they become
    /// paragraphs again.
    pub fn toggle_list(&mut self, selection: Selection, kind: ListKind) {
        let start = self.clamp(selection.start());
        let end = self.clamp(selection.end());
        let target = BlockKind::for_list(kind);
        let blocks = &mut self.blocks_mut()[start.block..=end.block];
        let all_in_list = blocks.iter().all(|b| b.kind == target);
        for block in blocks {
            block.kind = if all_in_list { BlockKind::Paragraph } else { target };
        }
    }

    /// Formatting at the selection
    pub fn active_formats(&self, selection: Selection) -> ActiveFormats {
        let start = self.clamp(selection.start());
        let list = self.blocks()[start.block].kind.list();

        if selection.is_collapsed() {
            let marks = self.blocks()[start.block].marks_at(start.offset);
            return ActiveFormats {
                bold: marks.bold,
                italic: marks.italic,
                underline: marks.underline,
                link: marks.link,
                list,
            };
        }

        let first_link = self.first_marks(selection).and_then(|m| m.link);
        ActiveFormats {
            bold: self.range_all(selection, |m| m.bold),
            italic: self.range_all(selection, |m| m.italic),
            underline: self.range_all(selection, |m| m.underline),
            link: first_link.clone().filter(|href| {
                self.range_all(selection, |m| m.link.as_deref() == Some(href.as_str()))
            }),
            list,
        }
    }

    /// Per-block `[from, to)` char ranges covered by a selection
    fn block_ranges(&self, selection: Selection) -> Vec<(usize, usize, usize)> {
        let start = self.clamp(selection.start());
        let end = self.clamp(selection.end());
        (start.block..=end.block)
            .map(|i| {
                let from = if i == start.block { start.offset } else { 0 };
                let to = if i == end.block {
                    end.offset
                } else {
                    self.blocks()[i].char_len()
                };
                (i, from, to)
            })
            .filter(|(_, from, to)| from < to)
            .collect()
    }

    fn range_all(&self, selection: Selection, pred: impl Fn(&Marks) -> bool) -> bool {
        let mut any = false;
        for (i, from, to) in self.block_ranges(selection) {
            let mut start = 0;
            for span in &self.blocks()[i].spans {
                let end = start + span.char_len();
                if end > from && start < to {
                    any = true;
                    if !pred(&span.marks) {
                        return false;
                    }
                }
                start = end;
            }
        }
        any
    }

    fn first_marks(&self, selection: Selection) -> Option<Marks> {
        let (i, from, _) = *self.block_ranges(selection).first()?;
        let block: &TextBlock = &self.blocks()[i];
        Some(block.marks_at(from + 1))
    }

    fn update_marks(&mut self, selection: Selection, f: impl Fn(&mut Marks)) {
        for (i, from, to) in self.block_ranges(selection) {
            let block = &mut self.blocks_mut()[i];
            let range = block.span_range(from, to);
            for span in &mut block.spans[range] {
                f(&mut span.marks);
            }
            block.normalize();
        }
    }
}
