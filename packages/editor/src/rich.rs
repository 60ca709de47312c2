//! # Rich-Text Field Editor
//!
//! Same commit contract as [`TextFieldEditor`](crate::leaf::TextFieldEditor),
//! over a structured document instead of a string. Values are diffed as
//! canonical markup so that stored aliases (`<b>`, `<br>`) never show up as
//! edits on their own.
//!
//! The floating toolbar outlives focus by a grace delay: a click on a toolbar
//! button blurs the editor first, and the command still has to land. Time is
//! passed in explicitly so hosts and tests drive the clock.

use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::leaf::FieldBinding;
use crate::session::{ChangeOutcome, EditSession};
use cmsedit_common::RemoteDocument;
use cmsedit_richtext::{
    parse_markup, to_markup, ActiveFormats, ListKind, Mark, Position, RichTextDocument, Selection,
    TextBlock,
};
use std::time::{Duration, Instant};

/// Toolbar buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarCommand {
    ToggleMark(Mark),
    ToggleList(ListKind),
    /// `None` clears the link
    SetLink(Option<String>),
}

/// Visibility of the floating toolbar
#[derive(Debug, Clone)]
pub struct FloatingToolbar {
    visible: bool,
    hide_at: Option<Instant>,
    grace: Duration,
}

impl FloatingToolbar {
    pub fn new(grace: Duration) -> Self {
        Self {
            visible: false,
            hide_at: None,
            grace,
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.hide_at = None;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.hide_at = None;
    }

    /// Hide once the grace delay has passed
    pub fn schedule_hide(&mut self, now: Instant) {
        if self.visible {
            self.hide_at = Some(now + self.grace);
        }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.visible && self.hide_at.map_or(true, |at| now < at)
    }

    /// Apply a due hide. Returns true if the toolbar just disappeared.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.hide_at {
            Some(at) if now >= at => {
                self.hide();
                true
            }
            _ => false,
        }
    }
}

/// Render state of a rich-text field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichView {
    /// Sanitized markup of the stored value
    ReadOnly { markup: String },
    Editable {
        markup: String,
        editing: bool,
        toolbar_visible: bool,
        active: ActiveFormats,
        dirty: bool,
    },
}

#[derive(Debug, Clone)]
pub struct RichTextFieldEditor {
    binding: FieldBinding,
    /// Value as handed in, registered back verbatim when edits cancel out
    original: String,
    canonical: String,
    document: RichTextDocument,
    selection: Selection,
    editing: bool,
    toolbar: FloatingToolbar,
    seen_generation: u64,
}

impl RichTextFieldEditor {
    pub fn new(
        binding: FieldBinding,
        markup: impl Into<String>,
        session: &EditSession,
        config: &EditorConfig,
    ) -> Self {
        let original = markup.into();
        let (document, canonical) = load(&original);
        Self {
            binding,
            original,
            canonical,
            document,
            selection: Selection::caret(Position::default()),
            editing: false,
            toolbar: FloatingToolbar::new(config.toolbar_grace()),
            seen_generation: session.generation(),
        }
    }

    pub fn for_field(
        document: &RemoteDocument,
        field_path: &str,
        session: &EditSession,
        config: &EditorConfig,
    ) -> Self {
        Self::new(
            FieldBinding::for_document(document, field_path),
            document.field_text(field_path),
            session,
            config,
        )
    }

    pub fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    pub fn document(&self) -> &RichTextDocument {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn markup(&self) -> String {
        to_markup(&self.document)
    }

    pub fn is_toolbar_visible(&self, now: Instant) -> bool {
        self.toolbar.is_visible(now)
    }

    /// Adopt a new stored value. Ignored while editing.
    pub fn sync_value(&mut self, markup: &str) -> bool {
        if self.editing || markup == self.original {
            return false;
        }
        self.original = markup.to_string();
        self.reload();
        true
    }

    pub fn activate(&mut self, session: &EditSession) -> bool {
        self.refresh(session);
        if !session.is_edit_mode_active() {
            return false;
        }
        self.editing = true;
        self.toolbar.show();
        true
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = Selection::new(
            self.document.clamp(selection.anchor),
            self.document.clamp(selection.head),
        );
    }

    pub fn select_all(&mut self) {
        self.selection = self.document.select_all();
    }

    /// Type text over the selection. Newlines split blocks.
    pub fn insert_text(&mut self, text: &str) {
        if !self.editing {
            return;
        }
        let at = self.document.delete_selection(self.selection);
        let caret = self.document.insert_text(at, text);
        self.selection = Selection::caret(caret);
    }

    pub fn split_block(&mut self) {
        if !self.editing {
            return;
        }
        let at = self.document.delete_selection(self.selection);
        let caret = self.document.split_block(at);
        self.selection = Selection::caret(caret);
    }

    /// Backspace: delete the selection, or the char (or block break) before the caret
    pub fn delete_backward(&mut self) {
        if !self.editing {
            return;
        }
        if !self.selection.is_collapsed() {
            let caret = self.document.delete_selection(self.selection);
            self.selection = Selection::caret(caret);
            return;
        }

        let at = self.selection.head;
        let from = if at.offset > 0 {
            Position::new(at.block, at.offset - 1)
        } else if at.block > 0 {
            let previous = &self.document.blocks()[at.block - 1];
            Position::new(at.block - 1, previous.char_len())
        } else {
            return;
        };
        let caret = self.document.delete_range(from, at);
        self.selection = Selection::caret(caret);
    }

    /// Run a toolbar command.
    ///
    /// Accepted while editing or while the toolbar is still up during the
    /// grace delay, in which case the editor takes focus again. Refocusing
    /// needs edit mode.
    pub fn apply(&mut self, command: ToolbarCommand, session: &EditSession, now: Instant) -> bool {
        if !self.editing {
            if !self.toolbar.is_visible(now) || !session.is_edit_mode_active() {
                return false;
            }
            self.editing = true;
        }
        self.toolbar.show();

        let selection = self.selection;
        match command {
            ToolbarCommand::ToggleMark(mark) => self.document.toggle_mark(selection, mark),
            ToolbarCommand::ToggleList(kind) => {
                self.document.toggle_list(selection, kind);
                true
            }
            ToolbarCommand::SetLink(href) => self.document.set_link(selection, href.as_deref()),
        }
    }

    pub fn active_formats(&self) -> ActiveFormats {
        self.document.active_formats(self.selection)
    }

    /// Commit the serialized document and start the toolbar grace delay
    pub fn blur(
        &mut self,
        session: &EditSession,
        now: Instant,
    ) -> Result<Option<ChangeOutcome>, EditorError> {
        if !self.editing {
            return Ok(None);
        }
        self.editing = false;
        self.toolbar.schedule_hide(now);

        let serialized = to_markup(&self.document);
        let new_value = if serialized == self.canonical {
            self.original.clone()
        } else {
            serialized
        };
        session
            .register_change(self.binding.change(new_value, self.original.clone()))
            .map(Some)
    }

    /// Throw away local edits and leave editing
    pub fn cancel(&mut self) {
        self.editing = false;
        self.toolbar.hide();
        self.reload();
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.toolbar.tick(now)
    }

    /// Adopt a saved original, and throw away local edits after a discard
    pub fn refresh(&mut self, session: &EditSession) {
        if !self.editing {
            let confirmed = session.confirmed_value(&self.binding.key(), &self.original);
            if confirmed != self.original {
                self.canonical = load(&confirmed).1;
                self.original = confirmed;
            }
        }
        let generation = session.generation();
        if generation != self.seen_generation {
            self.seen_generation = generation;
            self.cancel();
        }
    }

    pub fn view(&mut self, session: &EditSession, now: Instant) -> RichView {
        self.refresh(session);
        self.tick(now);
        let markup = self.markup();
        if !session.is_edit_mode_active() && !self.editing {
            return RichView::ReadOnly { markup };
        }
        RichView::Editable {
            markup,
            editing: self.editing,
            toolbar_visible: self.toolbar.is_visible(now),
            active: self.active_formats(),
            dirty: session.is_field_dirty(&self.binding.document_id, &self.binding.field_path),
        }
    }

    fn reload(&mut self) {
        let (document, canonical) = load(&self.original);
        self.document = document;
        self.canonical = canonical;
        self.selection = Selection::caret(Position::default());
    }
}

/// Parse stored markup, falling back to treating it as plain text
fn load(markup: &str) -> (RichTextDocument, String) {
    let document = match parse_markup(markup) {
        Ok(document) => document,
        Err(err) => {
            tracing::warn!(error = %err, "unreadable rich text, editing it as plain text");
            RichTextDocument::from_blocks(vec![TextBlock::paragraph(markup)])
        }
    };
    let canonical = to_markup(&document);
    (document, canonical)
}
