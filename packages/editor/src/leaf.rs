//! # Plain-Text Field Editor
//!
//! Binds one field of one document to an editable region. The editor keeps
//! the value it was handed as its original, moves it forward when a save
//! from the session replaces it, and only talks to the session on commit
//! (blur or the commit key).
//!
//! ```text
//!   ReadOnly ──activate (edit mode)──▶ Editing
//!      ▲                                 │
//!      └──── blur / Enter / Escape ──────┘
//! ```

use crate::errors::EditorError;
use crate::session::{ChangeOutcome, EditSession};
use cmsedit_common::{ChangeKey, PendingChange, RemoteDocument};

/// Which field of which document an editor writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub document_id: String,
    pub document_kind: String,
    pub field_path: String,
}

impl FieldBinding {
    pub fn new(
        document_id: impl Into<String>,
        document_kind: impl Into<String>,
        field_path: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            document_kind: document_kind.into(),
            field_path: field_path.into(),
        }
    }

    pub fn for_document(document: &RemoteDocument, field_path: impl Into<String>) -> Self {
        Self::new(document.id.clone(), document.kind.clone(), field_path)
    }

    pub fn key(&self) -> ChangeKey {
        ChangeKey::new(self.document_id.clone(), self.field_path.clone())
    }

    pub fn change(
        &self,
        new_value: impl Into<String>,
        original_value: impl Into<String>,
    ) -> PendingChange {
        PendingChange::new(
            self.document_id.clone(),
            self.document_kind.clone(),
            self.field_path.clone(),
            new_value,
            original_value,
        )
    }
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Enter,
    Escape,
}

/// What a key press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Value committed to the session
    Committed(ChangeOutcome),
    /// Display reverted to the original, nothing registered
    Cancelled,
    /// Not handled here; the host inserts it as text
    PassThrough,
}

/// Render state of a text field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafView {
    ReadOnly { text: String },
    Editable { text: String, editing: bool, dirty: bool },
}

#[derive(Debug, Clone)]
pub struct TextFieldEditor {
    binding: FieldBinding,
    original: String,
    display: String,
    editing: bool,
    multiline: bool,
    seen_generation: u64,
}

impl TextFieldEditor {
    pub fn new(binding: FieldBinding, value: impl Into<String>, session: &EditSession) -> Self {
        let original = value.into();
        Self {
            binding,
            display: original.clone(),
            original,
            editing: false,
            multiline: false,
            seen_generation: session.generation(),
        }
    }

    /// Bind to a field of a remote document, reading its current value
    pub fn for_field(document: &RemoteDocument, field_path: &str, session: &EditSession) -> Self {
        Self::new(
            FieldBinding::for_document(document, field_path),
            document.field_text(field_path),
            session,
        )
    }

    /// Multi-line editors treat Enter as text
    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    pub fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Adopt a new value from the host. Ignored while editing.
    ///
    /// Returns true if the display changed.
    pub fn sync_value(&mut self, value: &str) -> bool {
        if self.editing || value == self.original {
            return false;
        }
        self.original = value.to_string();
        self.display = self.original.clone();
        true
    }

    /// Start editing. Only possible in edit mode.
    pub fn activate(&mut self, session: &EditSession) -> bool {
        self.refresh(session);
        if !session.is_edit_mode_active() {
            return false;
        }
        self.editing = true;
        true
    }

    /// Replace the draft text while editing
    pub fn input(&mut self, text: impl Into<String>) {
        if self.editing {
            self.display = text.into();
        }
    }

    pub fn handle_key(
        &mut self,
        key: EditKey,
        session: &EditSession,
    ) -> Result<KeyOutcome, EditorError> {
        if !self.editing {
            return Ok(KeyOutcome::PassThrough);
        }
        match key {
            EditKey::Escape => {
                self.cancel();
                Ok(KeyOutcome::Cancelled)
            }
            EditKey::Enter if self.multiline => Ok(KeyOutcome::PassThrough),
            EditKey::Enter => Ok(KeyOutcome::Committed(self.commit(session)?)),
        }
    }

    /// Leave editing and register the draft against the original
    pub fn blur(&mut self, session: &EditSession) -> Result<Option<ChangeOutcome>, EditorError> {
        if !self.editing {
            return Ok(None);
        }
        self.commit(session).map(Some)
    }

    /// Revert the display and leave editing without registering anything
    pub fn cancel(&mut self) {
        self.display = self.original.clone();
        self.editing = false;
    }

    /// Adopt a saved original, and re-derive local state after a discard
    pub fn refresh(&mut self, session: &EditSession) {
        if !self.editing {
            self.original = session.confirmed_value(&self.binding.key(), &self.original);
        }
        let generation = session.generation();
        if generation != self.seen_generation {
            self.seen_generation = generation;
            self.cancel();
        }
    }

    pub fn view(&mut self, session: &EditSession) -> LeafView {
        self.refresh(session);
        if !session.is_edit_mode_active() && !self.editing {
            return LeafView::ReadOnly {
                text: self.display.clone(),
            };
        }
        LeafView::Editable {
            text: self.display.clone(),
            editing: self.editing,
            dirty: session.is_field_dirty(&self.binding.document_id, &self.binding.field_path),
        }
    }

    fn commit(&mut self, session: &EditSession) -> Result<ChangeOutcome, EditorError> {
        self.editing = false;
        let change = self.binding.change(self.display.clone(), self.original.clone());
        session.register_change(change)
    }
}
