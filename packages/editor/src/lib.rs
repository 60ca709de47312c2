//! # cmsedit Editor
//!
//! In-place content editing for a rendered page: a session store of unsaved
//! changes, editors that commit into it, and a coordinator that saves them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ orchestrator: read-only vs. editable render │
//! │  - Block controls + per-block render cache  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editors: local copies, commit on blur/drop  │
//! │  - Plain-text and rich-text field editors   │
//! │  - Structural block list editor + form      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: pending changes (net diff)         │
//! │  - Edit mode, discard generation            │
//! │  - Grouped concurrent save via ContentApi   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Session is source of truth**: editors only push committed values in
//! 2. **Net diff, not history**: editing back to the original leaves nothing
//! 3. **Commits are local**: the only network traffic is the grouped save
//! 4. **Failures are per document**: a failed write keeps its changes pending
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cmsedit_editor::{EditSession, TextFieldEditor};
//!
//! let session = EditSession::new(is_admin);
//! session.enter_edit_mode()?;
//!
//! let mut title = TextFieldEditor::for_field(&document, "title", &session);
//! title.activate(&session);
//! title.input("New headline");
//! title.blur(&session)?;
//!
//! let report = session.save_all_changes(&api).await?;
//! assert!(report.is_success());
//! ```

mod block_editor;
mod block_form;
mod config;
mod errors;
mod leaf;
mod orchestrator;
mod rich;
mod save;
mod session;
mod toolbar;

pub use block_editor::{BlockListEditor, DragState};
pub use block_form::BlockForm;
pub use config::{
    EditorConfig, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SAVE_ENDPOINT, DEFAULT_TOOLBAR_GRACE_MS,
};
pub use errors::EditorError;
pub use leaf::{EditKey, FieldBinding, KeyOutcome, LeafView, TextFieldEditor};
pub use orchestrator::{
    BlockAction, BlockControls, BlockRenderer, ContentOrchestrator, EditableBlockView, PageView,
};
pub use rich::{FloatingToolbar, RichTextFieldEditor, RichView, ToolbarCommand};
pub use save::{ContentApi, DocumentSaveOutcome, SaveError, SaveReport, SaveRequest};
pub use session::{ChangeOutcome, EditSession};
pub use toolbar::{summarize, EditToolbar, SaveSummary, ToolbarView};

// Re-export common types for convenience
pub use cmsedit_catalog::{ComponentCatalog, PickedComponent};
pub use cmsedit_common::{Block, ChangeKey, PendingChange, RemoteDocument, StructuralMarker};
