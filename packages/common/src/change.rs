//! # Pending Changes
//!
//! A pending change is one not-yet-saved local edit to a single field of a
//! single document. The pending set always holds the net diff against the
//! remote document: a change whose new value equals its original value is
//! never stored.

use crate::document::{Block, BLOCKS_FIELD};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a pending change: one field of one document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeKey {
    pub document_id: String,
    pub field_path: String,
}

impl ChangeKey {
    pub fn new(document_id: impl Into<String>, field_path: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            field_path: field_path.into(),
        }
    }

    /// Key of the structural change for a document's block list
    pub fn blocks(document_id: impl Into<String>) -> Self {
        Self::new(document_id, BLOCKS_FIELD)
    }

    pub fn is_structural(&self) -> bool {
        self.field_path == BLOCKS_FIELD
    }
}

impl fmt::Display for ChangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.document_id, self.field_path)
    }
}

/// A registered, not-yet-saved local edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingChange {
    pub document_id: String,
    pub document_kind: String,
    pub field_path: String,
    pub new_value: String,
    pub original_value: String,
}

impl PendingChange {
    pub fn new(
        document_id: impl Into<String>,
        document_kind: impl Into<String>,
        field_path: impl Into<String>,
        new_value: impl Into<String>,
        original_value: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            document_kind: document_kind.into(),
            field_path: field_path.into(),
            new_value: new_value.into(),
            original_value: original_value.into(),
        }
    }

    /// Structural change for a document's block list.
    ///
    /// `None` produces the collapsing form (new equals original), used when a
    /// local block list has returned to the remote order.
    pub fn structural(
        document_id: impl Into<String>,
        document_kind: impl Into<String>,
        marker: Option<&StructuralMarker>,
    ) -> Self {
        let new_value = marker.map(|m| m.to_string()).unwrap_or_default();
        Self::new(document_id, document_kind, BLOCKS_FIELD, new_value, "")
    }

    pub fn key(&self) -> ChangeKey {
        ChangeKey::new(self.document_id.clone(), self.field_path.clone())
    }

    /// True when this change would not alter the remote document
    pub fn is_noop(&self) -> bool {
        self.new_value == self.original_value
    }

    pub fn is_structural(&self) -> bool {
        self.field_path == BLOCKS_FIELD
    }
}

/// Opaque marker registered as the value of a structural change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralMarker {
    Reordered,
    Deleted,
    /// Serialized JSON of an inserted or reconfigured block
    Block(String),
}

impl StructuralMarker {
    pub fn for_block(block: &Block) -> Result<Self, serde_json::Error> {
        Ok(StructuralMarker::Block(block.to_json()?))
    }
}

impl fmt::Display for StructuralMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralMarker::Reordered => f.write_str("reordered"),
            StructuralMarker::Deleted => f.write_str("deleted"),
            StructuralMarker::Block(json) => f.write_str(json),
        }
    }
}
