//! # Save Coordination
//!
//! Pending changes are grouped per document into one [`SaveRequest`] each.
//! Requests go out concurrently through a [`ContentApi`]; a failed document
//! never aborts its siblings, and the outcome of every document is reported
//! in a [`SaveReport`].

use async_trait::async_trait;
use cmsedit_common::{Block, ChangeKey, PendingChange, BLOCKS_FIELD};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Body of one remote write: every pending field of a single document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub document_id: String,
    pub document_kind: String,
    pub fields: BTreeMap<String, String>,
}

/// Why a single document failed to save
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("remote rejected the save with status {0}")]
    Status(u16),

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Remote content store the session saves into
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn save_document(&self, request: &SaveRequest) -> Result<(), SaveError>;
}

/// Outcome of saving one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSaveOutcome {
    pub document_id: String,
    pub document_kind: String,
    /// Field paths that were sent
    pub fields: Vec<String>,
    pub result: Result<(), SaveError>,
}

impl DocumentSaveOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-document results of one save
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub outcomes: Vec<DocumentSaveOutcome>,
}

impl SaveReport {
    /// True only if every document saved. An empty report is a success.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(DocumentSaveOutcome::is_success)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &DocumentSaveOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &DocumentSaveOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// One document's share of a save, with the exact changes it was built from
#[derive(Debug, Clone)]
pub(crate) struct SaveGroup {
    pub request: SaveRequest,
    pub changes: Vec<PendingChange>,
    pub staged_blocks: Option<Vec<Block>>,
}

/// Group a snapshot of the pending set by document.
///
/// A document with a staged block list sends the serialized list as its
/// `blocks` field instead of the structural marker.
pub(crate) fn group_changes(
    pending: &BTreeMap<ChangeKey, PendingChange>,
    staged: &HashMap<String, Vec<Block>>,
) -> Result<Vec<SaveGroup>, serde_json::Error> {
    let mut groups: BTreeMap<&str, SaveGroup> = BTreeMap::new();

    for change in pending.values() {
        let group = groups.entry(change.document_id.as_str()).or_insert_with(|| SaveGroup {
            request: SaveRequest {
                document_id: change.document_id.clone(),
                document_kind: change.document_kind.clone(),
                fields: BTreeMap::new(),
            },
            changes: Vec::new(),
            staged_blocks: None,
        });

        if group.request.document_kind != change.document_kind {
            tracing::warn!(
                document = %change.document_id,
                kept = %group.request.document_kind,
                ignored = %change.document_kind,
                "conflicting document kinds in pending set"
            );
        }

        let value = match (change.field_path.as_str(), staged.get(&change.document_id)) {
            (BLOCKS_FIELD, Some(blocks)) => {
                group.staged_blocks = Some(blocks.clone());
                serde_json::to_string(blocks)?
            }
            _ => change.new_value.clone(),
        };

        group.request.fields.insert(change.field_path.clone(), value);
        group.changes.push(change.clone());
    }

    Ok(groups.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmsedit_common::StructuralMarker;

    fn pending(changes: Vec<PendingChange>) -> BTreeMap<ChangeKey, PendingChange> {
        changes.into_iter().map(|c| (c.key(), c)).collect()
    }

    #[test]
    fn test_groups_by_document() {
        let set = pending(vec![
            PendingChange::new("doc-1", "page", "title", "B", "A"),
            PendingChange::new("doc-2", "post", "body", "new", "old"),
            PendingChange::new("doc-1", "page", "subtitle", "S2", "S1"),
        ]);

        let groups = group_changes(&set, &HashMap::new()).unwrap();
        assert_eq!(groups.len(), 2);

        let first = &groups[0].request;
        assert_eq!(first.document_id, "doc-1");
        assert_eq!(first.document_kind, "page");
        assert_eq!(first.fields.len(), 2);
        assert_eq!(first.fields["title"], "B");
        assert_eq!(first.fields["subtitle"], "S2");

        assert_eq!(groups[1].request.fields["body"], "new");
    }

    #[test]
    fn test_marker_sent_without_staged_list() {
        let set = pending(vec![PendingChange::structural(
            "doc-1",
            "page",
            Some(&StructuralMarker::Reordered),
        )]);

        let groups = group_changes(&set, &HashMap::new()).unwrap();
        assert_eq!(groups[0].request.fields[BLOCKS_FIELD], "reordered");
        assert!(groups[0].staged_blocks.is_none());
    }

    #[test]
    fn test_staged_list_replaces_marker() {
        let set = pending(vec![PendingChange::structural(
            "doc-1",
            "page",
            Some(&StructuralMarker::Deleted),
        )]);
        let mut staged = HashMap::new();
        staged.insert("doc-1".to_string(), vec![Block::new("b1", "Hero")]);

        let groups = group_changes(&set, &staged).unwrap();
        let sent: Vec<Block> =
            serde_json::from_str(&groups[0].request.fields[BLOCKS_FIELD]).unwrap();
        assert_eq!(sent, vec![Block::new("b1", "Hero")]);
        assert_eq!(groups[0].staged_blocks.as_deref(), Some(sent.as_slice()));
    }

    #[test]
    fn test_save_request_wire_format() {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), "Hello".to_string());
        let request = SaveRequest {
            document_id: "doc-1".into(),
            document_kind: "page".into(),
            fields,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "documentId": "doc-1",
                "documentKind": "page",
                "fields": { "title": "Hello" }
            })
        );
    }

    #[test]
    fn test_report_aggregate() {
        let ok = DocumentSaveOutcome {
            document_id: "a".into(),
            document_kind: "page".into(),
            fields: vec!["title".into()],
            result: Ok(()),
        };
        let failed = DocumentSaveOutcome {
            result: Err(SaveError::Status(500)),
            document_id: "b".into(),
            ..ok.clone()
        };

        assert!(SaveReport::default().is_success());
        assert!(SaveReport { outcomes: vec![ok.clone()] }.is_success());

        let mixed = SaveReport { outcomes: vec![ok, failed] };
        assert!(!mixed.is_success());
        assert_eq!(mixed.failed().count(), 1);
        assert_eq!(mixed.succeeded().count(), 1);
    }
}
