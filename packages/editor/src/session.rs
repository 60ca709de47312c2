//! # Edit Session
//!
//! The single source of truth for edit mode and unsaved work. Editors keep
//! transient local copies and push committed values in through
//! [`EditSession::register_change`]; nothing flows the other way except the
//! discard generation, which tells editors to drop their local state.
//!
//! The session is a cheap cloneable handle. All state sits behind one
//! `parking_lot::Mutex` that is never held across an `.await`.
//!
//! Editors diff against the value they were handed, which goes stale once a
//! save lands. The session therefore remembers what each save sent:
//!
//! ```text
//!   in flight ── write ok ──▶ confirmed   (baseline moves to the sent value)
//!       │
//!       └──── write failed ──▶ dropped    (baseline stays remote)
//! ```
//!
//! Registrations are rebased onto the in-flight value while a write is out
//! and onto the confirmed value afterwards, so a revert is never mistaken
//! for a no-op.

use crate::errors::EditorError;
use crate::save::{group_changes, ContentApi, DocumentSaveOutcome, SaveGroup, SaveReport};
use cmsedit_common::{Block, ChangeKey, PendingChange, StructuralMarker};
use futures::future::join_all;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// What a registration did to the pending set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    Added,
    Updated,
    Removed,
    Unchanged,
}

/// A value this session saved, with the values it replaced
#[derive(Debug)]
struct Confirmed<T> {
    value: T,
    superseded: Vec<T>,
}

impl<T: PartialEq> Confirmed<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            superseded: Vec::new(),
        }
    }

    fn advance(&mut self, from: T, to: T) {
        let previous = std::mem::replace(&mut self.value, to);
        for old in [previous, from] {
            if !self.superseded.contains(&old) {
                self.superseded.push(old);
            }
        }
        let value = &self.value;
        self.superseded.retain(|old| old != value);
    }

    /// The saved value if `original` is one it replaced, else `original`
    fn resolve<'a, Q>(&'a self, original: &'a Q) -> &'a Q
    where
        T: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        if self.superseded.iter().any(|old| <T as Borrow<Q>>::borrow(old) == original) {
            <T as Borrow<Q>>::borrow(&self.value)
        } else {
            original
        }
    }
}

/// A block list being written, with the list it was diffed against
#[derive(Debug)]
struct InFlightList {
    base: Vec<Block>,
    sent: Vec<Block>,
}

#[derive(Debug, Default)]
struct SessionState {
    authorized: bool,
    edit_mode: bool,
    pending: BTreeMap<ChangeKey, PendingChange>,
    /// Last committed local block list per document
    staged: HashMap<String, Vec<Block>>,
    /// Baseline each staged list was diffed against
    staged_bases: HashMap<String, Vec<Block>>,
    saving: bool,
    generation: u64,
    in_flight: HashMap<ChangeKey, PendingChange>,
    in_flight_blocks: HashMap<String, InFlightList>,
    confirmed: HashMap<ChangeKey, Confirmed<String>>,
    confirmed_blocks: HashMap<String, Confirmed<Vec<Block>>>,
}

/// Shared handle to one user's editing session
#[derive(Debug, Clone)]
pub struct EditSession {
    state: Arc<Mutex<SessionState>>,
}

impl EditSession {
    /// Create a session. Authorization is fixed for its lifetime.
    pub fn new(is_admin: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                authorized: is_admin,
                ..SessionState::default()
            })),
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.state.lock().authorized
    }

    pub fn is_edit_mode_active(&self) -> bool {
        self.state.lock().edit_mode
    }

    pub fn enter_edit_mode(&self) -> Result<(), EditorError> {
        let mut state = self.state.lock();
        if !state.authorized {
            return Err(EditorError::NotAuthorized);
        }
        state.edit_mode = true;
        tracing::debug!("entered edit mode");
        Ok(())
    }

    /// Leave edit mode. Pending changes are kept.
    pub fn exit_edit_mode(&self) {
        let mut state = self.state.lock();
        state.edit_mode = false;
        tracing::debug!(pending = state.pending.len(), "exited edit mode");
    }

    /// Flip edit mode, returning the new state
    pub fn toggle_edit_mode(&self) -> Result<bool, EditorError> {
        if self.is_edit_mode_active() {
            self.exit_edit_mode();
            Ok(false)
        } else {
            self.enter_edit_mode()?;
            Ok(true)
        }
    }

    /// Upsert a change by `(document_id, field_path)`.
    ///
    /// The change's original is first rebased onto whatever this session
    /// has sent or saved for the key since the editor read it. A change
    /// whose new value then equals its original removes any existing entry
    /// for the key instead of being stored.
    pub fn register_change(&self, mut change: PendingChange) -> Result<ChangeOutcome, EditorError> {
        let mut state = self.state.lock();
        if !state.authorized {
            return Err(EditorError::NotAuthorized);
        }
        change.original_value = state.field_baseline(&change.key(), &change.original_value);
        Ok(upsert(&mut state.pending, change))
    }

    /// Register the structural change for a document's block list.
    ///
    /// `blocks` is diffed against the baseline derived from `remote` (see
    /// [`EditSession::block_baseline`]). When they match, the structural
    /// change collapses and the staged list is dropped. Otherwise `marker` is
    /// recorded and `blocks` is staged as the list to send.
    pub fn register_block_list(
        &self,
        document_id: &str,
        document_kind: &str,
        remote: &[Block],
        blocks: &[Block],
        marker: StructuralMarker,
    ) -> Result<ChangeOutcome, EditorError> {
        let mut state = self.state.lock();
        if !state.authorized {
            return Err(EditorError::NotAuthorized);
        }

        let base = state.block_baseline(document_id, remote);
        let outcome = if blocks == base.as_slice() {
            state.staged.remove(document_id);
            state.staged_bases.remove(document_id);
            upsert(
                &mut state.pending,
                PendingChange::structural(document_id, document_kind, None),
            )
        } else {
            state.staged.insert(document_id.to_string(), blocks.to_vec());
            state.staged_bases.insert(document_id.to_string(), base);
            upsert(
                &mut state.pending,
                PendingChange::structural(document_id, document_kind, Some(&marker)),
            )
        };
        Ok(outcome)
    }

    /// The value a field holds remotely as far as this session knows.
    ///
    /// `original` is the value an editor was handed. If a save from this
    /// session replaced it, the saved value is returned instead.
    pub fn confirmed_value(&self, key: &ChangeKey, original: &str) -> String {
        let state = self.state.lock();
        match state.confirmed.get(key) {
            Some(confirmed) => confirmed.resolve(original).to_string(),
            None => original.to_string(),
        }
    }

    /// The block list a structural editor should diff against.
    ///
    /// `remote` is the list the editor was handed. A list this session saved
    /// over it wins, and while a write for the document is in flight the
    /// list being sent wins.
    pub fn block_baseline(&self, document_id: &str, remote: &[Block]) -> Vec<Block> {
        self.state.lock().block_baseline(document_id, remote)
    }

    /// Snapshot of the pending set in key order
    pub fn pending_changes(&self) -> Vec<PendingChange> {
        self.state.lock().pending.values().cloned().collect()
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.state.lock().pending.is_empty()
    }

    pub fn pending_change(&self, key: &ChangeKey) -> Option<PendingChange> {
        self.state.lock().pending.get(key).cloned()
    }

    pub fn is_field_dirty(&self, document_id: &str, field_path: &str) -> bool {
        self.state
            .lock()
            .pending
            .contains_key(&ChangeKey::new(document_id, field_path))
    }

    pub fn is_saving(&self) -> bool {
        self.state.lock().saving
    }

    /// Bumped by every discard
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub fn staged_blocks(&self, document_id: &str) -> Option<Vec<Block>> {
        self.state.lock().staged.get(document_id).cloned()
    }

    /// Drop all unsaved work and tell editors to reload from remote content
    pub fn discard_all_changes(&self) -> Result<(), EditorError> {
        let mut state = self.state.lock();
        if state.saving {
            return Err(EditorError::SaveInProgress);
        }
        let dropped = state.pending.len();
        state.pending.clear();
        state.staged.clear();
        state.staged_bases.clear();
        state.generation += 1;
        tracing::info!(dropped, generation = state.generation, "discarded all changes");
        Ok(())
    }

    /// Save every pending change, one concurrent write per document.
    ///
    /// Only the changes captured when the save started are cleared, and only
    /// for documents that saved and whose entries still hold the sent value.
    /// Anything registered while the writes were in flight stays pending,
    /// including a revert to the value the remote held before the save.
    pub async fn save_all_changes(&self, api: &dyn ContentApi) -> Result<SaveReport, EditorError> {
        let (groups, _guard) = {
            let mut state = self.state.lock();
            if state.saving {
                return Err(EditorError::SaveInProgress);
            }
            if state.pending.is_empty() {
                tracing::debug!("nothing to save");
                return Ok(SaveReport::default());
            }
            state.saving = true;
            let groups = group_changes(&state.pending, &state.staged);
            if let Ok(groups) = &groups {
                state.track_in_flight(groups);
            }
            drop(state);

            let guard = SavingGuard {
                state: Arc::clone(&self.state),
            };
            (groups?, guard)
        };

        tracing::info!(documents = groups.len(), "saving pending changes");

        let results = join_all(groups.iter().map(|group| api.save_document(&group.request))).await;

        let mut state = self.state.lock();
        let mut report = SaveReport::default();
        for (group, result) in groups.into_iter().zip(results) {
            match &result {
                Ok(()) => state.confirm_saved(&group),
                Err(err) => {
                    tracing::warn!(
                        document = %group.request.document_id,
                        error = %err,
                        "document failed to save, keeping its changes"
                    );
                    state.restore_failed(&group);
                }
            }
            report.outcomes.push(DocumentSaveOutcome {
                document_id: group.request.document_id,
                document_kind: group.request.document_kind,
                fields: group.request.fields.into_keys().collect(),
                result,
            });
        }

        tracing::info!(
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            remaining = state.pending.len(),
            "save finished"
        );
        Ok(report)
    }
}

fn upsert(
    pending: &mut BTreeMap<ChangeKey, PendingChange>,
    change: PendingChange,
) -> ChangeOutcome {
    let key = change.key();

    let outcome = if change.is_noop() {
        match pending.remove(&key) {
            Some(_) => ChangeOutcome::Removed,
            None => ChangeOutcome::Unchanged,
        }
    } else {
        match pending.get(&key) {
            Some(existing) if *existing == change => ChangeOutcome::Unchanged,
            Some(_) => {
                pending.insert(key.clone(), change);
                ChangeOutcome::Updated
            }
            None => {
                pending.insert(key.clone(), change);
                ChangeOutcome::Added
            }
        }
    };

    tracing::debug!(%key, ?outcome, "registered change");
    outcome
}

impl SessionState {
    fn field_baseline(&self, key: &ChangeKey, original: &str) -> String {
        let resolved = match self.confirmed.get(key) {
            Some(confirmed) => confirmed.resolve(original),
            None => original,
        };
        match self.in_flight.get(key) {
            Some(sent) if sent.original_value == resolved => sent.new_value.clone(),
            _ => resolved.to_string(),
        }
    }

    fn block_baseline(&self, document_id: &str, remote: &[Block]) -> Vec<Block> {
        let resolved = match self.confirmed_blocks.get(document_id) {
            Some(confirmed) => confirmed.resolve(remote),
            None => remote,
        };
        match self.in_flight_blocks.get(document_id) {
            Some(flight) if flight.base == resolved => flight.sent.clone(),
            _ => resolved.to_vec(),
        }
    }

    fn track_in_flight(&mut self, groups: &[SaveGroup]) {
        for group in groups {
            let document_id = &group.request.document_id;
            for change in &group.changes {
                if !change.is_structural() {
                    self.in_flight.insert(change.key(), change.clone());
                    continue;
                }
                let base = self.staged_bases.get(document_id);
                if let (Some(sent), Some(base)) = (&group.staged_blocks, base) {
                    let flight = InFlightList {
                        base: base.clone(),
                        sent: sent.clone(),
                    };
                    self.in_flight_blocks.insert(document_id.clone(), flight);
                }
            }
        }
    }

    /// Move baselines to the sent values and remove the entries a
    /// successful write covered, unless they moved on
    fn confirm_saved(&mut self, group: &SaveGroup) {
        let document_id = &group.request.document_id;

        for sent in &group.changes {
            let key = sent.key();
            if sent.is_structural() {
                if let Some(flight) = self.in_flight_blocks.remove(document_id) {
                    self.confirmed_blocks
                        .entry(document_id.clone())
                        .or_insert_with(|| Confirmed::new(flight.base.clone()))
                        .advance(flight.base, flight.sent);
                }
            } else {
                self.in_flight.remove(&key);
                self.confirmed
                    .entry(key.clone())
                    .or_insert_with(|| Confirmed::new(sent.original_value.clone()))
                    .advance(sent.original_value.clone(), sent.new_value.clone());
            }

            if self.pending.get(&key) != Some(sent) {
                tracing::debug!(%key, "kept change registered during save");
                continue;
            }
            let restaged = self.staged.get(document_id) != group.staged_blocks.as_ref();
            if sent.is_structural() && restaged {
                tracing::debug!(%key, "kept block list restaged during save");
                continue;
            }
            self.pending.remove(&key);
            if sent.is_structural() {
                self.staged.remove(document_id);
                self.staged_bases.remove(document_id);
            }
        }
    }

    /// Undo the rebasing done while a failed write was in flight.
    ///
    /// Entries registered against the sent value go back to the remote one,
    /// and a sent change that collapsed against itself is pending again.
    fn restore_failed(&mut self, group: &SaveGroup) {
        for sent in &group.changes {
            if sent.is_structural() {
                self.restore_failed_blocks(&group.request.document_id, sent);
                continue;
            }

            let key = sent.key();
            if self.in_flight.remove(&key).is_none() {
                continue;
            }
            let collapsed = match self.pending.get_mut(&key) {
                Some(entry) if *entry == *sent => false,
                Some(entry) if entry.original_value == sent.new_value => {
                    entry.original_value = sent.original_value.clone();
                    entry.is_noop()
                }
                Some(_) => false,
                None => {
                    self.pending.insert(key.clone(), sent.clone());
                    false
                }
            };
            if collapsed {
                self.pending.remove(&key);
            }
        }
    }

    fn restore_failed_blocks(&mut self, document_id: &str, sent: &PendingChange) {
        let Some(flight) = self.in_flight_blocks.remove(document_id) else {
            return;
        };
        let key = sent.key();

        match self.staged.get(document_id).cloned() {
            None => {
                self.staged.insert(document_id.to_string(), flight.sent);
                self.staged_bases.insert(document_id.to_string(), flight.base);
                self.pending.insert(key, sent.clone());
            }
            Some(blocks) if self.staged_bases.get(document_id) == Some(&flight.sent) => {
                if blocks == flight.base {
                    self.staged.remove(document_id);
                    self.staged_bases.remove(document_id);
                    self.pending.remove(&key);
                } else {
                    self.staged_bases.insert(document_id.to_string(), flight.base);
                }
            }
            Some(_) => {}
        }
    }
}

/// Clears the saving flag when the save finishes or its future is dropped
struct SavingGuard {
    state: Arc<Mutex<SessionState>>,
}

impl Drop for SavingGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.saving = false;
        state.in_flight.clear();
        state.in_flight_blocks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmsedit_common::BLOCKS_FIELD;

    fn change(field: &str, new: &str, original: &str) -> PendingChange {
        PendingChange::new("doc-1", "page", field, new, original)
    }

    #[test]
    fn test_unauthorized_session() {
        let session = EditSession::new(false);
        assert!(matches!(session.enter_edit_mode(), Err(EditorError::NotAuthorized)));
        assert!(matches!(
            session.register_change(change("title", "B", "A")),
            Err(EditorError::NotAuthorized)
        ));
        assert!(!session.is_edit_mode_active());
    }

    #[test]
    fn test_toggle_edit_mode_keeps_pending() {
        let session = EditSession::new(true);
        assert!(session.toggle_edit_mode().unwrap());
        session.register_change(change("title", "B", "A")).unwrap();
        assert!(!session.toggle_edit_mode().unwrap());
        assert_eq!(session.pending_count(), 1);
    }

    #[test]
    fn test_registration_outcomes() {
        let session = EditSession::new(true);
        let register = |new: &str| session.register_change(change("title", new, "A")).unwrap();
        assert_eq!(register("B"), ChangeOutcome::Added);
        assert_eq!(register("B"), ChangeOutcome::Unchanged);
        assert_eq!(register("C"), ChangeOutcome::Updated);
        assert_eq!(register("A"), ChangeOutcome::Removed);
        assert_eq!(register("A"), ChangeOutcome::Unchanged);
        assert!(!session.has_pending());
    }

    #[test]
    fn test_block_list_collapse_unstages() {
        let session = EditSession::new(true);
        let remote = vec![Block::new("b1", "Spacer"), Block::new("b2", "Hero")];
        let blocks = vec![Block::new("b2", "Hero"), Block::new("b1", "Spacer")];

        session
            .register_block_list("doc-1", "page", &remote, &blocks, StructuralMarker::Reordered)
            .unwrap();
        assert!(session.is_field_dirty("doc-1", BLOCKS_FIELD));
        assert_eq!(session.staged_blocks("doc-1"), Some(blocks));

        let outcome = session
            .register_block_list("doc-1", "page", &remote, &remote, StructuralMarker::Reordered)
            .unwrap();
        assert_eq!(outcome, ChangeOutcome::Removed);
        assert!(session.staged_blocks("doc-1").is_none());
        assert!(!session.has_pending());
    }

    #[test]
    fn test_discard_bumps_generation() {
        let session = EditSession::new(true);
        session.register_change(change("title", "B", "A")).unwrap();
        let remote = [Block::new("b1", "Hero")];
        session
            .register_block_list("doc-1", "page", &remote, &[], StructuralMarker::Deleted)
            .unwrap();

        session.discard_all_changes().unwrap();
        assert_eq!(session.generation(), 1);
        assert!(!session.has_pending());
        assert!(session.staged_blocks("doc-1").is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let session = EditSession::new(true);
        let other = session.clone();
        other.register_change(change("title", "B", "A")).unwrap();
        assert!(session.is_field_dirty("doc-1", "title"));
    }

    #[test]
    fn test_confirmed_value_follows_saves() {
        let mut confirmed = Confirmed::new("A".to_string());
        confirmed.advance("A".to_string(), "B".to_string());
        assert_eq!(confirmed.resolve("A"), "B");
        assert_eq!(confirmed.resolve("fresh"), "fresh");

        confirmed.advance("B".to_string(), "A".to_string());
        assert_eq!(confirmed.resolve("B"), "A");
        assert_eq!(confirmed.resolve("A"), "A");
        assert_eq!(confirmed.superseded, ["B"]);
    }
}
