//! # Structural Block Editor
//!
//! Holds a local copy of a document's block list while edit mode is on.
//! Every operation rewrites the local list and then reconciles it with the
//! session: if the list is back to the baseline order the structural change
//! collapses, otherwise a marker is registered and the list is staged for
//! the next save. The baseline is the remote list, or whatever this session
//! has since sent for the document.
//!
//! Boundary moves and same-index moves are no-ops that register nothing.

use crate::block_form::BlockForm;
use crate::errors::EditorError;
use crate::session::EditSession;
use cmsedit_catalog::{CatalogError, ComponentCatalog, ComponentPicker, PickedComponent};
use cmsedit_common::{
    generate_unique_block_id, Block, Configuration, RemoteDocument, StructuralMarker,
};

/// In-progress pointer drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub from: usize,
    pub over: usize,
}

#[derive(Debug, Clone)]
pub struct BlockListEditor {
    document_id: String,
    document_kind: String,
    remote: Vec<Block>,
    baseline: Vec<Block>,
    local: Vec<Block>,
    drag: Option<DragState>,
    seen_generation: u64,
}

impl BlockListEditor {
    /// Mount over a document, resuming from a staged list if there is one
    pub fn mount(document: &RemoteDocument, session: &EditSession) -> Self {
        let baseline = session.block_baseline(&document.id, &document.blocks);
        let local = session
            .staged_blocks(&document.id)
            .unwrap_or_else(|| baseline.clone());
        tracing::debug!(document = %document.id, blocks = local.len(), "mounted block editor");
        Self {
            document_id: document.id.clone(),
            document_kind: document.kind.clone(),
            remote: document.blocks.clone(),
            baseline,
            local,
            drag: None,
            seen_generation: session.generation(),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn blocks(&self) -> &[Block] {
        &self.local
    }

    pub fn len(&self) -> usize {
        self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    /// Local order differs from the baseline list
    pub fn is_diverged(&self) -> bool {
        self.local != self.baseline
    }

    pub fn drag_state(&self) -> Option<DragState> {
        self.drag
    }

    /// Take a new remote list. The local list follows only if it has not diverged.
    pub fn sync_remote(&mut self, blocks: &[Block], session: &EditSession) {
        if self.remote == blocks {
            return;
        }
        self.remote = blocks.to_vec();
        let baseline = session.block_baseline(&self.document_id, &self.remote);
        if !self.is_diverged() {
            self.local = baseline.clone();
        }
        self.baseline = baseline;
    }

    /// Pick up the current baseline, and reset to it after a discard
    pub fn refresh(&mut self, session: &EditSession) {
        self.baseline = session.block_baseline(&self.document_id, &self.remote);
        let generation = session.generation();
        if generation != self.seen_generation {
            self.seen_generation = generation;
            self.local = self.baseline.clone();
            self.drag = None;
        }
    }

    pub fn move_up(&mut self, index: usize, session: &EditSession) -> Result<bool, EditorError> {
        self.check_index(index)?;
        if index == 0 {
            return Ok(false);
        }
        self.local.swap(index - 1, index);
        self.commit(StructuralMarker::Reordered, session)?;
        Ok(true)
    }

    pub fn move_down(&mut self, index: usize, session: &EditSession) -> Result<bool, EditorError> {
        self.check_index(index)?;
        if index + 1 == self.local.len() {
            return Ok(false);
        }
        self.local.swap(index, index + 1);
        self.commit(StructuralMarker::Reordered, session)?;
        Ok(true)
    }

    /// Move the block at `from` so it ends up at `to`
    pub fn move_block(
        &mut self,
        from: usize,
        to: usize,
        session: &EditSession,
    ) -> Result<bool, EditorError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(false);
        }
        let block = self.local.remove(from);
        self.local.insert(to, block);
        self.commit(StructuralMarker::Reordered, session)?;
        Ok(true)
    }

    pub fn delete_block(
        &mut self,
        index: usize,
        session: &EditSession,
    ) -> Result<Block, EditorError> {
        self.check_index(index)?;
        let removed = self.local.remove(index);
        self.commit(StructuralMarker::Deleted, session)?;
        Ok(removed)
    }

    /// Splice a new block in at `index` (`0..=len`), returning its id
    pub fn insert_block(
        &mut self,
        index: usize,
        picked: PickedComponent,
        session: &EditSession,
    ) -> Result<String, EditorError> {
        if index > self.local.len() {
            return Err(EditorError::IndexOutOfBounds {
                index,
                len: self.local.len(),
            });
        }
        let id = generate_unique_block_id(self.local.iter().map(|b| b.id.as_str()));
        let block = Block::new(id.clone(), picked.kind).with_configuration(picked.configuration);
        let marker = StructuralMarker::for_block(&block)?;

        self.local.insert(index, block);
        self.commit(marker, session)?;
        Ok(id)
    }

    /// Pick `kind` from the catalog and insert it with its default configuration
    pub fn insert_kind(
        &mut self,
        index: usize,
        kind: &str,
        catalog: &ComponentCatalog,
        session: &EditSession,
    ) -> Result<String, EditorError> {
        let mut picker = ComponentPicker::new(catalog);
        picker.choose(kind)?;
        let picked = picker
            .confirm()
            .ok_or_else(|| CatalogError::UnknownKind(kind.to_string()))?;
        self.insert_block(index, picked, session)
    }

    pub fn configure_block(
        &mut self,
        index: usize,
        configuration: Configuration,
        session: &EditSession,
    ) -> Result<(), EditorError> {
        self.check_index(index)?;
        let block = &mut self.local[index];
        if block.configuration == configuration {
            return Ok(());
        }
        block.configuration = configuration;
        let marker = StructuralMarker::for_block(block)?;
        self.commit(marker, session)
    }

    pub fn open_form(
        &self,
        index: usize,
        catalog: &ComponentCatalog,
    ) -> Result<BlockForm, EditorError> {
        self.check_index(index)?;
        Ok(BlockForm::open(index, &self.local[index], catalog))
    }

    /// Submit a property form. The block is found by id in case the list moved.
    pub fn submit_form(
        &mut self,
        form: BlockForm,
        session: &EditSession,
    ) -> Result<(), EditorError> {
        let index = self
            .local
            .iter()
            .position(|b| b.id == form.block_id())
            .ok_or(EditorError::IndexOutOfBounds {
                index: form.index(),
                len: self.local.len(),
            })?;
        self.configure_block(index, form.into_configuration(), session)
    }

    pub fn begin_drag(&mut self, index: usize) -> Result<(), EditorError> {
        self.check_index(index)?;
        self.drag = Some(DragState {
            from: index,
            over: index,
        });
        Ok(())
    }

    pub fn drag_over(&mut self, index: usize) -> Result<(), EditorError> {
        self.check_index(index)?;
        if let Some(drag) = self.drag.as_mut() {
            drag.over = index;
        }
        Ok(())
    }

    /// Finish a drag. Returns true if the order changed.
    pub fn drop(&mut self, session: &EditSession) -> Result<bool, EditorError> {
        match self.drag.take() {
            Some(DragState { from, over }) => self.move_block(from, over, session),
            None => Ok(false),
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    fn check_index(&self, index: usize) -> Result<(), EditorError> {
        if index < self.local.len() {
            Ok(())
        } else {
            Err(EditorError::IndexOutOfBounds {
                index,
                len: self.local.len(),
            })
        }
    }

    fn commit(
        &mut self,
        marker: StructuralMarker,
        session: &EditSession,
    ) -> Result<(), EditorError> {
        let outcome = session.register_block_list(
            &self.document_id,
            &self.document_kind,
            &self.remote,
            &self.local,
            marker,
        )?;
        self.baseline = session.block_baseline(&self.document_id, &self.remote);
        tracing::debug!(
            document = %self.document_id,
            ?outcome,
            blocks = self.local.len(),
            "block list committed"
        );
        Ok(())
    }
}
