//! # Content Orchestrator
//!
//! Decides per render whether a document is shown read-only or wrapped in
//! block controls. Block content comes from an external [`BlockRenderer`];
//! outputs are cached per block id so an operation on one block leaves its
//! siblings' renders alone.

use crate::block_editor::BlockListEditor;
use crate::block_form::BlockForm;
use crate::errors::EditorError;
use crate::session::EditSession;
use cmsedit_catalog::ComponentCatalog;
use cmsedit_common::{Block, Configuration, RemoteDocument};
use std::collections::{HashMap, HashSet};

/// Host-provided rendering of one block
pub trait BlockRenderer {
    type Output: Clone;

    fn render_block(&self, block: &Block) -> Self::Output;
}

/// Which controls a block wrapper offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockControls {
    pub can_move_up: bool,
    pub can_move_down: bool,
    pub can_delete: bool,
    pub can_insert_above: bool,
    pub can_insert_below: bool,
}

impl BlockControls {
    fn at(index: usize, len: usize) -> Self {
        Self {
            can_move_up: index > 0,
            can_move_down: index + 1 < len,
            can_delete: true,
            can_insert_above: true,
            can_insert_below: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditableBlockView<O> {
    pub id: String,
    pub index: usize,
    pub kind: String,
    pub controls: BlockControls,
    pub highlighted: bool,
    pub content: O,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageView<O> {
    ReadOnly(Vec<O>),
    Editing(Vec<EditableBlockView<O>>),
}

/// User intents coming from the block controls
#[derive(Debug, Clone, PartialEq)]
pub enum BlockAction {
    MoveUp(usize),
    MoveDown(usize),
    Move { from: usize, to: usize },
    Delete(usize),
    Insert { index: usize, kind: String },
    Configure { index: usize, configuration: Configuration },
    BeginDrag(usize),
    DragOver(usize),
    Drop,
    CancelDrag,
}

struct RenderCache<O> {
    entries: HashMap<String, (Block, O)>,
    renders: usize,
}

impl<O: Clone> RenderCache<O> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            renders: 0,
        }
    }

    fn get_or_render<R: BlockRenderer<Output = O>>(&mut self, block: &Block, renderer: &R) -> O {
        if let Some((cached, output)) = self.entries.get(&block.id) {
            if cached == block {
                return output.clone();
            }
        }
        let output = renderer.render_block(block);
        self.renders += 1;
        self.entries.insert(block.id.clone(), (block.clone(), output.clone()));
        output
    }

    fn retain(&mut self, blocks: &[Block]) {
        let live: HashSet<&str> = blocks.iter().map(|b| b.id.as_str()).collect();
        self.entries.retain(|id, _| live.contains(id.as_str()));
    }
}

pub struct ContentOrchestrator<'c, R: BlockRenderer> {
    renderer: R,
    catalog: &'c ComponentCatalog,
    editor: Option<BlockListEditor>,
    cache: RenderCache<R::Output>,
    hovered: Option<String>,
}

impl<R: BlockRenderer> ContentOrchestrator<'static, R> {
    /// Orchestrator over the built-in component catalog
    pub fn new(renderer: R) -> Self {
        Self::with_catalog(renderer, ComponentCatalog::builtin())
    }
}

impl<'c, R: BlockRenderer> ContentOrchestrator<'c, R> {
    pub fn with_catalog(renderer: R, catalog: &'c ComponentCatalog) -> Self {
        Self {
            renderer,
            catalog,
            editor: None,
            cache: RenderCache::new(),
            hovered: None,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mounted block editor, present only while editing
    pub fn editor(&self) -> Option<&BlockListEditor> {
        self.editor.as_ref()
    }

    /// Number of times the renderer has been invoked
    pub fn render_count(&self) -> usize {
        self.cache.renders
    }

    /// Highlight the block under pointer focus
    pub fn set_hovered(&mut self, block_id: Option<&str>) {
        self.hovered = block_id.map(str::to_string);
    }

    pub fn render(
        &mut self,
        remote: &RemoteDocument,
        session: &EditSession,
    ) -> PageView<R::Output> {
        if !session.is_edit_mode_active() {
            if self.editor.take().is_some() {
                tracing::debug!(document = %remote.id, "unmounted block editor");
            }
            self.cache.retain(&remote.blocks);
            let outputs = remote
                .blocks
                .iter()
                .map(|block| self.cache.get_or_render(block, &self.renderer))
                .collect();
            return PageView::ReadOnly(outputs);
        }

        let blocks = self.mount(remote, session).blocks().to_vec();
        self.cache.retain(&blocks);

        let len = blocks.len();
        let views = blocks
            .iter()
            .enumerate()
            .map(|(index, block)| EditableBlockView {
                id: block.id.clone(),
                index,
                kind: block.kind.clone(),
                controls: BlockControls::at(index, len),
                highlighted: self.hovered.as_deref() == Some(block.id.as_str()),
                content: self.cache.get_or_render(block, &self.renderer),
            })
            .collect();
        PageView::Editing(views)
    }

    /// Apply a block control action. Only valid while editing.
    pub fn handle(
        &mut self,
        action: BlockAction,
        session: &EditSession,
    ) -> Result<(), EditorError> {
        let catalog = self.catalog;
        let editor = self.active_editor(session)?;
        tracing::debug!(?action, "block action");

        match action {
            BlockAction::MoveUp(index) => {
                editor.move_up(index, session)?;
            }
            BlockAction::MoveDown(index) => {
                editor.move_down(index, session)?;
            }
            BlockAction::Move { from, to } => {
                editor.move_block(from, to, session)?;
            }
            BlockAction::Delete(index) => {
                editor.delete_block(index, session)?;
            }
            BlockAction::Insert { index, kind } => {
                editor.insert_kind(index, &kind, catalog, session)?;
            }
            BlockAction::Configure { index, configuration } => {
                editor.configure_block(index, configuration, session)?;
            }
            BlockAction::BeginDrag(index) => editor.begin_drag(index)?,
            BlockAction::DragOver(index) => editor.drag_over(index)?,
            BlockAction::Drop => {
                editor.drop(session)?;
            }
            BlockAction::CancelDrag => editor.cancel_drag(),
        }
        Ok(())
    }

    pub fn open_form(
        &mut self,
        index: usize,
        session: &EditSession,
    ) -> Result<BlockForm, EditorError> {
        let catalog = self.catalog;
        self.active_editor(session)?.open_form(index, catalog)
    }

    pub fn submit_form(
        &mut self,
        form: BlockForm,
        session: &EditSession,
    ) -> Result<(), EditorError> {
        self.active_editor(session)?.submit_form(form, session)
    }

    /// Remote document with its blocks replaced by the local list, if any
    pub fn effective_document(
        &self,
        remote: &RemoteDocument,
        session: &EditSession,
    ) -> RemoteDocument {
        let local = match &self.editor {
            Some(editor) if editor.document_id() == remote.id => Some(editor.blocks().to_vec()),
            _ => session.staged_blocks(&remote.id),
        };
        match local {
            Some(blocks) => remote.clone().with_blocks(blocks),
            None => remote.clone(),
        }
    }

    fn mount(&mut self, remote: &RemoteDocument, session: &EditSession) -> &mut BlockListEditor {
        if self.editor.as_ref().is_some_and(|e| e.document_id() != remote.id) {
            self.editor = None;
        }
        let editor = self
            .editor
            .get_or_insert_with(|| BlockListEditor::mount(remote, session));
        editor.sync_remote(&remote.blocks, session);
        editor.refresh(session);
        editor
    }

    fn active_editor(
        &mut self,
        session: &EditSession,
    ) -> Result<&mut BlockListEditor, EditorError> {
        if !session.is_edit_mode_active() {
            return Err(EditorError::EditModeInactive);
        }
        self.editor.as_mut().ok_or(EditorError::EditModeInactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Renders a block as "<kind>:<id>" and logs every call
    #[derive(Default)]
    struct RecordingRenderer {
        calls: RefCell<Vec<String>>,
    }

    impl BlockRenderer for RecordingRenderer {
        type Output = String;

        fn render_block(&self, block: &Block) -> String {
            self.calls.borrow_mut().push(block.id.clone());
            format!("{}:{}", block.kind, block.id)
        }
    }

    fn document() -> RemoteDocument {
        RemoteDocument::new("home", "page").with_blocks(vec![
            Block::new("a", "Hero"),
            Block::new("b", "TextBlock"),
            Block::new("c", "Spacer"),
        ])
    }

    #[test]
    fn test_read_only_render() {
        let session = EditSession::new(true);
        let mut orchestrator = ContentOrchestrator::new(RecordingRenderer::default());
        assert_eq!(
            orchestrator.render(&document(), &session),
            PageView::ReadOnly(vec!["Hero:a".into(), "TextBlock:b".into(), "Spacer:c".into()])
        );
        assert!(orchestrator.editor().is_none());
    }

    #[test]
    fn test_controls_at_edges() {
        let session = EditSession::new(true);
        session.enter_edit_mode().unwrap();
        let mut orchestrator = ContentOrchestrator::new(RecordingRenderer::default());

        let PageView::Editing(views) = orchestrator.render(&document(), &session) else {
            panic!("expected edit view");
        };
        assert!(!views[0].controls.can_move_up);
        assert!(views[0].controls.can_move_down);
        assert!(views[2].controls.can_move_up);
        assert!(!views[2].controls.can_move_down);
    }

    #[test]
    fn test_configure_rerenders_only_that_block() {
        let session = EditSession::new(true);
        session.enter_edit_mode().unwrap();
        let mut orchestrator = ContentOrchestrator::new(RecordingRenderer::default());
        orchestrator.render(&document(), &session);
        assert_eq!(orchestrator.render_count(), 3);

        let mut configuration = Configuration::new();
        configuration.insert("height".into(), 12.into());
        orchestrator
            .handle(BlockAction::Configure { index: 2, configuration }, &session)
            .unwrap();
        orchestrator.handle(BlockAction::MoveUp(1), &session).unwrap();
        orchestrator.render(&document(), &session);

        assert_eq!(orchestrator.render_count(), 4);
        assert_eq!(orchestrator.renderer().calls.borrow().last().map(String::as_str), Some("c"));
    }

    #[test]
    fn test_hover_highlight() {
        let session = EditSession::new(true);
        session.enter_edit_mode().unwrap();
        let mut orchestrator = ContentOrchestrator::new(RecordingRenderer::default());
        orchestrator.set_hovered(Some("b"));

        let PageView::Editing(views) = orchestrator.render(&document(), &session) else {
            panic!("expected edit view");
        };
        let highlighted: Vec<bool> = views.iter().map(|v| v.highlighted).collect();
        assert_eq!(highlighted, [false, true, false]);
    }

    #[test]
    fn test_actions_need_edit_mode() {
        let session = EditSession::new(true);
        let mut orchestrator = ContentOrchestrator::new(RecordingRenderer::default());
        orchestrator.render(&document(), &session);
        assert!(matches!(
            orchestrator.handle(BlockAction::Delete(0), &session),
            Err(EditorError::EditModeInactive)
        ));
    }

    #[test]
    fn test_effective_document_survives_exit() {
        let session = EditSession::new(true);
        session.enter_edit_mode().unwrap();
        let mut orchestrator = ContentOrchestrator::new(RecordingRenderer::default());
        orchestrator.render(&document(), &session);
        orchestrator.handle(BlockAction::Delete(0), &session).unwrap();

        session.exit_edit_mode();
        let view = orchestrator.render(&document(), &session);
        assert!(matches!(view, PageView::ReadOnly(ref outputs) if outputs.len() == 3));

        let effective = orchestrator.effective_document(&document(), &session);
        assert_eq!(effective.block_ids(), ["b", "c"]);
    }
}
