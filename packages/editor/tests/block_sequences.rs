//! Sequences of structural operations on the block list
//!
//! This tests:
//! - Reorders that cancel out
//! - Boundary moves
//! - Inserting from the catalog
//! - Mixed sequences and what ends up pending

use cmsedit_editor::{
    Block, BlockListEditor, ChangeKey, ComponentCatalog, EditSession, RemoteDocument,
    StructuralMarker,
};

fn document(ids: &[&str]) -> RemoteDocument {
    let blocks = ids.iter().map(|id| Block::new(*id, "TextBlock")).collect();
    RemoteDocument::new("home", "page").with_blocks(blocks)
}

fn ids(editor: &BlockListEditor) -> Vec<String> {
    editor.blocks().iter().map(|b| b.id.clone()).collect()
}

fn setup(ids: &[&str]) -> (EditSession, BlockListEditor) {
    let session = EditSession::new(true);
    session.enter_edit_mode().unwrap();
    let editor = BlockListEditor::mount(&document(ids), &session);
    (session, editor)
}

#[test]
fn test_move_down_then_up_restores_order() {
    let (session, mut editor) = setup(&["a", "b", "c", "d"]);

    for i in 0..3 {
        assert!(editor.move_down(i, &session).unwrap());
        assert!(session.has_pending());
        assert!(editor.move_up(i + 1, &session).unwrap());
        assert_eq!(ids(&editor), ["a", "b", "c", "d"]);
        assert!(!session.has_pending(), "reorder at {i} should collapse");
    }
}

#[test]
fn test_boundary_moves_are_noops() {
    let (session, mut editor) = setup(&["a", "b", "c"]);

    assert!(!editor.move_up(0, &session).unwrap());
    assert!(!editor.move_down(2, &session).unwrap());
    assert_eq!(ids(&editor), ["a", "b", "c"]);
    assert!(!session.has_pending());
}

#[test]
fn test_boundary_move_keeps_existing_marker() {
    let (session, mut editor) = setup(&["a", "b", "c"]);
    editor.delete_block(1, &session).unwrap();

    assert!(!editor.move_up(0, &session).unwrap());
    let change = session.pending_change(&ChangeKey::blocks("home")).unwrap();
    assert_eq!(change.new_value, StructuralMarker::Deleted.to_string());
}

#[test]
fn test_insert_hero_at_top() {
    let (session, mut editor) = setup(&["a", "b"]);

    let id = editor
        .insert_kind(0, "Hero", ComponentCatalog::builtin(), &session)
        .unwrap();

    assert_eq!(editor.len(), 3);
    assert_eq!(editor.blocks()[0].id, id);
    assert!(id != "a" && id != "b");
    assert_eq!(editor.blocks()[0].kind, "Hero");
    assert_eq!(
        editor.blocks()[0].config_value("title"),
        Some(&serde_json::json!("Headline"))
    );

    let change = session.pending_change(&ChangeKey::blocks("home")).unwrap();
    let inserted: Block = serde_json::from_str(&change.new_value).unwrap();
    assert_eq!(inserted.id, id);
    assert_eq!(session.staged_blocks("home").unwrap().len(), 3);
}

#[test]
fn test_insert_unknown_kind_fails_without_change() {
    let (session, mut editor) = setup(&["a"]);
    assert!(editor
        .insert_kind(0, "Carousel", ComponentCatalog::builtin(), &session)
        .is_err());
    assert_eq!(editor.len(), 1);
    assert!(!session.has_pending());
}

#[test]
fn test_insert_then_delete_collapses() {
    let (session, mut editor) = setup(&["a", "b"]);
    editor
        .insert_kind(1, "Divider", ComponentCatalog::builtin(), &session)
        .unwrap();
    editor.delete_block(1, &session).unwrap();

    assert_eq!(ids(&editor), ["a", "b"]);
    assert!(!session.has_pending());
    assert!(session.staged_blocks("home").is_none());
}

#[test]
fn test_structural_and_field_changes_coexist() {
    let (session, mut editor) = setup(&["a", "b"]);
    session
        .register_change(cmsedit_editor::PendingChange::new("home", "page", "title", "New", "Old"))
        .unwrap();
    editor.move_block(1, 0, &session).unwrap();

    let keys: Vec<String> = session
        .pending_changes()
        .iter()
        .map(|c| c.field_path.clone())
        .collect();
    assert_eq!(keys, ["blocks", "title"]);
}

#[test]
fn test_form_submission_targets_block_after_reorder() {
    let (session, mut editor) = setup(&["a", "b"]);
    let mut form = editor.open_form(0, ComponentCatalog::builtin()).unwrap();
    form.set_input("content", "<p>Hello</p>").unwrap();

    editor.move_down(0, &session).unwrap();
    editor.submit_form(form, &session).unwrap();

    assert_eq!(
        editor.blocks()[1].config_value("content"),
        Some(&serde_json::json!("<p>Hello</p>"))
    );
}
