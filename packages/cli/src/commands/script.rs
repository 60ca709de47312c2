//! Edit scripts: a JSON array of operations replayed against one document
//! the way a user would perform them in the editing surface.

use anyhow::{Context, Result};
use cmsedit_common::{value_to_text, Block, RemoteDocument};
use cmsedit_editor::{
    BlockAction, BlockRenderer, ContentOrchestrator, EditSession, EditorConfig, RichTextFieldEditor,
    TextFieldEditor, ToolbarCommand,
};
use cmsedit_richtext::{ListKind, Mark};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ScriptOp {
    /// Type a new value into a plain-text field
    SetField { field: String, value: String },

    /// Replace and/or format a rich-text field
    SetRichField {
        field: String,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        marks: Vec<Mark>,
        #[serde(default)]
        list: Option<ListKind>,
        #[serde(default)]
        link: Option<String>,
    },

    MoveUp { index: usize },
    MoveDown { index: usize },
    Move { from: usize, to: usize },
    Delete { index: usize },
    Insert { index: usize, kind: String },

    /// Fill the block's property form; strings go through input coercion
    Configure { index: usize, values: Map<String, Value> },
}

impl ScriptOp {
    fn name(&self) -> &'static str {
        match self {
            ScriptOp::SetField { .. } => "setField",
            ScriptOp::SetRichField { .. } => "setRichField",
            ScriptOp::MoveUp { .. } => "moveUp",
            ScriptOp::MoveDown { .. } => "moveDown",
            ScriptOp::Move { .. } => "move",
            ScriptOp::Delete { .. } => "delete",
            ScriptOp::Insert { .. } => "insert",
            ScriptOp::Configure { .. } => "configure",
        }
    }
}

/// Renders a block as a one-line outline entry
pub struct OutlineRenderer;

impl BlockRenderer for OutlineRenderer {
    type Output = String;

    fn render_block(&self, block: &Block) -> String {
        let headline = ["title", "question", "quote", "alt", "content"]
            .iter()
            .find_map(|key| block.config_value(key))
            .map(value_to_text)
            .unwrap_or_default();
        if headline.is_empty() {
            block.kind.clone()
        } else {
            format!("{} \"{}\"", block.kind, truncate(&headline, 40))
        }
    }
}

pub fn parse_script(source: &str) -> Result<Vec<ScriptOp>> {
    serde_json::from_str(source).context("Invalid edit script")
}

/// Replay `ops` against `document` in an active edit session
pub fn run_script(
    document: &RemoteDocument,
    ops: &[ScriptOp],
    session: &EditSession,
    config: &EditorConfig,
) -> Result<ContentOrchestrator<'static, OutlineRenderer>> {
    let mut orchestrator = ContentOrchestrator::new(OutlineRenderer);
    orchestrator.render(document, session);

    for (step, op) in ops.iter().enumerate() {
        apply(op, document, session, config, &mut orchestrator)
            .with_context(|| format!("Script step {} ({}) failed", step + 1, op.name()))?;
        tracing::debug!(
            step = step + 1,
            op = op.name(),
            pending = session.pending_count(),
            "applied"
        );
    }

    Ok(orchestrator)
}

fn apply(
    op: &ScriptOp,
    document: &RemoteDocument,
    session: &EditSession,
    config: &EditorConfig,
    orchestrator: &mut ContentOrchestrator<'static, OutlineRenderer>,
) -> Result<()> {
    match op {
        ScriptOp::SetField { field, value } => {
            document.require_field(field)?;
            let mut editor = TextFieldEditor::for_field(document, field, session);
            editor.activate(session);
            editor.input(value.clone());
            editor.blur(session)?;
        }
        ScriptOp::SetRichField {
            field,
            text,
            marks,
            list,
            link,
        } => {
            document.require_field(field)?;
            let now = Instant::now();
            let mut editor = RichTextFieldEditor::for_field(document, field, session, config);
            editor.activate(session);
            if let Some(text) = text {
                editor.select_all();
                editor.insert_text(text);
            }
            editor.select_all();
            for mark in marks {
                editor.apply(ToolbarCommand::ToggleMark(*mark), session, now);
            }
            if let Some(kind) = list {
                editor.apply(ToolbarCommand::ToggleList(*kind), session, now);
            }
            if let Some(href) = link {
                editor.apply(ToolbarCommand::SetLink(Some(href.clone())), session, now);
            }
            editor.blur(session, now)?;
        }
        ScriptOp::MoveUp { index } => orchestrator.handle(BlockAction::MoveUp(*index), session)?,
        ScriptOp::MoveDown { index } => {
            orchestrator.handle(BlockAction::MoveDown(*index), session)?
        }
        ScriptOp::Move { from, to } => {
            orchestrator.handle(BlockAction::Move { from: *from, to: *to }, session)?
        }
        ScriptOp::Delete { index } => orchestrator.handle(BlockAction::Delete(*index), session)?,
        ScriptOp::Insert { index, kind } => orchestrator.handle(
            BlockAction::Insert {
                index: *index,
                kind: kind.clone(),
            },
            session,
        )?,
        ScriptOp::Configure { index, values } => {
            let mut form = orchestrator.open_form(*index, session)?;
            if form.is_degraded() {
                tracing::warn!(kind = form.kind(), "configuring a block without a declared schema");
            }
            for (key, value) in values {
                match value {
                    Value::String(raw) => form.set_input(key, raw)?,
                    other => form.set_value(key, other.clone())?,
                }
            }
            orchestrator.submit_form(form, session)?;
        }
    }
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max && line.len() == text.len() {
        return line.to_string();
    }
    let cut: String = line.chars().take(max).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmsedit_common::ChangeKey;

    fn document() -> RemoteDocument {
        serde_json::from_str(
            r#"{
                "documentId": "home",
                "documentKind": "page",
                "fields": { "title": "Old", "intro": "<p>Welcome</p>" },
                "blocks": [
                    { "id": "b1", "type": "Hero", "props": { "title": "Hi" } },
                    { "id": "b2", "type": "Spacer", "props": { "height": 48 } }
                ]
            }"#,
        )
        .unwrap()
    }

    fn session() -> EditSession {
        let session = EditSession::new(true);
        session.enter_edit_mode().unwrap();
        session
    }

    #[test]
    fn test_parse_script() {
        let ops = parse_script(
            r#"[
                { "op": "setField", "field": "title", "value": "New" },
                { "op": "setRichField", "field": "intro", "marks": ["bold"], "list": "bullet" },
                { "op": "move", "from": 0, "to": 1 },
                { "op": "insert", "index": 0, "kind": "Hero" }
            ]"#,
        )
        .unwrap();

        assert_eq!(ops.len(), 4);
        assert_eq!(
            ops[1],
            ScriptOp::SetRichField {
                field: "intro".into(),
                text: None,
                marks: vec![Mark::Bold],
                list: Some(ListKind::Bullet),
                link: None,
            }
        );
        assert_eq!(ops[2], ScriptOp::Move { from: 0, to: 1 });
    }

    #[test]
    fn test_unknown_op_rejected() {
        assert!(parse_script(r#"[{ "op": "undo" }]"#).is_err());
    }

    #[test]
    fn test_run_script() {
        let doc = document();
        let session = session();
        let ops = parse_script(
            r#"[
                { "op": "setField", "field": "title", "value": "New" },
                { "op": "setRichField", "field": "intro", "marks": ["italic"] },
                { "op": "moveDown", "index": 0 },
                { "op": "configure", "index": 0, "values": { "height": "96" } }
            ]"#,
        )
        .unwrap();

        let orchestrator = run_script(&doc, &ops, &session, &EditorConfig::default()).unwrap();

        assert_eq!(
            session.pending_change(&ChangeKey::new("home", "title")).unwrap().new_value,
            "New"
        );
        assert_eq!(
            session.pending_change(&ChangeKey::new("home", "intro")).unwrap().new_value,
            "<p><em>Welcome</em></p>"
        );

        let effective = orchestrator.effective_document(&doc, &session);
        assert_eq!(effective.block_ids(), ["b2", "b1"]);
        assert_eq!(effective.blocks[0].config_value("height"), Some(&serde_json::json!(96)));
    }

    #[test]
    fn test_failing_step_is_reported() {
        let doc = document();
        let session = session();
        let ops = vec![ScriptOp::Delete { index: 7 }];

        let Err(err) = run_script(&doc, &ops, &session, &EditorConfig::default()) else {
            panic!("expected the delete to fail");
        };
        assert_eq!(err.to_string(), "Script step 1 (delete) failed");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let doc = document();
        let session = session();
        let ops = vec![ScriptOp::SetField {
            field: "titel".into(),
            value: "x".into(),
        }];

        assert!(run_script(&doc, &ops, &session, &EditorConfig::default()).is_err());
        assert!(!session.has_pending());
    }

    #[test]
    fn test_outline_renderer() {
        let hero = &document().blocks[0];
        assert_eq!(OutlineRenderer.render_block(hero), "Hero \"Hi\"");
        assert_eq!(truncate("line one\nline two", 40), "line one…");
    }
}
