//! Edit toolbar: the session-level controls (edit mode, save, discard).

use crate::errors::EditorError;
use crate::save::{ContentApi, SaveReport};
use crate::session::EditSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarView {
    pub edit_mode: bool,
    pub authorized: bool,
    pub pending_count: usize,
    pub saving: bool,
    pub can_save: bool,
    pub can_discard: bool,
}

/// Result of the save button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub report: SaveReport,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct EditToolbar {
    session: EditSession,
}

impl EditToolbar {
    pub fn new(session: EditSession) -> Self {
        Self { session }
    }

    pub fn view(&self) -> ToolbarView {
        let pending_count = self.session.pending_count();
        let saving = self.session.is_saving();
        ToolbarView {
            edit_mode: self.session.is_edit_mode_active(),
            authorized: self.session.is_authorized(),
            pending_count,
            saving,
            can_save: pending_count > 0 && !saving,
            can_discard: pending_count > 0 && !saving,
        }
    }

    pub fn toggle_edit_mode(&self) -> Result<bool, EditorError> {
        self.session.toggle_edit_mode()
    }

    pub async fn save(&self, api: &dyn ContentApi) -> Result<SaveSummary, EditorError> {
        let report = self.session.save_all_changes(api).await?;
        let message = summarize(&report);
        Ok(SaveSummary { report, message })
    }

    pub fn discard(&self) -> Result<(), EditorError> {
        self.session.discard_all_changes()
    }
}

/// User-facing one-liner for a save report
pub fn summarize(report: &SaveReport) -> String {
    if report.is_empty() {
        return "No changes to save".to_string();
    }
    if report.is_success() {
        return "All changes saved".to_string();
    }
    let failed: Vec<&str> = report.failed().map(|o| o.document_id.as_str()).collect();
    format!(
        "{} of {} documents failed to save: {}",
        failed.len(),
        report.outcomes.len(),
        failed.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::{DocumentSaveOutcome, SaveError};
    use cmsedit_common::PendingChange;

    fn outcome(id: &str, result: Result<(), SaveError>) -> DocumentSaveOutcome {
        DocumentSaveOutcome {
            document_id: id.into(),
            document_kind: "page".into(),
            fields: vec!["title".into()],
            result,
        }
    }

    #[test]
    fn test_view_tracks_session() {
        let session = EditSession::new(true);
        let toolbar = EditToolbar::new(session.clone());
        assert!(!toolbar.view().can_save);

        assert!(toolbar.toggle_edit_mode().unwrap());
        session
            .register_change(PendingChange::new("doc-1", "page", "title", "B", "A"))
            .unwrap();

        let view = toolbar.view();
        assert!(view.edit_mode);
        assert_eq!(view.pending_count, 1);
        assert!(view.can_save && view.can_discard);

        toolbar.discard().unwrap();
        assert!(!toolbar.view().can_discard);
    }

    #[test]
    fn test_summaries() {
        assert_eq!(summarize(&SaveReport::default()), "No changes to save");
        assert_eq!(
            summarize(&SaveReport {
                outcomes: vec![outcome("a", Ok(()))]
            }),
            "All changes saved"
        );
        assert_eq!(
            summarize(&SaveReport {
                outcomes: vec![
                    outcome("a", Ok(())),
                    outcome("b", Err(SaveError::Status(500))),
                    outcome("c", Err(SaveError::Transport("timeout".into()))),
                ]
            }),
            "2 of 3 documents failed to save: b, c"
        );
    }
}
