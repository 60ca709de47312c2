use super::script::{parse_script, run_script};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use cmsedit_client::HttpContentApi;
use cmsedit_common::{PendingChange, RemoteDocument};
use cmsedit_editor::{EditSession, EditToolbar, EditorError, PageView, SaveReport, SaveSummary};
use colored::Colorize;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Remote document JSON ({documentId, documentKind, fields, blocks})
    pub document: PathBuf,

    /// JSON array of edit operations to replay
    #[arg(short, long)]
    pub script: PathBuf,

    /// Run as an authorized editor
    #[arg(long)]
    pub admin: bool,

    /// Post the pending changes to the configured save endpoint
    #[arg(long)]
    pub save: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn edit(args: EditArgs, config: &Config) -> Result<()> {
    let source = fs::read_to_string(&args.document)
        .with_context(|| format!("Cannot read document {}", args.document.display()))?;
    let document = RemoteDocument::from_json(&source)
        .with_context(|| format!("Invalid document {}", args.document.display()))?;

    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("Cannot read script {}", args.script.display()))?;
    let ops = parse_script(&script)?;

    let session = EditSession::new(args.admin);
    let toolbar = EditToolbar::new(session.clone());
    toolbar.toggle_edit_mode().map_err(|err| match err {
        EditorError::NotAuthorized => anyhow!("Editing requires --admin"),
        other => other.into(),
    })?;

    let mut orchestrator = run_script(&document, &ops, &session, &config.editor)?;
    let pending = session.pending_changes();
    let effective = orchestrator.effective_document(&document, &session);
    let outline: Vec<(String, String)> = match orchestrator.render(&document, &session) {
        PageView::Editing(views) => views.into_iter().map(|v| (v.id, v.content)).collect(),
        PageView::ReadOnly(outputs) => outputs.into_iter().map(|o| (String::new(), o)).collect(),
    };

    let summary = if args.save {
        let api = HttpContentApi::new(&config.editor)?;
        let runtime = tokio::runtime::Runtime::new()?;
        Some(runtime.block_on(toolbar.save(&api))?)
    } else {
        None
    };

    match args.format {
        OutputFormat::Text => print_text(&document, &pending, &outline, summary.as_ref()),
        OutputFormat::Json => {
            let output = json!({
                "pendingChanges": pending,
                "effectiveDocument": effective,
                "save": summary.as_ref().map(|s| report_json(&s.report)),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    match summary {
        Some(summary) if !summary.report.is_success() => Err(anyhow!(summary.message)),
        _ => Ok(()),
    }
}

fn print_text(
    document: &RemoteDocument,
    pending: &[PendingChange],
    outline: &[(String, String)],
    summary: Option<&SaveSummary>,
) {
    println!("{}", format!("Pending changes ({})", pending.len()).bright_blue().bold());
    if pending.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for change in pending {
        let key = format!("{}/{}", change.document_id, change.field_path);
        if change.is_structural() {
            println!("  {} {}", key.yellow(), preview(&change.new_value).dimmed());
        } else {
            println!(
                "  {} {} → {}",
                key.yellow(),
                preview(&change.original_value).dimmed(),
                preview(&change.new_value).green()
            );
        }
    }
    println!();

    println!(
        "{}",
        format!("Blocks of {} ({})", document.id, document.kind).bright_blue().bold()
    );
    for (index, (id, line)) in outline.iter().enumerate() {
        println!("  {:>2}. {} {}", index, line, format!("[{id}]").dimmed());
    }

    if let Some(summary) = summary {
        println!();
        for outcome in &summary.report.outcomes {
            match &outcome.result {
                Ok(()) => println!(
                    "  {} {} ({})",
                    "✓".green(),
                    outcome.document_id,
                    outcome.fields.join(", ")
                ),
                Err(err) => println!("  {} {} - {}", "✗".red(), outcome.document_id, err),
            }
        }
        if summary.report.is_success() {
            println!("{}", summary.message.green().bold());
        }
    }
}

fn report_json(report: &SaveReport) -> Value {
    let outcomes: Vec<Value> = report
        .outcomes
        .iter()
        .map(|o| {
            json!({
                "documentId": o.document_id,
                "documentKind": o.document_kind,
                "fields": o.fields,
                "ok": o.is_success(),
                "error": o.result.as_ref().err().map(ToString::to_string),
            })
        })
        .collect();
    json!({ "success": report.is_success(), "documents": outcomes })
}

fn preview(value: &str) -> String {
    const MAX: usize = 60;
    let flat = value.replace('\n', " ");
    if flat.chars().count() <= MAX {
        format!("{flat:?}")
    } else {
        let cut: String = flat.chars().take(MAX).collect();
        format!("{:?}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmsedit_editor::{DocumentSaveOutcome, SaveError};

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short"), "\"short\"");
        let long = "x".repeat(80);
        assert!(preview(&long).ends_with('…'));
    }

    #[test]
    fn test_report_json() {
        let report = SaveReport {
            outcomes: vec![DocumentSaveOutcome {
                document_id: "home".into(),
                document_kind: "page".into(),
                fields: vec!["title".into()],
                result: Err(SaveError::Status(500)),
            }],
        };
        let value = report_json(&report);
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["documents"][0]["ok"], json!(false));
        assert_eq!(
            value["documents"][0]["error"],
            json!("remote rejected the save with status 500")
        );
    }
}
