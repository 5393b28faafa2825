//! CLI presentation: text and json formatters per command.

use crate::error::{invalid_data, GenerationError};
use crate::generation::RunReport;
use crate::history::{HistoryRecord, RollbackReport};
use crate::run::GenerationRun;
use crate::store::SectionRecord;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

fn to_json(value: &serde_json::Value) -> Result<String, GenerationError> {
    serde_json::to_string_pretty(value).map_err(|e| GenerationError::Storage(invalid_data(e)))
}

/// Section tree, one line per section, indented by depth.
pub fn format_section_tree(sections: &[SectionRecord]) -> String {
    if sections.is_empty() {
        return "No sections found".to_string();
    }
    let mut out = String::new();
    for section in sections {
        let indent = "— ".repeat(section.depth_level.saturating_sub(1) as usize);
        let marker = if section.auto_generated {
            format!(" {}", "[generated]".dimmed())
        } else {
            String::new()
        };
        out.push_str(&format!(
            "{}{} ({}){}\n",
            indent, section.name, section.id, marker
        ));
    }
    out.trim_end().to_string()
}

pub fn format_run_report(report: &RunReport, format: &str) -> Result<String, GenerationError> {
    if format == "json" {
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|f| json!({ "section_id": f.section_id(), "error": f.to_string() }))
            .collect();
        return to_json(&json!({
            "run_id": report.run_id,
            "phase": report.phase.to_string(),
            "snapshotted": report.snapshotted,
            "skipped": report.skipped,
            "requested": report.requested,
            "updated": report.updated,
            "unknown_ids": report.unchanged_unknown,
            "failures": failures,
        }));
    }

    let mut out = format!("{}\n", format!("Run {} {}", report.run_id, report.phase).bold());
    out.push_str(&format!(
        "  Snapshotted: {}\n  Skipped (already generated): {}\n  Requested: {}\n  Updated: {}\n  Unknown ids ignored: {}",
        report.snapshotted, report.skipped, report.requested, report.updated, report.unchanged_unknown
    ));
    let hard: Vec<_> = report.hard_failures().collect();
    if !hard.is_empty() {
        out.push_str(&format!("\n  {}", format!("Failed items: {}", hard.len()).red()));
        for failure in hard {
            out.push_str(&format!("\n    - {}", failure));
        }
    }
    Ok(out)
}

pub fn format_history_table(
    run_id: u64,
    records: &[HistoryRecord],
    format: &str,
) -> Result<String, GenerationError> {
    if format == "json" {
        let value = serde_json::to_value(records).map_err(|e| GenerationError::Storage(invalid_data(e)))?;
        return to_json(&value);
    }
    if records.is_empty() {
        return Ok(format!("No history recorded for run {}", run_id));
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Section", "H1", "Title", "Description", "Recorded At"]);
    for r in records {
        let section = r.section_id.to_string();
        table.add_row(vec![&section, &r.name, &r.title, &r.description, &r.recorded_at]);
    }
    Ok(table.to_string())
}

pub fn format_runs_table(runs: &[GenerationRun], format: &str) -> Result<String, GenerationError> {
    if format == "json" {
        let arr: Vec<serde_json::Value> = runs
            .iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "done": r.done,
                    "iblock_id": r.settings.iblock_id,
                    "section_id": r.settings.section_id,
                    "provider": r.settings.provider.as_str(),
                    "ai_model": r.settings.ai_model,
                    "created_at": r.created_at,
                    "completed_at": r.completed_at,
                })
            })
            .collect();
        return to_json(&serde_json::Value::Array(arr));
    }
    if runs.is_empty() {
        return Ok("No generation runs yet".to_string());
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Run", "Status", "Catalog", "Root", "Model", "Created At"]);
    for r in runs {
        let status = if r.done {
            "done".green().to_string()
        } else {
            "open".yellow().to_string()
        };
        table.add_row(vec![
            r.id.to_string(),
            status,
            r.settings.iblock_id.to_string(),
            r.settings.section_id.to_string(),
            format!("{} / {}", r.settings.provider, r.settings.ai_model),
            r.created_at.clone(),
        ]);
    }
    Ok(table.to_string())
}

pub fn format_rollback_report(run_id: u64, report: &RollbackReport) -> String {
    let mut out = format!(
        "Rolled back run {}: {} section(s) restored",
        run_id,
        report.restored.len()
    );
    for (section_id, reason) in &report.failures {
        out.push_str(&format!("\n  {} section {}: {}", "failed".red(), section_id, reason));
    }
    out
}
