//! Output rendering for analyze, sanitize and profiles commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-file fields, excluded paths, and a top-level summary.

use crate::config::ProfileSource;
use crate::models::{AnalysisSummary, FileAnalysis, Level, Outcome, Status};
use crate::utils::{rel_to, use_colors};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

fn status_tag(status: Status, color: bool) -> String {
    let tag = format!("⟦{}⟧", status.as_str());
    if !color {
        return tag;
    }
    match status {
        Status::Error => tag.red().bold().to_string(),
        Status::Warning => tag.yellow().bold().to_string(),
        Status::Ok => tag.green().bold().to_string(),
    }
}

fn level_icon(level: Level, color: bool) -> String {
    let icon = match level {
        Level::Error => "✖",
        Level::Warning => "▲",
        Level::Info => "◆",
    };
    if !color {
        return icon.to_string();
    }
    match level {
        Level::Error => icon.red().to_string(),
        Level::Warning => icon.yellow().to_string(),
        Level::Info => icon.blue().to_string(),
    }
}

fn file_json(fa: &FileAnalysis) -> JsonVal {
    json!({
        "source": fa.source.to_string_lossy(),
        "file_type": fa.file_type,
        "status": fa.status,
        "issues": fa.issues,
        "suggested_name": fa.suggested_name,
        "correction_outcome": fa.correction_outcome,
        "actions": fa.correction_actions,
        "output_path": fa.output_path.as_ref().map(|p| p.to_string_lossy().to_string()),
        "sha256": fa.sha256,
    })
}

/// Build the JSON document printed by `analyze` and `sanitize`.
pub fn compose_summary_json(summary: &AnalysisSummary, output_dir: Option<&Path>) -> JsonVal {
    let files: Vec<_> = summary.files.iter().map(file_json).collect();
    let excluded: Vec<_> = summary
        .excluded
        .iter()
        .map(|e| json!({"path": e.path.to_string_lossy(), "reason": e.reason.as_str()}))
        .collect();
    let mut outcomes = serde_json::Map::new();
    for outcome in [
        Outcome::NotRun,
        Outcome::Ok,
        Outcome::Fixed,
        Outcome::Partial,
        Outcome::Impossible,
        Outcome::Error,
    ] {
        let n = summary.count_outcome(outcome);
        if n > 0 {
            outcomes.insert(outcome.as_str().to_string(), json!(n));
        }
    }
    json!({
        "output_dir": output_dir.map(|p| p.to_string_lossy().to_string()),
        "files": files,
        "excluded": excluded,
        "summary": {
            "files": summary.files.len(),
            "ok": summary.count_status(Status::Ok),
            "warnings": summary.count_status(Status::Warning),
            "errors": summary.count_status(Status::Error),
            "outcomes": outcomes,
        }
    })
}

fn print_json(v: &JsonVal) {
    println!("{}", serde_json::to_string_pretty(v).unwrap_or_default());
}

fn print_files(summary: &AnalysisSummary, root: &Path, color: bool, with_outcome: bool) {
    for fa in &summary.files {
        let name = rel_to(&fa.source, root);
        let name = if color { name.bold().to_string() } else { name };
        if with_outcome {
            println!(
                "{} {} → {}",
                status_tag(fa.status, color),
                name,
                fa.correction_outcome
            );
        } else {
            println!("{} {}", status_tag(fa.status, color), name);
        }
        for is in &fa.issues {
            println!("    {} ❲{}❳ {}", level_icon(is.level, color), is.code, is.message);
        }
        if !with_outcome && fa.suggested_name != fa.source_name() {
            println!("    suggested name: {}", fa.suggested_name);
        }
    }
    for ex in &summary.excluded {
        let line = format!("skipped ({}): {}", ex.reason.as_str(), rel_to(&ex.path, root));
        if color {
            println!("{}", line.bright_black());
        } else {
            println!("{line}");
        }
    }
}

fn print_totals(summary: &AnalysisSummary, color: bool) {
    let line = format!(
        "— Summary — files={} ok={} warnings={} errors={}",
        summary.files.len(),
        summary.count_status(Status::Ok),
        summary.count_status(Status::Warning),
        summary.count_status(Status::Error)
    );
    if color {
        println!("{}", line.bold());
    } else {
        println!("{line}");
    }
}

/// Print analysis results in the requested format.
pub fn print_analysis(summary: &AnalysisSummary, root: &Path, output: &str) {
    match output {
        "json" => print_json(&compose_summary_json(summary, None)),
        _ => {
            let color = use_colors(output);
            print_files(summary, root, color, false);
            print_totals(summary, color);
        }
    }
}

/// Print sanitize results. `output_dir` is `None` for a dry run.
pub fn print_sanitize(
    summary: &AnalysisSummary,
    root: &Path,
    output_dir: Option<&Path>,
    output: &str,
) {
    match output {
        "json" => print_json(&compose_summary_json(summary, output_dir)),
        _ => {
            let color = use_colors(output);
            print_files(summary, root, color, output_dir.is_some());
            print_totals(summary, color);
            match output_dir {
                Some(dir) => {
                    let line = format!(
                        "fixed={} partial={} impossible={} errors={}",
                        summary.count_outcome(Outcome::Fixed),
                        summary.count_outcome(Outcome::Partial),
                        summary.count_outcome(Outcome::Impossible),
                        summary.count_outcome(Outcome::Error)
                    );
                    println!("{line}");
                    if color {
                        println!("{} {}", "📦 output:".green().bold(), dir.display());
                    } else {
                        println!("📦 output: {}", dir.display());
                    }
                }
                None => println!("dry run: nothing written"),
            }
        }
    }
}

/// Print the known profiles, marking the default.
pub fn print_profiles(source: &ProfileSource, output: &str) {
    match output {
        "json" => {
            let items: Vec<_> = source
                .names()
                .iter()
                .filter_map(|n| source.get(n))
                .map(|p| {
                    json!({
                        "name": p.name,
                        "allowed_formats": p.allowed_formats,
                        "warning_formats": p.warning_formats,
                        "max_length": p.max_length(),
                    })
                })
                .collect();
            print_json(&json!({"default": source.default_name(), "profiles": items}));
        }
        _ => {
            let color = use_colors(output);
            for name in source.names() {
                let Some(p) = source.get(&name) else { continue };
                let marker = if name == source.default_name() { " (default)" } else { "" };
                let title = format!("{name}{marker}");
                if color {
                    println!("{}", title.bold());
                } else {
                    println!("{title}");
                }
                let join = |set: &std::collections::BTreeSet<String>| {
                    set.iter().cloned().collect::<Vec<_>>().join(", ")
                };
                println!("    allowed: {}", join(&p.allowed_formats));
                if !p.warning_formats.is_empty() {
                    println!("    warning: {}", join(&p.warning_formats));
                }
                println!("    max filename length: {}", p.max_length());
            }
        }
    }
}
