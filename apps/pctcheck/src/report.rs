//! Manifest and report generation for a sanitize run.
//!
//! All artifacts go to the technical directory `.pctcheck/` inside the
//! output tree, apart from the depositable files:
//! - `manifest.json`: one structured record per analyzed file.
//! - `manifest.csv`: the same records flattened for spreadsheets.
//! - `REPORT.txt`: technical report with every action and issue.
//! - `SUMMARY.txt`: one line per file.
//!
//! The report builders are pure; `write_reports` puts them on disk.

use crate::error::Result;
use crate::models::{AnalysisSummary, FileAnalysis, Issue, Outcome, Status};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TECH_DIR: &str = ".pctcheck";
pub const MANIFEST_JSON: &str = "manifest.json";
pub const MANIFEST_CSV: &str = "manifest.csv";
pub const TECHNICAL_REPORT: &str = "REPORT.txt";
pub const SYNTHETIC_REPORT: &str = "SUMMARY.txt";

/// File names treated as report artifacts when found in an input tree.
pub const RESERVED_REPORT_NAMES: &[&str] = &[
    MANIFEST_JSON,
    MANIFEST_CSV,
    TECHNICAL_REPORT,
    "REPORT.json",
    "MANIFEST.csv",
    SYNTHETIC_REPORT,
];

const RULE: usize = 60;

#[derive(Debug, Serialize)]
pub struct ManifestEntry<'a> {
    pub source: String,
    pub target: Option<String>,
    pub file_type: &'a str,
    pub sha256: Option<&'a str>,
    pub status: Status,
    pub issues: &'a [Issue],
    pub correction_outcome: Outcome,
    pub actions: &'a [String],
    pub suggested_name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub output: String,
    pub profile: &'a str,
    pub files: Vec<ManifestEntry<'a>>,
}

fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn entry(fa: &FileAnalysis) -> ManifestEntry<'_> {
    ManifestEntry {
        source: display(&fa.source),
        target: fa.output_path.as_deref().map(display),
        file_type: &fa.file_type,
        sha256: fa.sha256.as_deref(),
        status: fa.status,
        issues: &fa.issues,
        correction_outcome: fa.correction_outcome,
        actions: &fa.correction_actions,
        suggested_name: &fa.suggested_name,
    }
}

pub fn build_manifest<'a>(
    summary: &'a AnalysisSummary,
    output_dir: &Path,
    profile: &'a str,
) -> Manifest<'a> {
    Manifest {
        output: display(output_dir),
        profile,
        files: summary.files.iter().map(entry).collect(),
    }
}

/// Issues flattened as `code:message; code:message`.
pub fn issues_cell(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}:{}", i.code, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Render the tabular manifest to CSV bytes.
pub fn manifest_csv(summary: &AnalysisSummary) -> Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record([
        "source",
        "output",
        "status",
        "correction_outcome",
        "sha256",
        "issues",
    ])?;
    for fa in &summary.files {
        w.write_record([
            display(&fa.source),
            fa.output_path.as_deref().map(display).unwrap_or_default(),
            fa.status.to_string(),
            fa.correction_outcome.to_string(),
            fa.sha256.clone().unwrap_or_default(),
            issues_cell(&fa.issues),
        ])?;
    }
    w.into_inner().map_err(|e| e.into_error().into())
}

/// Per-file technical report: final status, outcome, output path, actions
/// and issues.
pub fn build_technical_report(summary: &AnalysisSummary, output_dir: &Path) -> String {
    let mut lines = vec![
        "PCTCHECK - TECHNICAL CORRECTION REPORT".to_string(),
        "=".repeat(RULE),
        format!("Output: {}", output_dir.display()),
        String::new(),
    ];
    for fa in &summary.files {
        lines.push(format!("{} -> {}", fa.source_name(), fa.correction_outcome));
        lines.push(format!("  Final status: {}", fa.status.as_str().to_uppercase()));
        if let Some(out) = &fa.output_path {
            lines.push(format!("  Output: {}", out.display()));
        }
        for action in &fa.correction_actions {
            lines.push(format!("  - {action}"));
        }
        for issue in &fa.issues {
            lines.push(format!(
                "  [{}] {}: {}",
                issue.level.as_str().to_uppercase(),
                issue.code,
                issue.message
            ));
        }
        lines.push(String::new());
    }
    if !summary.excluded.is_empty() {
        lines.push("Excluded paths:".to_string());
        for ex in &summary.excluded {
            lines.push(format!("  {} ({})", ex.path.display(), ex.reason.as_str()));
        }
    }
    lines.join("\n")
}

/// One `name: STATUS | OUTCOME` line per file.
pub fn build_synthetic_report(summary: &AnalysisSummary) -> String {
    let mut lines = vec!["PCTCHECK - Summary".to_string(), "=".repeat(32)];
    for fa in &summary.files {
        lines.push(format!(
            "{}: {} | {}",
            fa.source_name(),
            fa.status.as_str().to_uppercase(),
            fa.correction_outcome
        ));
    }
    lines.join("\n")
}

/// Write all four artifacts into `<output_dir>/.pctcheck/`.
pub fn write_reports(output_dir: &Path, profile: &str, summary: &AnalysisSummary) -> Result<PathBuf> {
    let tech = output_dir.join(TECH_DIR);
    fs::create_dir_all(&tech)?;

    let manifest = build_manifest(summary, output_dir, profile);
    let mut json = serde_json::to_string_pretty(&manifest)?;
    json.push('\n');
    fs::write(tech.join(MANIFEST_JSON), json)?;
    fs::write(tech.join(MANIFEST_CSV), manifest_csv(summary)?)?;
    fs::write(
        tech.join(TECHNICAL_REPORT),
        build_technical_report(summary, output_dir),
    )?;
    fs::write(tech.join(SYNTHETIC_REPORT), build_synthetic_report(summary))?;
    info!(dir = %tech.display(), files = summary.files.len(), "reports written");
    Ok(tech)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExcludedPath, ExclusionReason, IssueCode};
    use tempfile::tempdir;

    fn sample() -> AnalysisSummary {
        let fixed = FileAnalysis {
            source: PathBuf::from("/in/Atto uno.pdf"),
            file_type: "pdf".to_string(),
            status: Status::Ok,
            issues: vec![Issue::info(IssueCode::SmartRenameApplied, "renamed, twice")],
            suggested_name: "Atto_uno.pdf".to_string(),
            sha256: Some("ab".repeat(32)),
            correction_outcome: Outcome::Fixed,
            correction_actions: vec!["Renamed: Atto uno.pdf -> Atto_uno.pdf".to_string()],
            output_path: Some(PathBuf::from("/in_conforme/Atto_uno.pdf")),
        };
        let refused = FileAnalysis {
            source: PathBuf::from("/in/video.mp4"),
            file_type: "mp4".to_string(),
            status: Status::Error,
            issues: vec![Issue::error(IssueCode::ExtForbidden, "no")],
            suggested_name: "video.mp4".to_string(),
            sha256: None,
            correction_outcome: Outcome::Impossible,
            correction_actions: vec!["Format not allowed".to_string()],
            output_path: None,
        };
        AnalysisSummary {
            files: vec![fixed, refused],
            excluded: vec![ExcludedPath {
                path: PathBuf::from("/in/.pctcheck"),
                reason: ExclusionReason::TechnicalDirectory,
            }],
        }
    }

    #[test]
    fn test_manifest_shape() {
        let s = sample();
        let v = serde_json::to_value(build_manifest(&s, Path::new("/in_conforme"), "pdua_safe"))
            .unwrap();
        assert_eq!(v["output"], "/in_conforme");
        assert_eq!(v["profile"], "pdua_safe");
        assert_eq!(v["files"][0]["target"], "/in_conforme/Atto_uno.pdf");
        assert_eq!(v["files"][0]["correction_outcome"], "FIXED");
        assert_eq!(v["files"][0]["issues"][0]["code"], "smart_rename_applied");
        assert!(v["files"][1]["target"].is_null());
        assert!(v["files"][1]["sha256"].is_null());
        assert_eq!(v["files"][1]["status"], "error");
    }

    #[test]
    fn test_csv_rows_and_quoting() {
        let csv = String::from_utf8(manifest_csv(&sample()).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "source,output,status,correction_outcome,sha256,issues"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("/in/Atto uno.pdf,/in_conforme/Atto_uno.pdf,ok,FIXED,"));
        assert!(first.ends_with("\"smart_rename_applied:renamed, twice\""));
        assert_eq!(
            lines.next().unwrap(),
            "/in/video.mp4,,error,IMPOSSIBLE,,ext_forbidden:no"
        );
    }

    #[test]
    fn test_text_reports() {
        let s = sample();
        let tech = build_technical_report(&s, Path::new("/in_conforme"));
        assert!(tech.contains("Atto uno.pdf -> FIXED"));
        assert!(tech.contains("  Final status: ERROR"));
        assert!(tech.contains("  [ERROR] ext_forbidden: no"));
        assert!(tech.contains("/in/.pctcheck (technical directory)"));

        let synth = build_synthetic_report(&s);
        let lines: Vec<_> = synth.lines().collect();
        assert_eq!(lines[2], "Atto uno.pdf: OK | FIXED");
        assert_eq!(lines[3], "video.mp4: ERROR | IMPOSSIBLE");
    }

    #[test]
    fn test_write_reports_creates_technical_dir() {
        let dir = tempdir().unwrap();
        let tech = write_reports(dir.path(), "t", &sample()).unwrap();
        assert_eq!(tech, dir.path().join(TECH_DIR));
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(tech.join(MANIFEST_JSON)).unwrap()).unwrap();
        assert_eq!(json["files"].as_array().unwrap().len(), 2);
    }
}
