//! Analysis and sanitization orchestration.
//!
//! `analyze` enumerates the input (skipping the tool's own artifacts) and
//! validates every file. `sanitize` builds on it: it prepares a fresh output
//! directory, proposes a unique output name per file, repairs archives or
//! copies other content, re-validates what was written, and derives the
//! correction outcome. Reports are written once, after every file.
//!
//! Files are processed one at a time; the used-names set is owned by the
//! run and never shared.

use crate::error::{PctError, Result};
use crate::hashing::sha256_file;
use crate::heuristics::Heuristics;
use crate::models::profile::{Profile, SmartRenameOptions};
use crate::models::{
    AnalysisSummary, Correction, ExcludedPath, ExclusionReason, FileAnalysis, Issue, IssueCode,
    Outcome, PostRepair, Status,
};
use crate::namer::{ensure_unique, Rename, RenameContext, SmartNamer};
use crate::normalize::extension_of;
use crate::repair::repair_archive;
use crate::report::{self, RESERVED_REPORT_NAMES, TECH_DIR};
use crate::validate::{is_archive, Validator};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Suffix of generated output folders.
pub const OUTPUT_SUFFIX: &str = "_conforme";
/// Marker left in the technical directory while a run is in progress.
pub const INCOMPLETE_MARKER: &str = "INCOMPLETE";
/// Backup location inside the technical directory.
pub const BACKUP_DIR: &str = "backup";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Where the output directory is placed.
pub enum OutputMode {
    /// Next to the input: `<parent>/<name>_conforme`.
    #[default]
    Sibling,
    /// Under a caller-supplied root: `<root>/<name>_conforme`.
    Custom(PathBuf),
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Compute the output directory for `input`. Files contribute their stem,
/// directories their full name.
pub fn resolve_output_dir(input: &Path, mode: &OutputMode) -> PathBuf {
    let input = if input.file_name().is_some() {
        input.to_path_buf()
    } else {
        absolute(input)
    };
    let base = if input.is_file() {
        input.file_stem()
    } else {
        input.file_name()
    }
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| "input".to_string());
    let name = format!("{base}{OUTPUT_SUFFIX}");
    match mode {
        OutputMode::Sibling => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join(name),
        OutputMode::Custom(root) => root.join(name),
    }
}

/// Classify a path (relative to the input root) as a tool artifact.
pub fn exclusion_reason(rel: &Path, is_file: bool) -> Option<ExclusionReason> {
    for comp in rel.components() {
        let part = comp.as_os_str().to_string_lossy();
        if part == TECH_DIR {
            return Some(ExclusionReason::TechnicalDirectory);
        }
        if part.ends_with(OUTPUT_SUFFIX) {
            return Some(ExclusionReason::PreviousOutput);
        }
    }
    let name = rel.file_name()?.to_string_lossy();
    if is_file && RESERVED_REPORT_NAMES.contains(&name.as_ref()) {
        return Some(ExclusionReason::ReportArtifact);
    }
    None
}

/// Enumerate regular files under `root` in a stable order. A sole file
/// input is always returned, whatever its name.
pub fn collect_inputs(root: &Path) -> (Vec<PathBuf>, Vec<ExcludedPath>) {
    if root.is_file() {
        return (vec![root.to_path_buf()], Vec::new());
    }
    let mut files = Vec::new();
    let mut excluded = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            let rel = e.path().strip_prefix(root).unwrap_or(e.path());
            match exclusion_reason(rel, e.file_type().is_file()) {
                Some(reason) => {
                    debug!(path = %e.path().display(), reason = reason.as_str(), "excluded");
                    excluded.push(ExcludedPath {
                        path: e.path().to_path_buf(),
                        reason,
                    });
                    false
                }
                None => true,
            }
        });
    for entry in walker {
        match entry {
            Ok(e) if e.file_type().is_file() => files.push(e.into_path()),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "skipping unreadable path"),
        }
    }
    (files, excluded)
}

/// Analyze `root` with the built-in heuristic tables.
pub fn analyze(root: &Path, profile: &Profile) -> AnalysisSummary {
    analyze_with(root, profile, &Heuristics::default())
}

/// Analyze every file under `root`. Validation runs in parallel; results
/// keep enumeration order and carry outcome `NOT_RUN`.
pub fn analyze_with(root: &Path, profile: &Profile, tables: &Heuristics) -> AnalysisSummary {
    let (paths, excluded) = collect_inputs(root);
    let validator = Validator::new(profile, tables);
    let files: Vec<FileAnalysis> = paths.par_iter().map(|p| validator.validate(p)).collect();
    info!(
        root = %root.display(),
        profile = %profile.name,
        files = files.len(),
        excluded = excluded.len(),
        "analysis complete"
    );
    AnalysisSummary { files, excluded }
}

#[derive(Debug, Clone, Default)]
pub struct SanitizeOptions {
    /// Analyze only; nothing is written.
    pub dry_run: bool,
    pub output_mode: OutputMode,
    /// Copy the input into `.pctcheck/backup` before writing output.
    pub backup: bool,
    pub naming: SmartRenameOptions,
    pub tables: Heuristics,
}

/// Outcome decision table over the re-validated output.
///
/// Persisting forbidden content wins; otherwise a clean file is `FIXED`
/// when something changed and `OK` when not, and a changed file with
/// residual issues is `PARTIAL`. An unchanged file with residual issues is
/// reported `OK`.
pub fn derive_outcome(changed: bool, status: Status, forbidden_persists: bool) -> Outcome {
    match (forbidden_persists, status, changed) {
        (true, _, _) => Outcome::Impossible,
        (false, Status::Ok, true) => Outcome::Fixed,
        (false, Status::Ok, false) => Outcome::Ok,
        (false, _, true) => Outcome::Partial,
        (false, _, false) => Outcome::Ok,
    }
}

fn guard_overlap(input: &Path, output: &Path) -> Result<()> {
    let (input, output) = (absolute(input), absolute(output));
    if input.starts_with(&output) {
        return Err(PctError::OutputOverlapsInput { output, input });
    }
    Ok(())
}

fn prepare_output_dir(output_dir: &Path) -> Result<()> {
    if output_dir.exists() {
        debug!(dir = %output_dir.display(), "clearing previous output");
        fs::remove_dir_all(output_dir)?;
    }
    let tech = output_dir.join(TECH_DIR);
    fs::create_dir_all(&tech)?;
    fs::write(tech.join(INCOMPLETE_MARKER), b"sanitize run in progress\n")?;
    Ok(())
}

/// Copy the input tree (minus tool artifacts) into `dest`.
fn backup_input(root: &Path, dest: &Path) -> Result<usize> {
    fs::create_dir_all(dest)?;
    if root.is_file() {
        if let Some(name) = root.file_name() {
            fs::copy(root, dest.join(name))?;
        }
        return Ok(1);
    }
    let mut copied = 0usize;
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let rel = e.path().strip_prefix(root).unwrap_or(e.path());
            e.depth() == 0 || exclusion_reason(rel, e.file_type().is_file()).is_none()
        });
    for entry in walker {
        let entry = entry?;
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

struct RunContext<'a> {
    profile: &'a Profile,
    tables: &'a Heuristics,
    validator: Validator<'a>,
    namer: SmartNamer<'a>,
    output_dir: &'a Path,
    max_path: usize,
}

struct Placement {
    src_name: String,
    ext: String,
    target: String,
    dst: PathBuf,
    rename: Rename,
}

fn place(fa: &FileAnalysis, ctx: &RunContext<'_>, used: &mut HashSet<String>) -> Placement {
    let src_name = fa.source_name();
    let ext = extension_of(&src_name);
    let rename = ctx.namer.rename(
        &src_name,
        "",
        RenameContext {
            output_dir: Some(ctx.output_dir),
        },
    );
    let target = ensure_unique(used, &rename.name, ctx.namer.max_name_len());
    let dst = ctx.output_dir.join(&target);
    Placement {
        src_name,
        ext,
        target,
        dst,
        rename,
    }
}

fn remediation_issues(p: &Placement, max_path: usize) -> Vec<Issue> {
    let mut issues = Vec::new();
    if p.rename.fired() {
        issues.push(Issue::info(
            IssueCode::SmartRenameApplied,
            format!(
                "Smart rename applied ({}): {} -> {}",
                p.rename.reasons_joined(),
                p.src_name,
                p.target
            ),
        ));
    }
    if p.rename.mitigated() {
        issues.push(Issue::warning(
            IssueCode::PathTooLongMitigated,
            format!("Output path shortened to fit {max_path} characters."),
        ));
    }
    issues
}

fn write_output(fa: &FileAnalysis, p: &Placement, ctx: &RunContext<'_>) -> Result<Correction> {
    let mut actions = Vec::new();
    let mut impossible = false;
    let renamed = p.target != p.src_name;

    let changed = if is_archive(&p.ext) {
        let repaired = repair_archive(&fa.source, &p.dst, ctx.profile, ctx.tables)?;
        actions.extend(repaired.actions);
        impossible = repaired.impossible;
        if renamed {
            actions.push(format!("Renamed archive: {} -> {}", p.src_name, p.target));
        }
        true
    } else {
        fs::copy(&fa.source, &p.dst)?;
        if renamed {
            actions.push(format!("Renamed: {} -> {}", p.src_name, p.target));
        } else {
            actions.push("Copied without changes".to_string());
        }
        renamed
    };

    let post = ctx.validator.validate(&p.dst);
    let sha256 = sha256_file(&p.dst)?;

    let forbidden_left = post.has_issue(IssueCode::ZipExtForbidden);
    if forbidden_left {
        actions.push(
            "Forbidden formats persist in the ZIP: correction cannot be completed".to_string(),
        );
    }
    if post.has_issue(IssueCode::ZipMixedPades) {
        actions.push("Warning kept: mixed PAdES detected (non-blocking)".to_string());
    }
    let outcome = derive_outcome(changed, post.status, impossible || forbidden_left);
    actions.push(format!("Output written to: {}", p.dst.display()));

    let mut issues = post.issues;
    issues.extend(remediation_issues(p, ctx.max_path));
    Ok(Correction {
        outcome,
        actions,
        post: Some(PostRepair {
            output_path: p.dst.clone(),
            issues,
            suggested_name: post.suggested_name,
            sha256,
        }),
    })
}

fn correct_file(fa: &FileAnalysis, ctx: &RunContext<'_>, used: &mut HashSet<String>) -> Correction {
    let placement = place(fa, ctx, used);
    if !ctx.profile.accepts(&placement.ext) {
        return Correction::without_output(
            Outcome::Impossible,
            "Format not allowed: file excluded from automatic correction",
        );
    }
    match write_output(fa, &placement, ctx) {
        Ok(correction) => correction,
        Err(err) => {
            warn!(file = %fa.source.display(), error = %err, "correction failed");
            if placement.dst.exists() {
                let _ = fs::remove_file(&placement.dst);
            }
            Correction::without_output(Outcome::Error, format!("Correction failed: {err}"))
        }
    }
}

/// Sanitize `root` under `profile`.
///
/// Returns the output directory (`None` for a dry run) and the summary.
/// Per-file failures become the `ERROR` outcome; only output-directory
/// preparation, backup, and report writing abort the run.
pub fn sanitize(
    root: &Path,
    profile: &Profile,
    opts: &SanitizeOptions,
) -> Result<(Option<PathBuf>, AnalysisSummary)> {
    let summary = analyze_with(root, profile, &opts.tables);
    if opts.dry_run {
        return Ok((None, summary));
    }

    let output_dir = resolve_output_dir(root, &opts.output_mode);
    guard_overlap(root, &output_dir)?;
    prepare_output_dir(&output_dir)?;
    if opts.backup {
        let dest = output_dir.join(TECH_DIR).join(BACKUP_DIR);
        let copied = backup_input(root, &dest)?;
        info!(dest = %dest.display(), files = copied, "backup written");
    }

    let naming = SmartRenameOptions {
        max_filename_len: opts.naming.max_filename_len.min(profile.max_length()),
        ..opts.naming.clone()
    };
    let ctx = RunContext {
        profile,
        tables: &opts.tables,
        validator: Validator::new(profile, &opts.tables),
        namer: SmartNamer::new(&naming, &opts.tables),
        output_dir: &output_dir,
        max_path: naming.max_output_path_len,
    };
    let mut used: HashSet<String> = HashSet::new();
    let AnalysisSummary { files, excluded } = summary;
    let files: Vec<FileAnalysis> = files
        .into_iter()
        .map(|fa| {
            let correction = correct_file(&fa, &ctx, &mut used);
            debug!(file = %fa.source.display(), outcome = %correction.outcome, "processed");
            fa.with_correction(correction)
        })
        .collect();
    let summary = AnalysisSummary { files, excluded };

    report::write_reports(&output_dir, &profile.name, &summary)?;
    fs::remove_file(output_dir.join(TECH_DIR).join(INCOMPLETE_MARKER))?;
    info!(
        output = %output_dir.display(),
        fixed = summary.count_outcome(Outcome::Fixed),
        impossible = summary.count_outcome(Outcome::Impossible),
        errors = summary.count_outcome(Outcome::Error),
        "sanitize complete"
    );
    Ok((Some(output_dir), summary))
}
