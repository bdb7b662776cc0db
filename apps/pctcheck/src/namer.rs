//! Smart renaming of output files.
//!
//! A name is only rewritten when at least one reason fires (too long, opaque
//! machine identifier, output path too long, invalid characters). The new
//! name is built from a label for the stem, chosen by a pluggable
//! `LabelStrategy`, plus any signature suffix the original carried, then
//! normalized and trimmed to fit the output path budget.
//!
//! `ensure_unique` resolves collisions within one run with `_02`, `_03`, ...

use crate::heuristics::Heuristics;
use crate::models::profile::{LabelStrategyKind, SmartRenameOptions};
use crate::normalize::{clean_stem, is_valid, normalize, split_name};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("valid regex")
});
static ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]{20,}").expect("valid regex"));

/// Minimum stem length kept while trimming for the path budget.
const MIN_STEM_LEN: usize = 12;

/// Label used when nothing of the stem survives cleaning.
const FALLBACK_LABEL: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameReason {
    FilenameTooLong,
    UuidOrRandomPattern,
    PathTooLong,
    FilenameInvalidChars,
    PathTooLongMitigated,
}

impl RenameReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenameReason::FilenameTooLong => "filename_too_long",
            RenameReason::UuidOrRandomPattern => "uuid_or_random_pattern",
            RenameReason::PathTooLong => "path_too_long",
            RenameReason::FilenameInvalidChars => "filename_invalid_chars",
            RenameReason::PathTooLongMitigated => "path_too_long_mitigated",
        }
    }
}

impl fmt::Display for RenameReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Proposed name and the reasons that triggered it. Empty reasons mean the
/// original name was passed through untouched.
pub struct Rename {
    pub name: String,
    pub reasons: Vec<RenameReason>,
}

impl Rename {
    pub fn fired(&self) -> bool {
        !self.reasons.is_empty()
    }

    pub fn mitigated(&self) -> bool {
        self.reasons.contains(&RenameReason::PathTooLongMitigated)
    }

    pub fn reasons_joined(&self) -> String {
        self.reasons
            .iter()
            .map(RenameReason::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Destination information needed to evaluate full-path length.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameContext<'a> {
    pub output_dir: Option<&'a Path>,
}

/// Builds the human-readable part of a renamed stem.
pub trait LabelStrategy: Send + Sync {
    fn label(&self, stem: &str, tables: &Heuristics) -> String;
}

/// Keeps the original wording, only cleaned.
pub struct LiteralLabel;

impl LabelStrategy for LiteralLabel {
    fn label(&self, stem: &str, _tables: &Heuristics) -> String {
        clean_stem(stem, true)
    }
}

/// Maps known document kinds to canonical labels, else literal.
pub struct ClassifyLabel;

impl LabelStrategy for ClassifyLabel {
    fn label(&self, stem: &str, tables: &Heuristics) -> String {
        tables
            .classify(stem)
            .unwrap_or_else(|| LiteralLabel.label(stem, tables))
    }
}

pub fn strategy_for(kind: LabelStrategyKind) -> Box<dyn LabelStrategy> {
    match kind {
        LabelStrategyKind::Literal => Box::new(LiteralLabel),
        LabelStrategyKind::Classify => Box::new(ClassifyLabel),
    }
}

/// True when the stem holds a UUID or a long letters-and-digits run.
pub fn looks_machine_generated(stem: &str) -> bool {
    if UUID.is_match(stem) {
        return true;
    }
    ALNUM_RUN.find_iter(stem).any(|m| {
        let s = m.as_str();
        s.chars().any(|c| c.is_ascii_alphabetic()) && s.chars().any(|c| c.is_ascii_digit())
    })
}

fn carries_suffix(label: &str, suffix: &str) -> bool {
    let low = label.to_lowercase();
    low.ends_with(suffix) || low == suffix.trim_start_matches('_')
}

fn path_len(dir: &Path, name: &str) -> usize {
    dir.join(name).to_string_lossy().chars().count()
}

pub struct SmartNamer<'a> {
    options: &'a SmartRenameOptions,
    tables: &'a Heuristics,
    strategy: Box<dyn LabelStrategy>,
}

impl<'a> SmartNamer<'a> {
    pub fn new(options: &'a SmartRenameOptions, tables: &'a Heuristics) -> Self {
        Self {
            options,
            tables,
            strategy: strategy_for(options.strategy),
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn LabelStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Longest file name this namer produces.
    pub fn max_name_len(&self) -> usize {
        self.options.max_filename_len.max(1)
    }

    /// Propose an output name for `original`. `extension` overrides the
    /// original's own extension when non-empty (with or without the dot).
    pub fn rename(&self, original: &str, extension: &str, ctx: RenameContext<'_>) -> Rename {
        let max_name = self.max_name_len();
        let max_path = self.options.max_output_path_len;
        let original = Path::new(original)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| original.to_string());
        let (stem, own_ext) = split_name(&original);
        let extension = match extension {
            "" => own_ext.to_string(),
            e if e.starts_with('.') => e.to_string(),
            e => format!(".{e}"),
        };

        if !self.options.enabled {
            return Rename {
                name: normalize(&original, max_name),
                reasons: Vec::new(),
            };
        }

        let mut reasons = Vec::new();
        if original.chars().count() > max_name {
            reasons.push(RenameReason::FilenameTooLong);
        }
        if looks_machine_generated(stem) {
            reasons.push(RenameReason::UuidOrRandomPattern);
        }
        if ctx
            .output_dir
            .is_some_and(|dir| path_len(dir, &original) > max_path)
        {
            reasons.push(RenameReason::PathTooLong);
        }
        if !is_valid(&original, max_name) {
            reasons.push(RenameReason::FilenameInvalidChars);
        }
        if reasons.is_empty() {
            return Rename {
                name: original,
                reasons,
            };
        }

        let mut label = self.strategy.label(stem, self.tables);
        if clean_stem(&label, false).is_empty() {
            label = FALLBACK_LABEL.to_string();
        }
        let candidate_stem = match self.tables.signature_suffix(stem) {
            Some(suffix) if !carries_suffix(&label, suffix) => format!("{label}{suffix}"),
            _ => label,
        };
        let mut candidate = normalize(&format!("{candidate_stem}{extension}"), max_name);

        if let Some(dir) = ctx.output_dir {
            if path_len(dir, &candidate) > max_path {
                let (base, ext) = split_name(&candidate);
                let (mut base, ext) = (base.to_string(), ext.to_string());
                while path_len(dir, &format!("{base}{ext}")) > max_path
                    && base.len() > MIN_STEM_LEN
                {
                    base.pop();
                }
                let trimmed = base.trim_end_matches(['.', '_', '-']);
                if !trimmed.is_empty() {
                    base = trimmed.to_string();
                }
                candidate = format!("{base}{ext}");
                if path_len(dir, &candidate) > max_path {
                    candidate = normalize(&candidate, 20.max(max_name.saturating_sub(10)));
                }
                reasons.push(RenameReason::PathTooLongMitigated);
            }
        }

        for marker in &self.tables.signature_markers {
            let doubled = format!("{0}{0}", marker.suffix);
            while candidate.contains(&doubled) {
                candidate = candidate.replace(&doubled, &marker.suffix);
            }
        }
        Rename {
            name: candidate,
            reasons,
        }
    }
}

fn fit_stem(stem: &str, room: usize) -> &str {
    if stem.len() <= room {
        return stem;
    }
    let mut end = room;
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    stem[..end].trim_end_matches(['.', '_', '-'])
}

/// Reserve `candidate` in `used`, appending `_02`, `_03`, ... before the
/// extension until the name is free. The stem is shortened so that a
/// numbered name stays within `max_len`.
pub fn ensure_unique(used: &mut HashSet<String>, candidate: &str, max_len: usize) -> String {
    if used.insert(candidate.to_string()) {
        return candidate.to_string();
    }
    let (stem, ext) = split_name(candidate);
    let mut idx = 2usize;
    loop {
        let tag = format!("_{idx:02}");
        let base = fit_stem(stem, max_len.saturating_sub(tag.len() + ext.len()));
        let alt = format!("{base}{tag}{ext}");
        if used.insert(alt.clone()) {
            return alt;
        }
        idx += 1;
    }
}
