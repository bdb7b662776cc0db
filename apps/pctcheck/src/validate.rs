//! Per-file validator.
//!
//! Rules are evaluated independently and accumulated into a `FileAnalysis`:
//! extension against the profile, filename validity, then a structural
//! check dispatched on the extension. Status is derived from the issues and
//! a suggested name is always computed.

use crate::checks::{check_pdf, check_zip};
use crate::heuristics::Heuristics;
use crate::models::profile::Profile;
use crate::models::{FileAnalysis, Issue, IssueCode, Outcome, Status};
use crate::normalize::{extension_of, is_valid, normalize};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static BUILTIN_TABLES: LazyLock<Heuristics> = LazyLock::new(Heuristics::default);

/// Extensions handled as archive containers.
pub const ARCHIVE_FORMATS: &[&str] = &["zip"];

pub fn is_archive(ext: &str) -> bool {
    ARCHIVE_FORMATS.contains(&ext)
}

/// Validator bound to one profile and one set of heuristic tables.
#[derive(Clone, Copy)]
pub struct Validator<'a> {
    profile: &'a Profile,
    tables: &'a Heuristics,
}

impl<'a> Validator<'a> {
    pub fn new(profile: &'a Profile, tables: &'a Heuristics) -> Self {
        Self { profile, tables }
    }

    /// Analyze one file. Never fails: unreadable or corrupt content shows
    /// up as issues.
    pub fn validate(&self, path: &Path) -> FileAnalysis {
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let ext = extension_of(&base);
        let max_len = self.profile.max_length();
        let mut issues: Vec<Issue> = Vec::new();

        if self.profile.is_warning(&ext) {
            issues.push(Issue::warning(
                IssueCode::ExtWarning,
                format!("Format '{ext}' accepted with caution."),
            ));
        } else if !self.profile.is_allowed(&ext) {
            issues.push(Issue::error(
                IssueCode::ExtForbidden,
                format!("Format '{ext}' not allowed by the profile."),
            ));
        }

        if !is_valid(&base, max_len) {
            issues.push(Issue::warning(
                IssueCode::FilenameNormalize,
                "Filename must be normalized.",
            ));
        }

        match ext.as_str() {
            "pdf" => issues.extend(check_pdf(path)),
            e if is_archive(e) => issues.extend(check_zip(path, self.profile, self.tables)),
            _ => {}
        }

        let status = Status::from_issues(&issues);
        debug!(file = %path.display(), %status, issues = issues.len(), "validated");
        FileAnalysis {
            source: path.to_path_buf(),
            file_type: if ext.is_empty() {
                "unknown".to_string()
            } else {
                ext
            },
            status,
            issues,
            suggested_name: normalize(&base, max_len),
            sha256: None,
            correction_outcome: Outcome::NotRun,
            correction_actions: Vec::new(),
            output_path: None,
        }
    }
}

/// Validate `path` under `profile` with the built-in heuristic tables.
pub fn validate_path(path: &Path, profile: &Profile) -> FileAnalysis {
    Validator::new(profile, &BUILTIN_TABLES).validate(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn profile() -> Profile {
        Profile::new("t", ["pdf", "zip", "txt"], ["png"], 80)
    }

    #[test]
    fn test_bad_pdf_header_is_single_error() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("atto.pdf");
        std::fs::write(&p, b"GIF89a /Encrypt").unwrap();
        let fa = validate_path(&p, &profile());
        assert_eq!(fa.issues.len(), 1);
        assert_eq!(fa.issues[0].code, IssueCode::PdfHeader);
        assert_eq!(fa.status, Status::Error);
    }

    #[test]
    fn test_clean_pdf_is_ok() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("atto.pdf");
        std::fs::write(&p, b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF").unwrap();
        let fa = validate_path(&p, &profile());
        assert!(fa.issues.is_empty());
        assert_eq!(fa.status, Status::Ok);
        assert_eq!(fa.file_type, "pdf");
        assert_eq!(fa.suggested_name, "atto.pdf");
        assert_eq!(fa.correction_outcome, Outcome::NotRun);
    }

    #[test]
    fn test_extension_and_name_rules_accumulate() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("foto del sopralluogo.png");
        std::fs::write(&p, b"\x89PNG").unwrap();
        let fa = validate_path(&p, &profile());
        let codes: Vec<_> = fa.issues.iter().map(|i| i.code).collect();
        assert_eq!(codes, vec![IssueCode::ExtWarning, IssueCode::FilenameNormalize]);
        assert_eq!(fa.status, Status::Warning);
        assert_eq!(fa.suggested_name, "foto_del_sopralluogo.png");
    }

    #[test]
    fn test_forbidden_extension_and_unknown_type() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("video.mp4");
        std::fs::write(&p, b"fake").unwrap();
        let fa = validate_path(&p, &profile());
        assert_eq!(fa.issues[0].code, IssueCode::ExtForbidden);
        assert_eq!(fa.status, Status::Error);

        let p = dir.path().join("README");
        std::fs::write(&p, b"x").unwrap();
        let fa = validate_path(&p, &profile());
        assert_eq!(fa.file_type, "unknown");
        assert_eq!(fa.status, Status::Error);
    }

    #[test]
    fn test_empty_pdf_still_completes() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("vuoto.pdf");
        std::fs::write(&p, b"").unwrap();
        let fa = validate_path(&p, &profile());
        assert_eq!(fa.status, Status::Error);
        assert!(fa.has_issue(IssueCode::PdfHeader));
    }
}
