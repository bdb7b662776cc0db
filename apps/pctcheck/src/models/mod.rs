//! Shared data models for analysis results, issues, and run summaries.

pub mod profile;

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Severity of a single issue. Only `Warning` and `Error` affect status.
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
/// Closed taxonomy of issue codes.
pub enum IssueCode {
    // format
    ExtWarning,
    ExtForbidden,
    // naming
    FilenameNormalize,
    FilenameInvalidChars,
    FilenameTooLong,
    ZipName,
    // pdf structure
    PdfHeader,
    PdfIntegrity,
    PdfEncrypted,
    PadesDetected,
    // archive structure
    ZipCorrupt,
    ZipJunk,
    ZipTemp,
    ZipNested,
    ZipDoubleExt,
    ZipWarningExt,
    ZipExtForbidden,
    ZipMixedPades,
    // remediation metadata
    SmartRenameApplied,
    PathTooLongMitigated,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::ExtWarning => "ext_warning",
            IssueCode::ExtForbidden => "ext_forbidden",
            IssueCode::FilenameNormalize => "filename_normalize",
            IssueCode::FilenameInvalidChars => "filename_invalid_chars",
            IssueCode::FilenameTooLong => "filename_too_long",
            IssueCode::ZipName => "zip_name",
            IssueCode::PdfHeader => "pdf_header",
            IssueCode::PdfIntegrity => "pdf_integrity",
            IssueCode::PdfEncrypted => "pdf_encrypted",
            IssueCode::PadesDetected => "pades_detected",
            IssueCode::ZipCorrupt => "zip_corrupt",
            IssueCode::ZipJunk => "zip_junk",
            IssueCode::ZipTemp => "zip_temp",
            IssueCode::ZipNested => "zip_nested",
            IssueCode::ZipDoubleExt => "zip_double_ext",
            IssueCode::ZipWarningExt => "zip_warning_ext",
            IssueCode::ZipExtForbidden => "zip_ext_forbidden",
            IssueCode::ZipMixedPades => "zip_mixed_pades",
            IssueCode::SmartRenameApplied => "smart_rename_applied",
            IssueCode::PathTooLongMitigated => "path_too_long_mitigated",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One detected non-conformity with severity, code, and message.
pub struct Issue {
    pub level: Level,
    pub code: IssueCode,
    pub message: String,
}

impl Issue {
    pub fn new(level: Level, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            level,
            code,
            message: message.into(),
        }
    }

    pub fn info(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Level::Info, code, message)
    }

    pub fn warning(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Level::Warning, code, message)
    }

    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Level::Error, code, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Per-file status derived from the issue list.
pub enum Status {
    Ok,
    Warning,
    Error,
}

impl Status {
    /// `error` if any error, else `warning` if any warning, else `ok`.
    pub fn from_issues(issues: &[Issue]) -> Self {
        if issues.iter().any(|i| i.level == Level::Error) {
            Status::Error
        } else if issues.iter().any(|i| i.level == Level::Warning) {
            Status::Warning
        } else {
            Status::Ok
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Warning => "warning",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Disposition of an attempted automatic correction.
pub enum Outcome {
    #[default]
    NotRun,
    Ok,
    Fixed,
    Partial,
    Impossible,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::NotRun => "NOT_RUN",
            Outcome::Ok => "OK",
            Outcome::Fixed => "FIXED",
            Outcome::Partial => "PARTIAL",
            Outcome::Impossible => "IMPOSSIBLE",
            Outcome::Error => "ERROR",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
/// Analysis of one input file, later completed by the sanitizer.
pub struct FileAnalysis {
    pub source: PathBuf,
    pub file_type: String,
    pub status: Status,
    pub issues: Vec<Issue>,
    pub suggested_name: String,
    pub sha256: Option<String>,
    pub correction_outcome: Outcome,
    pub correction_actions: Vec<String>,
    pub output_path: Option<PathBuf>,
}

impl FileAnalysis {
    pub fn has_issue(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    /// Display name of the source file.
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.source.to_string_lossy().to_string())
    }

    /// Attach a finished correction. The correction is built in full before
    /// this call; the analysis is not touched again afterwards.
    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction_outcome = correction.outcome;
        self.correction_actions = correction.actions;
        if let Some(post) = correction.post {
            self.issues = post.issues;
            self.status = Status::from_issues(&self.issues);
            self.suggested_name = post.suggested_name;
            self.sha256 = Some(post.sha256);
            self.output_path = Some(post.output_path);
        }
        self
    }
}

#[derive(Debug, Clone)]
/// Result of re-validating a written output file.
pub struct PostRepair {
    pub output_path: PathBuf,
    pub issues: Vec<Issue>,
    pub suggested_name: String,
    pub sha256: String,
}

#[derive(Debug, Clone)]
/// Finished correction record for one file.
pub struct Correction {
    pub outcome: Outcome,
    pub actions: Vec<String>,
    /// Present only when an output file was written and re-validated.
    pub post: Option<PostRepair>,
}

impl Correction {
    /// Correction that never produced an output file.
    pub fn without_output(outcome: Outcome, action: impl Into<String>) -> Self {
        Self {
            outcome,
            actions: vec![action.into()],
            post: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Why an input path was skipped during enumeration.
pub enum ExclusionReason {
    TechnicalDirectory,
    PreviousOutput,
    ReportArtifact,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::TechnicalDirectory => "technical directory",
            ExclusionReason::PreviousOutput => "previous output folder",
            ExclusionReason::ReportArtifact => "report artifact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedPath {
    pub path: PathBuf,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, Default, Serialize)]
/// All analyses of one run plus the paths skipped as tool artifacts.
pub struct AnalysisSummary {
    pub files: Vec<FileAnalysis>,
    pub excluded: Vec<ExcludedPath>,
}

impl AnalysisSummary {
    pub fn has_errors(&self) -> bool {
        self.files.iter().any(|f| f.status == Status::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.files.iter().any(|f| f.status == Status::Warning)
    }

    pub fn count_status(&self, status: Status) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }

    pub fn count_outcome(&self, outcome: Outcome) -> usize {
        self.files
            .iter()
            .filter(|f| f.correction_outcome == outcome)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ignores_info_issues() {
        let issues = vec![Issue::info(IssueCode::PadesDetected, "sig")];
        assert_eq!(Status::from_issues(&issues), Status::Ok);
        let issues = vec![
            Issue::info(IssueCode::PadesDetected, "sig"),
            Issue::warning(IssueCode::FilenameNormalize, "name"),
        ];
        assert_eq!(Status::from_issues(&issues), Status::Warning);
        let issues = vec![
            Issue::warning(IssueCode::FilenameNormalize, "name"),
            Issue::error(IssueCode::PdfHeader, "hdr"),
        ];
        assert_eq!(Status::from_issues(&issues), Status::Error);
    }

    #[test]
    fn test_serialized_codes_match_taxonomy() {
        let v = serde_json::to_value(Issue::error(IssueCode::ZipExtForbidden, "x")).unwrap();
        assert_eq!(v["code"], "zip_ext_forbidden");
        assert_eq!(v["level"], "error");
        assert_eq!(IssueCode::ZipExtForbidden.as_str(), "zip_ext_forbidden");
        assert_eq!(
            serde_json::to_value(Outcome::NotRun).unwrap(),
            serde_json::json!("NOT_RUN")
        );
    }

    #[test]
    fn test_empty_summary_has_no_errors() {
        let s = AnalysisSummary::default();
        assert!(!s.has_errors());
        assert_eq!(s.count_outcome(Outcome::NotRun), 0);
    }
}
