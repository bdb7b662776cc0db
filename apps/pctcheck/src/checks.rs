//! Type-specific structural checks.
//!
//! - PDF: header magic, `%%EOF` trailer near the end, encryption dictionary,
//!   and a heuristic PAdES signature marker (presence only, never verified).
//! - ZIP: container readability, then per-entry junk/lock/nesting/extension
//!   and naming rules, plus one archive-level mixed-signature warning.

use crate::heuristics::Heuristics;
use crate::models::profile::Profile;
use crate::models::{Issue, IssueCode};
use crate::normalize::{extension_of, is_valid};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF";
const PDF_EOF: &[u8] = b"%%EOF";
const PDF_ENCRYPT: &[u8] = b"/Encrypt";
const PDF_BYTE_RANGE: &[u8] = b"/ByteRange";
const PDF_CONTENTS: &[u8] = b"/Contents";
const TRAILER_WINDOW: usize = 2048;

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Structural checks over the raw bytes of a PDF.
///
/// A missing header short-circuits: no further PDF checks run.
pub fn check_pdf_bytes(blob: &[u8]) -> Vec<Issue> {
    let mut issues = Vec::new();
    if !blob.starts_with(PDF_MAGIC) {
        issues.push(Issue::error(IssueCode::PdfHeader, "Invalid PDF header."));
        return issues;
    }
    let tail = &blob[blob.len().saturating_sub(TRAILER_WINDOW)..];
    if !contains(tail, PDF_EOF) {
        issues.push(Issue::error(
            IssueCode::PdfIntegrity,
            "PDF EOF trailer not found; the file may be truncated or corrupt.",
        ));
    }
    if contains(blob, PDF_ENCRYPT) {
        issues.push(Issue::error(
            IssueCode::PdfEncrypted,
            "PDF is encrypted and cannot be opened without a password.",
        ));
    }
    if contains(blob, PDF_BYTE_RANGE) && contains(blob, PDF_CONTENTS) {
        issues.push(Issue::info(
            IssueCode::PadesDetected,
            "Possible PAdES signature detected.",
        ));
    }
    issues
}

/// Read `path` and run the PDF checks. An unreadable file is reported as a
/// header failure.
pub fn check_pdf(path: &Path) -> Vec<Issue> {
    match std::fs::read(path) {
        Ok(blob) => check_pdf_bytes(&blob),
        Err(e) => vec![Issue::error(
            IssueCode::PdfHeader,
            format!("PDF could not be read: {e}"),
        )],
    }
}

/// Open `path` as a ZIP container and check its entries. A container that
/// cannot be opened yields a single `zip_corrupt` error.
pub fn check_zip(path: &Path, profile: &Profile, tables: &Heuristics) -> Vec<Issue> {
    let names = match File::open(path)
        .map_err(zip::result::ZipError::from)
        .and_then(|f| zip::ZipArchive::new(BufReader::new(f)))
    {
        Ok(archive) => archive.file_names().map(str::to_string).collect::<Vec<_>>(),
        Err(e) => {
            return vec![Issue::error(
                IssueCode::ZipCorrupt,
                format!("ZIP archive is corrupt: {e}"),
            )]
        }
    };
    let mut names = names;
    // central directory order is not guaranteed; keep reports stable
    names.sort();
    check_zip_entries(&names, profile, tables)
}

fn components(name: &str) -> Vec<&str> {
    name.split(['/', '\\']).filter(|c| !c.is_empty()).collect()
}

/// Entry-level rules over archive member names.
pub fn check_zip_entries(names: &[String], profile: &Profile, tables: &Heuristics) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut has_signed_pdf = false;
    let mut has_unsigned_pdf = false;

    for name in names {
        let parts = components(name);
        let Some(base) = parts.last().copied() else {
            continue;
        };
        if parts.iter().any(|p| tables.is_junk(p)) {
            issues.push(Issue::error(
                IssueCode::ZipJunk,
                format!("System file not allowed in ZIP: {name}"),
            ));
            continue;
        }
        if tables.is_temp(base) {
            issues.push(Issue::error(
                IssueCode::ZipTemp,
                format!("Temporary file not allowed in ZIP: {name}"),
            ));
            continue;
        }
        if parts.len() > 1 || name.ends_with('/') {
            issues.push(Issue::error(
                IssueCode::ZipNested,
                format!("ZIP is not flat (contains folders): {name}"),
            ));
        }
        if name.ends_with('/') {
            // directory entry: nothing else to check
            continue;
        }
        if base.matches('.').count() > 1 {
            issues.push(Issue::error(
                IssueCode::ZipDoubleExt,
                format!("Double extension: {base}"),
            ));
        }

        let ext = extension_of(base);
        if profile.is_warning(&ext) {
            issues.push(Issue::warning(
                IssueCode::ZipWarningExt,
                format!("Format accepted with warning inside ZIP: {base}"),
            ));
        } else if !profile.is_allowed(&ext) {
            issues.push(Issue::error(
                IssueCode::ZipExtForbidden,
                format!("Format not allowed inside ZIP: {base}"),
            ));
        }

        if !is_valid(base, profile.max_length()) {
            issues.push(Issue::warning(
                IssueCode::ZipName,
                format!("Name inside ZIP must be normalized: {base}"),
            ));
        }

        if ext == "pdf" {
            if base.to_lowercase().contains(&tables.signed_hint) {
                has_signed_pdf = true;
            } else {
                has_unsigned_pdf = true;
            }
        }
    }

    if has_signed_pdf && has_unsigned_pdf {
        issues.push(Issue::warning(
            IssueCode::ZipMixedPades,
            "Signed and unsigned PDFs in the same ZIP.",
        ));
    }
    issues
}
