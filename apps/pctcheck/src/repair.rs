//! Archive repair: rebuild a ZIP as a flat, clean, deflate-compressed copy.
//!
//! The source is extracted into a private scratch directory. Junk and lock
//! files are dropped, entries with formats the profile does not accept are
//! dropped and mark the repair as impossible, and every remaining entry is
//! renamed to its normalized basename (collisions resolved with `_02`, ...).
//! The new archive is assembled in scratch and copied to `dst` only once
//! complete, so `dst` never holds a half-written archive.

use crate::error::Result;
use crate::heuristics::Heuristics;
use crate::models::profile::Profile;
use crate::namer::ensure_unique;
use crate::normalize::{extension_of, normalize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Debug, Clone, Default)]
pub struct RepairReport {
    /// Human-readable audit trail, in processing order.
    pub actions: Vec<String>,
    /// Set when content had to be dropped because its format is not allowed.
    pub impossible: bool,
    /// Entry names written to the repaired archive.
    pub entries: Vec<String>,
}

fn extract(src: &Path, root: &Path, actions: &mut Vec<String>) -> Result<()> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(src)?))?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(rel) = entry.enclosed_name() else {
            actions.push(format!("[ZIP] Unsafe entry path dropped: {}", entry.name()));
            continue;
        };
        let out = root.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&out)?);
        io::copy(&mut entry, &mut writer)?;
        writer.flush()?;
    }
    Ok(())
}

fn extracted_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Repair the archive at `src` into `dst` under `profile`.
pub fn repair_archive(
    src: &Path,
    dst: &Path,
    profile: &Profile,
    tables: &Heuristics,
) -> Result<RepairReport> {
    let mut report = RepairReport {
        actions: vec!["[ZIP] Archive repair started".to_string()],
        ..RepairReport::default()
    };
    let scratch = tempfile::Builder::new().prefix("pctcheck_zip_").tempdir()?;
    let root = scratch.path().join("content");
    fs::create_dir_all(&root)?;
    extract(src, &root, &mut report.actions)?;

    let max_len = profile.max_length();
    let mut used: HashSet<String> = HashSet::new();
    let mut staged: Vec<(String, PathBuf)> = Vec::new();

    for path in extracted_files(&root)? {
        let rel = path.strip_prefix(&root).unwrap_or(&path).to_path_buf();
        let rel_display = rel.to_string_lossy().replace('\\', "/");
        let raw_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let junk = rel
            .components()
            .any(|c| tables.is_junk(&c.as_os_str().to_string_lossy()));
        if junk || tables.is_temp(&raw_name) {
            report
                .actions
                .push(format!("[ZIP] Removed system file: {rel_display}"));
            continue;
        }

        let ext = extension_of(&raw_name);
        if !profile.accepts(&ext) {
            report
                .actions
                .push(format!("[ZIP] Forbidden format removed: {rel_display}"));
            report.impossible = true;
            continue;
        }

        let final_name = ensure_unique(&mut used, &normalize(&raw_name, max_len), max_len);
        if final_name != raw_name {
            report
                .actions
                .push(format!("[ZIP] Renamed: {raw_name} -> {final_name}"));
        }
        if rel.parent().is_some_and(|p| !p.as_os_str().is_empty()) {
            report
                .actions
                .push(format!("[ZIP] Folder structure flattened: {rel_display}"));
        }
        debug!(entry = %rel_display, name = %final_name, "staged archive entry");
        staged.push((final_name, path));
    }

    let packed = scratch.path().join("repacked.zip");
    {
        let mut writer = ZipWriter::new(BufWriter::new(File::create(&packed)?));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        for (name, path) in &staged {
            writer.start_file(name.as_str(), options)?;
            let mut f = File::open(path)?;
            io::copy(&mut f, &mut writer)?;
        }
        writer.finish()?.flush()?;
    }
    fs::copy(&packed, dst)?;

    report.entries = staged.into_iter().map(|(name, _)| name).collect();
    report
        .actions
        .push("[ZIP] Rebuilt as a flat compliant ZIP".to_string());
    info!(
        src = %src.display(),
        entries = report.entries.len(),
        impossible = report.impossible,
        "archive repaired"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    fn profile() -> Profile {
        Profile::new("t", ["pdf", "txt"], Vec::<String>::new(), 80)
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zw = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            zw.start_file(*name, SimpleFileOptions::default()).unwrap();
            zw.write_all(data).unwrap();
        }
        zw.finish().unwrap();
    }

    fn names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_flatten_and_cleanup() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("in.zip");
        let dst = dir.path().join("out.zip");
        write_zip(
            &src,
            &[("folder/doc 1.pdf", b"%PDF-1.4\n"), ("folder/Thumbs.db", b"x")],
        );
        let report = repair_archive(&src, &dst, &profile(), &Heuristics::default()).unwrap();
        let out = names(&dst);
        assert_eq!(out, vec!["doc_1.pdf".to_string()]);
        assert!(out.iter().all(|n| !n.contains('/')));
        assert!(!report.impossible);
        assert!(report.actions.iter().any(|a| a.contains("Folder structure flattened")));
        assert!(report.actions.iter().any(|a| a.contains("Removed system file")));
    }

    #[test]
    fn test_forbidden_entry_marks_impossible() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("in.zip");
        let dst = dir.path().join("out.zip");
        write_zip(&src, &[("atto.pdf", b"%PDF"), ("video.mp4", b"fake")]);
        let report = repair_archive(&src, &dst, &profile(), &Heuristics::default()).unwrap();
        assert!(report.impossible);
        assert_eq!(names(&dst), vec!["atto.pdf".to_string()]);
    }

    #[test]
    fn test_in_archive_collisions_resolved() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("in.zip");
        let dst = dir.path().join("out.zip");
        write_zip(
            &src,
            &[("a/atto.pdf", b"%PDF-a"), ("b/atto.pdf", b"%PDF-b"), ("~$atto.txt", b"lock")],
        );
        let report = repair_archive(&src, &dst, &profile(), &Heuristics::default()).unwrap();
        assert_eq!(report.entries, vec!["atto.pdf", "atto_02.pdf"]);
        let mut archive = ZipArchive::new(File::open(&dst).unwrap()).unwrap();
        let mut second = String::new();
        archive
            .by_name("atto_02.pdf")
            .unwrap()
            .read_to_string(&mut second)
            .unwrap();
        assert_eq!(second, "%PDF-b");
    }

    #[test]
    fn test_long_colliding_entries_fit_limit() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("in.zip");
        let dst = dir.path().join("out.zip");
        let long = "x".repeat(56);
        let a = format!("a/{long}.pdf");
        let b = format!("b/{long}.pdf");
        write_zip(&src, &[(a.as_str(), b"%PDF-a"), (b.as_str(), b"%PDF-b")]);
        let strict = Profile::new("strict", ["pdf"], Vec::<String>::new(), 60);
        let report = repair_archive(&src, &dst, &strict, &Heuristics::default()).unwrap();
        assert_eq!(report.entries.len(), 2);
        assert_ne!(report.entries[0], report.entries[1]);
        for name in names(&dst) {
            assert!(crate::normalize::is_valid(&name, 60), "{name}");
        }
    }

    #[test]
    fn test_corrupt_source_leaves_no_output() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("in.zip");
        let dst = dir.path().join("out.zip");
        std::fs::write(&src, b"garbage").unwrap();
        assert!(repair_archive(&src, &dst, &profile(), &Heuristics::default()).is_err());
        assert!(!dst.exists());
    }

    #[test]
    fn test_repack_is_deterministic() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("in.zip");
        write_zip(&src, &[("x/uno.pdf", b"%PDF-1"), ("due.txt", b"2")]);
        let a = dir.path().join("a.zip");
        let b = dir.path().join("b.zip");
        repair_archive(&src, &a, &profile(), &Heuristics::default()).unwrap();
        repair_archive(&src, &b, &profile(), &Heuristics::default()).unwrap();
        assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
    }
}
