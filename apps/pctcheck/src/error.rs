//! Error types for operational failures.
//!
//! Structural problems in the checked files are never errors; they are
//! reported as `Issue` values. These types cover I/O, archive handling, and
//! configuration resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration and profile resolution failures. These abort a run before
/// any file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("profile '{name}' not found. Available: {}", available.join(", "))]
    UnknownProfile { name: String, available: Vec<String> },
}

/// Top-level error type for analysis and sanitization.
#[derive(Debug, Error)]
pub enum PctError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("output directory {} overlaps the input {}", output.display(), input.display())]
    OutputOverlapsInput { output: PathBuf, input: PathBuf },
}

/// Alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PctError>;
