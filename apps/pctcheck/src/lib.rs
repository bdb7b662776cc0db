//! pctcheck core library.
//!
//! This crate exposes programmatic APIs for checking a court e-filing
//! deposit against a profile and producing a conformant copy of it.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Config discovery, built-in profiles, effective settings.
//! - `normalize`: Filename normalization and validity.
//! - `checks`: PDF and ZIP structural checks.
//! - `validate`: Per-file validator producing a `FileAnalysis`.
//! - `heuristics`: Injectable junk/stop-word/classification tables.
//! - `namer`: Smart renaming and collision resolution.
//! - `repair`: ZIP flattening and cleanup.
//! - `sanitize`: Analyze/sanitize orchestration and outcome derivation.
//! - `report`: Manifest (JSON/CSV) and text reports.
//! - `hashing`: SHA-256 of written files.
//! - `models`: Issues, statuses, outcomes, profiles, summaries.
//! - `output`: Human/JSON printers.
//! - `error`: Error types.
//! - `utils`: Supporting helpers.
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod hashing;
pub mod heuristics;
pub mod models;
pub mod namer;
pub mod normalize;
pub mod output;
pub mod repair;
pub mod report;
pub mod sanitize;
pub mod utils;
pub mod validate;
