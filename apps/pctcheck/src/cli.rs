//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pctcheck",
    version,
    about = "Compliance checker and sanitizer for e-filing deposits",
    long_about = "pctcheck — analyze a folder (or file) against a filing profile and produce a conformant copy.\n\nConfiguration precedence: CLI > pctcheck.toml > defaults.",
    after_help = "Examples:\n  pctcheck analyze ./pratica\n  pctcheck analyze ./pratica --profile pct_strict --output json\n  pctcheck sanitize ./pratica --backup\n  pctcheck sanitize ./pratica --out-dir /tmp/deposito --dry-run\n  pctcheck profiles",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current pctcheck version.")]
    Version,
    /// Analyze files without writing anything
    #[command(
        about = "Analyze a deposit",
        long_about = "Validate every file under the input against the profile. Nothing is written. Files with errors make the exit code non-zero.",
        after_help = "Examples:\n  pctcheck analyze ./pratica\n  pctcheck analyze ./atto.pdf --output json"
    )]
    Analyze {
        #[arg(help = "Input folder or file")]
        input: String,
        #[arg(long, help = "Profile name (default: from config, else pdua_safe)")]
        profile: Option<String>,
        #[arg(long, help = "Path to pctcheck.toml|yaml (default: discovered upward)")]
        config: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero on warnings too")]
        strict: bool,
    },
    /// Write a conformant copy of the input
    #[command(
        about = "Sanitize a deposit",
        long_about = "Copy, rename and repair files into <input>_conforme. Reports are written to its .pctcheck folder. The input is never modified.",
        after_help = "Examples:\n  pctcheck sanitize ./pratica\n  pctcheck sanitize ./pratica --out-dir /tmp/out --no-smart-rename"
    )]
    Sanitize {
        #[arg(help = "Input folder or file")]
        input: String,
        #[arg(long, help = "Profile name (default: from config, else pdua_safe)")]
        profile: Option<String>,
        #[arg(long, help = "Path to pctcheck.toml|yaml (default: discovered upward)")]
        config: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Place the output folder under this directory instead of next to the input")]
        out_dir: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Analyze only; write nothing")]
        dry_run: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Keep a copy of the input in .pctcheck/backup")]
        backup: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Only normalize names; skip smart renaming")]
        no_smart_rename: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero on warnings too")]
        strict: bool,
    },
    /// List known profiles
    #[command(
        about = "List profiles",
        long_about = "List built-in profiles and those declared in the discovered config."
    )]
    Profiles {
        #[arg(long, help = "Path to pctcheck.toml|yaml (default: discovered from current dir)")]
        config: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
