//! pctcheck CLI binary entry point.
//! Resolves configuration, delegates to analyze/sanitize and prints results.

use clap::Parser;
use pctcheck::cli::{Cli, Commands};
use pctcheck::config::{self, CliOverrides, ProfileSource};
use pctcheck::error::{ConfigError, PctError};
use pctcheck::models::AnalysisSummary;
use pctcheck::sanitize::{self, OutputMode, SanitizeOptions};
use pctcheck::{output, utils};
use std::path::{Path, PathBuf};
use std::process::exit;

const EXIT_ERRORS: i32 = 1;
const EXIT_WARNINGS: i32 = 2;
const EXIT_CONFIG: i32 = 3;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn fail_config(err: ConfigError) -> ! {
    eprintln!("{} {}", utils::error_prefix(), err);
    exit(EXIT_CONFIG);
}

fn check_input(input: &Path) {
    if !input.exists() {
        eprintln!(
            "{} Input not found: {}",
            utils::error_prefix(),
            input.display()
        );
        exit(EXIT_ERRORS);
    }
}

fn note_config(path: Option<&Path>, output: &str) {
    if output == "json" {
        return;
    }
    match path {
        Some(p) => eprintln!("{} Using config {}", utils::info_prefix(), p.display()),
        None => eprintln!(
            "{} No pctcheck.toml found; using built-in profiles.",
            utils::note_prefix()
        ),
    }
}

fn exit_for(summary: &AnalysisSummary, strict: bool) {
    if summary.has_errors() {
        exit(EXIT_ERRORS);
    }
    if strict && summary.has_warnings() {
        exit(EXIT_WARNINGS);
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Analyze {
            input,
            profile,
            config,
            output,
            strict,
        } => {
            let input = PathBuf::from(input);
            check_input(&input);
            let overrides = CliOverrides {
                config: config.as_deref(),
                profile: profile.as_deref(),
                output: output.as_deref(),
                ..CliOverrides::default()
            };
            let eff = config::resolve_effective(&input, &overrides).unwrap_or_else(|e| fail_config(e));
            note_config(eff.config_path.as_deref(), &eff.output);
            let summary = sanitize::analyze(&input, &eff.profile);
            output::print_analysis(&summary, &input, &eff.output);
            exit_for(&summary, strict);
        }
        Commands::Sanitize {
            input,
            profile,
            config,
            output,
            out_dir,
            dry_run,
            backup,
            no_smart_rename,
            strict,
        } => {
            let input = PathBuf::from(input);
            check_input(&input);
            let overrides = CliOverrides {
                config: config.as_deref(),
                profile: profile.as_deref(),
                output: output.as_deref(),
                // flags only ever switch a behavior on; absent means "use config"
                backup: backup.then_some(true),
                smart_rename: no_smart_rename.then_some(false),
            };
            let eff = config::resolve_effective(&input, &overrides).unwrap_or_else(|e| fail_config(e));
            note_config(eff.config_path.as_deref(), &eff.output);
            let opts = SanitizeOptions {
                dry_run,
                output_mode: out_dir
                    .map(|d| OutputMode::Custom(PathBuf::from(d)))
                    .unwrap_or_default(),
                backup: eff.backup,
                naming: eff.naming.clone(),
                ..SanitizeOptions::default()
            };
            match sanitize::sanitize(&input, &eff.profile, &opts) {
                Ok((dir, summary)) => {
                    output::print_sanitize(&summary, &input, dir.as_deref(), &eff.output);
                    exit_for(&summary, strict);
                }
                Err(PctError::Config(e)) => fail_config(e),
                Err(e) => {
                    eprintln!("{} {}", utils::error_prefix(), e);
                    exit(EXIT_ERRORS);
                }
            }
        }
        Commands::Profiles { config, output } => {
            let output = output.unwrap_or_else(|| "human".to_string());
            let cwd = PathBuf::from(".");
            let (path, cfg) = config::config_for(&cwd, config.as_deref())
                .unwrap_or_else(|e| fail_config(e));
            note_config(path.as_deref(), &output);
            output::print_profiles(&ProfileSource::from_config(&cfg), &output);
        }
    }
}
