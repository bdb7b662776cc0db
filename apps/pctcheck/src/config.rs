//! Configuration discovery and effective settings resolution.
//!
//! pctcheck reads `pctcheck.toml|yaml|yml` from the input's directory (or
//! the closest ancestor) and merges it with CLI flags to produce an
//! `Effective` config. Defaults:
//! - profile: `pdua_safe`
//! - output: `human`
//! - `[naming]`: smart rename enabled, literal labels, 60/180 budgets
//! - `[output].backup`: false
//!
//! Profiles declared in the file extend the built-in set and replace
//! built-ins of the same name.
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::ConfigError;
use crate::models::profile::{Profile, SmartRenameOptions};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILES: [&str; 3] = ["pctcheck.toml", "pctcheck.yaml", "pctcheck.yml"];
pub const DEFAULT_PROFILE: &str = "pdua_safe";

#[derive(Debug, Default, Deserialize, Clone)]
/// Output section under `[output]`.
pub struct OutputCfg {
    pub backup: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `pctcheck.toml|yaml`.
pub struct PctConfig {
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
    pub naming: Option<SmartRenameOptions>,
    pub output: Option<OutputCfg>,
}

/// Walk upward from `start` looking for a config file.
pub fn detect_config(start: &Path) -> Option<PathBuf> {
    let start = if start.is_file() {
        start.parent().unwrap_or(start)
    } else {
        start
    };
    let mut cur = Some(start);
    while let Some(dir) = cur {
        for name in CONFIG_FILES {
            let p = dir.join(name);
            if p.is_file() {
                return Some(p);
            }
        }
        cur = dir.parent();
    }
    None
}

/// Load a config file, choosing the parser from its extension.
pub fn load_config(path: &Path) -> Result<PctConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&text).map_err(|e| parse_err(e.to_string()))
    } else {
        toml::from_str(&text).map_err(|e| parse_err(e.to_string()))
    }
}

#[derive(Debug, Clone)]
/// Named profiles available to a run.
pub struct ProfileSource {
    profiles: BTreeMap<String, Profile>,
    default: String,
}

impl ProfileSource {
    /// The built-in profiles: `pdua_safe` (broad) and `pct_strict`.
    pub fn builtin() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "pdua_safe".to_string(),
            Profile::new(
                "pdua_safe",
                [
                    "pdf", "p7m", "xml", "zip", "eml", "msg", "txt", "jpg", "jpeg", "tif", "tiff",
                ],
                ["png", "gif", "rtf"],
                80,
            ),
        );
        profiles.insert(
            "pct_strict".to_string(),
            Profile::new(
                "pct_strict",
                ["pdf", "p7m", "xml", "zip", "eml", "msg"],
                Vec::<String>::new(),
                60,
            ),
        );
        Self {
            profiles,
            default: DEFAULT_PROFILE.to_string(),
        }
    }

    pub fn from_config(cfg: &PctConfig) -> Self {
        let mut source = Self::builtin();
        for (name, profile) in &cfg.profiles {
            source
                .profiles
                .insert(name.clone(), profile.clone().normalized(name));
        }
        if let Some(d) = &cfg.default_profile {
            source.default = d.clone();
        }
        source
    }

    /// Sorted profile names.
    pub fn names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Resolve `name`, or the default profile when `None`.
    pub fn resolve(&self, name: Option<&str>) -> Result<Profile, ConfigError> {
        let name = name.unwrap_or(&self.default);
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownProfile {
                name: name.to_string(),
                available: self.names(),
            })
    }
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub config_path: Option<PathBuf>,
    pub profile: Profile,
    pub naming: SmartRenameOptions,
    pub backup: bool,
    pub output: String,
}

/// Locate and load the config for `input`. An explicit path must exist.
pub fn config_for(
    input: &Path,
    cli_config: Option<&str>,
) -> Result<(Option<PathBuf>, PctConfig), ConfigError> {
    let path = match cli_config {
        Some(p) => Some(PathBuf::from(p)),
        None => detect_config(input),
    };
    match path {
        Some(p) => {
            let cfg = load_config(&p)?;
            debug!(config = %p.display(), "configuration loaded");
            Ok((Some(p), cfg))
        }
        None => Ok((None, PctConfig::default())),
    }
}

/// Options the CLI may override.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides<'a> {
    pub config: Option<&'a str>,
    pub profile: Option<&'a str>,
    pub output: Option<&'a str>,
    pub backup: Option<bool>,
    pub smart_rename: Option<bool>,
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(input: &Path, cli: &CliOverrides<'_>) -> Result<Effective, ConfigError> {
    let (config_path, cfg) = config_for(input, cli.config)?;
    let profile = ProfileSource::from_config(&cfg).resolve(cli.profile)?;

    let mut naming = cfg.naming.clone().unwrap_or_default();
    if let Some(enabled) = cli.smart_rename {
        naming.enabled = enabled;
    }
    let backup = cli
        .backup
        .or_else(|| cfg.output.as_ref().and_then(|o| o.backup))
        .unwrap_or(false);
    let output = cli.output.unwrap_or("human").to_string();

    Ok(Effective {
        config_path,
        profile,
        naming,
        backup,
        output,
    })
}
