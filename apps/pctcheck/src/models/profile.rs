//! Profile schema: the compliance rules a deposit is checked against, plus
//! the smart-rename options applied during sanitization.
//!
//! Profiles are loaded from `pctcheck.toml|yaml` (see `config`) or taken
//! from the built-in set. Extensions are stored lower-case without a dot.

use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
/// Filename rules under `[profiles.<name>.filename]`.
pub struct FilenameRules {
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_max_length() -> usize {
    80
}

impl Default for FilenameRules {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
/// A named set of compliance rules. Immutable for the duration of a run.
pub struct Profile {
    /// Filled in by the profile source; not part of the file format.
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub allowed_formats: BTreeSet<String>,
    #[serde(default)]
    pub warning_formats: BTreeSet<String>,
    #[serde(default)]
    pub filename: FilenameRules,
}

impl Profile {
    pub fn new<I, J, S, T>(name: &str, allowed: I, warning: J, max_length: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            name: name.to_string(),
            allowed_formats: allowed.into_iter().map(|s| clean_ext(s.as_ref())).collect(),
            warning_formats: warning.into_iter().map(|s| clean_ext(s.as_ref())).collect(),
            filename: FilenameRules { max_length },
        }
    }

    /// Lower-case extensions and drop leading dots after deserialization.
    pub fn normalized(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self.allowed_formats = self.allowed_formats.iter().map(|e| clean_ext(e)).collect();
        self.warning_formats = self.warning_formats.iter().map(|e| clean_ext(e)).collect();
        self
    }

    pub fn max_length(&self) -> usize {
        self.filename.max_length.max(1)
    }

    pub fn is_allowed(&self, ext: &str) -> bool {
        self.allowed_formats.contains(ext)
    }

    pub fn is_warning(&self, ext: &str) -> bool {
        self.warning_formats.contains(ext)
    }

    /// Whether content with this extension may be carried into the output.
    pub fn accepts(&self, ext: &str) -> bool {
        self.is_allowed(ext) || self.is_warning(ext)
    }
}

fn clean_ext(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
/// How the smart namer builds a human-readable label for a stem.
pub enum LabelStrategyKind {
    /// Keep the original words, only cleaned.
    #[default]
    Literal,
    /// Map known document kinds to canonical labels.
    Classify,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
/// Smart-rename options under `[naming]`.
pub struct SmartRenameOptions {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_filename_len")]
    pub max_filename_len: usize,
    #[serde(default = "default_max_output_path_len")]
    pub max_output_path_len: usize,
    #[serde(default)]
    pub strategy: LabelStrategyKind,
}

fn default_true() -> bool {
    true
}

fn default_max_filename_len() -> usize {
    60
}

fn default_max_output_path_len() -> usize {
    180
}

impl Default for SmartRenameOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            max_filename_len: default_max_filename_len(),
            max_output_path_len: default_max_output_path_len(),
            strategy: LabelStrategyKind::Literal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_toml_normalizes_extensions() {
        let p: Profile = toml::from_str(
            r#"
allowed_formats = ["PDF", ".zip"]
warning_formats = ["png"]
[filename]
max_length = 40
"#,
        )
        .unwrap();
        let p = p.normalized("custom");
        assert!(p.is_allowed("pdf"));
        assert!(p.is_allowed("zip"));
        assert!(p.is_warning("png"));
        assert!(p.accepts("png"));
        assert!(!p.accepts("mp4"));
        assert_eq!(p.max_length(), 40);
        assert_eq!(p.name, "custom");
    }

    #[test]
    fn test_naming_defaults() {
        let n: SmartRenameOptions = toml::from_str("").unwrap();
        assert_eq!(n, SmartRenameOptions::default());
        let n: SmartRenameOptions = serde_yaml::from_str("strategy: classify\nenabled: false").unwrap();
        assert_eq!(n.strategy, LabelStrategyKind::Classify);
        assert!(!n.enabled);
        assert_eq!(n.max_filename_len, 60);
    }
}
