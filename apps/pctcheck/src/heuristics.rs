//! Heuristic tables shared by the validator, the archive repair, and the
//! smart namer: OS junk names, lock-file prefixes, stop-words, signature
//! markers, and document classification rules.
//!
//! The tables are plain data. `Heuristics::default()` returns the built-in
//! set; callers and tests can construct variants and pass them in.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A token that marks a digitally signed document and the suffix that
/// preserves that information in a renamed file.
pub struct SignatureMarker {
    pub keyword: String,
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// How a matching classification rule builds its label.
pub enum LabelTemplate {
    /// Use this label verbatim.
    Fixed(String),
    /// `PREFIX_` followed by the upper-cased meaningful tokens of the stem.
    Prefixed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Maps stems containing any of `keywords` (as whole tokens,
/// case-insensitive) to a canonical label.
pub struct ClassRule {
    pub keywords: Vec<String>,
    pub template: LabelTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heuristics {
    /// OS-generated names never allowed in a deposit (files or folders).
    pub junk_names: BTreeSet<String>,
    /// Prefix of office lock files.
    pub temp_prefix: String,
    /// Substring marking a signed PDF inside an archive.
    pub signed_hint: String,
    pub stop_words: BTreeSet<String>,
    pub signature_markers: Vec<SignatureMarker>,
    pub class_rules: Vec<ClassRule>,
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            junk_names: set(&["__MACOSX", ".DS_Store", "Thumbs.db"]),
            temp_prefix: "~$".to_string(),
            signed_hint: "signed".to_string(),
            stop_words: set(&[
                "pec",
                "email",
                "posta",
                "elettronica",
                "signed",
                "firmato",
                "pdf",
                "msg",
                "eml",
                "spa",
            ]),
            signature_markers: vec![
                SignatureMarker {
                    keyword: "signed".to_string(),
                    suffix: "_signed".to_string(),
                },
                SignatureMarker {
                    keyword: "firmato".to_string(),
                    suffix: "_firmato".to_string(),
                },
            ],
            class_rules: vec![
                ClassRule {
                    keywords: vec!["pagopa".to_string()],
                    template: LabelTemplate::Fixed("Ricevuta_PagoPA".to_string()),
                },
                ClassRule {
                    keywords: vec!["pec".to_string()],
                    template: LabelTemplate::Prefixed("PEC".to_string()),
                },
                ClassRule {
                    keywords: vec!["relata".to_string(), "notifica".to_string()],
                    template: LabelTemplate::Prefixed("NOTIFICA".to_string()),
                },
            ],
        }
    }
}

/// Alphanumeric runs of `stem`, in order.
pub fn tokens(stem: &str) -> Vec<&str> {
    stem.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

impl Heuristics {
    /// Whether `name` (a single path component) is OS junk.
    pub fn is_junk(&self, name: &str) -> bool {
        self.junk_names.contains(name)
    }

    /// Whether `name` is an office lock file.
    pub fn is_temp(&self, name: &str) -> bool {
        name.starts_with(&self.temp_prefix)
    }

    /// Suffix to carry over for a signed document, if the stem says so.
    /// The marker keyword must appear as a whole token.
    pub fn signature_suffix(&self, stem: &str) -> Option<&str> {
        let low = stem.to_lowercase();
        let toks = tokens(&low);
        self.signature_markers
            .iter()
            .find(|m| toks.iter().any(|t| *t == m.keyword))
            .map(|m| m.suffix.as_str())
    }

    /// Canonical label for `stem`, or `None` when no rule matches.
    pub fn classify(&self, stem: &str) -> Option<String> {
        let low = stem.to_lowercase();
        let toks = tokens(&low);
        let rule = self
            .class_rules
            .iter()
            .find(|r| r.keywords.iter().any(|k| toks.contains(&k.as_str())))?;
        match &rule.template {
            LabelTemplate::Fixed(label) => Some(label.clone()),
            LabelTemplate::Prefixed(prefix) => {
                let meaningful: Vec<String> = tokens(stem)
                    .into_iter()
                    .filter(|t| t.len() >= 2)
                    .filter(|t| {
                        let l = t.to_lowercase();
                        !self.stop_words.contains(&l) && !rule.keywords.contains(&l)
                    })
                    .map(|t| t.to_uppercase())
                    .collect();
                if meaningful.is_empty() {
                    Some(prefix.clone())
                } else {
                    Some(format!("{}_{}", prefix, meaningful.join("_")))
                }
            }
        }
    }
}
