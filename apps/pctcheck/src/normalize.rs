//! Filename normalization.
//!
//! `normalize` turns any name into one that satisfies `is_valid` for the same
//! length limit: accented Latin letters are transliterated, remaining
//! combining marks dropped, everything outside `[A-Za-z0-9._-]` becomes `_`,
//! runs of `_` collapse, and the stem is cut to fit the limit.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static VALID_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid regex"));
static UNDERSCORE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("valid regex"));

/// Explicit transliterations applied before Unicode decomposition. Covers
/// letters NFKD leaves untouched (ß, æ, ø, ...) as well as the common
/// Italian accented vowels.
const TRANSLITERATIONS: &[(char, &str)] = &[
    ('à', "a"),
    ('á', "a"),
    ('è', "e"),
    ('é', "e"),
    ('ì', "i"),
    ('í', "i"),
    ('ò', "o"),
    ('ó', "o"),
    ('ù', "u"),
    ('ú', "u"),
    ('À', "A"),
    ('Á', "A"),
    ('È', "E"),
    ('É', "E"),
    ('Ì', "I"),
    ('Í', "I"),
    ('Ò', "O"),
    ('Ó', "O"),
    ('Ù', "U"),
    ('Ú', "U"),
    ('ß', "ss"),
    ('æ', "ae"),
    ('Æ', "AE"),
    ('œ', "oe"),
    ('Œ', "OE"),
    ('ø', "o"),
    ('Ø', "O"),
    ('đ', "d"),
    ('Đ', "D"),
    ('ł', "l"),
    ('Ł', "L"),
];

const EDGE_CHARS: [char; 3] = ['.', '_', '-'];

/// Split a file name into `(stem, extension)`; the extension keeps its dot.
///
/// A leading dot (`.bashrc`) or a trailing dot (`name.`) does not start an
/// extension.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 && i + 1 < name.len() => (&name[..i], &name[i..]),
        _ => (name, ""),
    }
}

/// Lower-case extension without the dot, or empty.
pub fn extension_of(name: &str) -> String {
    let (_, ext) = split_name(name);
    ext.trim_start_matches('.').to_lowercase()
}

/// Transliterate accented letters and drop combining marks.
pub fn strip_accents(text: &str) -> String {
    let mut mapped = String::with_capacity(text.len());
    for ch in text.chars() {
        match TRANSLITERATIONS.iter().find(|(c, _)| *c == ch) {
            Some((_, repl)) => mapped.push_str(repl),
            None => mapped.push(ch),
        }
    }
    mapped.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' || ch == '-'
}

/// Clean a stem without applying any length limit. The result may be empty.
///
/// With `keep_dots = false` dots are replaced too, so the cleaned text can
/// never be mistaken for `stem.ext` on a later pass.
pub fn clean_stem(text: &str, keep_dots: bool) -> String {
    let replaced: String = strip_accents(text)
        .chars()
        .map(|c| {
            if c == '.' && !keep_dots {
                '_'
            } else if is_name_char(c) {
                c
            } else {
                '_'
            }
        })
        .collect();
    let collapsed = UNDERSCORE_RUN.replace_all(&replaced, "_");
    collapsed.trim_matches(&EDGE_CHARS[..]).to_string()
}

fn clean_extension(ext: &str) -> String {
    strip_accents(ext)
        .chars()
        .map(|c| if is_name_char(c) { c } else { '_' })
        .collect()
}

/// Normalize `name` so that `is_valid(result, max_length)` holds.
///
/// The stem is cut so that `stem + extension` fits `max_length`; at least
/// one stem character always remains, and an extension too long to leave
/// that room is shortened (or dropped when nothing but the dot would fit).
pub fn normalize(name: &str, max_length: usize) -> String {
    let max_length = max_length.max(1);
    let (stem, ext) = split_name(name);
    let has_ext = !ext.is_empty();

    let mut ext = clean_extension(ext);
    if ext.len() >= max_length {
        ext.truncate(max_length - 1);
    }
    if ext.len() < 2 {
        ext.clear();
    }

    let budget = max_length - ext.len();
    let mut cleaned = clean_stem(stem, has_ext);
    if cleaned.is_empty() {
        cleaned = "file".to_string();
    }
    cleaned.truncate(budget);
    let mut cleaned = cleaned.trim_end_matches(&EDGE_CHARS[..]).to_string();
    if cleaned.is_empty() {
        cleaned = "file"[..budget.min(4)].to_string();
    }
    format!("{cleaned}{ext}")
}

/// True iff `name` fits `max_length` and uses only `[A-Za-z0-9._-]`.
pub fn is_valid(name: &str, max_length: usize) -> bool {
    name.len() <= max_length && VALID_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AWKWARD: &[&str] = &[
        "Atto di citazione àèé.pdf",
        "x.pdf",
        "  spaced   out  .pdf",
        "___.pdf",
        ".bashrc",
        "name.",
        "a_.b.",
        "a.b.c.pdf",
        "relazione ctu (def) v2.DOCX",
        "ümlaut straße.txt",
        "日本語.pdf",
        "file.p df",
        "report.verylongextensionname",
        "-leading-and-trailing-.zip",
        "",
        "...",
        "Nota per Ufficiale Giudiziario_signed.pdf",
    ];

    #[test]
    fn test_normalize_italian_accents() {
        assert_eq!(
            normalize("Atto di citazione àèé.pdf", 80),
            "Atto_di_citazione_aee.pdf"
        );
    }

    #[test]
    fn test_normalize_trims_to_limit() {
        let name = format!("{}.pdf", "x".repeat(200));
        let out = normalize(&name, 80);
        assert_eq!(out.len(), 80);
        assert!(out.ends_with(".pdf"));
    }

    #[test]
    fn test_normalize_empty_stem_becomes_file() {
        assert_eq!(normalize("___.pdf", 80), "file.pdf");
        assert_eq!(normalize("日本語.pdf", 80), "file.pdf");
    }

    #[test]
    fn test_normalize_keeps_one_stem_char_when_extension_is_huge() {
        let out = normalize("report.verylongextensionname", 5);
        assert_eq!(out, "r.ver");
        assert!(is_valid(&out, 5));
        assert_eq!(normalize("report.pdf", 1), "r");
    }

    #[test]
    fn test_normalize_output_is_valid_for_all_limits() {
        for name in AWKWARD {
            for limit in 1..=40 {
                let out = normalize(name, limit);
                assert!(is_valid(&out, limit), "{name:?} @ {limit} -> {out:?}");
            }
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for name in AWKWARD {
            for limit in 1..=40 {
                let once = normalize(name, limit);
                let twice = normalize(&once, limit);
                assert_eq!(once, twice, "{name:?} @ {limit}");
            }
        }
    }

    #[test]
    fn test_is_valid_rejects_separators_and_unicode() {
        assert!(is_valid("Atto_01.pdf", 80));
        assert!(!is_valid("Atto 01.pdf", 80));
        assert!(!is_valid("dir/Atto.pdf", 80));
        assert!(!is_valid("àtto.pdf", 80));
        assert!(!is_valid("", 80));
        assert!(!is_valid("abcdef.pdf", 5));
    }

    #[test]
    fn test_split_name_edge_cases() {
        assert_eq!(split_name("a.b.pdf"), ("a.b", ".pdf"));
        assert_eq!(split_name(".bashrc"), (".bashrc", ""));
        assert_eq!(split_name("name."), ("name.", ""));
        assert_eq!(extension_of("SCAN.PDF"), "pdf");
        assert_eq!(extension_of("README"), "");
    }
}
