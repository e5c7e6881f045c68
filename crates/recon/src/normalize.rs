//! Cell normalization applied to every value before it reaches a resolver.
//!
//! Casing, repeated spaces, embedded newlines, surrounding quotes and
//! accents are not meaningful for matching, so they are folded away here.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

fn repeated_spaces() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("  +").expect("static pattern"))
}

/// Fold accented characters to their ASCII base where a decomposition exists.
/// Characters without one are kept as-is.
pub fn fold_ascii(value: &str) -> String {
    value.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Normalize a single cell value.
pub fn normalize(value: &str) -> String {
    let folded = fold_ascii(value);
    let collapsed = repeated_spaces().replace_all(&folded, " ");
    let single_line = collapsed.replace('\n', " ");
    single_line
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .to_lowercase()
        .trim()
        .to_string()
}
