use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// U+001C..U+001F (file/group/record/unit separators) count as whitespace too
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\x1C-\x1F-]").expect("valid regex"));
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-\s\x1C-\x1F]+").expect("valid regex"));

fn is_separator_space(c: char) -> bool {
    c.is_whitespace() || ('\x1C'..='\x1F').contains(&c)
}

/// Turn free text into a lowercase ASCII identifier safe for file names and URLs.
///
/// Accents are stripped by NFKD decomposition (combining marks and any other
/// non-ASCII residue are dropped), punctuation is removed, and every run of
/// whitespace or hyphens becomes a single `_`. Never fails; the output only
/// contains `[a-z0-9_]`.
pub fn slugify(text: &str) -> String {
    let ascii: String = text.nfkd().filter(char::is_ascii).collect();
    let cleaned = DISALLOWED.replace_all(&ascii, "");
    let lowered = cleaned.trim_matches(is_separator_space).to_lowercase();
    SEPARATORS.replace_all(&lowered, "_").into_owned()
}
