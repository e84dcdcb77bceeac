//! Team-name folding used to match clubs across data sources.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Whole words dropped by [`simplify_name`]: legal-form abbreviations and the
/// Spanish words for "club", "of" and "football".
const BOILERPLATE_TOKENS: [&str; 9] = ["cf", "fc", "cd", "rcd", "ud", "sad", "club", "de", "futbol"];

/// Lowercase, strip diacritics, collapse every non-alphanumeric run into a
/// single space and trim. `"Atlético de Madrid"` -> `"atletico de madrid"`.
pub fn normalize_name(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// [`normalize_name`] minus club boilerplate. `"Club Atlético de Madrid"` ->
/// `"atletico madrid"`.
pub fn simplify_name(name: &str) -> String {
    normalize_name(name)
        .split(' ')
        .filter(|word| !word.is_empty() && !BOILERPLATE_TOKENS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Both lookup keys for a name, normalized first.
pub fn name_keys(name: &str) -> (String, String) {
    (normalize_name(name), simplify_name(name))
}
