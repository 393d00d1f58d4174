//! Name canonicalization rules.
//!
//! The key rules are positional and deliberately literal: historical matching
//! between the two providers depends on them, including the `Super` rewrite
//! that inserts `S` after the *first* digit run anywhere in the name.

use once_cell::sync::Lazy;
use regex::Regex;

static VENDOR_TOKENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i-u)nvidia|geforce").expect("valid regex"));
static PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").expect("valid regex"));
static SUPER_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i-u)super").expect("valid regex"));
static FIRST_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)").expect("valid regex"));

/// Map a raw GPU name to the key used to join source A against source B.
///
/// Steps, in order:
/// 1. drop every `nvidia` / `geforce` (any case), trim
/// 2. drop every `( ... )` segment, trim
/// 3. if `super` occurs (any case): drop its first occurrence, trim, then
///    append `S` to the first digit run
/// 4. trim
///
/// ```
/// use gpu_compare::normalize::canonical_key;
///
/// assert_eq!(canonical_key("NVIDIA GeForce RTX 3060 (12GB)"), "RTX 3060");
/// assert_eq!(canonical_key("GeForce RTX 4080 SUPER"), "RTX 4080S");
/// ```
pub fn canonical_key(name: &str) -> String {
    let stripped = VENDOR_TOKENS.replace_all(name, "");
    let stripped = PARENTHESIZED.replace_all(stripped.trim(), "");
    let key = stripped.trim();

    if !SUPER_TOKEN.is_match(key) {
        return key.to_string();
    }

    let without_super = SUPER_TOKEN.replace(key, "");
    FIRST_DIGITS
        .replace(without_super.trim(), "${1}S")
        .trim()
        .to_string()
}

/// Human-facing label: vendor tokens removed, everything else kept.
pub fn display_name(name: &str) -> String {
    VENDOR_TOKENS.replace_all(name, "").trim().to_string()
}
