use regex::Regex;
use std::sync::LazyLock;

/// A compiled built-in exclusion pattern.
pub struct BuiltinPattern {
    pub name: &'static str,
    pub regex: &'static LazyLock<Option<Regex>>,
}

macro_rules! exclusion_pattern {
    ($name:ident, $regex_str:expr) => {
        pub static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// ── Email ──────────────────────────────────────────────────────────────────
exclusion_pattern!(
    RE_EMAIL,
    r"[\p{L}\p{N}._%+\-]+@[\p{L}\p{N}.\-]+\.[\p{L}]{2,}"
);

// ── URL (scheme or www. prefix, up to the next whitespace or quote) ───────
exclusion_pattern!(RE_URL, r#"(?i)\b(?:https?://|ftp://|www\.)[^\s<>"']+"#);

// ── Social handle (@name, not the domain part of an email) ────────────────
exclusion_pattern!(RE_HANDLE, r"\B@[\p{L}\p{N}_]{2,30}");

pub fn all_patterns() -> Vec<BuiltinPattern> {
    vec![
        BuiltinPattern {
            name: "email",
            regex: &RE_EMAIL,
        },
        BuiltinPattern {
            name: "url",
            regex: &RE_URL,
        },
        BuiltinPattern {
            name: "handle",
            regex: &RE_HANDLE,
        },
    ]
}
