use regex::Regex;
use std::sync::OnceLock;

static EMAIL_SHAPE: OnceLock<Regex> = OnceLock::new();

/// `local@domain.tld` with no whitespace and exactly one `@` before the last dot-separated part.
fn email_shape() -> &'static Regex {
    EMAIL_SHAPE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email shape regex")
    })
}

pub(crate) fn normalize_email(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.trim().to_lowercase()
}

pub(crate) fn is_valid_email(value: &str) -> bool {
    email_shape().is_match(value)
}

/// Trimmed, non-empty cell contents.
pub(crate) fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
