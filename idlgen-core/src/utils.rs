//! Shared string helpers for filters and templates.

/// Uppercase the first character, keep the rest (e.g. "climateControl" -> "ClimateControl")
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}

/// Lowercase the first character, keep the rest (e.g. "Echo" -> "echo")
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_lowercase().chain(chars).collect(),
    }
}

/// Uppercase the first character and lowercase the rest (e.g. "sELFtest" -> "Selftest")
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    }
}

/// Strip a leading `QT` from the given string
pub fn strip_qt(s: &str) -> &str {
    s.strip_prefix("QT").unwrap_or(s)
}
