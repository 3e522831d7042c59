// Utility helpers shared by entrypoints and services

/// `0x` followed by at least one hex digit.
pub fn is_hex_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .map(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

pub fn clean_address(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Truncates on a char boundary so error messages stay readable.
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
