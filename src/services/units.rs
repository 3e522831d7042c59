use ethers::types::{I256, U256};

/// Renders an integer amount of base units as a fixed-point decimal string.
///
/// The fraction keeps at most `decimals` digits with trailing zeros removed, and the
/// decimal point is dropped entirely when nothing remains after it.
pub fn format_units(value: U256, decimals: usize) -> String {
    format_magnitude("", value, decimals)
}

/// Signed variant of [`format_units`]; negative values keep a leading `-`.
pub fn format_signed_units(value: I256, decimals: usize) -> String {
    let sign = if value.is_negative() { "-" } else { "" };
    format_magnitude(sign, value.unsigned_abs(), decimals)
}

fn format_magnitude(sign: &str, magnitude: U256, decimals: usize) -> String {
    let digits = magnitude.to_string();
    if decimals == 0 {
        return format!("{sign}{digits}");
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        format!("{sign}{whole}")
    } else {
        format!("{sign}{whole}.{fraction}")
    }
}
