//! Numeric version comparison used by `check`.
//!
//! Versions are compared as floating point numbers taken from the leading
//! `major.minor` prefix of the string. Components past the second are ignored,
//! so `7.9.0` and `7.9.1` compare equal. Strings without a numeric prefix parse
//! as `0.0`.

/// Parse the leading numeric prefix of `version` as a float.
///
/// ```
/// use flykit::version::parse_numeric;
///
/// assert_eq!(parse_numeric("7.9.1"), 7.9);
/// assert_eq!(parse_numeric("10"), 10.0);
/// assert_eq!(parse_numeric("v7.9.1"), 0.0);
/// ```
#[must_use]
pub fn parse_numeric(version: &str) -> f64 {
    numeric_prefix(version).parse().unwrap_or(0.0)
}

/// Whether `observed` differs from `pinned` once both are parsed numerically.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn has_changed(pinned: &str, observed: &str) -> bool {
    parse_numeric(pinned) != parse_numeric(observed)
}

/// The longest prefix matching `[+-]?digits*(.digits*)?`.
fn numeric_prefix(version: &str) -> &str {
    let bytes = version.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }

    &version[..end]
}
