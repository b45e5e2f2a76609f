//! Report version numbers.
//!
//! Versions are stored as text (`"00"`, `"01"`, ...). Numeric value 0, or an
//! empty version, is the baseline; anything above is an amendment.

pub const FIRST_VERSION: &str = "00";

/// Numeric value of a version; `None` when the text is not a number.
pub fn version_number(version: &str) -> Option<u32> {
    let version = version.trim();
    if version.is_empty() {
        return Some(0);
    }
    version.parse().ok()
}

pub fn is_baseline(version: &str) -> bool {
    version_number(version) == Some(0)
}

pub fn is_amendment(version: &str) -> bool {
    version_number(version).is_some_and(|n| n > 0)
}

/// The following version, rendered with two digits.
pub fn next_version(version: &str) -> String {
    format!("{:02}", version_number(version).unwrap_or(0) + 1)
}
