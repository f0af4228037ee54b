//! Dotted version parsing and comparison for capability gating.
//!
//! Native managers report versions like `initctl (upstart 1.12.1)`. Older
//! releases lack stanzas that newer ones accept, so renderers ask
//! [`version_at_most`] before emitting them.

use std::cmp::Ordering;
use std::fmt;

use crate::error::VersionError;

/// A `major.minor.patch` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version(pub [u64; 3]);

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self([major, minor, patch])
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, patch] = self.0;
        write!(f, "{major}.{minor}.{patch}")
    }
}

/// Parse exactly three dot-separated unsigned integers.
///
/// Returns `None` for non-numeric components and for any component count
/// other than three; a short version is never zero-filled.
pub fn parse_version(v: &str) -> Option<Version> {
    let mut parts = [0u64; 3];
    let mut count = 0;
    for component in v.split('.') {
        if count == parts.len() {
            return None;
        }
        parts[count] = component.parse().ok()?;
        count += 1;
    }
    (count == parts.len()).then_some(Version(parts))
}

/// Compare two versions most-significant component first.
///
/// Fails when the slices have different lengths.
pub fn version_compare(a: &[u64], b: &[u64]) -> Result<Ordering, VersionError> {
    if a.len() != b.len() {
        return Err(VersionError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    for (x, y) in a.iter().zip(b) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }
    Ok(Ordering::Equal)
}

/// `true` when `version <= max`.
pub fn version_at_most(version: &[u64], max: &[u64]) -> Result<bool, VersionError> {
    Ok(version_compare(version, max)? != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_components() {
        assert_eq!(parse_version("2.3.4"), Some(Version::new(2, 3, 4)));
        assert_eq!(parse_version("0.6.5"), Some(Version::new(0, 6, 5)));
    }

    #[test]
    fn rejects_non_numeric_and_wrong_arity() {
        assert_eq!(parse_version("abc"), None);
        assert_eq!(parse_version("1.x.3"), None);
        assert_eq!(parse_version("1.2"), None);
        assert_eq!(parse_version("1.2.3.4"), None);
        assert_eq!(parse_version(""), None);
        assert_eq!(parse_version("-1.2.3"), None);
    }

    #[test]
    fn compare_is_lexicographic() {
        assert_eq!(version_compare(&[1, 4, 0], &[1, 4, 0]), Ok(Ordering::Equal));
        assert_eq!(version_compare(&[1, 10, 0], &[1, 4, 9]), Ok(Ordering::Greater));
        assert_eq!(version_compare(&[0, 6, 5], &[1, 0, 0]), Ok(Ordering::Less));
    }

    #[test]
    fn compare_rejects_length_mismatch() {
        assert_eq!(
            version_compare(&[1, 2], &[1, 2, 3]),
            Err(VersionError::LengthMismatch { left: 2, right: 3 })
        );
        assert!(version_at_most(&[1, 2, 3], &[1]).is_err());
    }

    #[test]
    fn at_most_includes_equality() {
        assert_eq!(version_at_most(&[0, 6, 5], &[0, 6, 5]), Ok(true));
        assert_eq!(version_at_most(&[0, 6, 4], &[0, 6, 5]), Ok(true));
        assert_eq!(version_at_most(&[0, 6, 6], &[0, 6, 5]), Ok(false));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let v = Version::new(1, 12, 1);
        assert_eq!(v.to_string(), "1.12.1");
        assert_eq!(parse_version(&v.to_string()), Some(v));
    }
}
