//! npm-style version ranges on top of `semver`.
//!
//! Package manifests declare their dependencies with npm range syntax,
//! which is wider than what `semver::VersionReq` accepts: bare versions are
//! exact, `1.2` means `1.2.x`, alternatives are joined with `||`, hyphen
//! ranges are allowed and operators may be separated from their version by
//! whitespace. Ranges are normalized into one `VersionReq` per alternative.

use std::fmt;

use semver::{Version, VersionReq};

use crate::resolver::errors::ResolveError;

/// A parsed npm range: satisfied when any alternative matches.
#[derive(Debug, Clone)]
pub struct VersionRange {
    raw: String,
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// Parse an npm range expression.
    pub fn parse(range: &str) -> Result<Self, ResolveError> {
        let alternatives = range
            .split("||")
            .map(|part| parse_alternative(range, part.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VersionRange {
            raw: range.trim().to_string(),
            alternatives,
        })
    }

    /// Check whether a version satisfies the range.
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// The range as written in the manifest.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_alternative(raw: &str, part: &str) -> Result<VersionReq, ResolveError> {
    if matches!(part, "" | "*" | "x" | "X" | "latest") {
        return Ok(VersionReq::STAR);
    }

    let comparators: Vec<String> = if let Some((low, high)) = part.split_once(" - ") {
        vec![
            format!(">={}", normalize_version(low.trim())),
            format!("<={}", normalize_version(high.trim())),
        ]
    } else {
        tokenize(part).iter().map(|t| convert_comparator(t)).collect()
    };

    VersionReq::parse(&comparators.join(", ")).map_err(|e| ResolveError::InvalidRange {
        range: raw.to_string(),
        message: e.to_string(),
    })
}

/// Split a comparator set on whitespace, re-attaching dangling operators.
fn tokenize(part: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut pending_op = String::new();

    for token in part.split_whitespace() {
        if token.chars().all(is_op_char) {
            pending_op.push_str(token);
            continue;
        }
        tokens.push(format!("{}{}", pending_op, token));
        pending_op.clear();
    }

    if !pending_op.is_empty() {
        tokens.push(pending_op);
    }

    tokens
}

fn is_op_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '~' | '^')
}

fn convert_comparator(token: &str) -> String {
    let op_end = token.find(|c: char| !is_op_char(c)).unwrap_or(token.len());
    let (op, version) = token.split_at(op_end);
    let version = normalize_version(version);

    if !op.is_empty() {
        return format!("{}{}", op, version);
    }

    if version.contains('*') {
        return version;
    }

    // A bare full version is exact; a bare partial version is an x-range.
    let core = version.split(['-', '+']).next().unwrap_or_default();
    if core.split('.').count() >= 3 {
        format!("={}", version)
    } else {
        format!("~{}", version)
    }
}

/// Strip a leading `v` and turn `x`/`X` components into `*`.
fn normalize_version(version: &str) -> String {
    let version = version.strip_prefix('v').unwrap_or(version);
    version
        .split('.')
        .map(|c| if c == "x" || c == "X" { "*" } else { c })
        .collect::<Vec<_>>()
        .join(".")
}

/// Parse a version string, allowing for incomplete versions.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    let s = s.strip_prefix('v').unwrap_or(s);

    if let Ok(v) = s.parse() {
        return Some(v);
    }

    let parts: Vec<&str> = s.split('.').collect();
    match parts.len() {
        1 => {
            let major: u64 = parts[0].parse().ok()?;
            Some(Version::new(major, 0, 0))
        }
        2 => {
            let major: u64 = parts[0].parse().ok()?;
            let minor: u64 = parts[1].parse().ok()?;
            Some(Version::new(major, minor, 0))
        }
        _ => None,
    }
}

/// Pick the highest version satisfying `range`, returned as recorded.
///
/// Entries that are not versions (such as the `master` pseudo-version) are
/// skipped.
pub fn max_satisfying<'a, S: AsRef<str>>(
    versions: &'a [S],
    range: &VersionRange,
) -> Option<&'a str> {
    versions
        .iter()
        .filter_map(|v| parse_version_lenient(v.as_ref()).map(|parsed| (parsed, v.as_ref())))
        .filter(|(parsed, _)| range.matches(parsed))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, raw)| raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(s: &str) -> VersionRange {
        VersionRange::parse(s).unwrap()
    }

    #[test]
    fn test_caret_range_zero_major() {
        let r = range("^0.4.0");

        assert!(r.matches(&Version::new(0, 4, 0)));
        assert!(r.matches(&Version::new(0, 4, 9)));
        assert!(!r.matches(&Version::new(0, 5, 0)));
        assert!(!r.matches(&Version::new(0, 3, 9)));
    }

    #[test]
    fn test_bare_version_is_exact() {
        let r = range("0.4.1");

        assert!(r.matches(&Version::new(0, 4, 1)));
        assert!(!r.matches(&Version::new(0, 4, 2)));
    }

    #[test]
    fn test_partial_and_x_ranges() {
        let r = range("1.2");
        assert!(r.matches(&Version::new(1, 2, 7)));
        assert!(!r.matches(&Version::new(1, 3, 0)));

        let r = range("1.x");
        assert!(r.matches(&Version::new(1, 9, 0)));
        assert!(!r.matches(&Version::new(2, 0, 0)));
    }

    #[test]
    fn test_alternatives_and_hyphen() {
        let r = range("^0.3.0 || ^0.5.0");
        assert!(r.matches(&Version::new(0, 3, 2)));
        assert!(r.matches(&Version::new(0, 5, 1)));
        assert!(!r.matches(&Version::new(0, 4, 0)));

        let r = range("1.0.0 - 1.4.0");
        assert!(r.matches(&Version::new(1, 4, 0)));
        assert!(!r.matches(&Version::new(1, 4, 1)));
    }

    #[test]
    fn test_spaced_operators() {
        let r = range(">= 0.2.0 < 0.4.0");
        assert!(r.matches(&Version::new(0, 3, 5)));
        assert!(!r.matches(&Version::new(0, 4, 0)));
    }

    #[test]
    fn test_star_and_latest() {
        assert!(range("*").matches(&Version::new(3, 1, 4)));
        assert!(range("latest").matches(&Version::new(0, 0, 1)));
        assert!(range("").matches(&Version::new(10, 0, 0)));
    }

    #[test]
    fn test_invalid_range() {
        let err = VersionRange::parse("^banana").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidRange { .. }));
    }

    #[test]
    fn test_max_satisfying_skips_master() {
        let versions = ["master", "0.4.1", "0.4.0", "0.3.9", "0.5.0"];

        assert_eq!(max_satisfying(&versions, &range("^0.4.0")), Some("0.4.1"));
        assert_eq!(max_satisfying(&versions, &range("^0.3.0")), Some("0.3.9"));
        assert_eq!(max_satisfying(&versions, &range("^1.0.0")), None);
    }

    #[test]
    fn test_parse_version_lenient() {
        assert_eq!(parse_version_lenient("1"), Some(Version::new(1, 0, 0)));
        assert_eq!(parse_version_lenient("1.2"), Some(Version::new(1, 2, 0)));
        assert_eq!(parse_version_lenient("v1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(parse_version_lenient("master"), None);
    }
}
