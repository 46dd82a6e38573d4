//! Lenient semantic version ordering.
//!
//! Registry data is published by third parties and is not guaranteed to be
//! valid semver. Everything here degrades instead of failing: strict parsing
//! is tried first, then a loose parse that pads partial versions, and
//! strings that still cannot be understood rank below every parseable
//! version.

use semver::Prerelease;
use std::cmp::Ordering;

/// The precedence-relevant parts of a version string.
///
/// Build metadata is deliberately absent: it never participates in
/// ordering. The derived `Ord` compares fields top to bottom, and
/// `Prerelease` orders an empty prerelease above any non-empty one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParsedVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Prerelease,
}

impl ParsedVersion {
    /// Returns `true` if the version carries a prerelease tag.
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl From<semver::Version> for ParsedVersion {
    fn from(version: semver::Version) -> Self {
        Self {
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            pre: version.pre,
        }
    }
}

/// Parses a version string as leniently as precedence allows.
///
/// Accepts a leading `v` or `=`, surrounding whitespace, and partial
/// versions (`"1"` is `1.0.0`, `"1.2"` is `1.2.0`). Returns `None` when the
/// numeric core cannot be recovered.
///
/// # Examples
///
/// ```
/// use pkgdeck_core::version::parse_loose;
///
/// let parsed = parse_loose("v2.1").unwrap();
/// assert_eq!((parsed.major, parsed.minor, parsed.patch), (2, 1, 0));
/// assert!(parse_loose("latest").is_none());
/// ```
pub fn parse_loose(input: &str) -> Option<ParsedVersion> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed).trim_start();
    let trimmed = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);

    if let Ok(version) = semver::Version::parse(trimmed) {
        return Some(version.into());
    }

    let without_build = trimmed.split_once('+').map_or(trimmed, |(core, _)| core);
    let (core, pre) = match without_build.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (without_build, None),
    };

    let mut parts = core.split('.');
    let major = parts.next()?.parse::<u64>().ok()?;
    let minor = match parts.next() {
        Some(part) => part.parse::<u64>().ok()?,
        None => 0,
    };
    let patch = match parts.next() {
        Some(part) => part.parse::<u64>().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    let pre = match pre {
        Some(pre) => Prerelease::new(pre).ok()?,
        None => Prerelease::EMPTY,
    };

    Some(ParsedVersion {
        major,
        minor,
        patch,
        pre,
    })
}

/// Compares two version strings by semver precedence.
///
/// Unparseable versions sort below parseable ones and are ordered among
/// themselves by plain string comparison, so the result is a total order:
/// `compare_versions(a, b)` is always the reverse of `compare_versions(b, a)`.
///
/// # Examples
///
/// ```
/// use pkgdeck_core::version::compare_versions;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_versions("1.0.0", "2.0.0"), Ordering::Less);
/// assert_eq!(compare_versions("1.0.0-beta", "1.0.0"), Ordering::Less);
/// assert_eq!(compare_versions("1.0.0+build.1", "1.0.0"), Ordering::Equal);
/// assert_eq!(compare_versions("garbage", "0.0.1"), Ordering::Less);
/// ```
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_loose(a), parse_loose(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

/// Newest-first ordering, for use with `sort_by`.
pub fn compare_versions_desc(a: &str, b: &str) -> Ordering {
    compare_versions(b, a)
}

/// Sorts version strings newest-first. Ties keep their input order.
pub fn sort_newest_first<T>(items: &mut [T], version: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| compare_versions_desc(version(a), version(b)));
}
