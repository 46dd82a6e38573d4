//! Release-line grouping.
//!
//! Versions are bucketed by the part of the version number that marks a
//! meaningful boundary: the major version for `1.x` and above, the minor
//! version for `0.x` packages (where minor bumps carry breaking changes).
//! Lines are ordered by their newest member so the line holding the
//! overall newest version comes first.

use indexmap::IndexMap;
use pkgdeck_core::{PackageDocument, VersionRecord, compare_versions_desc, parse_loose};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::tags::DistTagIndex;

/// Identifies a release line.
///
/// Displayed as `"4"` for `4.x`, `"0.10"` for `0.10.x`, and `"other"` for
/// version strings whose numbers cannot be recovered.
///
/// # Examples
///
/// ```
/// use pkgdeck_versions::ReleaseLineKey;
///
/// assert_eq!(ReleaseLineKey::for_version("4.17.21").to_string(), "4");
/// assert_eq!(ReleaseLineKey::for_version("0.10.3").to_string(), "0.10");
/// assert_eq!(ReleaseLineKey::for_version("nonsense"), ReleaseLineKey::Other);
/// assert_eq!("0.9".parse::<ReleaseLineKey>().unwrap(), ReleaseLineKey::Minor(9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseLineKey {
    /// `major.x` for major >= 1
    Major(u64),
    /// `0.minor.x`
    Minor(u64),
    /// Unparseable versions
    Other,
}

impl ReleaseLineKey {
    /// Computes the release line of a version string.
    pub fn for_version(version: &str) -> Self {
        match parse_loose(version) {
            Some(parsed) if parsed.major == 0 => Self::Minor(parsed.minor),
            Some(parsed) => Self::Major(parsed.major),
            None => Self::Other,
        }
    }
}

impl fmt::Display for ReleaseLineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major(major) => write!(f, "{major}"),
            Self::Minor(minor) => write!(f, "0.{minor}"),
            Self::Other => f.write_str("other"),
        }
    }
}

impl Serialize for ReleaseLineKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error returned when a release-line key string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid release line key '{0}'")]
pub struct ParseLineKeyError(pub String);

impl FromStr for ReleaseLineKey {
    type Err = ParseLineKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseLineKeyError(s.to_string());
        let s = s.trim();

        if s == "other" {
            return Ok(Self::Other);
        }
        if let Some(minor) = s.strip_prefix("0.") {
            return minor.parse().map(Self::Minor).map_err(|_| invalid());
        }
        match s.parse::<u64>() {
            Ok(major) if major > 0 => Ok(Self::Major(major)),
            _ => Err(invalid()),
        }
    }
}

/// A version with the dist-tags pointing at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedVersion {
    #[serde(flatten)]
    pub record: VersionRecord,
    pub tags: Vec<String>,
}

impl TaggedVersion {
    pub fn version(&self) -> &str {
        &self.record.version
    }

    pub fn is_latest(&self) -> bool {
        self.tags.first().is_some_and(|tag| tag == pkgdeck_core::LATEST_TAG)
    }
}

/// One release line, newest version first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseLine {
    key: ReleaseLineKey,
    count: usize,
    versions: Vec<TaggedVersion>,
    fully_loaded: bool,
}

impl ReleaseLine {
    pub fn key(&self) -> ReleaseLineKey {
        self.key
    }

    /// Number of versions in this line.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Members, newest first.
    pub fn versions(&self) -> &[TaggedVersion] {
        &self.versions
    }

    pub fn newest(&self) -> Option<&TaggedVersion> {
        self.versions.first()
    }

    /// Whether the full version history has been merged into this line.
    pub fn is_fully_loaded(&self) -> bool {
        self.fully_loaded
    }

    /// Returns `true` if the `latest` tag points into this line.
    pub fn contains_latest(&self) -> bool {
        self.versions.iter().any(TaggedVersion::is_latest)
    }
}

/// Versions grouped into release lines, ordered newest line first.
///
/// # Examples
///
/// ```
/// use pkgdeck_core::VersionRecord;
/// use pkgdeck_versions::ReleaseLines;
///
/// let records = ["0.9.0", "0.9.3", "0.10.0", "0.10.1"].map(VersionRecord::new);
/// let lines = ReleaseLines::group(records, [("latest", "0.10.1")]);
///
/// let keys: Vec<String> = lines.lines().iter().map(|l| l.key().to_string()).collect();
/// assert_eq!(keys, ["0.10", "0.9"]);
/// assert_eq!(lines.lines()[0].versions()[0].version(), "0.10.1");
/// assert_eq!(lines.lines()[0].versions()[0].tags, ["latest"]);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReleaseLines {
    lines: Vec<ReleaseLine>,
    tags: DistTagIndex,
    #[serde(skip)]
    dist_tags: Vec<(String, String)>,
}

impl ReleaseLines {
    /// Groups `records` into release lines and annotates them with `dist_tags`.
    ///
    /// Every record lands in exactly one line. Tags pointing at versions not
    /// present in `records` are dropped.
    pub fn group<R, I, K, V>(records: R, dist_tags: I) -> Self
    where
        R: IntoIterator<Item = VersionRecord>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let dist_tags = dist_tags
            .into_iter()
            .map(|(tag, version)| (tag.as_ref().to_string(), version.as_ref().to_string()))
            .collect();
        Self::build(records.into_iter().collect(), dist_tags, false)
    }

    /// Groups the versions embedded in a registry document.
    pub fn from_document(doc: &PackageDocument) -> Self {
        Self::group(doc.version_records(), &doc.dist_tags)
    }

    fn build(
        records: Vec<VersionRecord>,
        dist_tags: Vec<(String, String)>,
        fully_loaded: bool,
    ) -> Self {
        let known: HashSet<&str> = records.iter().map(|r| r.version.as_str()).collect();
        let tags = DistTagIndex::build(
            dist_tags.iter().map(|(tag, version)| (tag, version)),
            |version| known.contains(version),
        );

        let mut buckets: IndexMap<ReleaseLineKey, Vec<VersionRecord>> = IndexMap::new();
        for record in records {
            buckets
                .entry(ReleaseLineKey::for_version(&record.version))
                .or_default()
                .push(record);
        }

        let mut lines: Vec<ReleaseLine> = buckets
            .into_iter()
            .map(|(key, mut members)| {
                members.sort_by(|a, b| compare_versions_desc(&a.version, &b.version));
                let versions: Vec<TaggedVersion> = members
                    .into_iter()
                    .map(|record| TaggedVersion {
                        tags: tags.tags_for(&record.version).to_vec(),
                        record,
                    })
                    .collect();
                ReleaseLine {
                    key,
                    count: versions.len(),
                    versions,
                    fully_loaded,
                }
            })
            .collect();

        lines.sort_by(|a, b| {
            let newest = |line: &ReleaseLine| {
                line.newest()
                    .map(|v| v.record.version.clone())
                    .unwrap_or_default()
            };
            compare_versions_desc(&newest(a), &newest(b))
        });

        Self {
            lines,
            tags,
            dist_tags,
        }
    }

    /// Release lines, newest first.
    pub fn lines(&self) -> &[ReleaseLine] {
        &self.lines
    }

    /// Looks up one line by key.
    pub fn line(&self, key: ReleaseLineKey) -> Option<&ReleaseLine> {
        self.lines.iter().find(|line| line.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of versions across all lines.
    pub fn total_versions(&self) -> usize {
        self.lines.iter().map(ReleaseLine::count).sum()
    }

    /// Whether a "view all versions" affordance makes sense.
    ///
    /// A package with a single published version has nothing more to show.
    pub fn can_view_all(&self) -> bool {
        self.total_versions() > 1
    }

    /// Reverse dist-tag index.
    pub fn tags(&self) -> &DistTagIndex {
        &self.tags
    }

    /// Tags pointing at `version`, `latest` first.
    pub fn tags_for(&self, version: &str) -> &[String] {
        self.tags.tags_for(version)
    }

    /// Merges the full version history into the abbreviated listing.
    ///
    /// Versions already present keep their existing records; new versions
    /// may create new lines. Dist-tags that were dropped because their target
    /// was missing from the abbreviated set are restored if the history
    /// contains it. Every line is marked fully loaded afterwards.
    pub fn merge_history(&mut self, history: &[VersionRecord]) {
        let mut records: Vec<VersionRecord> = self
            .lines
            .drain(..)
            .flat_map(|line| line.versions.into_iter().map(|v| v.record))
            .collect();

        let mut seen: HashSet<String> = records.iter().map(|r| r.version.clone()).collect();
        let before = records.len();
        for record in history {
            if seen.insert(record.version.clone()) {
                records.push(record.clone());
            }
        }

        tracing::debug!(
            added = records.len() - before,
            total = records.len(),
            "merged version history"
        );

        *self = Self::build(records, std::mem::take(&mut self.dist_tags), true);
    }
}
