//! Reverse index from version to the dist-tags pointing at it.

use pkgdeck_core::LATEST_TAG;
use serde::Serialize;
use std::collections::HashMap;

/// Version -> tag names, for annotating version lists.
///
/// Several tags may alias one version (`latest` and `stable` both on
/// `2.0.0`). Tag order per version is deterministic: `latest` first, then
/// the remaining tags alphabetically. Tags pointing at a version the index
/// does not know about are dropped.
///
/// # Examples
///
/// ```
/// use pkgdeck_versions::DistTagIndex;
///
/// let tags = [("stable", "2.0.0"), ("latest", "2.0.0"), ("next", "3.0.0-rc.1")];
/// let index = DistTagIndex::build(tags, |version| version == "2.0.0");
///
/// assert_eq!(index.tags_for("2.0.0"), ["latest", "stable"]);
/// assert!(index.tags_for("3.0.0-rc.1").is_empty());
/// assert_eq!(index.latest(), Some("2.0.0"));
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct DistTagIndex {
    by_version: HashMap<String, Vec<String>>,
}

impl DistTagIndex {
    /// Builds the index from `(tag, version)` pairs.
    ///
    /// `is_known` decides whether a target version exists; unknown targets
    /// are skipped silently.
    pub fn build<I, K, V>(dist_tags: I, is_known: impl Fn(&str) -> bool) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut by_version: HashMap<String, Vec<String>> = HashMap::new();

        for (tag, version) in dist_tags {
            let (tag, version) = (tag.as_ref(), version.as_ref());
            if !is_known(version) {
                tracing::debug!(tag, version, "dropping dist-tag for unknown version");
                continue;
            }
            let tags = by_version.entry(version.to_string()).or_default();
            if !tags.iter().any(|existing| existing == tag) {
                tags.push(tag.to_string());
            }
        }

        for tags in by_version.values_mut() {
            tags.sort_by(|a, b| {
                (a != LATEST_TAG)
                    .cmp(&(b != LATEST_TAG))
                    .then_with(|| a.cmp(b))
            });
        }

        Self { by_version }
    }

    /// Tags pointing at `version`, `latest` first.
    pub fn tags_for(&self, version: &str) -> &[String] {
        self.by_version
            .get(version)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns `true` if the `latest` tag points at `version`.
    pub fn is_latest(&self, version: &str) -> bool {
        self.tags_for(version).first().is_some_and(|tag| tag == LATEST_TAG)
    }

    /// The version the `latest` tag points at, if known.
    pub fn latest(&self) -> Option<&str> {
        self.by_version
            .iter()
            .find(|(_, tags)| tags.iter().any(|tag| tag == LATEST_TAG))
            .map(|(version, _)| version.as_str())
    }

    /// Number of tagged versions.
    pub fn len(&self) -> usize {
        self.by_version.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_version.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliasing_latest_first() {
        let tags = [("stable", "2.0.0"), ("latest", "2.0.0")];
        let index = DistTagIndex::build(tags, |_| true);
        assert_eq!(index.tags_for("2.0.0"), ["latest", "stable"]);
        assert!(index.is_latest("2.0.0"));
    }

    #[test]
    fn test_other_tags_alphabetical() {
        let tags = [("next", "3.0.0"), ("canary", "3.0.0"), ("beta", "3.0.0")];
        let index = DistTagIndex::build(tags, |_| true);
        assert_eq!(index.tags_for("3.0.0"), ["beta", "canary", "next"]);
        assert!(!index.is_latest("3.0.0"));
    }

    #[test]
    fn test_unknown_target_dropped() {
        let tags = [("latest", "1.0.0"), ("legacy", "0.0.1")];
        let index = DistTagIndex::build(tags, |v| v == "1.0.0");
        assert_eq!(index.len(), 1);
        assert!(index.tags_for("0.0.1").is_empty());
    }

    #[test]
    fn test_untagged_version() {
        let index = DistTagIndex::build(Vec::<(String, String)>::new(), |_| true);
        assert!(index.is_empty());
        assert!(index.tags_for("1.0.0").is_empty());
        assert_eq!(index.latest(), None);
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let tags = vec![
            ("latest".to_string(), "1.0.0".to_string()),
            ("latest".to_string(), "1.0.0".to_string()),
        ];
        let index = DistTagIndex::build(tags.iter().map(|(tag, version)| (tag, version)), |_| true);
        assert_eq!(index.tags_for("1.0.0"), ["latest"]);
    }
}
