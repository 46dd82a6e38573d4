//! Registry document model.
//!
//! Mirrors the subset of the npm registry package document
//! (`https://registry.npmjs.org/{package}`) the presentation core consumes.
//! Fields that third-party publishers commonly get wrong (`bin`, `exports`,
//! `time` entries) are captured loosely and interpreted on demand so that a
//! single malformed version never rejects the whole document.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::version::compare_versions;

/// Name of the dist-tag that marks the default version.
pub const LATEST_TAG: &str = "latest";

/// A single published version, as shown in version history.
///
/// # Examples
///
/// ```
/// use pkgdeck_core::VersionRecord;
///
/// let record = VersionRecord::new("4.17.21");
/// assert_eq!(record.version, "4.17.21");
/// assert!(!record.has_provenance);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub has_provenance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl VersionRecord {
    /// Creates a record with only a version string.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            published_at: None,
            has_provenance: false,
            deprecated: None,
        }
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn with_provenance(mut self, has_provenance: bool) -> Self {
        self.has_provenance = has_provenance;
        self
    }
}

/// The `bin` field of a package version.
///
/// npm accepts either a single path (the command is then named after the
/// package) or a mapping of command name to path. Command order follows the
/// declaration order in `package.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BinField {
    Single(String),
    Commands(IndexMap<String, String>),
}

impl BinField {
    /// Interprets a raw JSON `bin` value, returning `None` for anything that
    /// is neither a string nor an object of strings.
    ///
    /// Non-string entries inside an object are skipped.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(path) => Some(Self::Single(path.clone())),
            serde_json::Value::Object(map) => Some(Self::Commands(
                map.iter()
                    .filter_map(|(name, path)| {
                        path.as_str().map(|path| (name.clone(), path.to_string()))
                    })
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Returns `true` if no command is declared.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(path) => path.trim().is_empty(),
            Self::Commands(commands) => commands.is_empty(),
        }
    }
}

/// Result of a JSR lookup for an npm package.
///
/// Only `exists` is guaranteed; a lookup that reports `exists` but lacks a
/// scope or name is treated as "not on JSR".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsrInfo {
    pub exists: bool,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub latest_version: Option<String>,
}

impl JsrInfo {
    /// Returns the `@scope/name` JSR package id when the lookup is usable.
    ///
    /// # Examples
    ///
    /// ```
    /// use pkgdeck_core::JsrInfo;
    ///
    /// let info = JsrInfo {
    ///     exists: true,
    ///     scope: Some("trpc".into()),
    ///     name: Some("server".into()),
    ///     ..JsrInfo::default()
    /// };
    /// assert_eq!(info.package_id().as_deref(), Some("@trpc/server"));
    ///
    /// let partial = JsrInfo { exists: true, ..JsrInfo::default() };
    /// assert_eq!(partial.package_id(), None);
    /// ```
    pub fn package_id(&self) -> Option<String> {
        if !self.exists {
            return None;
        }
        let scope = self.scope.as_deref().filter(|s| !s.is_empty())?;
        let name = self.name.as_deref().filter(|s| !s.is_empty())?;
        Some(format!("@{scope}/{name}"))
    }
}

/// Signature/attestation metadata of a published tarball.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistInfo {
    #[serde(default)]
    pub attestations: Option<serde_json::Value>,
}

/// Per-version manifest from the registry document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionDetail {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub bin: Option<serde_json::Value>,
    #[serde(default)]
    pub main: Option<serde_json::Value>,
    #[serde(default)]
    pub exports: Option<serde_json::Value>,
    #[serde(default)]
    pub deprecated: Option<serde_json::Value>,
    #[serde(default)]
    pub dist: Option<DistInfo>,
}

impl VersionDetail {
    /// The declared `bin` field, if it is well formed and non-empty.
    pub fn bin_field(&self) -> Option<BinField> {
        self.bin
            .as_ref()
            .and_then(BinField::from_value)
            .filter(|bin| !bin.is_empty())
    }

    pub fn has_main(&self) -> bool {
        is_declared(self.main.as_ref())
    }

    pub fn has_exports(&self) -> bool {
        is_declared(self.exports.as_ref())
    }

    pub fn has_provenance(&self) -> bool {
        self.dist
            .as_ref()
            .and_then(|dist| dist.attestations.as_ref())
            .is_some_and(|attestations| !attestations.is_null())
    }

    /// Deprecation message; registries publish `false` or `""` for "not deprecated".
    pub fn deprecation(&self) -> Option<String> {
        match self.deprecated.as_ref()? {
            serde_json::Value::String(message) if !message.is_empty() => Some(message.clone()),
            _ => None,
        }
    }
}

fn is_declared(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Package document as served by the npm registry.
///
/// # Examples
///
/// ```
/// use pkgdeck_core::PackageDocument;
///
/// let json = r#"{
///     "name": "left-pad",
///     "versions": { "1.0.0": {}, "1.3.0": {} },
///     "dist-tags": { "latest": "1.3.0" },
///     "time": { "1.3.0": "2018-04-09T01:27:55.000Z" }
/// }"#;
///
/// let doc = PackageDocument::from_json(json).unwrap();
/// assert_eq!(doc.latest_version(), Some("1.3.0"));
/// assert_eq!(doc.version_records().len(), 2);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDocument {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<serde_json::Value>,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default)]
    pub versions: IndexMap<String, VersionDetail>,
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: IndexMap<String, String>,
    /// Publish times keyed by version, plus `created`/`modified` and, for
    /// unpublished packages, an `unpublished` object.
    #[serde(default)]
    pub time: HashMap<String, serde_json::Value>,
}

impl PackageDocument {
    /// Parses a registry document.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let doc: Self = serde_json::from_str(json)?;
        if doc.name.trim().is_empty() {
            return Err(crate::DeckError::InvalidDocument(
                "package name is empty".into(),
            ));
        }
        Ok(doc)
    }

    /// Builds one record per entry of `versions`, joined with `time`.
    ///
    /// Timestamps that fail to parse are dropped rather than rejected.
    pub fn version_records(&self) -> Vec<VersionRecord> {
        self.versions
            .iter()
            .map(|(version, detail)| VersionRecord {
                version: version.clone(),
                published_at: self.published_at(version),
                has_provenance: detail.has_provenance(),
                deprecated: detail.deprecation(),
            })
            .collect()
    }

    /// Publish time of a version, if recorded and well formed.
    pub fn published_at(&self, version: &str) -> Option<DateTime<Utc>> {
        let raw = self.time.get(version)?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|time| time.with_timezone(&Utc))
            .ok()
    }

    /// The version the `latest` tag points at, if it exists in `versions`.
    pub fn latest_version(&self) -> Option<&str> {
        self.dist_tags
            .get(LATEST_TAG)
            .map(String::as_str)
            .filter(|version| self.versions.contains_key(*version))
    }

    /// Resolves the version to display.
    ///
    /// `requested` may be an exact version or a dist-tag name. Without a
    /// usable request this falls back to `latest`, then to the highest
    /// published version.
    pub fn resolve_version(&self, requested: Option<&str>) -> Option<&str> {
        if let Some(requested) = requested {
            if let Some((version, _)) = self.versions.get_key_value(requested) {
                return Some(version.as_str());
            }
            if let Some(version) = self.dist_tags.get(requested)
                && let Some((version, _)) = self.versions.get_key_value(version.as_str())
            {
                return Some(version.as_str());
            }
            tracing::debug!(
                package = %self.name,
                requested,
                "requested version not found, using default"
            );
        }

        self.latest_version().or_else(|| {
            self.versions
                .keys()
                .map(String::as_str)
                .max_by(|a, b| compare_versions(a, b))
        })
    }

    /// Manifest of a specific version.
    pub fn version_detail(&self, version: &str) -> Option<&VersionDetail> {
        self.versions.get(version)
    }
}
