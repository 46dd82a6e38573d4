use pkgdeck_core::{DeckError, Result};
use pkgdeck_install::PackageManager;
use pkgdeck_readme::ReadmeOptions;
use serde::Deserialize;
use std::path::Path;

/// Root configuration for pkgdeck.
///
/// Every section is optional; missing fields fall back to their defaults.
///
/// # Examples
///
/// ```
/// use pkgdeck::config::DeckConfig;
/// use pkgdeck_install::PackageManager;
///
/// let json = r#"{
///     "readme": { "cdn_base": "https://unpkg.com" },
///     "install": { "default_package_manager": "pnpm" }
/// }"#;
///
/// let config = DeckConfig::from_json(json).unwrap();
/// assert_eq!(config.readme.cdn_base, "https://unpkg.com");
/// assert_eq!(config.install.default_package_manager, PackageManager::Pnpm);
/// assert_eq!(config.history.max_packages, 1000);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckConfig {
    #[serde(default)]
    pub readme: ReadmeOptions,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub install: InstallConfig,
}

impl DeckConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Json`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Io`] if the file cannot be read, or
    /// [`DeckError::Json`] if it is malformed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(DeckError::from)?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

/// Configuration for the full-history loader.
///
/// # Defaults
///
/// - `max_packages`: `1000` histories kept in memory
///
/// # Examples
///
/// ```
/// use pkgdeck::config::HistoryConfig;
///
/// let config: HistoryConfig = serde_json::from_str("{}").unwrap();
/// assert_eq!(config.max_packages, 1000);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_max_packages")]
    pub max_packages: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_packages: default_max_packages(),
        }
    }
}

/// Configuration for command synthesis.
///
/// # Defaults
///
/// - `default_package_manager`: `npm`
#[derive(Debug, Clone, Deserialize)]
pub struct InstallConfig {
    #[serde(default = "default_package_manager")]
    pub default_package_manager: PackageManager,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            default_package_manager: default_package_manager(),
        }
    }
}

const fn default_max_packages() -> usize {
    1000
}

const fn default_package_manager() -> PackageManager {
    PackageManager::Npm
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DeckConfig::default();
        assert_eq!(config.readme, ReadmeOptions::default());
        assert_eq!(config.history.max_packages, 1000);
        assert_eq!(config.install.default_package_manager, PackageManager::Npm);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = DeckConfig::from_json("{}").unwrap();
        assert_eq!(config.history.max_packages, 1000);
        assert_eq!(config.readme.cdn_base, "https://cdn.jsdelivr.net/npm");
    }

    #[test]
    fn test_partial_sections() {
        let config = DeckConfig::from_json(
            r#"{"readme": {"max_line_bytes": 2048}, "history": {"max_packages": 10}}"#,
        )
        .unwrap();
        assert_eq!(config.readme.max_line_bytes, 2048);
        assert_eq!(config.readme.max_code_bytes, 2 * 1024 * 1024);
        assert_eq!(config.history.max_packages, 10);
    }

    #[test]
    fn test_unknown_package_manager_rejected() {
        let err = DeckConfig::from_json(r#"{"install": {"default_package_manager": "pip"}}"#)
            .unwrap_err();
        assert!(matches!(err, DeckError::Json(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"install": {{"default_package_manager": "bun"}}}}"#).unwrap();

        let config = DeckConfig::from_file(file.path()).unwrap();
        assert_eq!(config.install.default_package_manager, PackageManager::Bun);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DeckConfig::from_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, DeckError::Io(_)));
    }
}
