use thiserror::Error;

/// Core error types for pkgdeck.
///
/// Most of the presentation core degrades instead of failing, so these
/// errors only surface where a caller explicitly asks for a fallible
/// operation: loading the full version history, reading a registry
/// document, or parsing a package-manager id.
///
/// # Examples
///
/// ```
/// use pkgdeck_core::error::{DeckError, Result};
///
/// fn require_name(name: &str) -> Result<&str> {
///     if name.is_empty() {
///         return Err(DeckError::InvalidDocument("missing package name".into()));
///     }
///     Ok(name)
/// }
///
/// assert!(require_name("").is_err());
/// ```
#[derive(Error, Debug)]
pub enum DeckError {
    #[error("failed to fetch version history for {package}: {source}")]
    HistoryFetch {
        package: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid registry document: {0}")]
    InvalidDocument(String),

    #[error("unknown package manager: {0}")]
    UnknownPackageManager(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeckError {
    /// Wraps any error raised by a history source.
    pub fn history_fetch(
        package: impl Into<String>,
        error: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::HistoryFetch {
            package: package.into(),
            source: error.into(),
        }
    }
}

/// Convenience type alias for `Result<T, DeckError>`.
pub type Result<T> = std::result::Result<T, DeckError>;
