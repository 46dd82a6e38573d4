use serde::Deserialize;

/// Settings for README rendering.
///
/// # Defaults
///
/// - `cdn_base`: `"https://cdn.jsdelivr.net/npm"`
/// - `max_code_bytes`: 2 MiB per code block
/// - `max_line_bytes`: 512 bytes per highlighted line
///
/// # Examples
///
/// ```
/// use pkgdeck_readme::ReadmeOptions;
///
/// let options: ReadmeOptions = serde_json::from_str(r#"{"max_line_bytes": 1024}"#).unwrap();
/// assert_eq!(options.max_line_bytes, 1024);
/// assert_eq!(options.cdn_base, "https://cdn.jsdelivr.net/npm");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadmeOptions {
    /// Base URL relative README paths are resolved against, followed by
    /// `/{package}/{path}`.
    #[serde(default = "default_cdn_base")]
    pub cdn_base: String,
    /// Code blocks larger than this are not highlighted.
    #[serde(default = "default_max_code_bytes")]
    pub max_code_bytes: usize,
    /// Code blocks with a line longer than this are not highlighted.
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

impl Default for ReadmeOptions {
    fn default() -> Self {
        Self {
            cdn_base: default_cdn_base(),
            max_code_bytes: default_max_code_bytes(),
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

fn default_cdn_base() -> String {
    "https://cdn.jsdelivr.net/npm".into()
}

const fn default_max_code_bytes() -> usize {
    2 * 1024 * 1024
}

const fn default_max_line_bytes() -> usize {
    512
}
