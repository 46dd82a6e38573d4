//! URL resolution for links and images found in READMEs.
//!
//! A README is written against its repository, so relative paths only make
//! sense next to the published files. They are pointed at the package's
//! copy on a CDN instead.

use once_cell::sync::Lazy;
use regex::Regex;

static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("valid regex"));

static GITHUB_BLOB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://github\.com/[^/?#]+/[^/?#]+)/blob/").expect("valid regex")
});

/// Returns `true` for URLs that carry a scheme (`https:`, `mailto:`, ...).
pub fn has_scheme(url: &str) -> bool {
    SCHEME.is_match(url)
}

/// Returns `true` for absolute http(s) and protocol-relative URLs.
pub fn is_external(url: &str) -> bool {
    let url = url.trim_start();
    url.starts_with("//")
        || url
            .get(..7)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http://"))
        || url
            .get(..8)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("https://"))
}

/// Resolves a link or image target against the package's CDN location.
///
/// URLs with a scheme, protocol-relative URLs, fragments and empty strings
/// are returned unchanged. Anything else is a path relative to the package
/// root: leading `./` and `/` are dropped and the rest is appended to
/// `{cdn_base}/{package_name}/`.
///
/// # Examples
///
/// ```
/// use pkgdeck_readme::urls::resolve_url;
///
/// let cdn = "https://cdn.jsdelivr.net/npm";
/// assert_eq!(
///     resolve_url("./img.png", "foo", cdn),
///     "https://cdn.jsdelivr.net/npm/foo/img.png"
/// );
/// assert_eq!(resolve_url("#usage", "foo", cdn), "#usage");
/// assert_eq!(resolve_url("https://x.dev/a.png", "foo", cdn), "https://x.dev/a.png");
/// ```
pub fn resolve_url(url: &str, package_name: &str, cdn_base: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || has_scheme(trimmed)
    {
        return trimmed.to_string();
    }

    let mut path = trimmed;
    loop {
        let stripped = path.trim_start_matches("./").trim_start_matches('/');
        if stripped.len() == path.len() {
            break;
        }
        path = stripped;
    }

    format!("{}/{}/{}", cdn_base.trim_end_matches('/'), package_name, path)
}

/// Returns `true` if `url` points into the package's own files on the CDN,
/// i.e. it is what [`resolve_url`] makes of a relative path.
pub fn is_package_url(url: &str, package_name: &str, cdn_base: &str) -> bool {
    url.trim()
        .strip_prefix(cdn_base.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
        .and_then(|rest| rest.strip_prefix(package_name))
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Rewrites a GitHub `blob` page URL to its `raw` counterpart.
///
/// Only the first `/blob/` after `owner/repo` is rewritten; other URLs are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use pkgdeck_readme::urls::github_blob_to_raw;
///
/// assert_eq!(
///     github_blob_to_raw("https://github.com/o/r/blob/main/logo.png"),
///     "https://github.com/o/r/raw/main/logo.png"
/// );
/// ```
pub fn github_blob_to_raw(url: &str) -> String {
    GITHUB_BLOB.replace(url, "${1}/raw/").into_owned()
}

/// Resolution applied to image sources: CDN resolution, then blob to raw.
pub fn resolve_image_url(url: &str, package_name: &str, cdn_base: &str) -> String {
    github_blob_to_raw(&resolve_url(url, package_name, cdn_base))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDN: &str = "https://cdn.jsdelivr.net/npm";

    #[test]
    fn test_relative_paths() {
        assert_eq!(
            resolve_url("docs/guide.md", "foo", CDN),
            "https://cdn.jsdelivr.net/npm/foo/docs/guide.md"
        );
        assert_eq!(
            resolve_url("/assets/logo.svg", "foo", CDN),
            "https://cdn.jsdelivr.net/npm/foo/assets/logo.svg"
        );
        assert_eq!(
            resolve_url("././img.png", "@scope/pkg", CDN),
            "https://cdn.jsdelivr.net/npm/@scope/pkg/img.png"
        );
    }

    #[test]
    fn test_passthrough() {
        for url in [
            "https://example.com/a.png",
            "HTTP://EXAMPLE.COM",
            "//cdn.example.com/x.png",
            "#install",
            "mailto:dev@example.com",
            "javascript:alert(1)",
            "",
        ] {
            assert_eq!(resolve_url(url, "foo", CDN), url);
        }
    }

    #[test]
    fn test_trailing_slash_on_base() {
        assert_eq!(
            resolve_url("a.png", "foo", "https://unpkg.com/"),
            "https://unpkg.com/foo/a.png"
        );
    }

    #[test]
    fn test_resolution_is_stable() {
        let once = resolve_image_url("./img.png", "foo", CDN);
        assert_eq!(resolve_image_url(&once, "foo", CDN), once);
    }

    #[test]
    fn test_blob_to_raw() {
        assert_eq!(
            github_blob_to_raw("https://github.com/vitejs/vite/blob/main/docs/logo.svg"),
            "https://github.com/vitejs/vite/raw/main/docs/logo.svg"
        );
        assert_eq!(
            github_blob_to_raw("https://github.com/o/r/raw/main/a.png"),
            "https://github.com/o/r/raw/main/a.png"
        );
        assert_eq!(
            github_blob_to_raw("https://gitlab.com/o/r/blob/main/a.png"),
            "https://gitlab.com/o/r/blob/main/a.png"
        );
    }

    #[test]
    fn test_is_package_url() {
        let resolved = resolve_url("docs/a.md", "@scope/pkg", CDN);
        assert!(is_package_url(&resolved, "@scope/pkg", CDN));
        assert!(is_package_url(&resolved, "@scope/pkg", "https://cdn.jsdelivr.net/npm/"));
        assert!(!is_package_url(&resolved, "@scope/pk", CDN));
        assert!(!is_package_url("https://cdn.jsdelivr.net/npm/other/a.md", "foo", CDN));
        assert!(!is_package_url("https://x.dev/foo/a.md", "foo", CDN));
    }

    #[test]
    fn test_is_external() {
        assert!(is_external("https://npmjs.com"));
        assert!(is_external("HTTP://npmjs.com"));
        assert!(is_external("//npmjs.com"));
        assert!(!is_external("mailto:a@b.c"));
        assert!(!is_external("#top"));
        assert!(!is_external("docs/api.md"));
    }
}
