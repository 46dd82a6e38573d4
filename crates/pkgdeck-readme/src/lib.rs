//! README rendering for pkgdeck.
//!
//! The pipeline is fixed: Markdown is parsed and rendered with the
//! [`RenderRules`], then the HTML is passed through the allow-list
//! [sanitizer](sanitize). Sanitizing last means the sanitizer sees the
//! final URLs and attributes.
//!
//! # Examples
//!
//! ```
//! use pkgdeck_readme::render_readme;
//!
//! let html = render_readme("# Title\n\n<script>alert(1)</script>\n", "foo");
//! assert!(html.starts_with("<h3 id=\"title\" data-level=\"1\">Title</h3>"));
//! assert!(!html.contains("<script"));
//! ```

pub mod error;
pub mod highlight;
pub mod options;
pub mod render;
pub mod sanitize;
pub mod urls;

pub use error::{ReadmeError, Result};
pub use highlight::{HighlightLimits, Highlighter};
pub use options::ReadmeOptions;
pub use render::{RenderContext, RenderRules};
pub use sanitize::{is_safe_url, sanitize_html, try_sanitize_html};

/// Renders README Markdown to sanitized HTML.
///
/// Holds the options, the render rules and a handle to the highlighter, so
/// one instance can render any number of documents.
#[derive(Clone, Copy)]
pub struct ReadmeRenderer<'o> {
    options: &'o ReadmeOptions,
    rules: RenderRules,
    highlighter: &'static Highlighter,
}

static DEFAULT_OPTIONS: once_cell::sync::Lazy<ReadmeOptions> =
    once_cell::sync::Lazy::new(ReadmeOptions::default);

impl Default for ReadmeRenderer<'static> {
    fn default() -> Self {
        Self::new(&DEFAULT_OPTIONS)
    }
}

impl<'o> ReadmeRenderer<'o> {
    /// Creates a renderer with the default rules and the shared highlighter.
    pub fn new(options: &'o ReadmeOptions) -> Self {
        Self {
            options,
            rules: RenderRules::default(),
            highlighter: Highlighter::shared(),
        }
    }

    /// Replaces the render rules.
    pub fn with_rules(mut self, rules: RenderRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn options(&self) -> &ReadmeOptions {
        self.options
    }

    /// Renders without sanitizing. The result must not be embedded as is.
    pub fn render_unsanitized(&self, markdown: &str, package_name: &str) -> String {
        let ctx = RenderContext::new(package_name, self.options, self.highlighter);
        render::render_markdown(markdown, &self.rules, &ctx)
    }

    /// Renders and sanitizes.
    pub fn render(&self, markdown: &str, package_name: &str) -> String {
        let html = self.render_unsanitized(markdown, package_name);
        let sanitized = sanitize_html(&html, package_name, self.options);
        tracing::debug!(
            package = package_name,
            markdown_bytes = markdown.len(),
            html_bytes = sanitized.len(),
            "rendered README"
        );
        sanitized
    }
}

/// Renders README Markdown with default options.
pub fn render_readme(markdown: &str, package_name: &str) -> String {
    ReadmeRenderer::default().render(markdown, package_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_contract() {
        let html = render_readme("# Title", "foo");
        assert_eq!(html, "<h3 id=\"title\" data-level=\"1\">Title</h3>\n");
    }

    #[test]
    fn test_script_never_survives() {
        for markdown in [
            "<script>alert(1)</script>",
            "text <script>alert(1)</script> inline",
            "[x](javascript:alert(1))",
            "<img src=x onerror=alert(1)>",
            "<a href=\"jAvAsCrIpT:alert(1)\">x</a>",
            "<a href=\"&#106;avascript:alert(1)\">x</a>",
            "<a href=\"javascript&colon;alert(1)\">x</a>",
            "<a href=\"javascript&#58;alert(1)\">x</a>",
            "<img src=\"&#x6A;avascript:alert(1)\">",
            "[x](&#106;avascript:alert(1))",
        ] {
            let html = render_readme(markdown, "foo");
            assert!(!html.contains("<script"), "{html}");
            assert!(!html.to_ascii_lowercase().contains("javascript:"), "{html}");
            assert!(!html.contains("onerror"), "{html}");
            assert!(!html.contains("avascript"), "{html}");
        }
    }

    #[test]
    fn test_relative_links_stay_internal() {
        let html = render_readme("[guide](docs/guide.md) and [npm](https://npmjs.com)", "foo");
        assert!(html.contains("<a href=\"https://cdn.jsdelivr.net/npm/foo/docs/guide.md\">guide</a>"));
        assert!(html.contains(
            "<a href=\"https://npmjs.com\" rel=\"nofollow noreferrer noopener\" target=\"_blank\">npm</a>"
        ));
    }

    #[test]
    fn test_relative_image_on_cdn() {
        let html = render_readme("![logo](./img.png)", "foo");
        assert!(html.contains("src=\"https://cdn.jsdelivr.net/npm/foo/img.png\""));
    }

    #[test]
    fn test_blob_image_raw() {
        let html = render_readme("![s](https://github.com/o/r/blob/main/s.png)", "foo");
        assert!(html.contains("https://github.com/o/r/raw/main/s.png"));
        assert!(!html.contains("/blob/"));
    }

    #[test]
    fn test_raw_html_image_resolved() {
        let html = render_readme("<p align=\"center\"><img src=\"logo.svg\"></p>\n", "foo");
        assert!(html.contains("src=\"https://cdn.jsdelivr.net/npm/foo/logo.svg\""));
        assert!(html.contains("<p align=\"center\">"));
    }

    #[test]
    fn test_raw_h1_renamed() {
        let html = render_readme("<h1 align=\"center\">Logo</h1>\n", "foo");
        assert!(html.starts_with("<h3 data-level=\"1\">Logo</h3>"));
    }

    #[test]
    fn test_callout_survives_sanitizer() {
        let html = render_readme("> [!WARNING]\n> Careful.\n", "foo");
        assert!(html.contains("<blockquote data-callout=\"warning\">"));
        assert!(!html.contains("[!WARNING]"));
    }

    #[test]
    fn test_highlighting_survives_sanitizer() {
        let html = render_readme("```js\nconst a = 1;\n```\n", "foo");
        assert!(html.contains("<pre class=\"highlight\"><code class=\"language-js\">"));
        assert!(html.contains("<span class=\"syntax-"));
    }

    #[test]
    fn test_output_is_stable_under_resanitizing() {
        let markdown = "# Demo\n\n[site](https://x.dev) and [docs](docs/a.md)\n\n\
                        ![img](./a.png)\n\n> [!NOTE]\n> hi\n\n| a |\n|---|\n| b |\n";
        let html = render_readme(markdown, "demo");
        let again = sanitize_html(&html, "demo", &ReadmeOptions::default());
        assert_eq!(again, html);
    }

    #[test]
    fn test_custom_options() {
        let options = ReadmeOptions {
            cdn_base: "https://unpkg.com".into(),
            ..ReadmeOptions::default()
        };
        let html = ReadmeRenderer::new(&options).render("![a](a.png)", "foo");
        assert!(html.contains("https://unpkg.com/foo/a.png"));
    }
}
