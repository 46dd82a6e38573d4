//! Allow-list HTML sanitizer.
//!
//! Runs over every rendered README, including raw HTML embedded in the
//! Markdown. Elements and attributes are kept only when listed here; the
//! image and link transforms are applied again so the output is safe no
//! matter which renderer produced the input.

use lol_html::html_content::{Comment, Element};
use lol_html::{RewriteStrSettings, doc_comments, element, rewrite_str};

use crate::error::Result;
use crate::options::ReadmeOptions;
use crate::render::{CALLOUT_TYPES, EXTERNAL_REL};
use crate::urls::{has_scheme, is_external, is_package_url, resolve_image_url};

/// Elements removed together with everything inside them.
const DROPPED_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "noscript",
    "noembed", "noframes", "template", "textarea", "select", "option", "button", "input", "form",
    "svg", "math", "link", "meta", "base", "title", "head", "xmp", "plaintext", "portal",
];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Attributes allowed on each kept element. Elements missing here are
/// unwrapped.
fn allowed_attributes(tag: &str) -> Option<&'static [&'static str]> {
    let attributes: &'static [&'static str] = match tag {
        "h3" | "h4" | "h5" | "h6" => &["id", "data-level"],
        "p" | "div" => &["align"],
        "a" => &["href", "title", "rel", "target"],
        "img" => &["src", "alt", "title", "width", "height", "align"],
        "source" => &["srcset", "media", "type", "width", "height"],
        "td" | "th" => &["align", "colspan", "rowspan"],
        "ol" => &["start"],
        "pre" | "code" | "span" => &["class"],
        "blockquote" => &["data-callout"],
        "details" => &["open"],
        "br" | "hr" | "ul" | "li" | "dl" | "dt" | "dd" | "strong" | "b" | "em" | "i" | "del"
        | "s" | "ins" | "sub" | "sup" | "kbd" | "mark" | "table" | "thead" | "tbody" | "tfoot"
        | "tr" | "caption" | "picture" | "summary" => &[],
        _ => return None,
    };
    Some(attributes)
}

/// Class prefix each element may keep.
fn allowed_class_prefix(tag: &str) -> Option<&'static str> {
    match tag {
        "span" => Some("syntax-"),
        "code" => Some("language-"),
        _ => None,
    }
}

/// Returns `true` if `url` is relative or uses an allowed scheme.
///
/// `url` is an attribute value as written in the markup. Character
/// references are decoded and whitespace and control characters are ignored
/// when looking for the scheme, so `&#106;ava\tscript:` is recognized as
/// `javascript:`. A `&` left before the first `:`, `/`, `?` or `#` after
/// decoding is a reference the browser may still resolve, and the URL is
/// rejected.
///
/// # Examples
///
/// ```
/// use pkgdeck_readme::is_safe_url;
///
/// assert!(is_safe_url("https://example.com/?a=1&amp;b=2"));
/// assert!(!is_safe_url("javascript&colon;alert(1)"));
/// ```
pub fn is_safe_url(url: &str) -> bool {
    let decoded = html_escape::decode_html_entities(url);
    let normalized: String = decoded
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let scheme_part = normalized.split([':', '/', '?', '#']).next().unwrap_or_default();
    if scheme_part.contains('&') {
        return false;
    }

    if !has_scheme(&normalized) {
        return true;
    }
    URL_SCHEMES.iter().any(|scheme| {
        normalized
            .strip_prefix(scheme)
            .is_some_and(|rest| rest.starts_with(':'))
    })
}

/// Filters `html` down to the allow-list.
///
/// Rewriter failures are logged and yield an empty string, so a broken
/// README never leaks unsanitized markup.
///
/// # Examples
///
/// ```
/// use pkgdeck_readme::{ReadmeOptions, sanitize_html};
///
/// let html = sanitize_html(
///     "<p onclick=\"x()\">Hi<script>alert(1)</script></p>",
///     "foo",
///     &ReadmeOptions::default(),
/// );
/// assert_eq!(html, "<p>Hi</p>");
/// ```
pub fn sanitize_html(html: &str, package_name: &str, options: &ReadmeOptions) -> String {
    match try_sanitize_html(html, package_name, options) {
        Ok(sanitized) => sanitized,
        Err(e) => {
            tracing::error!(package = package_name, error = %e, "failed to sanitize README");
            String::new()
        }
    }
}

/// Like [`sanitize_html`], but reports rewriter failures.
///
/// # Errors
///
/// Returns [`ReadmeError::Rewrite`](crate::ReadmeError::Rewrite) if the
/// rewriter fails.
pub fn try_sanitize_html(html: &str, package_name: &str, options: &ReadmeOptions) -> Result<String> {
    let cdn_base = options.cdn_base.as_str();

    let sanitized = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                sanitize_element(el, package_name, cdn_base)?;
                Ok(())
            })],
            document_content_handlers: vec![doc_comments!(|comment: &mut Comment| {
                comment.remove();
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )?;

    Ok(sanitized)
}

type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn sanitize_element(el: &mut Element<'_, '_>, package_name: &str, cdn_base: &str) -> HandlerResult {
    let mut tag = el.tag_name();

    if DROPPED_WITH_CONTENT.contains(&tag.as_str()) {
        el.remove();
        return Ok(());
    }

    let original_level = match tag.as_str() {
        "h1" => Some("1"),
        "h2" => Some("2"),
        _ => None,
    };
    if let Some(level) = original_level {
        let renamed = if level == "1" { "h3" } else { "h4" };
        el.set_tag_name(renamed)?;
        tag = renamed.to_string();
    }

    let Some(allowed) = allowed_attributes(&tag) else {
        el.remove_and_keep_content();
        return Ok(());
    };

    let present: Vec<(String, String)> = el
        .attributes()
        .iter()
        .map(|attr| (attr.name(), attr.value()))
        .collect();

    for (name, value) in present {
        if !allowed.contains(&name.as_str()) || !is_valid_value(&tag, &name, &value) {
            el.remove_attribute(&name);
        }
    }

    if let Some(level) = original_level {
        el.set_attribute("data-level", level)?;
    }

    match tag.as_str() {
        "img" => {
            if let Some(src) = el.get_attribute("src") {
                let resolved = resolve_image_url(&src, package_name, cdn_base);
                if resolved != src {
                    el.set_attribute("src", &resolved)?;
                }
            }
        }
        "source" => {
            if let Some(srcset) = el.get_attribute("srcset") {
                let resolved = resolve_srcset(&srcset, package_name, cdn_base);
                if resolved != srcset {
                    el.set_attribute("srcset", &resolved)?;
                }
            }
        }
        "a" => match el.get_attribute("href") {
            Some(href)
                if is_external(&href) && !is_package_url(&href, package_name, cdn_base) =>
            {
                el.set_attribute("rel", EXTERNAL_REL)?;
                el.set_attribute("target", "_blank")?;
            }
            _ => {
                el.remove_attribute("rel");
                el.remove_attribute("target");
            }
        },
        _ => {}
    }

    if let Some(class) = el.get_attribute("class") {
        let kept = filter_classes(&tag, &class);
        if kept.is_empty() {
            el.remove_attribute("class");
        } else if kept != class {
            el.set_attribute("class", &kept)?;
        }
    }

    Ok(())
}

fn is_valid_value(tag: &str, name: &str, value: &str) -> bool {
    match name {
        "href" | "src" => is_safe_url(value),
        "srcset" => srcset_urls(value).all(is_safe_url),
        "data-level" => matches!(value, "1" | "2" | "3" | "4" | "5" | "6"),
        "data-callout" => CALLOUT_TYPES.contains(&value),
        "start" | "colspan" | "rowspan" => value.trim().parse::<u32>().is_ok(),
        "class" => allowed_class_prefix(tag).is_some() || tag == "pre",
        _ => true,
    }
}

fn filter_classes(tag: &str, class: &str) -> String {
    class
        .split_whitespace()
        .filter(|name| match tag {
            "pre" => *name == "highlight",
            _ => allowed_class_prefix(tag).is_some_and(|prefix| name.starts_with(prefix)),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn srcset_urls(srcset: &str) -> impl Iterator<Item = &str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
}

fn resolve_srcset(srcset: &str, package_name: &str, cdn_base: &str) -> String {
    srcset
        .split(',')
        .filter_map(|candidate| {
            let mut parts = candidate.split_whitespace();
            let url = parts.next()?;
            let resolved = resolve_image_url(url, package_name, cdn_base);
            let descriptor: Vec<&str> = parts.collect();
            Some(if descriptor.is_empty() {
                resolved
            } else {
                format!("{resolved} {}", descriptor.join(" "))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}
