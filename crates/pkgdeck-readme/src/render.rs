//! Markdown to HTML with per-node render rules.
//!
//! The document is parsed with comrak and walked by hand. Most nodes render
//! to their usual HTML; headings, fenced code, images, links and
//! blockquotes are delegated to the functions in [`RenderRules`], which can
//! be swapped individually.
//!
//! The output of this module is *not* safe to embed. Raw HTML from the
//! README passes through untouched; [`crate::sanitize`] runs afterwards.

use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, options, parse_document};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::highlight::{HighlightLimits, Highlighter};
use crate::options::ReadmeOptions;
use crate::urls::{is_external, resolve_image_url, resolve_url};

/// `rel` value placed on links leaving the page.
pub const EXTERNAL_REL: &str = "nofollow noreferrer noopener";

/// Callout kinds recognized at the start of a blockquote.
pub const CALLOUT_TYPES: &[&str] = &["note", "tip", "important", "warning", "caution"];

static CALLOUT_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*<p>\s*\[!(note|tip|important|warning|caution)\][ \t]*(?:<br />)?\n?")
        .expect("valid regex")
});

/// A heading, with its content already rendered.
#[derive(Debug)]
pub struct HeadingNode<'n> {
    /// Level as written in Markdown, 1 to 6.
    pub level: u8,
    pub inner_html: &'n str,
    /// Plain text content, used for the anchor slug.
    pub text: &'n str,
}

#[derive(Debug)]
pub struct CodeBlockNode<'n> {
    /// Full info string after the opening fence.
    pub info: &'n str,
    pub code: &'n str,
}

#[derive(Debug)]
pub struct ImageNode<'n> {
    pub url: &'n str,
    pub title: &'n str,
    pub alt: &'n str,
}

#[derive(Debug)]
pub struct LinkNode<'n> {
    pub url: &'n str,
    pub title: &'n str,
    pub inner_html: &'n str,
}

#[derive(Debug)]
pub struct BlockquoteNode<'n> {
    pub inner_html: &'n str,
}

pub type HeadingRule = fn(&HeadingNode<'_>, &RenderContext<'_>) -> String;
pub type CodeBlockRule = fn(&CodeBlockNode<'_>, &RenderContext<'_>) -> String;
pub type ImageRule = fn(&ImageNode<'_>, &RenderContext<'_>) -> String;
pub type LinkRule = fn(&LinkNode<'_>, &RenderContext<'_>) -> String;
pub type BlockquoteRule = fn(&BlockquoteNode<'_>, &RenderContext<'_>) -> String;

/// Per-node render overrides.
///
/// # Examples
///
/// ```
/// use pkgdeck_readme::render::{CodeBlockNode, RenderContext, RenderRules, escape_html};
/// use pkgdeck_readme::ReadmeRenderer;
///
/// fn plain_code(node: &CodeBlockNode<'_>, _ctx: &RenderContext<'_>) -> String {
///     format!("<pre>{}</pre>\n", escape_html(node.code))
/// }
///
/// let rules = RenderRules { code_block: plain_code, ..RenderRules::default() };
/// let renderer = ReadmeRenderer::default().with_rules(rules);
/// let html = renderer.render("```js\nlet a = 1;\n```\n", "demo");
/// assert_eq!(html, "<pre>let a = 1;\n</pre>\n");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RenderRules {
    pub heading: HeadingRule,
    pub code_block: CodeBlockRule,
    pub image: ImageRule,
    pub link: LinkRule,
    pub blockquote: BlockquoteRule,
}

impl Default for RenderRules {
    fn default() -> Self {
        Self {
            heading: render_heading,
            code_block: render_code_block,
            image: render_image,
            link: render_link,
            blockquote: render_blockquote,
        }
    }
}

/// State shared by all rules during one document render.
pub struct RenderContext<'a> {
    pub package_name: &'a str,
    pub options: &'a ReadmeOptions,
    pub highlighter: &'a Highlighter,
    slugs: RefCell<HashMap<String, usize>>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        package_name: &'a str,
        options: &'a ReadmeOptions,
        highlighter: &'a Highlighter,
    ) -> Self {
        Self {
            package_name,
            options,
            highlighter,
            slugs: RefCell::new(HashMap::new()),
        }
    }

    /// Returns an anchor id for `text`, unique within this document.
    ///
    /// Repeated headings get `-1`, `-2`, ... appended.
    pub fn unique_slug(&self, text: &str) -> String {
        let base = slugify(text);
        let mut slugs = self.slugs.borrow_mut();
        match slugs.get_mut(&base) {
            Some(count) => {
                *count += 1;
                format!("{base}-{count}")
            }
            None => {
                slugs.insert(base.clone(), 0);
                base
            }
        }
    }

    pub fn resolve_url(&self, url: &str) -> String {
        resolve_url(url, self.package_name, &self.options.cdn_base)
    }

    pub fn resolve_image_url(&self, url: &str) -> String {
        resolve_image_url(url, self.package_name, &self.options.cdn_base)
    }

    fn limits(&self) -> HighlightLimits {
        HighlightLimits {
            max_code_bytes: self.options.max_code_bytes,
            max_line_bytes: self.options.max_line_bytes,
        }
    }
}

/// GitHub-style anchor slug: lower-cased, spaces to `-`, punctuation dropped.
pub fn slugify(text: &str) -> String {
    let slug: String = text
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .flat_map(char::to_lowercase)
        .collect();

    if slug.is_empty() { "section".to_string() } else { slug }
}

/// Escapes text for use in HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Language token of a fence info string: the first word, cut at `,`.
///
/// `rust,ignore` and `js title="a.js"` both yield the bare language.
pub fn code_language(info: &str) -> Option<&str> {
    info.split(|c: char| c.is_whitespace() || c == ',')
        .find(|token| !token.is_empty())
}

/// Default heading rule: shifts the level down by two and records the
/// original level in `data-level`.
pub fn render_heading(node: &HeadingNode<'_>, ctx: &RenderContext<'_>) -> String {
    let level = node.level.clamp(1, 6);
    let tag = (level + 2).min(6);
    let id = ctx.unique_slug(node.text);
    format!(
        "<h{tag} id=\"{}\" data-level=\"{level}\">{}</h{tag}>\n",
        escape_html(&id),
        node.inner_html
    )
}

/// Default code block rule: highlighted when the language is known and the
/// block is within limits, escaped otherwise.
pub fn render_code_block(node: &CodeBlockNode<'_>, ctx: &RenderContext<'_>) -> String {
    let Some(language) = code_language(node.info) else {
        return format!("<pre><code>{}</code></pre>\n", escape_html(node.code));
    };
    let class = format!("language-{}", escape_html(language));

    match ctx.highlighter.highlight(language, node.code, ctx.limits()) {
        Ok(highlighted) => {
            format!("<pre class=\"highlight\"><code class=\"{class}\">{highlighted}</code></pre>\n")
        }
        Err(e) => {
            tracing::debug!(language, error = %e, "code block left unhighlighted");
            format!("<pre><code class=\"{class}\">{}</code></pre>\n", escape_html(node.code))
        }
    }
}

/// Default image rule: CDN resolution plus GitHub blob to raw.
pub fn render_image(node: &ImageNode<'_>, ctx: &RenderContext<'_>) -> String {
    let src = ctx.resolve_image_url(node.url);
    let mut html = format!(
        "<img src=\"{}\" alt=\"{}\"",
        escape_html(&src),
        escape_html(node.alt)
    );
    if !node.title.is_empty() {
        html.push_str(&format!(" title=\"{}\"", escape_html(node.title)));
    }
    html.push_str(" />");
    html
}

/// Default link rule: CDN resolution; external links open in a new context
/// without passing a referrer.
pub fn render_link(node: &LinkNode<'_>, ctx: &RenderContext<'_>) -> String {
    let href = ctx.resolve_url(node.url);
    let mut html = format!("<a href=\"{}\"", escape_html(&href));
    if !node.title.is_empty() {
        html.push_str(&format!(" title=\"{}\"", escape_html(node.title)));
    }
    // Relative links resolve to an absolute CDN URL but stay internal.
    if is_external(node.url) {
        html.push_str(&format!(" rel=\"{EXTERNAL_REL}\" target=\"_blank\""));
    }
    html.push('>');
    html.push_str(node.inner_html);
    html.push_str("</a>");
    html
}

/// Default blockquote rule: a leading `[!TYPE]` marker becomes a
/// `data-callout` attribute.
pub fn render_blockquote(node: &BlockquoteNode<'_>, _ctx: &RenderContext<'_>) -> String {
    let Some(captures) = CALLOUT_MARKER.captures(node.inner_html) else {
        return format!("<blockquote>\n{}</blockquote>\n", node.inner_html);
    };
    let kind = captures[1].to_ascii_lowercase();
    let marker_end = captures.get(0).map_or(0, |m| m.end());
    let rest = &node.inner_html[marker_end..];

    // Marker alone in its paragraph: drop the now empty paragraph.
    let body = match rest.trim_start().strip_prefix("</p>") {
        Some(after) => after.trim_start_matches('\n').to_string(),
        None => format!("<p>{rest}"),
    };

    format!("<blockquote data-callout=\"{kind}\">\n{body}</blockquote>\n")
}

/// Parses `markdown` and renders it with `rules`.
pub fn render_markdown(markdown: &str, rules: &RenderRules, ctx: &RenderContext<'_>) -> String {
    let arena = Arena::new();
    let options = Options {
        extension: options::Extension {
            table: true,
            strikethrough: true,
            autolink: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let root = parse_document(&arena, markdown, &options);
    let mut walker = Walker { rules, ctx };
    let mut html = String::with_capacity(markdown.len() * 2);
    walker.render_node(root, &mut html);
    html
}

struct Walker<'r, 'c> {
    rules: &'r RenderRules,
    ctx: &'r RenderContext<'c>,
}

impl Walker<'_, '_> {
    fn render_children<'a>(&mut self, node: &'a AstNode<'a>) -> String {
        let mut html = String::new();
        for child in node.children() {
            self.render_node(child, &mut html);
        }
        html
    }

    fn render_node<'a>(&mut self, node: &'a AstNode<'a>, out: &mut String) {
        let data = node.data.borrow();
        match &data.value {
            NodeValue::Document => out.push_str(&self.render_children(node)),
            NodeValue::FrontMatter(_) => {}
            NodeValue::Paragraph => {
                let inner = self.render_children(node);
                if in_tight_list(node) {
                    out.push_str(&inner);
                    out.push('\n');
                } else {
                    out.push_str("<p>");
                    out.push_str(&inner);
                    out.push_str("</p>\n");
                }
            }
            NodeValue::Heading(heading) => {
                let inner_html = self.render_children(node);
                let mut text = String::new();
                collect_text(node, &mut text);
                out.push_str(&(self.rules.heading)(
                    &HeadingNode {
                        level: heading.level,
                        inner_html: &inner_html,
                        text: &text,
                    },
                    self.ctx,
                ));
            }
            NodeValue::BlockQuote => {
                let inner_html = self.render_children(node);
                out.push_str(&(self.rules.blockquote)(
                    &BlockquoteNode {
                        inner_html: &inner_html,
                    },
                    self.ctx,
                ));
            }
            NodeValue::CodeBlock(block) => {
                out.push_str(&(self.rules.code_block)(
                    &CodeBlockNode {
                        info: &block.info,
                        code: &block.literal,
                    },
                    self.ctx,
                ));
            }
            NodeValue::HtmlBlock(block) => out.push_str(&block.literal),
            NodeValue::ThematicBreak => out.push_str("<hr />\n"),
            NodeValue::List(list) => {
                let inner = self.render_children(node);
                if list.list_type == ListType::Ordered {
                    if list.start == 1 {
                        out.push_str("<ol>\n");
                    } else {
                        out.push_str(&format!("<ol start=\"{}\">\n", list.start));
                    }
                    out.push_str(&inner);
                    out.push_str("</ol>\n");
                } else {
                    out.push_str("<ul>\n");
                    out.push_str(&inner);
                    out.push_str("</ul>\n");
                }
            }
            NodeValue::Item(_) => {
                out.push_str("<li>");
                out.push_str(self.render_children(node).trim_end_matches('\n'));
                out.push_str("</li>\n");
            }
            NodeValue::Table(table) => {
                let alignments: Vec<TableAlignment> = table.alignments.to_vec();
                self.render_table(node, &alignments, out);
            }
            NodeValue::Text(text) => out.push_str(&escape_html(text)),
            NodeValue::SoftBreak => out.push('\n'),
            NodeValue::LineBreak => out.push_str("<br />\n"),
            NodeValue::Code(code) => {
                out.push_str("<code>");
                out.push_str(&escape_html(&code.literal));
                out.push_str("</code>");
            }
            NodeValue::HtmlInline(raw) => out.push_str(raw),
            NodeValue::Emph => wrap(out, "em", &self.render_children(node)),
            NodeValue::Strong => wrap(out, "strong", &self.render_children(node)),
            NodeValue::Strikethrough => wrap(out, "del", &self.render_children(node)),
            NodeValue::Link(link) => {
                let inner_html = self.render_children(node);
                out.push_str(&(self.rules.link)(
                    &LinkNode {
                        url: &link.url,
                        title: &link.title,
                        inner_html: &inner_html,
                    },
                    self.ctx,
                ));
            }
            NodeValue::Image(link) => {
                let mut alt = String::new();
                collect_text(node, &mut alt);
                out.push_str(&(self.rules.image)(
                    &ImageNode {
                        url: &link.url,
                        title: &link.title,
                        alt: &alt,
                    },
                    self.ctx,
                ));
            }
            _ => out.push_str(&self.render_children(node)),
        }
    }

    fn render_table<'a>(
        &mut self,
        table: &'a AstNode<'a>,
        alignments: &[TableAlignment],
        out: &mut String,
    ) {
        out.push_str("<table>\n");
        for (row_index, row) in table.children().enumerate() {
            let header = row_index == 0;
            if row_index == 0 {
                out.push_str("<thead>\n");
            } else if row_index == 1 {
                out.push_str("<tbody>\n");
            }

            out.push_str("<tr>\n");
            let cell_tag = if header { "th" } else { "td" };
            for (column, cell) in row.children().enumerate() {
                let inner = self.render_children(cell);
                match alignments.get(column).and_then(|a| alignment_name(*a)) {
                    Some(align) => out.push_str(&format!("<{cell_tag} align=\"{align}\">")),
                    None => out.push_str(&format!("<{cell_tag}>")),
                }
                out.push_str(&inner);
                out.push_str(&format!("</{cell_tag}>\n"));
            }
            out.push_str("</tr>\n");

            if header {
                out.push_str("</thead>\n");
            }
        }
        if table.children().nth(1).is_some() {
            out.push_str("</tbody>\n");
        }
        out.push_str("</table>\n");
    }
}

fn wrap(out: &mut String, tag: &str, inner: &str) {
    out.push_str(&format!("<{tag}>{inner}</{tag}>"));
}

fn alignment_name(alignment: TableAlignment) -> Option<&'static str> {
    match alignment {
        TableAlignment::Left => Some("left"),
        TableAlignment::Center => Some("center"),
        TableAlignment::Right => Some("right"),
        TableAlignment::None => None,
    }
}

fn in_tight_list<'a>(paragraph: &'a AstNode<'a>) -> bool {
    let Some(list) = paragraph.parent().and_then(|item| item.parent()) else {
        return false;
    };
    match &list.data.borrow().value {
        NodeValue::List(list) => list.tight,
        _ => false,
    }
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(text) => out.push_str(text),
            NodeValue::Code(code) => out.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
            _ => collect_text(child, out),
        }
    }
}
