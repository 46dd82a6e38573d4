//! Syntax highlighting for fenced code blocks.

use once_cell::sync::Lazy;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::{ReadmeError, Result};

static SHARED: Lazy<Highlighter> = Lazy::new(Highlighter::load);

/// Info-string tokens README authors use that the bundled grammars do not
/// list under that name.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("console", "bash"),
    ("shell", "bash"),
    ("shellscript", "bash"),
    ("sh", "bash"),
    ("zsh", "bash"),
    ("jsonc", "json"),
    ("json5", "json"),
    ("mjs", "js"),
    ("cjs", "js"),
    ("jsx", "js"),
    ("ts", "js"),
    ("tsx", "js"),
    ("mts", "js"),
    ("cts", "js"),
    ("typescript", "js"),
    ("yml", "yaml"),
];

/// Size limits applied before highlighting.
#[derive(Debug, Clone, Copy)]
pub struct HighlightLimits {
    pub max_code_bytes: usize,
    pub max_line_bytes: usize,
}

/// Grammar set plus the HTML generator settings.
///
/// Loading the grammars is the expensive part; it happens once per process
/// on the first call to [`Highlighter::shared`] and the instance is never
/// torn down. After that the highlighter is read-only and can be used from
/// any thread.
pub struct Highlighter {
    syntaxes: SyntaxSet,
}

impl Highlighter {
    /// The process-wide instance, loaded on first use.
    pub fn shared() -> &'static Highlighter {
        &SHARED
    }

    fn load() -> Self {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        tracing::debug!(count = syntaxes.syntaxes().len(), "loaded syntax definitions");
        Self { syntaxes }
    }

    /// Looks up the grammar for an info-string language token.
    pub fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        let language = language.trim().to_ascii_lowercase();
        if language.is_empty() {
            return None;
        }
        let token = LANGUAGE_ALIASES
            .iter()
            .find(|&&(alias, _)| alias == language)
            .map_or(language.as_str(), |&(_, target)| target);
        self.syntaxes.find_syntax_by_token(token)
    }

    /// Returns `true` if `language` has a loaded grammar.
    pub fn supports(&self, language: &str) -> bool {
        self.find_syntax(language).is_some()
    }

    /// Highlights `code` into class-annotated spans (`syntax-*` classes).
    ///
    /// # Errors
    ///
    /// Returns [`ReadmeError::UnknownLanguage`] if no grammar matches,
    /// [`ReadmeError::LimitsExceeded`] if the code is too large, or the
    /// underlying highlighter error.
    pub fn highlight(&self, language: &str, code: &str, limits: HighlightLimits) -> Result<String> {
        let syntax = self
            .find_syntax(language)
            .ok_or_else(|| ReadmeError::UnknownLanguage(language.to_string()))?;

        if code.len() > limits.max_code_bytes {
            return Err(ReadmeError::LimitsExceeded);
        }

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntaxes,
            ClassStyle::SpacedPrefixed { prefix: "syntax-" },
        );

        for line in LinesWithEndings::from(code) {
            if line.len() > limits.max_line_bytes {
                return Err(ReadmeError::LimitsExceeded);
            }
            generator.parse_html_for_line_which_includes_newline(line)?;
        }

        Ok(generator.finalize())
    }
}
