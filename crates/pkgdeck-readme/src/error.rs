use thiserror::Error;

/// Failures inside the README pipeline.
///
/// None of these reach the caller of [`render_readme`](crate::render_readme):
/// a failing code block falls back to escaped text and a failing sanitizer
/// pass yields an empty document. They are public so custom render rules can
/// use the highlighter directly.
#[derive(Error, Debug)]
pub enum ReadmeError {
    #[error("no grammar loaded for language '{0}'")]
    UnknownLanguage(String),

    #[error("the code exceeded a highlighting limit")]
    LimitsExceeded,

    #[error("highlighter error: {0}")]
    Highlight(#[from] syntect::Error),

    #[error("HTML rewriter error: {0}")]
    Rewrite(#[from] lol_html::errors::RewritingError),
}

pub type Result<T> = std::result::Result<T, ReadmeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ReadmeError::UnknownLanguage("brainfuck".into()).to_string(),
            "no grammar loaded for language 'brainfuck'"
        );
        assert_eq!(
            ReadmeError::LimitsExceeded.to_string(),
            "the code exceeded a highlighting limit"
        );
    }
}
