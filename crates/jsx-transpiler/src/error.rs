//! Transpile error types.

use text_size::TextRange;
use thiserror::Error;

/// An error produced while transpiling one block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranspileError {
    /// An opening tag was never closed (strict mode).
    #[error("unclosed tag: <{tag_name}>")]
    UnclosedTag {
        /// The name of the unclosed tag.
        tag_name: String,
        /// Where the opening tag starts.
        span: TextRange,
    },

    /// A closing tag did not match the innermost open tag (strict mode).
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedClosingTag {
        /// The name of the innermost open tag.
        expected: String,
        /// The name found in the closing tag.
        found: String,
        /// The closing tag.
        span: TextRange,
    },

    /// A closing tag appeared with no open tag (strict mode).
    #[error("unexpected closing tag: </{tag_name}>")]
    UnexpectedClosingTag {
        /// The name found in the closing tag.
        tag_name: String,
        /// The closing tag.
        span: TextRange,
    },

    /// The input ended inside a tag or one of its attribute values (strict mode).
    #[error("unterminated tag: <{tag_name}")]
    UnterminatedTag {
        /// The name of the unterminated tag.
        tag_name: String,
        /// From the tag start to the end of input.
        span: TextRange,
    },

    /// The rewritten text is not a valid script.
    #[error("invalid output: {message}")]
    InvalidOutput {
        /// The parser message.
        message: String,
        /// Location of the problem in the rewritten text, when known.
        span: Option<TextRange>,
    },

    /// An unexpected fault inside pragma resolution or rewriting.
    #[error("internal fault: {message}")]
    Fault {
        /// A description of the fault.
        message: String,
    },
}

impl TranspileError {
    /// Returns the span this error refers to.
    ///
    /// Spans of structural errors point into the input text; the span of
    /// [`TranspileError::InvalidOutput`] points into the rewritten text.
    pub fn span(&self) -> Option<TextRange> {
        match self {
            Self::UnclosedTag { span, .. }
            | Self::MismatchedClosingTag { span, .. }
            | Self::UnexpectedClosingTag { span, .. }
            | Self::UnterminatedTag { span, .. } => Some(*span),
            Self::InvalidOutput { span, .. } => *span,
            Self::Fault { .. } => None,
        }
    }

    /// A short stable code, used by reporters.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnclosedTag { .. } => "unclosed-tag",
            Self::MismatchedClosingTag { .. } => "mismatched-closing-tag",
            Self::UnexpectedClosingTag { .. } => "unexpected-closing-tag",
            Self::UnterminatedTag { .. } => "unterminated-tag",
            Self::InvalidOutput { .. } => "invalid-output",
            Self::Fault { .. } => "transpile-fault",
        }
    }
}
