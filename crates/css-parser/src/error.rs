//! Parse error types.

use source_map::Span;
use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the source where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// An unexpected token was encountered.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },

    /// An unexpected end of file was encountered.
    #[error("unexpected end of file: expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: String,
    },

    /// A closing bracket did not match the innermost open one.
    #[error("mismatched bracket: expected '{expected}', found '{found}'")]
    MismatchedBracket {
        /// The closing bracket that was expected.
        expected: char,
        /// The closing bracket that was found.
        found: char,
    },

    /// A string was broken by a newline or the end of input.
    #[error("unterminated string")]
    UnterminatedString,

    /// A comment is missing its closing `*/`.
    #[error("unterminated comment")]
    UnterminatedComment,

    /// An unquoted `url(...)` contained characters it may not contain.
    #[error("malformed url: {message}")]
    BadUrl {
        /// A description of the problem.
        message: String,
    },

    /// A generic syntax error.
    #[error("{message}")]
    SyntaxError {
        /// A description of the error.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_size::TextSize;

    #[test]
    fn test_error_display() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "'{'".to_string(),
                found: "';'".to_string(),
            },
            Span::new(TextSize::from(0), TextSize::from(1)),
        );
        assert_eq!(
            error.to_string(),
            "unexpected token: expected '{', found ';'"
        );
    }

    #[test]
    fn test_mismatched_bracket_display() {
        let error = ParseError::new(
            ParseErrorKind::MismatchedBracket {
                expected: ')',
                found: '}',
            },
            Span::empty(TextSize::from(4)),
        );
        assert_eq!(error.to_string(), "mismatched bracket: expected ')', found '}'");
    }
}
