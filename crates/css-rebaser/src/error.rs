//! Error types for the rebasing engine.

use crate::policy::PolicyError;
use css_parser::ParseError;
use source_map::SourceMapError;
use thiserror::Error;

/// Errors that fail a rebase. No output is produced when one occurs.
#[derive(Debug, Error)]
pub enum RebaseError {
    /// Neither an embedded nor a supplied source map is available.
    #[error("a source map is required, either embedded in the stylesheet or supplied explicitly")]
    MissingSourceMap,

    /// The supplied or embedded source map could not be decoded.
    #[error(transparent)]
    SourceMap(#[from] SourceMapError),

    /// The stylesheet could not be parsed.
    #[error("failed to parse stylesheet at byte {}: {}", u32::from(.0.span.start), .0)]
    Parse(#[from] ParseError),

    /// A policy failed or abandoned its decision.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// A spawned policy task panicked or was cancelled.
    #[error("rebase policy task failed: {0}")]
    PolicyTask(String),

    /// The projected source map could not be serialized.
    #[error("failed to encode source map: {0}")]
    EncodeMap(#[source] source_map::sourcemap::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_parser::ParseErrorKind;
    use source_map::Span;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RebaseError::MissingSourceMap.to_string(),
            "a source map is required, either embedded in the stylesheet or supplied explicitly"
        );

        let parse = ParseError::new(ParseErrorKind::UnterminatedString, Span::from_usize(7, 9));
        assert_eq!(
            RebaseError::from(parse).to_string(),
            "failed to parse stylesheet at byte 7: unterminated string"
        );

        assert_eq!(
            RebaseError::from(PolicyError::Abandoned).to_string(),
            "rebase policy dropped its completion handle without deciding"
        );
    }
}
