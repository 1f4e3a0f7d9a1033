//! Errors reported by the command-line front end.

use camino::Utf8PathBuf;
use css_rebaser::RebaseError;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A failure that aborts the run with exit code 1.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("failed to read {path}")]
    #[diagnostic(code(css_rebaser::read))]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    #[diagnostic(code(css_rebaser::write))]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    #[diagnostic(
        code(css_rebaser::config),
        help("expected {{ \"baseDir\", \"emitMap\", \"exclude\", \"rewrites\" }}")
    )]
    Config {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(css_rebaser::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error(transparent)]
    #[diagnostic(code(css_rebaser::rebase))]
    Rebase(RebaseError),

    #[error("the working directory is not valid UTF-8")]
    WorkingDir,
}

impl CliError {
    /// Wraps an engine error, attaching the stylesheet text to parse failures.
    pub fn rebase(error: RebaseError, path: &Utf8PathBuf, css: &str) -> Self {
        match error {
            RebaseError::Parse(parse) => Self::Syntax {
                message: format!("failed to parse stylesheet: {parse}"),
                src: NamedSource::new(path.as_str(), css.to_string()),
                span: parse.span.range().into(),
            },
            other => Self::Rebase(other),
        }
    }
}
