//! CSS parser for css-rebaser.
//!
//! This crate provides a tolerant CSS parser that keeps byte-accurate spans:
//! - Lexer (tokenizer) using `logos`
//! - Recursive descent parser for rules, blocks and declarations
//! - AST types with a dedicated node for `url(...)` references
//! - Error recovery, so every problem in a file is reported at once
//!
//! # Example
//!
//! ```
//! use css_parser::parse;
//!
//! let result = parse(".logo { background: url(../img/logo.png) no-repeat }");
//! assert!(result.errors.is_empty());
//! ```

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use source_map::Span;

/// The result of parsing a stylesheet.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed stylesheet.
    pub stylesheet: Stylesheet,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns the stylesheet, or the first error if parsing failed.
    pub fn into_result(self) -> Result<Stylesheet, ParseError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.stylesheet),
        }
    }
}

/// Parses a stylesheet into an AST.
///
/// This function will attempt to parse the entire stylesheet and recover from
/// errors where possible, returning both the AST and any errors encountered.
pub fn parse(source: &str) -> ParseResult {
    parser::Parser::new(source).parse()
}
