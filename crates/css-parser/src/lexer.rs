//! CSS lexer using logos.
//!
//! The token set is a reduced form of CSS Syntax Level 3. Whitespace is
//! skipped, comments are kept so that `sourceMappingURL` directives can be
//! found, and `url(` gets special treatment: an unquoted URL is consumed as a
//! single token, a quoted one lexes like any other function.

use logos::Logos;
use source_map::Span;
use text_size::TextSize;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the source.
    pub span: Span,
}

/// Token kinds for CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    /// `{`
    #[token("{", priority = 10)]
    LBrace,

    /// `}`
    #[token("}", priority = 10)]
    RBrace,

    /// `(`
    #[token("(", priority = 10)]
    LParen,

    /// `)`
    #[token(")", priority = 10)]
    RParen,

    /// `[`
    #[token("[", priority = 10)]
    LBracket,

    /// `]`
    #[token("]", priority = 10)]
    RBracket,

    /// `:`
    #[token(":", priority = 10)]
    Colon,

    /// `;`
    #[token(";", priority = 10)]
    Semicolon,

    /// `,`
    #[token(",", priority = 10)]
    Comma,

    /// `/* ... */`
    #[token("/*", lex_comment, priority = 10)]
    Comment,

    /// A comment missing its closing `*/`.
    UnterminatedComment,

    /// A quoted string.
    #[token("\"", lex_string, priority = 10)]
    #[token("'", lex_string, priority = 10)]
    String,

    /// A string broken by a newline or the end of input.
    BadString,

    /// An unquoted `url(...)`, including the closing parenthesis.
    #[token("url(", lex_url, priority = 20, ignore(case))]
    Url,

    /// A malformed unquoted `url(...)`.
    BadUrl,

    /// A function name including its opening parenthesis, e.g. `rgb(`.
    #[regex(
        r"-?-?([a-zA-Z_]|[^\x00-\x7F]|\\[^\n\r\f])([a-zA-Z0-9_-]|[^\x00-\x7F]|\\[^\n\r\f])*\(",
        priority = 5
    )]
    Function,

    /// An at-keyword, e.g. `@media`.
    #[regex(
        r"@-?-?([a-zA-Z_]|[^\x00-\x7F]|\\[^\n\r\f])([a-zA-Z0-9_-]|[^\x00-\x7F]|\\[^\n\r\f])*",
        priority = 5
    )]
    AtKeyword,

    /// An identifier.
    #[regex(
        r"-?-?([a-zA-Z_]|[^\x00-\x7F]|\\[^\n\r\f])([a-zA-Z0-9_-]|[^\x00-\x7F]|\\[^\n\r\f])*",
        priority = 4
    )]
    Ident,

    /// A hash, e.g. `#fff` or `#id`.
    #[regex(r"#([a-zA-Z0-9_-]|[^\x00-\x7F]|\\[^\n\r\f])+", priority = 4)]
    Hash,

    /// A number, percentage or dimension.
    #[regex(
        r"[+-]?([0-9]+|[0-9]*\.[0-9]+)([eE][+-]?[0-9]+)?(%|-?[a-zA-Z_][a-zA-Z0-9_-]*)?",
        priority = 4
    )]
    Number,

    /// Any other single character.
    #[regex(r"[^ \t\r\n\f]", priority = 0)]
    Delim,

    /// End of file
    Eof,

    /// Invalid/unknown token
    #[default]
    Error,
}

impl TokenKind {
    /// Returns true for tokens that can only appear in malformed input.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            TokenKind::UnterminatedComment
                | TokenKind::BadString
                | TokenKind::BadUrl
                | TokenKind::Error
        )
    }

    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Comment => "comment",
            TokenKind::UnterminatedComment => "unterminated comment",
            TokenKind::String => "string",
            TokenKind::BadString => "unterminated string",
            TokenKind::Url => "url",
            TokenKind::BadUrl => "malformed url",
            TokenKind::Function => "function",
            TokenKind::AtKeyword => "at-keyword",
            TokenKind::Ident => "identifier",
            TokenKind::Hash => "hash",
            TokenKind::Number => "number",
            TokenKind::Delim => "delimiter",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0C')
}

fn is_newline(c: char) -> bool {
    matches!(c, '\r' | '\n' | '\x0C')
}

fn lex_comment(lex: &mut logos::Lexer<'_, TokenKind>) -> TokenKind {
    match lex.remainder().find("*/") {
        Some(idx) => {
            lex.bump(idx + 2);
            TokenKind::Comment
        }
        None => {
            lex.bump(lex.remainder().len());
            TokenKind::UnterminatedComment
        }
    }
}

fn lex_string(lex: &mut logos::Lexer<'_, TokenKind>) -> TokenKind {
    let quote = lex.slice().chars().next().unwrap_or('"');
    let mut chars = lex.remainder().char_indices();

    while let Some((idx, c)) = chars.next() {
        match c {
            c if c == quote => {
                lex.bump(idx + c.len_utf8());
                return TokenKind::String;
            }
            '\\' => {
                // An escaped newline continues the string.
                if let Some((_, escaped)) = chars.next() {
                    if escaped == '\r' {
                        let rest = &lex.remainder()[idx + 2..];
                        if rest.starts_with('\n') {
                            chars.next();
                        }
                    }
                }
            }
            c if is_newline(c) => {
                lex.bump(idx);
                return TokenKind::BadString;
            }
            _ => {}
        }
    }

    lex.bump(lex.remainder().len());
    TokenKind::BadString
}

fn lex_url(lex: &mut logos::Lexer<'_, TokenKind>) -> TokenKind {
    let rest = lex.remainder();
    let inner = rest.trim_start_matches(is_whitespace);
    if inner.starts_with(['"', '\'']) {
        return TokenKind::Function;
    }

    let mut trailing_whitespace = false;
    let mut chars = rest.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            ')' => {
                lex.bump(idx + 1);
                return TokenKind::Url;
            }
            c if is_whitespace(c) => {
                if idx >= rest.len() - inner.len() {
                    trailing_whitespace = true;
                }
            }
            _ if trailing_whitespace => return bad_url(lex),
            '"' | '\'' | '(' => return bad_url(lex),
            '\\' => match chars.next() {
                Some((_, escaped)) if !is_newline(escaped) => {}
                _ => return bad_url(lex),
            },
            c if c.is_control() => return bad_url(lex),
            _ => {}
        }
    }

    bad_url(lex)
}

/// Consumes the remnants of a malformed url up to its closing parenthesis.
fn bad_url(lex: &mut logos::Lexer<'_, TokenKind>) -> TokenKind {
    let rest = lex.remainder();
    let len = rest.find(')').map_or(rest.len(), |idx| idx + 1);
    lex.bump(len);
    TokenKind::BadUrl
}

/// A lexer for CSS source code.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            finished: false,
        }
    }

    /// Returns the source string being lexed.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Returns the text of the current token.
    pub fn slice(&self) -> &'src str {
        self.inner.slice()
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let kind = match self.inner.next() {
            Some(Ok(kind)) => kind,
            Some(Err(())) => TokenKind::Error,
            None => {
                self.finished = true;
                let end = TextSize::from(self.source.len() as u32);
                return Some(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(end, end),
                });
            }
        };

        let span = self.inner.span();
        Some(Token {
            kind,
            span: Span::from_usize(span.start, span.end),
        })
    }
}
