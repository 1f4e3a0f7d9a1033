//! Recursive descent parser for CSS.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::ParseResult;
use smol_str::SmolStr;
use source_map::Span;
use text_size::TextSize;

const URL_PREFIX_LEN: u32 = "url(".len() as u32;

fn is_css_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0C')
}

/// The CSS parser.
pub struct Parser<'src> {
    /// The source being parsed.
    source: &'src str,
    /// Significant tokens; comments are split off into `comments`.
    tokens: Vec<Token>,
    /// Comments in source order.
    comments: Vec<Comment>,
    /// Current position in the token stream.
    pos: usize,
    /// Parse errors collected during parsing.
    errors: Vec<ParseError>,
    /// EOF token for when we're past the end
    eof_token: Token,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str) -> Self {
        let mut tokens = Vec::new();
        let mut comments = Vec::new();
        let mut errors = Vec::new();

        for token in Lexer::new(source) {
            match token.kind {
                TokenKind::Comment => comments.push(Comment { span: token.span }),
                TokenKind::UnterminatedComment => {
                    errors.push(ParseError::new(
                        ParseErrorKind::UnterminatedComment,
                        token.span,
                    ));
                    comments.push(Comment { span: token.span });
                }
                _ => tokens.push(token),
            }
        }

        let eof_token = Token {
            kind: TokenKind::Eof,
            span: Span::empty(TextSize::from(source.len() as u32)),
        };
        Self {
            source,
            tokens,
            comments,
            pos: 0,
            errors,
            eof_token,
        }
    }

    /// Parses the source into a stylesheet.
    pub fn parse(mut self) -> ParseResult {
        let stylesheet = self.parse_stylesheet();
        ParseResult {
            stylesheet,
            errors: self.errors,
        }
    }

    // === Token helpers ===

    /// Returns the current token.
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof_token)
    }

    /// Returns the current token kind.
    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Returns the text of the current token.
    fn current_text(&self) -> &'src str {
        self.current().span.text(self.source)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Advances if the current token matches, returns true if matched.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Reports an error at the current position.
    fn error(&mut self, kind: ParseErrorKind) {
        self.errors.push(ParseError::new(kind, self.current().span));
    }

    /// Reports that the current token is not what was expected.
    fn unexpected(&mut self, expected: &str) {
        let kind = if self.check(TokenKind::Eof) {
            ParseErrorKind::UnexpectedEof {
                expected: expected.to_string(),
            }
        } else {
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current_kind().name().to_string(),
            }
        };
        self.error(kind);
    }

    // === Rules ===

    fn parse_stylesheet(&mut self) -> Stylesheet {
        let mut rules = Vec::new();

        loop {
            match self.current_kind() {
                TokenKind::Eof => break,
                TokenKind::AtKeyword => rules.push(Rule::At(self.parse_at_rule())),
                TokenKind::RBrace | TokenKind::Semicolon => {
                    self.unexpected("rule");
                    self.advance();
                }
                _ => {
                    if let Some(rule) = self.parse_qualified_rule() {
                        rules.push(Rule::Qualified(rule));
                    }
                }
            }
        }

        Stylesheet {
            rules,
            comments: std::mem::take(&mut self.comments),
            span: Span::from_usize(0, self.source.len()),
        }
    }

    fn parse_at_rule(&mut self) -> AtRule {
        let start = self.current().span.start;
        let name = SmolStr::new(&self.current_text()[1..]);
        let mut end = self.current().span.end;
        self.advance();

        let prelude = self.parse_values(&[TokenKind::Semicolon, TokenKind::LBrace, TokenKind::RBrace]);
        if let Some(last) = prelude.last() {
            end = last.span().end;
        }

        let mut block = None;
        match self.current_kind() {
            TokenKind::Semicolon => {
                end = self.current().span.end;
                self.advance();
            }
            TokenKind::LBrace => {
                let parsed = self.parse_block();
                end = parsed.span.end;
                block = Some(parsed);
            }
            // `}` closes the enclosing block; EOF ends the rule.
            _ => {}
        }

        AtRule {
            name,
            prelude,
            block,
            span: Span::new(start, end),
        }
    }

    fn parse_qualified_rule(&mut self) -> Option<QualifiedRule> {
        let start = self.current().span.start;
        let prelude = self.parse_values(&[TokenKind::LBrace, TokenKind::Semicolon, TokenKind::RBrace]);

        if !self.check(TokenKind::LBrace) {
            self.unexpected(TokenKind::LBrace.name());
            self.eat(TokenKind::Semicolon);
            return None;
        }

        let block = self.parse_block();
        Some(QualifiedRule {
            prelude,
            span: Span::new(start, block.span.end),
            block,
        })
    }

    /// Parses a `{ ... }` block. The current token must be `{`.
    fn parse_block(&mut self) -> Block {
        let start = self.current().span.start;
        self.advance();

        let mut items = Vec::new();
        let end = loop {
            match self.current_kind() {
                TokenKind::RBrace => {
                    let end = self.current().span.end;
                    self.advance();
                    break end;
                }
                TokenKind::Eof => {
                    self.unexpected(TokenKind::RBrace.name());
                    break self.current().span.end;
                }
                TokenKind::Semicolon => self.advance(),
                TokenKind::AtKeyword => {
                    items.push(BlockItem::Rule(Rule::At(self.parse_at_rule())));
                }
                TokenKind::Ident if self.at_declaration() => {
                    if let Some(declaration) = self.parse_declaration() {
                        items.push(BlockItem::Declaration(declaration));
                    }
                }
                _ => {
                    if let Some(rule) = self.parse_qualified_rule() {
                        items.push(BlockItem::Rule(Rule::Qualified(rule)));
                    }
                }
            }
        };

        Block {
            items,
            span: Span::new(start, end),
        }
    }

    /// Decides whether the identifier at the current position starts a
    /// declaration rather than a nested rule.
    ///
    /// A `{` before the next top-level `;` or `}` means a nested rule, except
    /// for custom properties, whose values may contain blocks.
    fn at_declaration(&self) -> bool {
        if self.current_text().starts_with("--") {
            return true;
        }

        let mut depth = 0usize;
        for token in &self.tokens[self.pos..] {
            match token.kind {
                TokenKind::Function | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::LBrace if depth == 0 => return false,
                TokenKind::Semicolon | TokenKind::RBrace if depth == 0 => return true,
                _ => {}
            }
        }

        true
    }

    fn parse_declaration(&mut self) -> Option<Declaration> {
        let start = self.current().span.start;
        let name = SmolStr::new(self.current_text());
        let mut end = self.current().span.end;
        self.advance();

        if !self.check(TokenKind::Colon) {
            self.unexpected(TokenKind::Colon.name());
            self.parse_values(&[TokenKind::Semicolon, TokenKind::RBrace]);
            return None;
        }
        end = end.max(self.current().span.end);
        self.advance();

        let mut value = self.parse_values(&[TokenKind::Semicolon, TokenKind::RBrace]);
        if let Some(last) = value.last() {
            end = last.span().end;
        }
        let important = self.strip_important(&mut value);

        Some(Declaration {
            name,
            value,
            important,
            span: Span::new(start, end),
        })
    }

    /// Removes a trailing `! important` from a declaration value.
    fn strip_important(&self, value: &mut Vec<ComponentValue>) -> bool {
        let [.., bang, ident] = value.as_slice() else {
            return false;
        };
        let is_bang = matches!(
            bang,
            ComponentValue::Preserved { kind: TokenKind::Delim, span } if span.text(self.source) == "!"
        );
        let is_important = matches!(
            ident,
            ComponentValue::Preserved { kind: TokenKind::Ident, span }
                if span.text(self.source).eq_ignore_ascii_case("important")
        );

        if is_bang && is_important {
            value.truncate(value.len() - 2);
            true
        } else {
            false
        }
    }

    // === Component values ===

    /// Parses component values until one of `stop` (or EOF) is current.
    fn parse_values(&mut self, stop: &[TokenKind]) -> Vec<ComponentValue> {
        let mut values = Vec::new();
        while !self.check(TokenKind::Eof) && !stop.contains(&self.current_kind()) {
            if let Some(value) = self.parse_component_value() {
                values.push(value);
            }
        }
        values
    }

    /// Parses one component value, always consuming at least one token.
    fn parse_component_value(&mut self) -> Option<ComponentValue> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Url => {
                self.advance();
                Some(ComponentValue::Url(self.unquoted_url(token.span)))
            }
            TokenKind::Function => Some(self.parse_function()),
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                Some(ComponentValue::SimpleBlock(self.parse_simple_block()))
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                self.unexpected("value");
                self.advance();
                None
            }
            TokenKind::BadString => {
                self.error(ParseErrorKind::UnterminatedString);
                self.advance();
                None
            }
            TokenKind::BadUrl => {
                self.error(ParseErrorKind::BadUrl {
                    message: format!("`{}`", token.span.text(self.source)),
                });
                self.advance();
                None
            }
            TokenKind::Error => {
                self.error(ParseErrorKind::SyntaxError {
                    message: format!("invalid token `{}`", token.span.text(self.source)),
                });
                self.advance();
                None
            }
            kind => {
                self.advance();
                Some(ComponentValue::Preserved {
                    kind,
                    span: token.span,
                })
            }
        }
    }

    fn unquoted_url(&self, span: Span) -> UrlValue {
        let text = span.text(self.source);
        let inner = &text[URL_PREFIX_LEN as usize..text.len() - 1];
        let leading = inner.len() - inner.trim_start_matches(is_css_whitespace).len();
        let value = inner.trim_matches(is_css_whitespace);
        let value_start = span.start + TextSize::from(URL_PREFIX_LEN + leading as u32);

        UrlValue {
            span,
            value_span: Span::new(value_start, value_start + TextSize::from(value.len() as u32)),
            quote: Quote::None,
            value: value.to_string(),
        }
    }

    /// Parses a function. The current token must be a function token.
    fn parse_function(&mut self) -> ComponentValue {
        let start = self.current().span.start;
        let text = self.current_text();
        let name = SmolStr::new(&text[..text.len() - 1]);
        self.advance();

        let (arguments, end) = self.parse_nested(TokenKind::RParen, ')');
        let span = Span::new(start, end);

        if name.eq_ignore_ascii_case("url") {
            if let Some(ComponentValue::Preserved {
                kind: TokenKind::String,
                span: value_span,
            }) = arguments.first()
            {
                let quoted = value_span.text(self.source);
                let quote = if quoted.starts_with('\'') {
                    Quote::Single
                } else {
                    Quote::Double
                };
                return ComponentValue::Url(UrlValue {
                    span,
                    value_span: *value_span,
                    quote,
                    value: quoted[1..quoted.len() - 1].to_string(),
                });
            }
        }

        ComponentValue::Function(Function {
            name,
            arguments,
            span,
        })
    }

    /// Parses a bracketed block. The current token must open it.
    fn parse_simple_block(&mut self) -> SimpleBlock {
        let start = self.current().span.start;
        let (open, close, close_char) = match self.current_kind() {
            TokenKind::LBracket => ('[', TokenKind::RBracket, ']'),
            TokenKind::LBrace => ('{', TokenKind::RBrace, '}'),
            _ => ('(', TokenKind::RParen, ')'),
        };
        self.advance();

        let (values, end) = self.parse_nested(close, close_char);
        SimpleBlock {
            open,
            values,
            span: Span::new(start, end),
        }
    }

    /// Parses values up to and including the `close` token, returning the
    /// values and the end offset.
    ///
    /// A different closing bracket ends the nesting with an error and is left
    /// for the enclosing construct.
    fn parse_nested(&mut self, close: TokenKind, close_char: char) -> (Vec<ComponentValue>, TextSize) {
        let mut values = Vec::new();
        loop {
            let token = self.current().clone();
            match token.kind {
                kind if kind == close => {
                    self.advance();
                    return (values, token.span.end);
                }
                TokenKind::Eof => {
                    self.unexpected(close.name());
                    return (values, token.span.end);
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    let found = self.current_text().chars().next().unwrap_or(close_char);
                    self.error(ParseErrorKind::MismatchedBracket {
                        expected: close_char,
                        found,
                    });
                    return (values, token.span.start);
                }
                _ => {
                    if let Some(value) = self.parse_component_value() {
                        values.push(value);
                    }
                }
            }
        }
    }
}
