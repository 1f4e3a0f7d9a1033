//! AST types for CSS.
//!
//! The tree keeps only the structure needed to find values and their
//! positions: rules, blocks, declarations and component values. Every node
//! carries the byte span it was parsed from.

use crate::lexer::TokenKind;
use smol_str::SmolStr;
use source_map::Span;

/// A complete stylesheet.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stylesheet {
    /// Top-level rules.
    pub rules: Vec<Rule>,
    /// All comments in the stylesheet, in source order.
    pub comments: Vec<Comment>,
    /// The span of the entire stylesheet.
    pub span: Span,
}

impl Stylesheet {
    /// Returns the `sourceMappingURL` reference of the last comment that
    /// carries one.
    pub fn source_mapping_url<'a>(&self, source: &'a str) -> Option<&'a str> {
        self.comments
            .iter()
            .rev()
            .find_map(|comment| source_map::source_mapping_url(comment.span.text(source)))
    }
}

/// A comment, including its delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comment {
    /// The span of the comment.
    pub span: Span,
}

/// A rule at the top level or nested inside a block.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rule {
    /// An at-rule (`@media ... { }`, `@import ...;`).
    At(AtRule),
    /// A qualified rule (`selector { }`).
    Qualified(QualifiedRule),
}

impl Rule {
    /// Returns the span of this rule.
    pub fn span(&self) -> Span {
        match self {
            Rule::At(rule) => rule.span,
            Rule::Qualified(rule) => rule.span,
        }
    }
}

/// An at-rule.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtRule {
    /// The name without the `@`.
    pub name: SmolStr,
    /// The prelude between the name and the block or `;`.
    pub prelude: Vec<ComponentValue>,
    /// The block, if the rule has one.
    pub block: Option<Block>,
    /// The span of the entire rule.
    pub span: Span,
}

/// A qualified rule.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualifiedRule {
    /// The prelude, usually a selector list.
    pub prelude: Vec<ComponentValue>,
    /// The block.
    pub block: Block,
    /// The span of the entire rule.
    pub span: Span,
}

/// A `{ ... }` block of declarations and nested rules.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    /// Declarations and nested rules in source order.
    pub items: Vec<BlockItem>,
    /// The span including the braces.
    pub span: Span,
}

/// An entry of a block.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockItem {
    /// A `name: value` declaration.
    Declaration(Declaration),
    /// A nested rule.
    Rule(Rule),
}

/// A declaration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Declaration {
    /// The property name.
    pub name: SmolStr,
    /// The value, without a trailing `!important`.
    pub value: Vec<ComponentValue>,
    /// Whether the declaration ends in `!important`.
    pub important: bool,
    /// The span from the name to the end of the value.
    pub span: Span,
}

/// A piece of a prelude or a declaration value.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentValue {
    /// A `url(...)` reference, quoted or not.
    Url(UrlValue),
    /// A function call such as `image-set(...)`.
    Function(Function),
    /// A `( )`, `[ ]` or `{ }` block.
    SimpleBlock(SimpleBlock),
    /// Any other token.
    Preserved {
        /// The token kind.
        kind: TokenKind,
        /// The token span.
        span: Span,
    },
}

impl ComponentValue {
    /// Returns the span of this value.
    pub fn span(&self) -> Span {
        match self {
            ComponentValue::Url(url) => url.span,
            ComponentValue::Function(function) => function.span,
            ComponentValue::SimpleBlock(block) => block.span,
            ComponentValue::Preserved { span, .. } => *span,
        }
    }
}

/// A function and its arguments.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    /// The function name without the `(`.
    pub name: SmolStr,
    /// The arguments.
    pub arguments: Vec<ComponentValue>,
    /// The span from the name to the closing `)`.
    pub span: Span,
}

/// A bracketed block inside a value.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleBlock {
    /// The opening bracket.
    pub open: char,
    /// The contents.
    pub values: Vec<ComponentValue>,
    /// The span including the brackets.
    pub span: Span,
}

/// The quote style of a `url(...)` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quote {
    /// `url("...")`
    Double,
    /// `url('...')`
    Single,
    /// `url(...)`
    None,
}

impl Quote {
    /// Returns the quote character as written, empty for unquoted values.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quote::Double => "\"",
            Quote::Single => "'",
            Quote::None => "",
        }
    }
}

/// A `url(...)` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UrlValue {
    /// The span from `url(` to the closing `)`.
    pub span: Span,
    /// The span of the value including its quotes, without surrounding
    /// whitespace.
    pub value_span: Span,
    /// The quote style.
    pub quote: Quote,
    /// The value as written, without quotes.
    pub value: String,
}
