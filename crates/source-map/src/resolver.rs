//! Generated → original position lookups against a decoded source map.

use crate::embedded;
use crate::LineCol;
use sourcemap::{DecodedMap, SourceMap};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading a source map.
#[derive(Debug, Error)]
pub enum SourceMapError {
    /// The map could not be decoded.
    #[error("invalid source map: {0}")]
    Decode(#[from] sourcemap::Error),

    /// An embedded map reference was not a usable data URL.
    #[error("invalid source map data URL: {0}")]
    InvalidDataUrl(String),
}

/// Where a generated position came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalLocation {
    /// The original source file, as listed in the map.
    pub source: String,
    /// 0-indexed line in the original source.
    pub line: u32,
    /// 0-indexed column in the original source.
    pub col: u32,
    /// The original name attached to the mapping, if any.
    pub name: Option<String>,
}

/// A validated source map answering "original position for generated position".
///
/// The map is decoded once at construction; lookups never fail, they only
/// report a position as unmapped. Cloning shares the decoded map.
#[derive(Debug, Clone)]
pub struct SourceMapResolver {
    map: Arc<SourceMap>,
}

impl SourceMapResolver {
    /// Wraps an already decoded source map.
    pub fn new(map: SourceMap) -> Self {
        Self { map: Arc::new(map) }
    }

    /// Decodes a source map from its JSON text.
    ///
    /// Index maps are flattened into a regular map.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SourceMapError> {
        let map = match sourcemap::decode_slice(bytes)? {
            DecodedMap::Regular(map) => map,
            DecodedMap::Index(index) => index.flatten()?,
            DecodedMap::Hermes(hermes) => (*hermes).clone(),
        };
        Ok(Self::new(map))
    }

    /// Decodes a source map embedded as a `data:` URL.
    pub fn from_data_url(url: &str) -> Result<Self, SourceMapError> {
        let json = embedded::decode_data_url(url)?;
        Self::from_slice(&json)
    }

    /// Returns the underlying source map.
    pub fn map(&self) -> &SourceMap {
        &self.map
    }

    /// Returns the mapping in effect at a generated position: the closest one
    /// at or before it on the same line.
    pub fn token_at(&self, generated: LineCol) -> Option<sourcemap::Token<'_>> {
        self.map
            .lookup_token(generated.line, generated.col)
            .filter(|token| token.get_dst_line() == generated.line)
    }

    /// Finds the original location of a generated position.
    ///
    /// Returns `None` when the line has no mapping at or before the column,
    /// or when that mapping carries no source.
    pub fn resolve(&self, generated: LineCol) -> Option<OriginalLocation> {
        let token = self.token_at(generated)?;
        let source = token.get_source()?;
        Some(OriginalLocation {
            source: source.to_string(),
            line: token.get_src_line(),
            col: token.get_src_col(),
            name: token.get_name().map(str::to_string),
        })
    }
}
