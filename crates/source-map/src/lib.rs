//! Source position tracking and source map plumbing for css-rebaser.
//!
//! This crate provides the position layer the rebasing engine is built on:
//! - [`Span`] and [`LineIndex`] for byte offsets and line/column positions
//! - [`OffsetMap`] for remapping positions across a splice-based rewrite
//! - [`SourceMapResolver`] for "original position of a generated position"
//!   lookups against a decoded source map, including maps embedded as data URLs

mod embedded;
mod line_index;
mod offset_map;
mod resolver;
mod span;

pub use embedded::{decode_data_url, source_mapping_url};
pub use line_index::{LineCol, LineIndex};
pub use offset_map::{OffsetMap, OffsetMapBuilder, Segment, SegmentKind};
pub use resolver::{OriginalLocation, SourceMapError, SourceMapResolver};
pub use span::{ByteOffset, Span};

/// Re-export of the source map codec so downstream crates agree on one version.
pub use sourcemap;
