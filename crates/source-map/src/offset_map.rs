//! Offset remapping across a splice-based rewrite.
//!
//! A rewrite walks its input left to right, copying some spans verbatim and
//! substituting others. [`OffsetMapBuilder`] records each step as a
//! [`Segment`]; the resulting [`OffsetMap`] translates positions between the
//! input and the output text.

use crate::{ByteOffset, Span};
use text_size::TextSize;

/// How a segment of output text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// The output is a byte-for-byte copy of the input.
    Copied,
    /// The output replaces the input span with different text.
    Replaced,
}

/// A single step of a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// The span in the input text.
    pub input: Span,
    /// The span in the output text.
    pub output: Span,
    /// Whether the span was copied or replaced.
    pub kind: SegmentKind,
}

/// Position translation between the input and output of a rewrite.
///
/// Segments are contiguous and ordered in both the input and the output.
#[derive(Debug, Clone, Default)]
pub struct OffsetMap {
    segments: Vec<Segment>,
    input_len: ByteOffset,
    output_len: ByteOffset,
}

impl OffsetMap {
    /// Returns the number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if nothing was recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the replaced segments in order.
    pub fn replacements(&self) -> impl Iterator<Item = &Segment> {
        self.segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Replaced)
    }

    /// Translates an input offset to the corresponding output offset.
    ///
    /// Offsets inside a replaced span land on the start of its replacement.
    /// The end of the input maps to the end of the output. Returns `None` for
    /// offsets past the end of the input.
    pub fn output_offset(&self, input: ByteOffset) -> Option<ByteOffset> {
        if input == self.input_len {
            return Some(self.output_len);
        }

        let segment = self.segment_at_input(input)?;
        match segment.kind {
            SegmentKind::Copied => Some(segment.output.start + (input - segment.input.start)),
            SegmentKind::Replaced => Some(segment.output.start),
        }
    }

    /// Finds the segment whose input span contains the given offset.
    pub fn segment_at_input(&self, input: ByteOffset) -> Option<&Segment> {
        let idx = match self.segments.binary_search_by(|s| s.input.start.cmp(&input)) {
            Ok(idx) => idx,
            Err(idx) => idx.checked_sub(1)?,
        };

        self.segments.get(idx).filter(|s| s.input.contains(input))
    }
}

/// Records the steps of a rewrite as it is performed.
#[derive(Debug, Default)]
pub struct OffsetMapBuilder {
    segments: Vec<Segment>,
    input_offset: ByteOffset,
    output_offset: ByteOffset,
}

impl OffsetMapBuilder {
    /// Creates a new offset map builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records text copied verbatim from the current input position.
    pub fn add_source(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let len = TextSize::from(text.len() as u32);
        self.push(len, len, SegmentKind::Copied);
    }

    /// Records that the input span starting at the current position was
    /// replaced by `replacement`.
    ///
    /// # Panics
    ///
    /// Panics if `input` does not start at the current input position.
    pub fn add_transformed(&mut self, input: Span, replacement: &str) {
        assert_eq!(
            input.start, self.input_offset,
            "replaced spans must be recorded in input order"
        );
        let output_len = TextSize::from(replacement.len() as u32);
        self.push(input.len(), output_len, SegmentKind::Replaced);
    }

    fn push(&mut self, input_len: TextSize, output_len: TextSize, kind: SegmentKind) {
        let input = Span::new(self.input_offset, self.input_offset + input_len);
        let output = Span::new(self.output_offset, self.output_offset + output_len);
        self.segments.push(Segment {
            input,
            output,
            kind,
        });
        self.input_offset = input.end;
        self.output_offset = output.end;
    }

    /// Builds the final offset map.
    pub fn build(self) -> OffsetMap {
        OffsetMap {
            segments: self.segments,
            input_len: self.input_offset,
            output_len: self.output_offset,
        }
    }
}
