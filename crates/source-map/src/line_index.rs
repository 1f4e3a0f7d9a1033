//! Line index for offset ↔ line/column conversion.
//!
//! Source maps address text by line and column, where columns are counted in
//! UTF-16 code units. The index answers both byte-column and UTF-16-column
//! queries; the UTF-16 variants need the indexed text to walk the line.

use crate::ByteOffset;
use text_size::TextSize;

/// A line and column position (0-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed column.
    pub col: u32,
}

impl LineCol {
    /// Creates a new line/column position.
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// An index of line starts, enabling O(log n) offset → line lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `line_starts[i]` is the offset where line `i` begins.
    line_starts: Vec<ByteOffset>,
    len: ByteOffset,
}

impl LineIndex {
    /// Creates a new line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];

        for (offset, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }

        Self {
            line_starts,
            len: TextSize::from(text.len() as u32),
        }
    }

    /// Returns the number of lines in the source.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to a line and byte column.
    ///
    /// Returns `None` if the offset is past the end of the text.
    pub fn line_col(&self, offset: ByteOffset) -> Option<LineCol> {
        if offset > self.len {
            return None;
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let line_start = self.line_starts[line];
        Some(LineCol {
            line: line as u32,
            col: u32::from(offset) - u32::from(line_start),
        })
    }

    /// Converts a line and byte column to a byte offset.
    ///
    /// Returns `None` if the line is out of bounds.
    pub fn offset(&self, line_col: LineCol) -> Option<ByteOffset> {
        let line_start = self.line_start(line_col.line)?;
        Some(line_start + TextSize::from(line_col.col))
    }

    /// Converts a byte offset to a line and UTF-16 column.
    ///
    /// Returns `None` if the offset is out of bounds or splits a character.
    pub fn line_col_utf16(&self, text: &str, offset: ByteOffset) -> Option<LineCol> {
        let byte_pos = self.line_col(offset)?;
        let start = u32::from(self.line_starts[byte_pos.line as usize]) as usize;
        let prefix = text.get(start..u32::from(offset) as usize)?;

        Some(LineCol {
            line: byte_pos.line,
            col: prefix.encode_utf16().count() as u32,
        })
    }

    /// Converts a line and UTF-16 column to a byte offset.
    ///
    /// Returns `None` if the line does not exist, if the column lies past the
    /// end of the line, or if it points into the middle of a surrogate pair.
    pub fn offset_utf16(&self, text: &str, line_col: LineCol) -> Option<ByteOffset> {
        let start = self.line_start(line_col.line)?;
        let end = self.line_end(line_col.line)?;
        let line_text = text.get(u32::from(start) as usize..u32::from(end) as usize)?;

        let mut units = 0u32;
        for (idx, c) in line_text.char_indices() {
            if units == line_col.col {
                return Some(start + TextSize::from(idx as u32));
            }
            units += c.len_utf16() as u32;
            if units > line_col.col {
                return None;
            }
        }

        (units == line_col.col).then_some(end)
    }

    /// Returns the UTF-16 length of a line, excluding its newline.
    pub fn line_len_utf16(&self, text: &str, line: u32) -> Option<u32> {
        let start = u32::from(self.line_start(line)?) as usize;
        let end = u32::from(self.line_end(line)?) as usize;
        Some(text.get(start..end)?.encode_utf16().count() as u32)
    }

    /// Returns the byte offset where a line starts.
    pub fn line_start(&self, line: u32) -> Option<ByteOffset> {
        self.line_starts.get(line as usize).copied()
    }

    /// Returns the byte offset where a line ends (before the newline).
    pub fn line_end(&self, line: u32) -> Option<ByteOffset> {
        let line = line as usize;
        if line >= self.line_starts.len() {
            return None;
        }

        let end = self
            .line_starts
            .get(line + 1)
            .map(|&next| next - TextSize::from(1))
            .unwrap_or(self.len);

        Some(end)
    }
}
