//! Carrying a source map across a rewrite.
//!
//! The input map describes the stylesheet before rebasing. Projection moves
//! each of its mappings to where the same text sits in the rewritten
//! stylesheet, and pins the mapping in effect at both ends of every
//! substitution so the text after it keeps its provenance.

use source_map::{
    sourcemap::{SourceMap, SourceMapBuilder, Token},
    ByteOffset, LineCol, LineIndex, OffsetMap, SegmentKind, SourceMapResolver,
};

/// Lower ranks win when two mappings land on the same generated position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    /// An input mapping that kept its exact position.
    Exact,
    /// A mapping pinned at a substitution boundary.
    Boundary,
    /// An input mapping from inside a substituted span.
    Collapsed,
}

struct Mapping<'a> {
    dst: LineCol,
    rank: Rank,
    src_line: u32,
    src_col: u32,
    source: Option<&'a str>,
    name: Option<&'a str>,
    is_range: bool,
}

impl<'a> Mapping<'a> {
    fn new(dst: LineCol, rank: Rank, token: &Token<'a>) -> Self {
        Self {
            dst,
            rank,
            src_line: token.get_src_line(),
            src_col: token.get_src_col(),
            source: token.get_source(),
            name: token.get_name(),
            is_range: token.is_range(),
        }
    }
}

/// Builds the source map of `output`, the result of rewriting `input` as
/// described by `offsets`.
///
/// Mappings on lines `input` does not have are dropped. Sources, their
/// contents and names are carried over.
pub fn project(
    resolver: &SourceMapResolver,
    input: &str,
    output: &str,
    offsets: &OffsetMap,
) -> SourceMap {
    let map = resolver.map();
    let input_index = LineIndex::new(input);
    let output_index = LineIndex::new(output);
    let mut mappings = Vec::with_capacity(map.get_token_count() as usize);

    for token in map.tokens() {
        let generated = LineCol::new(token.get_dst_line(), token.get_dst_col());
        let Some((offset, overflow)) = input_offset(&input_index, input, generated) else {
            continue;
        };
        let rank = match offsets.segment_at_input(offset) {
            Some(segment) if segment.kind == SegmentKind::Replaced && segment.input.start != offset => {
                Rank::Collapsed
            }
            _ => Rank::Exact,
        };
        let Some(mut dst) = offsets
            .output_offset(offset)
            .and_then(|moved| output_index.line_col_utf16(output, moved))
        else {
            continue;
        };
        dst.col += overflow;
        mappings.push(Mapping::new(dst, rank, &token));
    }

    for segment in offsets.replacements() {
        let boundaries = [
            (segment.input.start, segment.output.start),
            (segment.input.end, segment.output.end),
        ];
        for (old, new) in boundaries {
            let active = input_index
                .line_col_utf16(input, old)
                .and_then(|pos| resolver.token_at(pos));
            let dst = output_index.line_col_utf16(output, new);
            if let (Some(token), Some(dst)) = (active, dst) {
                mappings.push(Mapping::new(dst, Rank::Boundary, &token));
            }
        }
    }

    mappings.sort_by_key(|m| (m.dst, m.rank));
    mappings.dedup_by_key(|m| m.dst);

    let mut builder = SourceMapBuilder::new(map.get_file());
    for idx in 0..map.get_source_count() {
        if let Some(source) = map.get_source(idx) {
            let id = builder.add_source(source);
            if let Some(contents) = map.get_source_contents(idx) {
                builder.set_source_contents(id, Some(contents));
            }
        }
    }
    for name in (0..).map_while(|idx| map.get_name(idx)) {
        builder.add_name(name);
    }
    for m in mappings {
        builder.add(
            m.dst.line, m.dst.col, m.src_line, m.src_col, m.source, m.name, m.is_range,
        );
    }

    builder.into_sourcemap()
}

/// Converts a generated position to a byte offset in `text`.
///
/// Columns past the end of a line resolve to the line end plus the number of
/// columns they overshoot by.
fn input_offset(index: &LineIndex, text: &str, pos: LineCol) -> Option<(ByteOffset, u32)> {
    if let Some(offset) = index.offset_utf16(text, pos) {
        return Some((offset, 0));
    }

    let len = index.line_len_utf16(text, pos.line)?;
    if pos.col > len {
        Some((index.line_end(pos.line)?, pos.col - len))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::{rewrite, RebaseDecision};
    use crate::locate::AssetOccurrence;
    use css_parser::Quote;
    use pretty_assertions::assert_eq;
    use source_map::Span;

    const CSS: &str = ".a{background:url(./img/x.png)}";

    fn input_map() -> SourceMapResolver {
        let mut builder = SourceMapBuilder::new(Some("a.css"));
        let src = builder.add_source("src/a.scss");
        builder.set_source_contents(src, Some(".a {\n  background: url(./img/x.png);\n}\n"));
        builder.add(0, 0, 0, 0, Some("src/a.scss"), None, false);
        builder.add(0, 3, 1, 2, Some("src/a.scss"), None, false);
        builder.add(0, 14, 1, 14, Some("src/a.scss"), None, false);
        builder.add(0, 30, 2, 0, Some("src/a.scss"), None, false);
        // A line the stylesheet does not have.
        builder.add(4, 0, 3, 0, Some("src/a.scss"), None, false);
        SourceMapResolver::new(builder.into_sourcemap())
    }

    fn rebased(rebased: &str) -> (String, SourceMap) {
        let start = CSS.find("./img").unwrap();
        let decision = RebaseDecision {
            occurrence: AssetOccurrence {
                raw: "./img/x.png".to_string(),
                quote: Quote::None,
                span: Span::from_usize(start, start + "./img/x.png".len()),
                position: LineCol::new(0, 14),
            },
            source: "src/a.scss".to_string(),
            resolved: rebased.to_string(),
            rebased: rebased.to_string(),
        };
        let rewrite = rewrite(CSS, &[decision]);
        let map = project(&input_map(), CSS, &rewrite.css, &rewrite.offsets);
        (rewrite.css, map)
    }

    fn summary(map: &SourceMap) -> Vec<(u32, u32, u32, u32)> {
        map.tokens()
            .map(|t| (t.get_dst_line(), t.get_dst_col(), t.get_src_line(), t.get_src_col()))
            .collect()
    }

    #[test]
    fn test_tokens_after_substitution_shift() {
        let (css, map) = rebased("src/img/x.png");
        assert_eq!(css, ".a{background:url(src/img/x.png)}");
        assert_eq!(
            summary(&map),
            vec![
                (0, 0, 0, 0),
                (0, 3, 1, 2),
                (0, 14, 1, 14),
                (0, 18, 1, 14),
                (0, 31, 1, 14),
                (0, 32, 2, 0),
            ]
        );
    }

    #[test]
    fn test_shrinking_substitution() {
        let (_, map) = rebased("x.png");
        let closing = map.lookup_token(0, 24).unwrap();
        assert_eq!(closing.get_dst_col(), 24);
        assert_eq!(closing.get_src(), (2, 0));
    }

    #[test]
    fn test_sources_and_contents_are_kept() {
        let (_, map) = rebased("src/img/x.png");
        assert_eq!(map.get_file(), Some("a.css"));
        assert_eq!(map.get_source(0), Some("src/a.scss"));
        assert_eq!(
            map.get_source_contents(0),
            Some(".a {\n  background: url(./img/x.png);\n}\n")
        );
    }

    #[test]
    fn test_projection_without_substitutions_keeps_mappings() {
        let resolver = input_map();
        let rewrite = rewrite(CSS, &[]);
        let map = project(&resolver, CSS, &rewrite.css, &rewrite.offsets);
        assert_eq!(
            summary(&map),
            vec![(0, 0, 0, 0), (0, 3, 1, 2), (0, 14, 1, 14), (0, 30, 2, 0)]
        );
    }
}
