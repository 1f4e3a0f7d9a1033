//! Splicing accepted decisions into the stylesheet text.

use crate::locate::AssetOccurrence;
use serde::Serialize;
use source_map::{OffsetMap, OffsetMapBuilder};

/// An accepted rebase of one occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseDecision {
    /// The occurrence being rewritten.
    pub occurrence: AssetOccurrence,
    /// The original source file the occurrence came from.
    pub source: String,
    /// The occurrence resolved against its source file.
    pub resolved: String,
    /// The text that replaces the occurrence's value.
    pub rebased: String,
}

/// Notification raised for every rewritten reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebaseRecord {
    /// The reference as written.
    pub raw: String,
    /// The reference resolved against its source file.
    pub resolved: String,
    /// The text written in its place.
    pub rebased: String,
}

/// The rewritten text and how it relates to the input.
#[derive(Debug, Clone)]
pub struct Rewrite {
    /// The rewritten stylesheet.
    pub css: String,
    /// Offset translation from the input to `css`.
    pub offsets: OffsetMap,
    /// One record per substitution, in text order.
    pub records: Vec<RebaseRecord>,
}

/// Applies decisions to `text`.
///
/// Decisions must be sorted by span start and must not overlap. Text outside
/// their spans is copied byte for byte; each span is replaced by the rebased
/// path wrapped in the occurrence's original quotes.
pub fn rewrite(text: &str, decisions: &[RebaseDecision]) -> Rewrite {
    let mut css = String::with_capacity(text.len());
    let mut offsets = OffsetMapBuilder::new();
    let mut records = Vec::with_capacity(decisions.len());
    let mut cursor = 0usize;

    for decision in decisions {
        let span = decision.occurrence.span.range();
        debug_assert!(span.start >= cursor, "rebase decisions overlap or are unordered");

        let copied = &text[cursor..span.start];
        css.push_str(copied);
        offsets.add_source(copied);

        let quote = decision.occurrence.quote.as_str();
        let replacement = format!("{quote}{}{quote}", decision.rebased);
        css.push_str(&replacement);
        offsets.add_transformed(decision.occurrence.span, &replacement);

        records.push(RebaseRecord {
            raw: decision.occurrence.raw.clone(),
            resolved: decision.resolved.clone(),
            rebased: decision.rebased.clone(),
        });
        cursor = span.end;
    }

    let rest = &text[cursor..];
    css.push_str(rest);
    offsets.add_source(rest);

    Rewrite {
        css,
        offsets: offsets.build(),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_parser::Quote;
    use pretty_assertions::assert_eq;
    use source_map::{LineCol, Span};
    use text_size::TextSize;

    fn decision(text: &str, value: &str, quote: Quote, rebased: &str) -> RebaseDecision {
        let start = text.find(value).unwrap();
        let raw = value.trim_matches(['"', '\'']).to_string();
        RebaseDecision {
            occurrence: AssetOccurrence {
                raw,
                quote,
                span: Span::from_usize(start, start + value.len()),
                position: LineCol::default(),
            },
            source: "src/a.scss".to_string(),
            resolved: rebased.to_string(),
            rebased: rebased.to_string(),
        }
    }

    #[test]
    fn test_rewrite_preserves_quotes_and_surroundings() {
        let text = ".a{b:url('x.png') url(\"y.png\") url(z.png)}";
        let decisions = vec![
            decision(text, "'x.png'", Quote::Single, "src/x.png"),
            decision(text, "\"y.png\"", Quote::Double, "src/y.png"),
            decision(text, "z.png", Quote::None, "src/z.png"),
        ];

        let rewrite = rewrite(text, &decisions);
        assert_eq!(
            rewrite.css,
            ".a{b:url('src/x.png') url(\"src/y.png\") url(src/z.png)}"
        );
        assert_eq!(rewrite.records.len(), 3);
        assert_eq!(rewrite.records[2].raw, "z.png");
        assert_eq!(rewrite.records[2].rebased, "src/z.png");
    }

    #[test]
    fn test_rewrite_without_decisions_is_identity() {
        let text = ".a{b:url(x.png)}\n/* é */";
        let rewrite = rewrite(text, &[]);
        assert_eq!(rewrite.css, text);
        assert!(rewrite.records.is_empty());
        assert_eq!(
            rewrite.offsets.output_offset(TextSize::from(5)),
            Some(TextSize::from(5))
        );
    }

    #[test]
    fn test_rewrite_offsets() {
        let text = ".a{b:url(x.png)}";
        let rewrite = rewrite(text, &[decision(text, "x.png", Quote::None, "../x.png")]);
        // `)` moves from 14 to 17.
        assert_eq!(
            rewrite.offsets.output_offset(TextSize::from(14)),
            Some(TextSize::from(17))
        );
    }
}
