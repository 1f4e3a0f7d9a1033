//! Finding `url(...)` references in a parsed stylesheet.

use css_parser::{Block, BlockItem, ComponentValue, Quote, Rule, Stylesheet, UrlValue};
use source_map::{LineCol, LineIndex, Span};

/// One `url(...)` reference in the compiled stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOccurrence {
    /// The value as written, without quotes.
    pub raw: String,
    /// The quote style, restored verbatim on rewrite.
    pub quote: Quote,
    /// The span of the value including its quotes; the unit of rewriting.
    pub span: Span,
    /// The generated position of the `url(` token, in UTF-16 columns.
    pub position: LineCol,
}

/// Collects every `url(...)` reference of a stylesheet in document order.
///
/// References are found in declaration values, nested functions, bracketed
/// blocks, at-rule preludes and nested rules.
pub fn locate(stylesheet: &Stylesheet, index: &LineIndex, source: &str) -> Vec<AssetOccurrence> {
    let mut urls = Vec::new();
    for rule in &stylesheet.rules {
        collect_rule(rule, &mut urls);
    }

    let mut occurrences: Vec<AssetOccurrence> = urls
        .into_iter()
        .filter_map(|url| {
            let position = index.line_col_utf16(source, url.span.start)?;
            Some(AssetOccurrence {
                raw: url.value.clone(),
                quote: url.quote,
                span: url.value_span,
                position,
            })
        })
        .collect();
    occurrences.sort_by_key(|occurrence| occurrence.span.start);
    occurrences
}

fn collect_rule<'a>(rule: &'a Rule, out: &mut Vec<&'a UrlValue>) {
    match rule {
        Rule::At(at) => {
            collect_values(&at.prelude, out);
            if let Some(block) = &at.block {
                collect_block(block, out);
            }
        }
        Rule::Qualified(qualified) => {
            collect_values(&qualified.prelude, out);
            collect_block(&qualified.block, out);
        }
    }
}

fn collect_block<'a>(block: &'a Block, out: &mut Vec<&'a UrlValue>) {
    for item in &block.items {
        match item {
            BlockItem::Declaration(declaration) => collect_values(&declaration.value, out),
            BlockItem::Rule(rule) => collect_rule(rule, out),
        }
    }
}

fn collect_values<'a>(values: &'a [ComponentValue], out: &mut Vec<&'a UrlValue>) {
    for value in values {
        match value {
            ComponentValue::Url(url) => out.push(url),
            ComponentValue::Function(function) => collect_values(&function.arguments, out),
            ComponentValue::SimpleBlock(block) => collect_values(&block.values, out),
            ComponentValue::Preserved { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn occurrences(source: &str) -> Vec<AssetOccurrence> {
        let stylesheet = css_parser::parse(source).into_result().unwrap();
        locate(&stylesheet, &LineIndex::new(source), source)
    }

    #[test]
    fn test_locate_in_declarations() {
        let source = ".a{background:url(./img/x.png)}";
        let found = occurrences(source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw, "./img/x.png");
        assert_eq!(found[0].quote, Quote::None);
        assert_eq!(found[0].span.text(source), "./img/x.png");
        assert_eq!(found[0].position, LineCol::new(0, 14));
    }

    #[test]
    fn test_locate_quotes_and_fallbacks() {
        let source = "@font-face{src:url(\"a.woff2\") format(\"woff2\"),url('a.woff')}";
        let found = occurrences(source);
        let summary: Vec<_> = found
            .iter()
            .map(|o| (o.raw.as_str(), o.quote, o.span.text(source)))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("a.woff2", Quote::Double, "\"a.woff2\""),
                ("a.woff", Quote::Single, "'a.woff'"),
            ]
        );
    }

    #[test]
    fn test_locate_nested_and_multiline() {
        let source = "@import url(base.css);\n@media print {\n  .b { background: image-set(url(b.png) 1x, url(b2.png) 2x) }\n}\n";
        let found = occurrences(source);
        let positions: Vec<_> = found.iter().map(|o| (o.raw.as_str(), o.position)).collect();
        assert_eq!(
            positions,
            vec![
                ("base.css", LineCol::new(0, 8)),
                ("b.png", LineCol::new(2, 29)),
                ("b2.png", LineCol::new(2, 44)),
            ]
        );
    }

    #[test]
    fn test_positions_use_utf16_columns() {
        let source = ".é😀{a:url(x.png)}";
        let found = occurrences(source);
        // `.` + `é` + surrogate pair + `{a:` = 7 units.
        assert_eq!(found[0].position, LineCol::new(0, 7));
    }
}
