//! Rebase report formatting.

use crate::cli::ReportFormat;
use css_rebaser::RebaseRecord;

/// Formats the rebase report.
pub fn format_report(records: &[RebaseRecord], format: ReportFormat) -> String {
    match format {
        ReportFormat::Human => format_human(records),
        ReportFormat::Json => format_json(records),
    }
}

fn format_human(records: &[RebaseRecord]) -> String {
    let mut output = String::new();
    for record in records {
        output.push_str(&record.raw);
        output.push_str(" -> ");
        output.push_str(&record.rebased);
        output.push('\n');
    }
    output
}

fn format_json(records: &[RebaseRecord]) -> String {
    let mut output = serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string());
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn records() -> Vec<RebaseRecord> {
        vec![
            RebaseRecord {
                raw: "../img/a.png".to_string(),
                resolved: "src/img/a.png".to_string(),
                rebased: "src/img/a.png".to_string(),
            },
            RebaseRecord {
                raw: "font.woff2#iefix".to_string(),
                resolved: "src/fonts/font.woff2#iefix".to_string(),
                rebased: "/static/fonts/font.woff2#iefix".to_string(),
            },
        ]
    }

    #[test]
    fn test_human_report() {
        assert_eq!(
            format_report(&records(), ReportFormat::Human),
            "../img/a.png -> src/img/a.png\nfont.woff2#iefix -> /static/fonts/font.woff2#iefix\n"
        );
    }

    #[test]
    fn test_json_report() {
        let report = format_report(&records(), ReportFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value[0]["raw"], "../img/a.png");
        assert_eq!(value[1]["resolved"], "src/fonts/font.woff2#iefix");
        assert_eq!(value[1]["rebased"], "/static/fonts/font.woff2#iefix");
    }

    #[test]
    fn test_empty_reports() {
        assert_eq!(format_report(&[], ReportFormat::Human), "");
        assert_eq!(format_report(&[], ReportFormat::Json), "[]\n");
    }
}
