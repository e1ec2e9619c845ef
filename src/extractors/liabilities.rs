// src/extractors/liabilities.rs
use crate::extractors::document::{table_rows, text_of, PageDocument};
use crate::extractors::patterns::{Section, SectionPatterns};
use crate::extractors::rows::{classify, RowContext, RowKind, LIABILITY_CLASSIFIERS};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static FIGURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Rs\.?\s.*|Nil)$").expect("Failed to compile FIGURE_RE"));

/// Text preceding a summary figure that marks it as the liabilities total.
const SUMMARY_MARKER: &str = "Liabilities";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Liabilities {
    pub total: String,
    /// Liability category → amount in page order; the last row for a category
    /// sets its amount.
    pub entries: Map<String, Value>,
}

pub fn extract_liabilities(document: &PageDocument, patterns: &SectionPatterns) -> Liabilities {
    let mut liabilities = Liabilities::default();

    if let Some(table) = patterns
        .locate(document, Section::Liabilities)
        .and_then(|heading| document.first_table_after(heading))
    {
        read_table(&mut liabilities, &table_rows(table));
    }

    if liabilities.total.is_empty() {
        if let Some(figure) = summary_figure(document) {
            tracing::debug!("Liabilities total taken from page summary: '{}'", figure);
            liabilities.total = figure;
        }
    }

    liabilities
}

fn read_table(liabilities: &mut Liabilities, rows: &[Vec<String>]) {
    for (index, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row.iter().filter(|c| !c.is_empty()).cloned().collect();
        let ctx = RowContext { index, cells: &cells, header: &[] };
        let Some(classifier) = classify(LIABILITY_CLASSIFIERS, &ctx) else {
            continue;
        };
        match classifier.kind {
            RowKind::GrandTotal => {
                if let Some(total) = ctx.last_value() {
                    liabilities.total = total.to_string();
                }
            }
            RowKind::Data => {
                if let (Some(key), Some(value)) = (cells.first(), cells.last()) {
                    liabilities.entries.insert(key.clone(), Value::String(value.clone()));
                }
            }
            RowKind::Blank | RowKind::Header | RowKind::Subtotal => {}
        }
    }
}

/// A bold `Rs …`/`Nil` figure whose preceding text mentions liabilities.
fn summary_figure(document: &PageDocument) -> Option<String> {
    document
        .find_all("b")
        .filter(|bold| FIGURE_RE.is_match(&text_of(*bold)))
        .find(|bold| {
            document
                .previous_text(*bold)
                .is_some_and(|prev| prev.contains(SUMMARY_MARKER))
        })
        .map(text_of)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &[(&str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(k, v)| format!("<tr><td>{}</td><td></td><td>{}</td></tr>", k, v))
            .collect();
        format!("<h3>Details of Liabilities</h3><table>{}</table>", body)
    }

    #[test]
    fn table_entries_and_total() {
        let html = page(&[("Bank Loan", "Rs 1,00,000"), ("Grand Total", "Rs 1,00,000")]);
        let liabilities = extract_liabilities(&PageDocument::parse(&html), &SectionPatterns::default());

        assert_eq!(liabilities.entries.len(), 1);
        assert_eq!(liabilities.entries["Bank Loan"], "Rs 1,00,000");
        assert_eq!(liabilities.total, "Rs 1,00,000");
    }

    #[test]
    fn last_occurrence_wins() {
        let html = page(&[("Bank Loan", "Rs 1"), ("Bank Loan", "Rs 2"), ("Total Liabilities", "Rs 2")]);
        let liabilities = extract_liabilities(&PageDocument::parse(&html), &SectionPatterns::default());
        assert_eq!(liabilities.entries["Bank Loan"], "Rs 2");
        assert_eq!(liabilities.total, "Rs 2");
    }

    #[test]
    fn summary_fallback_when_table_missing() {
        let html = r#"
            <div>Assets: <b>Rs 12,00,000</b></div>
            <div>Liabilities: <b>Nil</b></div>
        "#;
        let liabilities = extract_liabilities(&PageDocument::parse(html), &SectionPatterns::default());
        assert_eq!(liabilities.total, "Nil");
        assert!(liabilities.entries.is_empty());
    }

    #[test]
    fn table_total_beats_summary() {
        let html = format!(
            "<div>Liabilities: <b>Rs 9</b></div>{}",
            page(&[("Grand Total", "Rs 5")])
        );
        let liabilities = extract_liabilities(&PageDocument::parse(&html), &SectionPatterns::default());
        assert_eq!(liabilities.total, "Rs 5");
    }

    #[test]
    fn nothing_found_is_empty() {
        let liabilities = extract_liabilities(&PageDocument::parse("<p>Liabilities</p>"), &SectionPatterns::default());
        assert_eq!(liabilities, Liabilities::default());
    }

    #[test]
    fn entries_keep_page_order() {
        let html = page(&[("Vehicle Loan", "Rs 3"), ("Bank Loan", "Rs 1"), ("Agricultural Loan", "Rs 2")]);
        let liabilities = extract_liabilities(&PageDocument::parse(&html), &SectionPatterns::default());
        assert_eq!(
            serde_json::to_string(&liabilities.entries).unwrap(),
            r#"{"Vehicle Loan":"Rs 3","Bank Loan":"Rs 1","Agricultural Loan":"Rs 2"}"#
        );
    }
}
