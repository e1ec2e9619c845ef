// src/extractors/rows.rs
//! Named, ordered row classifiers shared by the table extractors.
//!
//! A table extractor owns a slice of [`RowClassifier`]s; the first one whose
//! predicate accepts a row decides its [`RowKind`]. Keeping the policy as data
//! lets each heuristic be tested on its own.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(Sr|Description|self|spouse|huf|dependent|Total)")
        .expect("Failed to compile HEADER_LABEL_RE")
});

static GRAND_TOTAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Grand\s*Total").expect("Failed to compile GRAND_TOTAL_RE"));

static SUBTOTAL_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(Sr\s*No|Total|Grand)").expect("Failed to compile SUBTOTAL_LABEL_RE")
});

static LIABILITY_TOTAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(Grand\s*Total|Total\s+Liabilit)").expect("Failed to compile LIABILITY_TOTAL_RE")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Nothing usable; dropped.
    Blank,
    /// Becomes the active column header.
    Header,
    /// Carries the section totals; not emitted as data.
    GrandTotal,
    /// Serial-number or intermediate total line; not emitted.
    Subtotal,
    /// A regular data row.
    Data,
}

/// What a classifier gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    /// Position of the row in the table, blank rows included.
    pub index: usize,
    pub cells: &'a [String],
    /// Header active when the row is reached (may be empty).
    pub header: &'a [String],
}

impl<'a> RowContext<'a> {
    pub fn non_empty(&self) -> impl Iterator<Item = &'a str> {
        let cells: &'a [String] = self.cells;
        cells.iter().map(String::as_str).filter(|c| !c.is_empty())
    }

    pub fn joined(&self) -> String {
        self.cells.join(" | ")
    }

    /// The cell that names the row: the one under a "Description" header,
    /// otherwise the second cell (the first if there is only one).
    pub fn description(&self) -> &'a str {
        let cells: &'a [String] = self.cells;
        let by_header = self
            .header
            .iter()
            .position(|h| h.to_lowercase().contains("description"));
        match by_header {
            Some(j) => cells.get(j).map(String::as_str).unwrap_or(""),
            None => cells
                .get(1)
                .or_else(|| cells.first())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }

    /// Last non-empty cell, usually the row's overall figure.
    pub fn last_value(&self) -> Option<&'a str> {
        self.non_empty().last()
    }
}

pub struct RowClassifier {
    pub name: &'static str,
    pub kind: RowKind,
    pub accepts: fn(&RowContext<'_>) -> bool,
}

/// First classifier accepting `ctx`; `None` when nothing matches.
pub fn classify<'c>(classifiers: &'c [RowClassifier], ctx: &RowContext<'_>) -> Option<&'c RowClassifier> {
    let hit = classifiers.iter().find(|c| (c.accepts)(ctx));
    if let Some(c) = hit {
        tracing::trace!("Row {} classified as {} ({:?})", ctx.index, c.name, c.kind);
    }
    hit
}

// --- Predicates ---

pub fn is_blank(ctx: &RowContext<'_>) -> bool {
    ctx.non_empty().next().is_none()
}

pub fn is_first_row(ctx: &RowContext<'_>) -> bool {
    ctx.index == 0
}

pub fn all_header_labels(ctx: &RowContext<'_>) -> bool {
    let mut cells = ctx.non_empty().peekable();
    cells.peek().is_some() && cells.all(|c| HEADER_LABEL_RE.is_match(c))
}

pub fn mentions_grand_total(ctx: &RowContext<'_>) -> bool {
    ctx.cells.iter().any(|c| GRAND_TOTAL_RE.is_match(c))
}

pub fn unlabelled_figures(ctx: &RowContext<'_>) -> bool {
    ctx.description().is_empty() && ctx.non_empty().next().is_some()
}

pub fn subtotal_label(ctx: &RowContext<'_>) -> bool {
    SUBTOTAL_LABEL_RE.is_match(ctx.description())
}

pub fn liability_total(ctx: &RowContext<'_>) -> bool {
    LIABILITY_TOTAL_RE.is_match(&ctx.joined())
}

pub fn fewer_than_two_values(ctx: &RowContext<'_>) -> bool {
    ctx.non_empty().take(2).count() < 2
}

pub fn always(_: &RowContext<'_>) -> bool {
    true
}

/// Policy for the immovable-assets table.
pub static IMMOVABLE_CLASSIFIERS: &[RowClassifier] = &[
    RowClassifier { name: "blank", kind: RowKind::Blank, accepts: is_blank },
    RowClassifier { name: "first_row_header", kind: RowKind::Header, accepts: is_first_row },
    RowClassifier { name: "label_row_header", kind: RowKind::Header, accepts: all_header_labels },
    RowClassifier { name: "grand_total", kind: RowKind::GrandTotal, accepts: mentions_grand_total },
    RowClassifier { name: "unlabelled_total", kind: RowKind::GrandTotal, accepts: unlabelled_figures },
    RowClassifier { name: "subtotal", kind: RowKind::Subtotal, accepts: subtotal_label },
    RowClassifier { name: "data", kind: RowKind::Data, accepts: always },
];

/// Policy for the liabilities table; cells are pre-filtered to non-empty ones.
pub static LIABILITY_CLASSIFIERS: &[RowClassifier] = &[
    RowClassifier { name: "blank", kind: RowKind::Blank, accepts: is_blank },
    RowClassifier { name: "total", kind: RowKind::GrandTotal, accepts: liability_total },
    RowClassifier { name: "header", kind: RowKind::Header, accepts: all_header_labels },
    RowClassifier { name: "single_cell", kind: RowKind::Blank, accepts: fewer_than_two_values },
    RowClassifier { name: "entry", kind: RowKind::Data, accepts: always },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn kind_of(classifiers: &[RowClassifier], index: usize, row: &[&str], header: &[&str]) -> RowKind {
        let row = cells(row);
        let header = cells(header);
        let ctx = RowContext { index, cells: &row, header: &header };
        classify(classifiers, &ctx).map(|c| c.kind).expect("fallback classifier")
    }

    #[test]
    fn header_detection() {
        let header = ["Sr No", "Description", "Self", "Spouse", "HUF", "Dependent1", "Total"];
        assert_eq!(kind_of(IMMOVABLE_CLASSIFIERS, 3, &header, &[]), RowKind::Header);
        assert_eq!(kind_of(IMMOVABLE_CLASSIFIERS, 0, &["anything", "goes"], &[]), RowKind::Header);
        assert_eq!(kind_of(IMMOVABLE_CLASSIFIERS, 0, &["", ""], &[]), RowKind::Blank);
    }

    #[test]
    fn totals_and_data() {
        let header = ["Description", "Self", "Spouse", "Total"];
        assert_eq!(
            kind_of(IMMOVABLE_CLASSIFIERS, 2, &["Agricultural Land", "Rs 5,00,000", "Nil", "Rs 5,00,000"], &header),
            RowKind::Data
        );
        assert_eq!(
            kind_of(IMMOVABLE_CLASSIFIERS, 3, &["", "Rs 5,00,000", "Nil", "Rs 5,00,000"], &header),
            RowKind::GrandTotal
        );
        assert_eq!(
            kind_of(IMMOVABLE_CLASSIFIERS, 3, &["Grand Total", "Rs 5", "Nil", "Rs 5"], &header),
            RowKind::GrandTotal
        );
        assert_eq!(
            kind_of(IMMOVABLE_CLASSIFIERS, 4, &["Total Current Market Value", "Rs 5", "", "Rs 5"], &header),
            RowKind::Subtotal
        );
    }

    #[test]
    fn description_falls_back_to_second_cell() {
        let row = cells(&["i", "Flat in Pune", "Rs 1"]);
        let ctx = RowContext { index: 1, cells: &row, header: &[] };
        assert_eq!(ctx.description(), "Flat in Pune");
        assert_eq!(ctx.last_value(), Some("Rs 1"));
    }

    #[test]
    fn liability_policy() {
        assert_eq!(kind_of(LIABILITY_CLASSIFIERS, 1, &["Bank Loan", "Rs 1,00,000"], &[]), RowKind::Data);
        assert_eq!(kind_of(LIABILITY_CLASSIFIERS, 2, &["Grand Total", "Rs 1,00,000"], &[]), RowKind::GrandTotal);
        assert_eq!(kind_of(LIABILITY_CLASSIFIERS, 2, &["Total Liabilities", "Nil"], &[]), RowKind::GrandTotal);
        assert_eq!(kind_of(LIABILITY_CLASSIFIERS, 0, &["Description", "Self", "Total"], &[]), RowKind::Header);
        assert_eq!(kind_of(LIABILITY_CLASSIFIERS, 3, &["Loans from individuals"], &[]), RowKind::Blank);
    }
}
