// src/extractors/criminal.rs
use crate::extractors::document::{table_rows, text_of, PageDocument};
use crate::extractors::patterns::{Section, SectionPatterns};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// --- Regex Patterns (Lazy Static) ---
static CASE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(case\s*no|\bf\.?\s*i\.?\s*r\b|crime\s*no)").expect("Failed to compile CASE_HEADER_RE")
});

// Citation introducer followed by the run of section tokens it governs.
static SECTION_CITATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\bIPC\b\s*(?:Sections?|Sec\.?)?|\bu/s\b|\bSections?\b|\bSec\b\.?)\s*([\dA-Za-z/,\-\s]+)")
        .expect("Failed to compile SECTION_CITATION_RE")
});

static SECTION_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,\s/]+").expect("Failed to compile SECTION_SPLIT_RE"));

static NUMERIC_ROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s|]+$").expect("Failed to compile NUMERIC_ROW_RE"));

static CONVICTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s+conviction").expect("Failed to compile CONVICTION_RE"));

/// Rows this short carry no useful charge description.
const MIN_CHARGE_LEN: usize = 10;

/// One criminal case as listed on the disclosure page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// The case/FIR header row as shown.
    pub raw: String,
    /// Legal-code section tokens in discovery order.
    pub ipc_sections: Vec<String>,
    pub charges: Vec<String>,
}

/// How the case list was obtained. Only logged; every variant with no cases
/// serializes to the same `[]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseListSource {
    /// No criminal-cases heading on the page.
    HeadingAbsent,
    /// The page states there are no criminal cases.
    DeclaredNone,
    /// Heading present but no table follows it.
    TableAbsent,
    /// Cases read from the table after the heading.
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriminalSummary {
    pub cases: Vec<CaseRecord>,
    pub convictions: u32,
    pub source: CaseListSource,
}

impl CriminalSummary {
    fn empty(source: CaseListSource) -> Self {
        Self { cases: Vec::new(), convictions: 0, source }
    }
}

#[derive(Debug, Default)]
enum CaseState {
    #[default]
    NoOpenCase,
    OpenCase(CaseRecord),
}

/// Groups table rows into cases. A header row opens a case and closes the
/// previous one; `finish` closes the trailing case.
#[derive(Debug, Default)]
pub struct CaseScanner {
    state: CaseState,
    closed: Vec<CaseRecord>,
}

impl CaseScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_open_case(&self) -> bool {
        matches!(self.state, CaseState::OpenCase(_))
    }

    pub fn feed(&mut self, cells: &[String]) {
        if cells.iter().all(|c| c.is_empty()) {
            return;
        }
        let text = cells.join(" | ");

        if CASE_HEADER_RE.is_match(&text) {
            let opened = CaseRecord { raw: text, ..CaseRecord::default() };
            if let CaseState::OpenCase(previous) = std::mem::replace(&mut self.state, CaseState::OpenCase(opened)) {
                self.closed.push(previous);
            }
            return;
        }

        match &mut self.state {
            CaseState::NoOpenCase => {
                tracing::trace!("Ignoring row before first case header: '{}'", text);
            }
            CaseState::OpenCase(current) => {
                current.ipc_sections.extend(section_tokens(&text));
                if is_charge_line(&text) {
                    current.charges.push(text);
                }
            }
        }
    }

    pub fn finish(mut self) -> Vec<CaseRecord> {
        if !self.has_open_case() && self.closed.is_empty() {
            tracing::debug!("Criminal cases table has no case header row");
        }
        if let CaseState::OpenCase(last) = std::mem::take(&mut self.state) {
            self.closed.push(last);
        }
        self.closed
    }
}

/// Section tokens cited in `text`. Tokens without a digit (connectives such as
/// "and", "of", code names) are dropped.
pub fn section_tokens(text: &str) -> Vec<String> {
    SECTION_CITATION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .flat_map(|run| SECTION_SPLIT_RE.split(run.as_str()))
        .map(|t| t.trim_matches(|c: char| c == '-' || c == '.'))
        .filter(|t| t.chars().any(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

fn is_charge_line(text: &str) -> bool {
    text.chars().count() > MIN_CHARGE_LEN && !NUMERIC_ROW_RE.is_match(text)
}

/// First `<N> conviction` figure on the page, 0 when absent or unparseable.
pub fn conviction_count(page_text: &str) -> u32 {
    CONVICTION_RE
        .captures(page_text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

pub fn extract_criminal_cases(document: &PageDocument, patterns: &SectionPatterns) -> CriminalSummary {
    let Some(heading) = patterns.locate(document, Section::CriminalCases) else {
        return CriminalSummary::empty(CaseListSource::HeadingAbsent);
    };

    // Stops at the next heading tag of any level, sub-headings too.
    let section_text: String = document
        .next_siblings(heading)
        .take_while(|sib| !patterns.is_heading_tag(sib.value().name()))
        .map(text_of)
        .collect::<Vec<_>>()
        .join(" ");
    if patterns.declares_no_cases(&section_text) {
        tracing::debug!("Page declares no criminal cases");
        return CriminalSummary::empty(CaseListSource::DeclaredNone);
    }

    let convictions = conviction_count(&document.full_text());

    let Some(table) = document.first_table_after(heading) else {
        tracing::debug!("Criminal cases heading without a table");
        return CriminalSummary { convictions, ..CriminalSummary::empty(CaseListSource::TableAbsent) };
    };

    let mut scanner = CaseScanner::new();
    for row in table_rows(table) {
        scanner.feed(&row);
    }
    let cases = scanner.finish();
    tracing::debug!("Parsed {} criminal case(s), {} conviction(s)", cases.len(), convictions);

    CriminalSummary { cases, convictions, source: CaseListSource::Table }
}
