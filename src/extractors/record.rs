// src/extractors/record.rs
use crate::extractors::assets::extract_immovable_assets;
use crate::extractors::criminal::{extract_criminal_cases, CaseListSource};
use crate::extractors::document::PageDocument;
use crate::extractors::fields::extract_identity;
use crate::extractors::liabilities::extract_liabilities;
use crate::extractors::patterns::SectionPatterns;
use serde::{Deserialize, Serialize};

/// Error tag stored on the marker record of a page that could not be fetched.
pub const FETCH_FAILED: &str = "fetch_failed";

/// One fully extracted candidate page. Every field is always present; the
/// `*_detail` fields hold JSON text (`[]`/`{}` when empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate_id: u32,
    pub source_url: String,
    // --- Basic info ---
    pub name: String,
    pub constituency: String,
    pub state: String,
    pub party: String,
    pub parentage: String,
    pub age: String,
    pub voter_enrolled_in: String,
    pub self_profession: String,
    pub spouse_profession: String,
    pub education: String,
    pub status: String,
    // --- Criminal ---
    pub criminal_cases_count: usize,
    pub convictions_count: u32,
    pub criminal_cases_detail: String,
    // --- Immovable assets ---
    pub immovable_assets_total_self: String,
    pub immovable_assets_total_spouse: String,
    pub immovable_assets_grand_total: String,
    pub immovable_assets_detail: String,
    // --- Liabilities ---
    pub liabilities_total: String,
    pub liabilities_detail: String,
    // --- Listing context ---
    /// Name shown on the constituency listing; filled in state and all-constituency runs.
    pub constituency_name: String,
}

impl Default for CandidateRecord {
    fn default() -> Self {
        Self {
            candidate_id: 0,
            source_url: String::new(),
            name: String::new(),
            constituency: String::new(),
            state: String::new(),
            party: String::new(),
            parentage: String::new(),
            age: String::new(),
            voter_enrolled_in: String::new(),
            self_profession: String::new(),
            spouse_profession: String::new(),
            education: String::new(),
            status: String::new(),
            criminal_cases_count: 0,
            convictions_count: 0,
            criminal_cases_detail: "[]".to_string(),
            immovable_assets_total_self: String::new(),
            immovable_assets_total_spouse: String::new(),
            immovable_assets_grand_total: String::new(),
            immovable_assets_detail: "[]".to_string(),
            liabilities_total: String::new(),
            liabilities_detail: "{}".to_string(),
            constituency_name: String::new(),
        }
    }
}

/// Stand-in for a page that could not be retrieved: identifier and error tag only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRecord {
    pub candidate_id: u32,
    pub error: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub constituency_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateOutcome {
    Extracted(CandidateRecord),
    Failed(FailedRecord),
}

impl CandidateOutcome {
    pub fn candidate_id(&self) -> u32 {
        match self {
            CandidateOutcome::Extracted(record) => record.candidate_id,
            CandidateOutcome::Failed(failed) => failed.candidate_id,
        }
    }

    pub fn record(&self) -> Option<&CandidateRecord> {
        match self {
            CandidateOutcome::Extracted(record) => Some(record),
            CandidateOutcome::Failed(_) => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CandidateOutcome::Failed(_))
    }

    /// Tags the outcome with the listing it was discovered from.
    pub fn set_constituency_name(&mut self, name: &str) {
        let slot = match self {
            CandidateOutcome::Extracted(record) => &mut record.constituency_name,
            CandidateOutcome::Failed(failed) => &mut failed.constituency_name,
        };
        *slot = name.to_string();
    }
}

/// Serializes a detail collection, falling back to `empty` so the field is
/// always valid JSON.
fn detail_json<T: Serialize>(value: &T, empty: &str, field: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        tracing::warn!("Could not serialize {}: {}; storing {}", field, e, empty);
        empty.to_string()
    })
}

/// Runs every extractor over one page and merges the results.
pub fn assemble(
    candidate_id: u32,
    source_url: &str,
    document: &PageDocument,
    patterns: &SectionPatterns,
) -> CandidateRecord {
    let identity = extract_identity(document, patterns);
    let criminal = extract_criminal_cases(document, patterns);
    let assets = extract_immovable_assets(document, patterns);
    let liabilities = extract_liabilities(document, patterns);

    if criminal.source == CaseListSource::HeadingAbsent {
        tracing::debug!("Candidate {}: no criminal cases heading found", candidate_id);
    }

    CandidateRecord {
        candidate_id,
        source_url: source_url.to_string(),
        name: identity.name,
        constituency: identity.constituency,
        state: identity.state,
        party: identity.party,
        parentage: identity.parentage,
        age: identity.age,
        voter_enrolled_in: identity.voter_enrolled_in,
        self_profession: identity.self_profession,
        spouse_profession: identity.spouse_profession,
        education: identity.education,
        status: identity.status,
        criminal_cases_count: criminal.cases.len(),
        convictions_count: criminal.convictions,
        criminal_cases_detail: detail_json(&criminal.cases, "[]", "criminal_cases_detail"),
        immovable_assets_total_self: assets.total_self,
        immovable_assets_total_spouse: assets.total_spouse,
        immovable_assets_grand_total: assets.grand_total,
        immovable_assets_detail: detail_json(&assets.rows, "[]", "immovable_assets_detail"),
        liabilities_total: liabilities.total,
        liabilities_detail: detail_json(&liabilities.entries, "{}", "liabilities_detail"),
        constituency_name: String::new(),
    }
}

/// Builds the outcome for one candidate. `page` is `None` when retrieval failed.
pub fn extract_candidate(
    candidate_id: u32,
    source_url: &str,
    page: Option<&str>,
    patterns: &SectionPatterns,
) -> CandidateOutcome {
    match page {
        Some(html) => {
            let document = PageDocument::parse(html);
            CandidateOutcome::Extracted(assemble(candidate_id, source_url, &document, patterns))
        }
        None => CandidateOutcome::Failed(FailedRecord {
            candidate_id,
            error: FETCH_FAILED.to_string(),
            constituency_name: String::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::criminal::CaseRecord;
    use crate::extractors::assets::ImmovableAssetRow;
    use std::collections::BTreeMap;

    const URL: &str = "https://www.myneta.info/LokSabha2024/candidate.php?candidate_id=6163";

    const FULL_PAGE: &str = r#"
        <html><body>
        <h2>ASHA DEVI</h2>
        <h5>KADAPA <span>(ANDHRA PRADESH)</span></h5>
        <div><b>Party:</b>ABC Party</div>
        <div><b>Age:</b> 52</div>
        <div>Assets: <b>Rs 50,00,000</b> Liabilities: <b>Rs 1,00,000</b></div>
        <div>
          <h3>Details of Criminal Cases</h3>
          <p>Cases: 2 pending, 0 conviction</p>
          <table>
            <tr><th>Serial No.</th><th>Details</th></tr>
            <tr><td>1</td><td>Case No. 12 of 2020</td></tr>
            <tr><td colspan="2">IPC Section 143, 147</td></tr>
            <tr><td>2</td><td>Case No. 13 of 2021</td></tr>
            <tr><td colspan="2">u/s 323</td></tr>
          </table>
          <h3>Details of Immovable Assets</h3>
          <table>
            <tr><th>Description</th><th>Self</th><th>Spouse</th><th>Total</th></tr>
            <tr><td>Agricultural Land</td><td>Rs 5,00,000</td><td>Nil</td><td>Rs 5,00,000</td></tr>
            <tr><td></td><td>Rs 5,00,000</td><td>Nil</td><td>Rs 5,00,000</td></tr>
          </table>
          <h3>Details of Liabilities</h3>
          <table>
            <tr><td>Bank Loan</td><td>Rs 1,00,000</td></tr>
            <tr><td>Grand Total</td><td>Rs 1,00,000</td></tr>
          </table>
        </div>
        </body></html>
    "#;

    #[test]
    fn assembles_full_record() {
        let outcome = extract_candidate(6163, URL, Some(FULL_PAGE), &SectionPatterns::default());
        let record = outcome.record().expect("extracted").clone();

        assert_eq!(record.candidate_id, 6163);
        assert_eq!(record.source_url, URL);
        assert_eq!(record.name, "ASHA DEVI");
        assert_eq!(record.state, "ANDHRA PRADESH");
        assert_eq!(record.party, "ABC Party");
        assert_eq!(record.age, "52");

        let cases: Vec<CaseRecord> = serde_json::from_str(&record.criminal_cases_detail).unwrap();
        assert_eq!(record.criminal_cases_count, cases.len());
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[1].ipc_sections, vec!["323"]);
        assert_eq!(record.convictions_count, 0);

        let rows: Vec<ImmovableAssetRow> = serde_json::from_str(&record.immovable_assets_detail).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(record.immovable_assets_grand_total, "Rs 5,00,000");
        assert_eq!(record.immovable_assets_total_self, "Rs 5,00,000");

        let entries: BTreeMap<String, String> = serde_json::from_str(&record.liabilities_detail).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(record.liabilities_total, "Rs 1,00,000");
    }

    #[test]
    fn page_without_sections_is_structurally_complete() {
        for html in ["", "<html><body><p>Under maintenance</p></body></html>", "<table><tr><td>"] {
            let outcome = extract_candidate(7, URL, Some(html), &SectionPatterns::default());
            let record = outcome.record().expect("extracted");
            assert_eq!(record.name, "");
            assert_eq!(record.education, "");
            assert_eq!(record.criminal_cases_count, 0);
            assert_eq!(record.convictions_count, 0);
            assert_eq!(record.criminal_cases_detail, "[]");
            assert_eq!(record.immovable_assets_detail, "[]");
            assert_eq!(record.liabilities_detail, "{}");
            assert_eq!(record.liabilities_total, "");
        }
    }

    #[test]
    fn details_always_parse_as_collections() {
        let pages = [
            FULL_PAGE,
            "<h3>Criminal Cases</h3><table><tr><td>FIR 1</td></tr><tr></tr></table>",
            "<h3>Immovable</h3><table><tr></tr><tr><td>x</td></tr></table><h4>Liabilities</h4>",
            "<<<>>> not html at all &amp;&&",
        ];
        for html in pages {
            let outcome = extract_candidate(1, URL, Some(html), &SectionPatterns::default());
            let record = outcome.record().expect("extracted");
            let cases: Vec<serde_json::Value> = serde_json::from_str(&record.criminal_cases_detail).unwrap();
            assert_eq!(cases.len(), record.criminal_cases_count);
            assert!(serde_json::from_str::<Vec<serde_json::Value>>(&record.immovable_assets_detail).is_ok());
            assert!(serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&record.liabilities_detail).is_ok());
        }
    }

    #[test]
    fn fetch_failure_yields_marker_only() {
        let outcome = extract_candidate(42, URL, None, &SectionPatterns::default());
        assert!(outcome.is_failure());
        assert_eq!(outcome.candidate_id(), 42);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"candidate_id": 42, "error": "fetch_failed"}));
    }

    #[test]
    fn record_serializes_every_field() {
        let json = serde_json::to_value(CandidateRecord::default()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 23);
        assert!(object.values().all(|v| !v.is_null()));
        assert_eq!(object["liabilities_detail"], "{}");
    }

    #[test]
    fn constituency_name_tags_both_outcome_kinds() {
        let patterns = SectionPatterns::default();
        let mut extracted = extract_candidate(1, URL, Some("<h2>X</h2>"), &patterns);
        let mut failed = extract_candidate(2, URL, None, &patterns);
        assert_eq!(extracted.record().map(|r| r.constituency_name.as_str()), Some(""));

        extracted.set_constituency_name("KADAPA");
        failed.set_constituency_name("KADAPA");

        assert_eq!(extracted.record().map(|r| r.constituency_name.as_str()), Some("KADAPA"));
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"candidate_id": 2, "error": "fetch_failed", "constituency_name": "KADAPA"})
        );
        let back: CandidateOutcome = serde_json::from_value(serde_json::to_value(&failed).unwrap()).unwrap();
        assert_eq!(back, failed);
    }
}
