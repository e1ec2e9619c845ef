// src/storage/mod.rs
use crate::extractors::record::CandidateOutcome;
use crate::utils::error::StorageError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// CSV column order: every record field, then the error tag of failed pages.
pub const CSV_COLUMNS: &[&str] = &[
    "candidate_id",
    "source_url",
    "name",
    "constituency",
    "state",
    "party",
    "parentage",
    "age",
    "voter_enrolled_in",
    "self_profession",
    "spouse_profession",
    "education",
    "status",
    "criminal_cases_count",
    "convictions_count",
    "criminal_cases_detail",
    "immovable_assets_total_self",
    "immovable_assets_total_spouse",
    "immovable_assets_grand_total",
    "immovable_assets_detail",
    "liabilities_total",
    "liabilities_detail",
    "constituency_name",
    "error",
];

/// Counts reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub scope: String,
    pub records: usize,
    pub failures: usize,
    pub candidates_with_criminal_cases: usize,
    pub total_criminal_cases: usize,
}

impl RunSummary {
    pub fn from_outcomes(scope: &str, outcomes: &[CandidateOutcome]) -> Self {
        let records = outcomes.iter().filter_map(CandidateOutcome::record);
        let (with_cases, total_cases) = records.fold((0, 0), |(with, total), r| {
            (
                with + usize::from(r.criminal_cases_count > 0),
                total + r.criminal_cases_count,
            )
        });
        Self {
            scope: scope.to_string(),
            records: outcomes.len(),
            failures: outcomes.iter().filter(|o| o.is_failure()).count(),
            candidates_with_criminal_cases: with_cases,
            total_criminal_cases: total_cases,
        }
    }

    pub fn log(&self) {
        tracing::info!("── SUMMARY ({}) ──", self.scope);
        tracing::info!("  Total candidates scraped       : {}", self.records);
        tracing::info!("  Pages that failed to download  : {}", self.failures);
        tracing::info!("  Candidates with criminal cases : {}", self.candidates_with_criminal_cases);
        tracing::info!("  Total criminal cases           : {}", self.total_criminal_cases);
    }
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes all outcomes as a pretty-printed JSON array.
    pub fn save_json(&self, outcomes: &[CandidateOutcome], filename: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(filename);
        let json = serde_json::to_string_pretty(outcomes)?;
        fs::write(&file_path, json)?;
        tracing::info!("Saved JSON → {} ({} records)", file_path.display(), outcomes.len());
        Ok(file_path)
    }

    /// Writes all outcomes as CSV in `CSV_COLUMNS` order; columns a row does
    /// not carry are left empty.
    pub fn save_csv(&self, outcomes: &[CandidateOutcome], filename: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(filename);
        let mut writer = csv::Writer::from_path(&file_path)?;
        writer.write_record(CSV_COLUMNS)?;
        for outcome in outcomes {
            writer.write_record(csv_row(outcome)?)?;
        }
        writer.flush()?;
        tracing::info!("Saved CSV  → {}", file_path.display());
        Ok(file_path)
    }

    /// Saves run counts and an extraction timestamp next to the data files.
    pub fn save_run_metadata(&self, summary: &RunSummary) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join("run_meta.json");
        let metadata = serde_json::json!({
            "summary": summary,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });
        fs::write(&file_path, serde_json::to_string_pretty(&metadata)?)?;
        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }

    /// JSON, CSV and metadata in one go. Nothing is written for an empty run.
    pub fn save_all(
        &self,
        outcomes: &[CandidateOutcome],
        summary: &RunSummary,
        json_name: &str,
        csv_name: &str,
    ) -> Result<(), StorageError> {
        if outcomes.is_empty() {
            tracing::warn!("No records to save.");
            return Ok(());
        }
        self.save_json(outcomes, json_name)?;
        self.save_csv(outcomes, csv_name)?;
        self.save_run_metadata(summary)?;
        Ok(())
    }
}

fn csv_row(outcome: &CandidateOutcome) -> Result<Vec<String>, StorageError> {
    let value = serde_json::to_value(outcome)?;
    Ok(CSV_COLUMNS
        .iter()
        .map(|column| match value.get(*column) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::record::{CandidateRecord, FailedRecord};

    fn sample() -> Vec<CandidateOutcome> {
        vec![
            CandidateOutcome::Extracted(CandidateRecord {
                candidate_id: 1,
                name: "Asha, Devi".into(),
                criminal_cases_count: 2,
                criminal_cases_detail: r#"[{"raw":"Case No 1","ipc_sections":[],"charges":[]},{"raw":"Case No 2","ipc_sections":[],"charges":[]}]"#.into(),
                ..CandidateRecord::default()
            }),
            CandidateOutcome::Failed(FailedRecord {
                candidate_id: 2,
                error: "fetch_failed".into(),
                constituency_name: "KADAPA".into(),
            }),
            CandidateOutcome::Extracted(CandidateRecord { candidate_id: 3, ..CandidateRecord::default() }),
        ]
    }

    #[test]
    fn summary_counts() {
        let summary = RunSummary::from_outcomes("constituency 22", &sample());
        assert_eq!(summary.records, 3);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.candidates_with_criminal_cases, 1);
        assert_eq!(summary.total_criminal_cases, 2);
    }

    #[test]
    fn writes_csv_with_fixed_columns() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("out")).unwrap();
        let path = storage.save_csv(&sample(), "candidates.csv").unwrap();

        let mut reader = csv::Reader::from_path(path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), CSV_COLUMNS.len());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][2], "Asha, Devi");
        assert_eq!(&rows[0][13], "2");
        assert_eq!(&rows[0][22], "");
        assert_eq!(&rows[0][23], "");
        assert_eq!(&rows[1][0], "2");
        assert_eq!(&rows[1][2], "");
        assert_eq!(&rows[1][22], "KADAPA");
        assert_eq!(&rows[1][23], "fetch_failed");
        assert_eq!(&rows[2][21], "{}");
        assert_eq!(&headers[22], "constituency_name");
    }

    #[test]
    fn json_round_trips_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let outcomes = sample();
        let path = storage.save_json(&outcomes, "candidates.json").unwrap();
        let loaded: Vec<CandidateOutcome> = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(loaded, outcomes);
    }

    #[test]
    fn empty_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let summary = RunSummary::from_outcomes("all", &[]);
        storage.save_all(&[], &summary, "a.json", "a.csv").unwrap();
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn metadata_has_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let path = storage.save_run_metadata(&RunSummary::from_outcomes("candidate 1", &sample())).unwrap();
        let meta: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(meta["summary"]["failures"], 1);
        assert!(meta["extraction_timestamp"].as_str().is_some());
    }
}
