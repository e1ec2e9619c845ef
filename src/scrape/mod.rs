// src/scrape/mod.rs
use crate::extractors::record::{extract_candidate, CandidateOutcome};
use crate::extractors::patterns::SectionPatterns;
use crate::myneta::{CandidateLink, ConstituencyLink, MynetaClient};
use crate::utils::error::FetchError;
use crate::utils::html_debug;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// What a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Candidate(u32),
    Constituency(u32),
    State(u32),
    All,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Candidate(id) => write!(f, "candidate {}", id),
            Scope::Constituency(id) => write!(f, "constituency {}", id),
            Scope::State(id) => write!(f, "state {}", id),
            Scope::All => write!(f, "all constituencies"),
        }
    }
}

pub struct ScrapeOptions {
    /// Pause after each candidate page and after each constituency listing.
    pub delay: Duration,
    /// When set, every candidate page is dumped here for inspection.
    pub debug_dir: Option<PathBuf>,
}

/// Walks the listing hierarchy for a scope and extracts every candidate page.
pub struct Scraper<'a> {
    client: &'a MynetaClient,
    patterns: &'a SectionPatterns,
    options: ScrapeOptions,
}

impl<'a> Scraper<'a> {
    pub fn new(client: &'a MynetaClient, patterns: &'a SectionPatterns, options: ScrapeOptions) -> Self {
        Self { client, patterns, options }
    }

    pub async fn run(&self, scope: Scope) -> Vec<CandidateOutcome> {
        tracing::info!("[MODE] {}", scope);
        match scope {
            Scope::Candidate(id) => vec![self.scrape_candidate(id).await],
            Scope::Constituency(id) => {
                let candidates = listing_or_empty(self.client.constituency_candidates(id).await, "candidates");
                self.scrape_candidates(&candidates).await
            }
            Scope::State(id) => {
                let constituencies = listing_or_empty(self.client.state_constituencies(id).await, "constituencies");
                self.scrape_constituencies(&constituencies).await
            }
            Scope::All => {
                let constituencies = listing_or_empty(self.client.all_constituencies().await, "constituencies");
                self.scrape_constituencies(&constituencies).await
            }
        }
    }

    async fn scrape_constituencies(&self, constituencies: &[ConstituencyLink]) -> Vec<CandidateOutcome> {
        let mut outcomes = Vec::new();
        for (i, constituency) in constituencies.iter().enumerate() {
            tracing::info!(
                "Constituency [{}/{}]: {}",
                i + 1,
                constituencies.len(),
                constituency.constituency_name
            );
            let candidates = listing_or_empty(
                self.client.constituency_candidates(constituency.constituency_id).await,
                "candidates",
            );
            let mut scraped = self.scrape_candidates(&candidates).await;
            tag_constituency(&mut scraped, &constituency.constituency_name);
            outcomes.extend(scraped);
            tokio::time::sleep(self.options.delay).await;
        }
        outcomes
    }

    async fn scrape_candidates(&self, candidates: &[CandidateLink]) -> Vec<CandidateOutcome> {
        let mut outcomes = Vec::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            tracing::info!(
                "  [{}/{}] candidate_id={} ({})",
                i + 1,
                candidates.len(),
                candidate.candidate_id,
                candidate.name_from_list
            );
            outcomes.push(self.scrape_candidate(candidate.candidate_id).await);
            tokio::time::sleep(self.options.delay).await;
        }
        outcomes
    }

    async fn scrape_candidate(&self, candidate_id: u32) -> CandidateOutcome {
        let url = self.client.site().candidate_url(candidate_id);
        let page = self.client.fetch_page(&url).await.ok();

        if let (Some(debug_dir), Some(html)) = (&self.options.debug_dir, &page) {
            if let Err(e) = html_debug::dump_candidate_page(debug_dir, candidate_id, html, self.patterns) {
                tracing::warn!("Failed to save debug pages for {}: {}", candidate_id, e);
            }
        }

        let outcome = extract_candidate(candidate_id, &url, page.as_deref(), self.patterns);
        log_outcome(&outcome);
        outcome
    }
}

/// Records scraped from a constituency listing carry its name.
fn tag_constituency(outcomes: &mut [CandidateOutcome], constituency_name: &str) {
    for outcome in outcomes {
        outcome.set_constituency_name(constituency_name);
    }
}

/// A listing that failed to download counts as empty.
fn listing_or_empty<T>(fetched: Result<Vec<T>, FetchError>, what: &str) -> Vec<T> {
    fetched.unwrap_or_else(|e| {
        tracing::error!("Could not list {}: {}", what, e);
        Vec::new()
    })
}

fn or_placeholder<'s>(value: &'s str, placeholder: &'s str) -> &'s str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

fn log_outcome(outcome: &CandidateOutcome) {
    match outcome {
        CandidateOutcome::Extracted(record) => {
            let id = record.candidate_id.to_string();
            tracing::info!(
                "      ✓ Parsed: {}  | Criminal: {}  | Immovable: {}  | Liabilities: {}",
                or_placeholder(&record.name, &id),
                record.criminal_cases_count,
                or_placeholder(&record.immovable_assets_grand_total, "N/A"),
                or_placeholder(&record.liabilities_total, "Nil"),
            );
        }
        CandidateOutcome::Failed(failed) => {
            tracing::warn!("      ✗ candidate_id={} ({})", outcome.candidate_id(), failed.error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_labels() {
        assert_eq!(Scope::Candidate(6163).to_string(), "candidate 6163");
        assert_eq!(Scope::State(2).to_string(), "state 2");
        assert_eq!(Scope::All.to_string(), "all constituencies");
    }

    #[test]
    fn failed_listing_is_empty() {
        let failed: Result<Vec<u32>, FetchError> = Err(FetchError::Exhausted { url: "u".into(), attempts: 3 });
        assert!(listing_or_empty(failed, "candidates").is_empty());
        assert_eq!(listing_or_empty(Ok(vec![1, 2]), "candidates"), vec![1, 2]);
    }

    #[test]
    fn listing_name_is_carried_onto_every_outcome() {
        let patterns = SectionPatterns::default();
        let mut outcomes = vec![
            extract_candidate(1, "u1", Some("<h2>A</h2>"), &patterns),
            extract_candidate(2, "u2", None, &patterns),
        ];
        tag_constituency(&mut outcomes, "KADAPA");

        assert_eq!(outcomes[0].record().map(|r| r.constituency_name.as_str()), Some("KADAPA"));
        let failed = serde_json::to_value(&outcomes[1]).unwrap();
        assert_eq!(failed["constituency_name"], "KADAPA");
    }

    #[test]
    fn placeholder_only_for_empty_values() {
        assert_eq!(or_placeholder("", "N/A"), "N/A");
        assert_eq!(or_placeholder("Rs 5", "N/A"), "Rs 5");
    }
}
