// src/myneta/models.rs
use serde::{Deserialize, Serialize};

/// Election-cycle root scraped by default.
pub const DEFAULT_BASE_URL: &str = "https://www.myneta.info/LokSabha2024";

/// URL layout of one election cycle on the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    base_url: String,
}

impl Site {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Home page listing every constituency.
    pub fn root_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    pub fn state_url(&self, state_id: u32) -> String {
        format!(
            "{}/index.php?action=show_constituencies&state_id={}",
            self.base_url, state_id
        )
    }

    pub fn constituency_url(&self, constituency_id: u32) -> String {
        format!(
            "{}/index.php?action=show_candidates&constituency_id={}",
            self.base_url, constituency_id
        )
    }

    pub fn candidate_url(&self, candidate_id: u32) -> String {
        format!("{}/candidate.php?candidate_id={}", self.base_url, candidate_id)
    }
}

impl Default for Site {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Constituency found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstituencyLink {
    pub constituency_id: u32,
    pub constituency_name: String,
    /// Set when discovered from a state page.
    pub state_id: Option<u32>,
}

/// Candidate found on a constituency page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLink {
    pub candidate_id: u32,
    pub name_from_list: String,
    pub constituency_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_site_urls() {
        let site = Site::new("https://www.myneta.info/LokSabha2024/");
        assert_eq!(site.root_url(), "https://www.myneta.info/LokSabha2024/");
        assert_eq!(
            site.state_url(2),
            "https://www.myneta.info/LokSabha2024/index.php?action=show_constituencies&state_id=2"
        );
        assert_eq!(
            site.constituency_url(22),
            "https://www.myneta.info/LokSabha2024/index.php?action=show_candidates&constituency_id=22"
        );
        assert_eq!(
            site.candidate_url(6163),
            "https://www.myneta.info/LokSabha2024/candidate.php?candidate_id=6163"
        );
    }
}
