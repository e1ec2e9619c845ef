// src/extractors/patterns.rs
use crate::extractors::document::{text_of, PageDocument};
use crate::utils::error::ConfigError;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Content sections located by heading text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Education,
    CriminalCases,
    ImmovableAssets,
    Liabilities,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Education,
        Section::CriminalCases,
        Section::ImmovableAssets,
        Section::Liabilities,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::Education => "education",
            Section::CriminalCases => "criminal_cases",
            Section::ImmovableAssets => "immovable_assets",
            Section::Liabilities => "liabilities",
        }
    }
}

/// Heading predicates for every section, matched case-insensitively as
/// substrings of the heading text. Loaded from JSON so new heading wording is a
/// data change; keys left out of the file keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionPatterns {
    /// Tags that can carry a section heading.
    pub heading_tags: Vec<String>,
    pub education: Vec<String>,
    pub criminal_cases: Vec<String>,
    /// Statements under the criminal heading that declare a clean record.
    pub no_criminal_cases: Vec<String>,
    pub immovable_assets: Vec<String>,
    pub liabilities: Vec<String>,
}

impl Default for SectionPatterns {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        Self {
            heading_tags: owned(&["h3", "h4"]),
            education: owned(&["Educational"]),
            criminal_cases: owned(&["Criminal Cases"]),
            no_criminal_cases: owned(&["No criminal cases"]),
            immovable_assets: owned(&["Immovable"]),
            liabilities: owned(&["Liabilit"]),
        }
    }
}

impl SectionPatterns {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let patterns: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!("Loaded section patterns from {}", path.display());
        Ok(patterns)
    }

    pub fn needles(&self, section: Section) -> &[String] {
        match section {
            Section::Education => &self.education,
            Section::CriminalCases => &self.criminal_cases,
            Section::ImmovableAssets => &self.immovable_assets,
            Section::Liabilities => &self.liabilities,
        }
    }

    pub fn is_heading_tag(&self, tag: &str) -> bool {
        self.heading_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// First heading element whose text names `section`.
    pub fn locate<'a>(&self, document: &'a PageDocument, section: Section) -> Option<ElementRef<'a>> {
        let needles = self.needles(section);
        let found = document.find_first(|el| {
            self.is_heading_tag(el.value().name()) && contains_any(&text_of(el), needles)
        });
        match found {
            Some(heading) => tracing::trace!("Located {} heading: '{}'", section.name(), text_of(heading)),
            None => tracing::debug!("No {} heading on page", section.name()),
        }
        found
    }

    pub fn declares_no_cases(&self, text: &str) -> bool {
        contains_any(text, &self.no_criminal_cases)
    }
}

/// Case-insensitive substring test against any of `needles`.
pub fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .filter(|n| !n.is_empty())
        .any(|n| haystack.contains(&n.to_lowercase()))
}
