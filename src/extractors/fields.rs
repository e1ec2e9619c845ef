// src/extractors/fields.rs
use crate::extractors::document::{section_blocks, text_of, text_parts, PageDocument};
use crate::extractors::patterns::{Section, SectionPatterns};
use crate::utils::text::normalize;

/// Joins the blocks of a multi-paragraph field such as education.
const BLOCK_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Party,
    Parentage,
    Age,
    VoterEnrolledIn,
    SelfProfession,
    SpouseProfession,
    Status,
}

/// Bold label spellings → field. Adding a spelling is a one-line change.
pub const LABEL_TABLE: &[(&str, IdentityField)] = &[
    ("Party", IdentityField::Party),
    ("S/o", IdentityField::Parentage),
    ("D/o", IdentityField::Parentage),
    ("W/o", IdentityField::Parentage),
    ("S/o|D/o|W/o", IdentityField::Parentage),
    ("Age", IdentityField::Age),
    ("Name Enrolled as Voter in", IdentityField::VoterEnrolledIn),
    ("Self Profession", IdentityField::SelfProfession),
    ("Spouse Profession", IdentityField::SpouseProfession),
    ("Status", IdentityField::Status),
];

pub fn field_for_label(label: &str) -> Option<IdentityField> {
    LABEL_TABLE
        .iter()
        .find(|(spelling, _)| *spelling == label)
        .map(|(_, field)| *field)
}

/// Scalar identity fields of a candidate page. Missing values stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
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
}

impl Identity {
    fn set(&mut self, field: IdentityField, value: String) {
        let slot = match field {
            IdentityField::Party => &mut self.party,
            IdentityField::Parentage => &mut self.parentage,
            IdentityField::Age => &mut self.age,
            IdentityField::VoterEnrolledIn => &mut self.voter_enrolled_in,
            IdentityField::SelfProfession => &mut self.self_profession,
            IdentityField::SpouseProfession => &mut self.spouse_profession,
            IdentityField::Status => &mut self.status,
        };
        *slot = value;
    }
}

pub fn extract_identity(document: &PageDocument, patterns: &SectionPatterns) -> Identity {
    let mut identity = Identity::default();

    if let Some(h2) = document.find_all("h2").next() {
        identity.name = text_of(h2);
    }

    if let Some(h5) = document.find_all("h5").next() {
        let (constituency, state) = split_constituency(&text_parts(h5));
        identity.constituency = constituency;
        identity.state = state;
    }

    for bold in document.find_all("b") {
        let raw_label = text_of(bold);
        let label = raw_label.trim_end_matches(':').trim_end();
        let Some(field) = field_for_label(label) else {
            continue;
        };
        let Some(block) = bold.parent().and_then(scraper::ElementRef::wrap) else {
            continue;
        };
        let value = normalize(&text_of(block).replacen(&raw_label, "", 1));
        tracing::trace!("Label '{}' -> {:?} = '{}'", label, field, value);
        identity.set(field, value);
    }

    identity.education = extract_education(document, patterns);
    identity
}

/// Constituency is the first text part of the sub-heading, state the second
/// with its parentheses removed.
fn split_constituency(parts: &[String]) -> (String, String) {
    let constituency = parts.first().cloned().unwrap_or_default();
    let state = parts
        .get(1)
        .map(|p| normalize(p.trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace())))
        .unwrap_or_default();
    (constituency, state)
}

fn extract_education(document: &PageDocument, patterns: &SectionPatterns) -> String {
    let Some(heading) = patterns.locate(document, Section::Education) else {
        return String::new();
    };
    section_blocks(document, heading)
        .map(text_of)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}
