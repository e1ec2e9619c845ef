// src/myneta/links.rs
use crate::extractors::document::text_of;
use crate::myneta::models::{CandidateLink, ConstituencyLink};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("Failed to compile ANCHOR_SELECTOR"));

static CONSTITUENCY_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"constituency_id=(\d+)").expect("Failed to compile CONSTITUENCY_ID_RE"));

static CANDIDATE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"candidate_id=(\d+)").expect("Failed to compile CANDIDATE_ID_RE"));

/// Marker in hrefs of constituency listing links.
const CONSTITUENCY_LINK_MARKER: &str = "show_candidates";
/// Marker in hrefs of candidate detail links.
const CANDIDATE_LINK_MARKER: &str = "candidate.php";

/// `(id, anchor text)` for every anchor whose href contains `marker` and
/// carries an id matched by `id_re`; de-duplicated by id, first seen wins.
fn scan_anchors(html: &str, marker: &str, id_re: &Regex) -> Vec<(u32, String)> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.contains(marker) {
            continue;
        }
        let Some(id) = id_re
            .captures(href)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        else {
            continue;
        };
        if seen.insert(id) {
            found.push((id, text_of(anchor)));
        }
    }
    found
}

/// Constituencies linked from the home page or a state page.
pub fn discover_constituencies(html: &str, state_id: Option<u32>) -> Vec<ConstituencyLink> {
    scan_anchors(html, CONSTITUENCY_LINK_MARKER, &CONSTITUENCY_ID_RE)
        .into_iter()
        .map(|(constituency_id, constituency_name)| ConstituencyLink {
            constituency_id,
            constituency_name,
            state_id,
        })
        .collect()
}

/// Candidates linked from a constituency page.
pub fn discover_candidates(html: &str, constituency_id: u32) -> Vec<CandidateLink> {
    scan_anchors(html, CANDIDATE_LINK_MARKER, &CANDIDATE_ID_RE)
        .into_iter()
        .map(|(candidate_id, name_from_list)| CandidateLink {
            candidate_id,
            name_from_list,
            constituency_id,
        })
        .collect()
}
