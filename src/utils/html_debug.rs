// src/utils/html_debug.rs
use crate::extractors::patterns::{Section, SectionPatterns};
use crate::utils::error::StorageError;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Highlight span: byte range in the page plus the section it belongs to.
type Highlight<'a> = (usize, usize, &'a str);

fn css_class(kind: &str) -> &'static str {
    match kind {
        "education" => "hl-education",
        "criminal_cases" => "hl-criminal",
        "immovable_assets" => "hl-immovable",
        "liabilities" => "hl-liabilities",
        _ => "hl-custom",
    }
}

/// Wraps each highlight in a titled `<span>`. Overlapping highlights after the
/// first are dropped.
pub fn annotate_html(html: &str, highlights: &[Highlight<'_>]) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    out.push_str(".hl-education { background-color: #ADD8E6; }\n");
    out.push_str(".hl-criminal { background-color: #FFC0CB; }\n");
    out.push_str(".hl-immovable { background-color: #90EE90; }\n");
    out.push_str(".hl-liabilities { background-color: #FFFF00; }\n");
    out.push_str(".hl-custom { background-color: #FFA500; }\n");
    out.push_str("</style>\n</head>\n<body>\n");

    let mut sorted = highlights.to_vec();
    sorted.sort_by_key(|h| h.0);

    let mut last_pos = 0;
    for (start, end, kind) in sorted {
        if start < last_pos || end > html.len() {
            continue;
        }
        out.push_str(&html[last_pos..start]);
        out.push_str(&format!(
            "<span class=\"{}\" title=\"Position: {}-{}, Section: {}\">",
            css_class(kind),
            start,
            end,
            kind
        ));
        out.push_str(&html[start..end]);
        out.push_str("</span>");
        last_pos = end;
    }
    out.push_str(&html[last_pos..]);
    out.push_str("\n</body>\n</html>");
    out
}

/// One case-insensitive regex per section, matching a heading tag whose
/// text contains any of the section's needles.
pub fn section_heading_regexes(patterns: &SectionPatterns) -> Vec<(Regex, &'static str)> {
    let tags = patterns
        .heading_tags
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    if tags.is_empty() {
        return Vec::new();
    }

    Section::ALL
        .iter()
        .filter_map(|&section| {
            let needles = patterns
                .needles(section)
                .iter()
                .filter(|n| !n.is_empty())
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>();
            if needles.is_empty() {
                return None;
            }
            let pattern = format!(
                r"(?is)<(?:{})\b[^>]*>[^<]*(?:{})[^<]*",
                tags,
                needles.join("|")
            );
            match Regex::new(&pattern) {
                Ok(re) => Some((re, section.name())),
                Err(e) => {
                    tracing::warn!("Skipping debug highlight for {}: {}", section.name(), e);
                    None
                }
            }
        })
        .collect()
}

/// Writes `raw_page.html` and `page_annotated.html` for one candidate into
/// `<debug_root>/<candidate_id>/`.
pub fn dump_candidate_page(
    debug_root: &Path,
    candidate_id: u32,
    html: &str,
    patterns: &SectionPatterns,
) -> Result<PathBuf, StorageError> {
    let dir = debug_root.join(candidate_id.to_string());
    fs::create_dir_all(&dir)?;

    fs::write(dir.join("raw_page.html"), html)?;

    let regexes = section_heading_regexes(patterns);
    let highlights: Vec<Highlight<'_>> = regexes
        .iter()
        .flat_map(|(re, kind)| re.find_iter(html).map(move |m| (m.start(), m.end(), *kind)))
        .collect();
    let annotated_path = dir.join("page_annotated.html");
    fs::write(&annotated_path, annotate_html(html, &highlights))?;

    tracing::info!(
        "Saved debug pages for candidate {} ({} highlight(s)) to {}",
        candidate_id,
        highlights.len(),
        dir.display()
    );
    Ok(annotated_path)
}
