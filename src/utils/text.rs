// src/utils/text.rs

/// Zero-width characters that survive HTML decoding and break label matching.
const INVISIBLE_CHARS: [char; 3] = ['\u{200B}', '\u{200C}', '\u{FEFF}'];

/// Collapses every whitespace run (including non-breaking spaces) to a single
/// space and trims both ends. Idempotent.
pub fn normalize(text: &str) -> String {
    text.split(|c: char| c.is_whitespace())
        .map(|word| word.trim_matches(|c: char| INVISIBLE_CHARS.contains(&c)))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapses a sequence of raw text fragments as if they were one string.
pub fn normalize_fragments<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    normalize(&fragments.into_iter().collect::<String>())
}
