// src/extractors/document.rs

// --- Imports ---
use crate::utils::text::{normalize, normalize_fragments};
use once_cell::sync::Lazy;
use scraper::{node::Node, ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));

static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("Failed to compile CELL_SELECTOR"));

/// Read-only view over one parsed candidate page.
///
/// Every traversal runs in source document order. Extractors only ever see
/// `ElementRef`s borrowed from this wrapper, so nothing outlives the page.
pub struct PageDocument {
    html: Html,
}

impl PageDocument {
    pub fn parse(raw_html: &str) -> Self {
        Self {
            html: Html::parse_document(raw_html),
        }
    }

    /// All elements of the page in document order.
    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }

    /// First element, in document order, accepted by `predicate`.
    pub fn find_first<'a, P>(&'a self, mut predicate: P) -> Option<ElementRef<'a>>
    where
        P: FnMut(ElementRef<'a>) -> bool,
    {
        self.elements().find(|el| predicate(*el))
    }

    /// Every element with the given tag name, in document order.
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.elements()
            .filter(move |el| el.value().name().eq_ignore_ascii_case(tag))
    }

    /// Sibling elements following `node`; text and comment siblings are skipped.
    pub fn next_siblings<'a>(&self, node: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
        node.next_siblings().filter_map(ElementRef::wrap)
    }

    /// Nearest `<table>` after the opening of `node` in document order.
    /// Tables nested inside `node` itself count, matching a forward scan of the markup.
    pub fn first_table_after<'a>(&'a self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.html
            .root_element()
            .descendants()
            .skip_while(|n| n.id() != node.id())
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "table")
    }

    /// Nearest non-blank text node that precedes `node` in document order.
    pub fn previous_text(&self, node: ElementRef<'_>) -> Option<String> {
        let mut last: Option<&str> = None;
        for current in self.html.root_element().descendants() {
            if current.id() == node.id() {
                break;
            }
            if let Node::Text(text) = current.value() {
                if !text.trim().is_empty() {
                    last = Some(&**text);
                }
            }
        }
        last.map(normalize)
    }

    /// Whole-page text, one space between text nodes.
    pub fn full_text(&self) -> String {
        normalize(
            &self
                .html
                .root_element()
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}

/// Normalized text content of an element.
pub fn text_of(element: ElementRef<'_>) -> String {
    normalize_fragments(element.text())
}

/// Normalized text of each non-blank text node under `element`, in order.
pub fn text_parts(element: ElementRef<'_>) -> Vec<String> {
    element
        .text()
        .map(normalize)
        .filter(|part| !part.is_empty())
        .collect()
}

/// `h1`..`h6` → 1..6, anything else → `None`.
pub fn heading_level(element: ElementRef<'_>) -> Option<u8> {
    let name = element.value().name();
    let mut chars = name.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('h'), Some(d @ '1'..='6'), None) => d.to_digit(10).map(|d| d as u8),
        _ => None,
    }
}

/// Sibling blocks that belong to `heading`: everything up to, not including,
/// the next heading of equal or higher rank.
pub fn section_blocks<'a>(
    document: &PageDocument,
    heading: ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> {
    let level = heading_level(heading).unwrap_or(6);
    document
        .next_siblings(heading)
        .take_while(move |sib| heading_level(*sib).map_or(true, |l| l > level))
}

/// Normalized cell texts of every row of `table`, empty cells kept in place.
pub fn table_rows(table: ElementRef<'_>) -> Vec<Vec<String>> {
    table
        .select(&ROW_SELECTOR)
        .map(|row| row.select(&CELL_SELECTOR).map(text_of).collect())
        .collect()
}
