// src/extractors/assets.rs
use crate::extractors::document::{table_rows, PageDocument};
use crate::extractors::patterns::{Section, SectionPatterns};
use crate::extractors::rows::{classify, mentions_grand_total, RowContext, RowKind, IMMOVABLE_CLASSIFIERS};
use serde_json::{Map, Value};

/// One immovable-asset line keyed by the detected column header, in page
/// column order.
pub type ImmovableAssetRow = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImmovableAssets {
    pub rows: Vec<ImmovableAssetRow>,
    pub total_self: String,
    pub total_spouse: String,
    pub grand_total: String,
}

/// Maps cells onto `header`; columns past the header (or under a blank header
/// cell) get positional `col_<j>` keys.
pub fn row_mapping(cells: &[String], header: &[String]) -> ImmovableAssetRow {
    cells
        .iter()
        .enumerate()
        .map(|(j, cell)| {
            let key = match header.get(j) {
                Some(h) if !h.is_empty() => h.clone(),
                _ => format!("col_{}", j),
            };
            (key, Value::String(cell.clone()))
        })
        .collect()
}

pub fn extract_immovable_assets(document: &PageDocument, patterns: &SectionPatterns) -> ImmovableAssets {
    let mut assets = ImmovableAssets::default();

    let Some(heading) = patterns.locate(document, Section::ImmovableAssets) else {
        return assets;
    };
    let Some(table) = document.first_table_after(heading) else {
        tracing::debug!("Immovable assets heading without a table");
        return assets;
    };

    let mut header: Vec<String> = Vec::new();
    // Unlabelled figure rows only count until a real "Grand Total" row shows up.
    let mut saw_labelled_total = false;
    for (index, cells) in table_rows(table).into_iter().enumerate() {
        let ctx = RowContext { index, cells: &cells, header: &header };
        let Some(classifier) = classify(IMMOVABLE_CLASSIFIERS, &ctx) else {
            continue;
        };
        match classifier.kind {
            RowKind::Blank | RowKind::Subtotal => {}
            RowKind::Header => header = cells,
            RowKind::GrandTotal => {
                let labelled = mentions_grand_total(&ctx);
                if labelled && !saw_labelled_total {
                    clear_totals(&mut assets);
                }
                if labelled || !saw_labelled_total {
                    apply_totals(&mut assets, &ctx);
                } else {
                    tracing::trace!("Ignoring figure row {} after the grand total", index);
                }
                saw_labelled_total |= labelled;
            }
            RowKind::Data => assets.rows.push(row_mapping(&cells, &header)),
        }
    }

    tracing::debug!(
        "Parsed {} immovable asset row(s), grand total '{}'",
        assets.rows.len(),
        assets.grand_total
    );
    assets
}

fn clear_totals(assets: &mut ImmovableAssets) {
    assets.total_self.clear();
    assets.total_spouse.clear();
    assets.grand_total.clear();
}

fn apply_totals(assets: &mut ImmovableAssets, ctx: &RowContext<'_>) {
    for (key, value) in row_mapping(ctx.cells, ctx.header) {
        let Some(value) = value.as_str().filter(|v| !v.is_empty()) else {
            continue;
        };
        let key = key.to_lowercase();
        if key.contains("self") {
            assets.total_self = value.to_string();
        }
        if key.contains("spouse") {
            assets.total_spouse = value.to_string();
        }
    }
    if let Some(last) = ctx.last_value() {
        assets.grand_total = last.to_string();
    }
}
