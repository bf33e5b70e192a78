//! Name-fuzzy join between the content catalog and live inventory rows.
//!
//! The two upstreams share no stable identifier: content entries are keyed by
//! slug, inventory rows carry whatever product name the shop staff typed into
//! the sheet. The join therefore matches on display names — trimmed,
//! case-folded, substring containment in either direction — and tolerates
//! duplicate or missing rows. This is deliberately a best-effort string join,
//! not ranked retrieval; with a curated catalog of tens to low hundreds of
//! items the O(catalog × inventory) scan is cheap and ties are broken by
//! first-found row order.

use serde::Serialize;

use crate::catalog::ContentProduct;
use crate::inventory::{InventoryRecord, StockLevel};

/// The join result: one catalog entry overlaid with live stock data.
///
/// Ephemeral — constructed per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedProduct {
    #[serde(flatten)]
    pub product: ContentProduct,
    pub stock: StockLevel,
    pub price: f64,
    /// Derived availability: a row matched AND its stock is a positive count.
    pub is_in_stock: bool,
    /// Whether any inventory row matched. `false` doubles as the UI's
    /// placeholder signal, so stock/price of an unmatched product are never
    /// presented as authoritative.
    pub has_sheet_data: bool,
}

impl EnrichedProduct {
    /// Overlay a matched inventory row onto a catalog entry.
    #[must_use]
    pub fn from_match(product: ContentProduct, record: &InventoryRecord) -> Self {
        let is_in_stock = record.stock.is_positive();
        Self {
            product,
            stock: record.stock,
            price: record.price,
            is_in_stock,
            has_sheet_data: true,
        }
    }

    /// Catalog entry with no matching inventory row: placeholder stock/price.
    #[must_use]
    pub fn placeholder(product: ContentProduct) -> Self {
        Self {
            product,
            stock: StockLevel::Count(0),
            price: 0.0,
            is_in_stock: false,
            has_sheet_data: false,
        }
    }
}

/// Canonical form used for all name comparisons and for the stock endpoint's
/// map keys: leading/trailing whitespace trimmed, lowercased.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Join every catalog entry against the inventory rows.
///
/// Each entry consumes at most one row: the FIRST row, in the adapter's scan
/// order, whose normalized name equals, contains, or is contained in the
/// entry's normalized name. Unmatched entries come back as placeholders.
/// Output order follows catalog order; the same row may match several entries.
#[must_use]
pub fn merge(catalog: Vec<ContentProduct>, inventory: &[InventoryRecord]) -> Vec<EnrichedProduct> {
    let keyed = normalize_inventory(inventory);
    catalog
        .into_iter()
        .map(|product| enrich(product, &keyed))
        .collect()
}

/// Join a single catalog entry, for the product-detail route.
#[must_use]
pub fn merge_one(product: ContentProduct, inventory: &[InventoryRecord]) -> EnrichedProduct {
    enrich(product, &normalize_inventory(inventory))
}

/// Inventory names are normalized once per call, not once per comparison.
fn normalize_inventory(inventory: &[InventoryRecord]) -> Vec<(String, &InventoryRecord)> {
    inventory
        .iter()
        .map(|record| (normalize_name(&record.name), record))
        .collect()
}

fn enrich(product: ContentProduct, keyed: &[(String, &InventoryRecord)]) -> EnrichedProduct {
    let target = normalize_name(&product.name);
    if target.is_empty() {
        return EnrichedProduct::placeholder(product);
    }
    match keyed
        .iter()
        .find(|(row_name, _)| names_match(&target, row_name))
    {
        Some((_, record)) => EnrichedProduct::from_match(product, record),
        None => EnrichedProduct::placeholder(product),
    }
}

/// Both arguments must already be normalized. An empty row name never
/// matches: the empty string is a substring of everything, and rows like that
/// are filtered at the adapter boundary anyway.
fn names_match(catalog_name: &str, row_name: &str) -> bool {
    if row_name.is_empty() {
        return false;
    }
    catalog_name == row_name
        || catalog_name.contains(row_name)
        || row_name.contains(catalog_name)
}
