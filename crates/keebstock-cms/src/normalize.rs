//! Conversion from raw entry JSON into [`ContentProduct`] values.
//!
//! Entries reference their image by asset ID; the asset sidecar is indexed
//! once per response and each entry's link is resolved against that index.
//! Entries without a usable slug or name are dropped with a warning rather
//! than failing the whole catalog fetch.

use std::collections::HashMap;

use keebstock_core::ContentProduct;

use crate::types::{Asset, Entry};

/// Builds an asset-ID to file-URL index from the `includes.Asset` sidecar.
///
/// Assets without an uploaded file are skipped. URLs are made absolute here so
/// the rest of the system never sees a protocol-relative URL.
pub(crate) fn index_assets(assets: &[Asset]) -> HashMap<String, String> {
    assets
        .iter()
        .filter_map(|asset| {
            let url = asset.fields.file.as_ref()?.url.as_deref()?;
            Some((asset.sys.id.clone(), absolute_image_url(url)))
        })
        .collect()
}

/// Prefixes protocol-relative URLs with `https:`; anything else passes through.
fn absolute_image_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_owned()
    }
}

/// Converts one raw entry into a [`ContentProduct`], resolving its image link
/// against `assets`.
///
/// Returns `None` when the entry has no non-blank `slug` or `name`. A catalog
/// row without both cannot be routed to or joined against inventory, so it is
/// dropped here instead of surfacing half-formed products downstream.
pub(crate) fn entry_to_product(
    entry: Entry,
    assets: &HashMap<String, String>,
) -> Option<ContentProduct> {
    let entry_id = entry.sys.id;
    let fields = entry.fields;

    let slug = match fields.slug {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            tracing::warn!(%entry_id, "skipping catalog entry without a slug");
            return None;
        }
    };
    let name = match fields.name {
        Some(n) if !n.trim().is_empty() => n,
        _ => {
            tracing::warn!(%entry_id, slug, "skipping catalog entry without a name");
            return None;
        }
    };

    let image_url = fields.image.and_then(|link| {
        let resolved = assets.get(&link.sys.id).cloned();
        if resolved.is_none() {
            tracing::debug!(%entry_id, asset_id = %link.sys.id, "image link points at an asset missing from includes");
        }
        resolved
    });

    Some(ContentProduct {
        slug,
        name,
        category: fields.category,
        switch_type: fields.switch_type,
        profile: fields.profile,
        budget: fields.budget,
        image_url,
        description: fields.description,
    })
}
