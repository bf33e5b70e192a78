//! Content Delivery API response types.
//!
//! All types model the JSON returned by the entries endpoint. Entries carry
//! their editable data under `fields`; linked assets are not inlined but
//! delivered once in the `includes.Asset` sidecar and referenced from entry
//! fields by ID.

use serde::Deserialize;

/// Top-level envelope for an entries query:
/// `{ "total": N, "items": [...], "includes": { "Asset": [...] } }`.
///
/// `total` counts all entries matching the query, not just the current page;
/// callers compare it against the number of items fetched so far to decide
/// whether another page is needed.
#[derive(Debug, Deserialize)]
pub struct EntriesResponse {
    pub total: usize,
    #[serde(default)]
    pub items: Vec<Entry>,
    #[serde(default)]
    pub includes: Includes,
}

/// A single catalog entry.
#[derive(Debug, Deserialize)]
pub struct Entry {
    pub sys: EntrySys,
    pub fields: EntryFields,
}

/// System metadata attached to every entry and asset.
#[derive(Debug, Deserialize)]
pub struct EntrySys {
    pub id: String,
}

/// Editable fields of a catalog entry.
///
/// Every field is optional on the wire: editors publish drafts with gaps, and
/// the delivery API omits absent fields rather than sending `null`. The wire
/// names are camelCase.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFields {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub switch_type: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    /// Link to the product image in the asset sidecar, not an inline URL.
    #[serde(default)]
    pub image: Option<AssetLink>,
    /// Rich-text document. Kept as raw JSON; the storefront renders it.
    #[serde(default)]
    pub description: Option<serde_json::Value>,
}

/// A link field pointing at an asset by ID: `{ "sys": { "id": "..." } }`.
#[derive(Debug, Deserialize)]
pub struct AssetLink {
    pub sys: LinkSys,
}

/// The inner `sys` object of a link field.
#[derive(Debug, Deserialize)]
pub struct LinkSys {
    pub id: String,
}

/// The `includes` sidecar delivered alongside entries when `include` is
/// requested. Only assets are used; other link types are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct Includes {
    #[serde(rename = "Asset", default)]
    pub assets: Vec<Asset>,
}

/// A media asset from the `includes.Asset` array.
#[derive(Debug, Deserialize)]
pub struct Asset {
    pub sys: EntrySys,
    pub fields: AssetFields,
}

/// Editable fields of an asset.
#[derive(Debug, Deserialize)]
pub struct AssetFields {
    #[serde(default)]
    pub file: Option<AssetFile>,
}

/// The uploaded file behind an asset.
///
/// `url` is protocol-relative on the wire (`//images.example.net/...`);
/// [`crate::normalize`] prefixes it with `https:` before it leaves this crate.
#[derive(Debug, Deserialize)]
pub struct AssetFile {
    #[serde(default)]
    pub url: Option<String>,
}
