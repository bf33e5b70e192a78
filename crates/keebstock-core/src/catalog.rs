use serde::{Deserialize, Serialize};

/// A canonical catalog entry from the content store, read-only to this
/// system and immutable within a single request lifecycle.
///
/// Field names serialize camelCase because the storefront UI consumes this
/// shape directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentProduct {
    /// URL slug, the only stable key across content edits, e.g. `"blue-switch-set"`.
    pub slug: String,
    /// Display name shown in the catalog. This is what the inventory join
    /// matches against, NOT the slug.
    pub name: String,
    /// Shop category, e.g. `"Switches"`, `"Keycaps"`.
    pub category: Option<String>,
    /// Switch feel for switch products, e.g. `"Linear"`, `"Tactile"`.
    pub switch_type: Option<String>,
    /// Keycap profile for keycap products, e.g. `"Cherry"`, `"OEM"`.
    pub profile: Option<String>,
    /// Budget tier label, e.g. `"Entry"`, `"Midrange"`, `"Premium"`.
    pub budget: Option<String>,
    /// Resolved image URL (the content store returns asset links; the adapter
    /// resolves them to absolute URLs before constructing this type).
    pub image_url: Option<String>,
    /// Rich-text description document, passed through opaquely for the UI's
    /// renderer.
    pub description: Option<serde_json::Value>,
}

impl ContentProduct {
    /// Returns `true` when this entry belongs to the given category
    /// (case-insensitive).
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(category))
    }
}
