use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
    Extension,
};
use keebstock_core::{
    merge, merge_one, normalize_name, EnrichedProduct, InventoryRecord, StockLevel,
};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{
    cache_control, cacheable_response, map_content_error, map_inventory_error, require_content,
    require_inventory, ApiError, AppState,
};

/// One value in the stock lookup served by `/products/stock`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StockEntry {
    pub stock: StockLevel,
    pub price: f64,
    pub is_in_stock: bool,
    pub category: String,
}

/// Inventory keyed by normalized product name. The first row wins when two
/// rows normalize to the same key.
pub(super) fn stock_map(records: &[InventoryRecord]) -> BTreeMap<String, StockEntry> {
    let mut map = BTreeMap::new();
    for record in records {
        map.entry(normalize_name(&record.name))
            .or_insert_with(|| StockEntry {
                stock: record.stock,
                price: record.price,
                is_in_stock: record.stock.is_positive(),
                category: record.category.clone(),
            });
    }
    map
}

/// GET /products — full catalog joined with live inventory.
///
/// Bypasses the in-process tiers so both upstreams are queried per request.
/// An inventory failure degrades the rows to placeholder stock; a content
/// failure is fatal for the route.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let content = require_content(&state, &req_id.0)?;

    let inventory_fetch = async {
        match state.inventory.as_ref() {
            Some(client) => Some(client.fetch_inventory(&state.layouts).await),
            None => None,
        }
    };
    let (catalog, inventory) = tokio::join!(content.fetch_catalog(), inventory_fetch);
    let catalog = catalog.map_err(|e| map_content_error(req_id.0.clone(), &e))?;

    let records = match inventory {
        Some(Ok(records)) => records,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "inventory unavailable, serving placeholder stock");
            Vec::new()
        }
        None => {
            tracing::warn!("inventory adapter not configured, serving placeholder stock");
            Vec::new()
        }
    };

    let enriched = merge(catalog, &records);
    let directives = cache_control(state.caches.inventory.ttl(), state.caches.inventory.grace());
    cacheable_response(&headers, &directives, req_id.0, None, enriched)
}

/// GET /products/basic — content-only catalog from the long-TTL tier.
///
/// Stock and price come back as loading placeholders so storefronts can paint
/// the grid before live inventory lands.
pub(super) async fn basic_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let content = require_content(&state, &req_id.0)?;

    let (catalog, outcome) = state
        .caches
        .catalog
        .get_or_refresh(move || async move { content.fetch_catalog().await })
        .await
        .map_err(|e| map_content_error(req_id.0.clone(), &e))?;

    let placeholders: Vec<EnrichedProduct> = catalog
        .into_iter()
        .map(EnrichedProduct::placeholder)
        .collect();

    let directives = cache_control(state.caches.catalog.ttl(), state.caches.catalog.grace());
    cacheable_response(&headers, &directives, req_id.0, Some(outcome), placeholders)
}

/// GET /products/stock — inventory lookup from the short-TTL tier.
pub(super) async fn stock_levels(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let inventory = require_inventory(&state, &req_id.0)?;
    let layouts = state.layouts.clone();

    let (records, outcome) = state
        .caches
        .inventory
        .get_or_refresh(move || async move { inventory.fetch_inventory(&layouts).await })
        .await
        .map_err(|e| map_inventory_error(req_id.0.clone(), &e))?;

    let directives = cache_control(state.caches.inventory.ttl(), state.caches.inventory.grace());
    cacheable_response(
        &headers,
        &directives,
        req_id.0,
        Some(outcome),
        stock_map(&records),
    )
}

/// GET /products/{slug} — one product joined with live inventory.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let content = require_content(&state, &req_id.0)?;

    let inventory_fetch = async {
        match state.inventory.as_ref() {
            Some(client) => Some(client.fetch_inventory(&state.layouts).await),
            None => None,
        }
    };
    let (product, inventory) =
        tokio::join!(content.fetch_product_by_slug(&slug), inventory_fetch);
    let Some(product) = product.map_err(|e| map_content_error(req_id.0.clone(), &e))? else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no product with slug {slug}"),
        ));
    };

    let enriched = match inventory {
        Some(Ok(records)) => merge_one(product, &records),
        Some(Err(e)) => {
            tracing::warn!(error = %e, slug = %slug, "inventory unavailable, serving placeholder stock");
            EnrichedProduct::placeholder(product)
        }
        None => EnrichedProduct::placeholder(product),
    };

    let directives = cache_control(state.caches.inventory.ttl(), state.caches.inventory.grace());
    cacheable_response(&headers, &directives, req_id.0, None, enriched)
}
