use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Storefront pages rebuilt downstream on every accepted revalidation.
const DEFAULT_PATHS: [&str; 2] = ["/", "/products"];

#[derive(Debug, Deserialize)]
pub(super) struct RevalidateQuery {
    secret: Option<String>,
    path: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct RevalidateData {
    revalidated: Vec<String>,
}

/// GET|POST /revalidate — drop both cache tiers after a secret check.
///
/// The secret comparison is constant-time. A rejected request must leave the
/// tiers untouched, so the optional `path` is validated before any clearing.
pub(super) async fn revalidate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RevalidateQuery>,
) -> Result<Json<ApiResponse<RevalidateData>>, ApiError> {
    let Some(expected) = state.revalidate_secret.as_deref() else {
        return Err(ApiError::new(
            req_id.0,
            "configuration_missing",
            "revalidation secret is not configured",
        ));
    };

    let provided = query.secret.unwrap_or_default();
    if !bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        tracing::warn!("revalidation rejected: secret mismatch");
        return Err(ApiError::new(
            req_id.0,
            "unauthorized",
            "invalid revalidation secret",
        ));
    }

    if let Some(path) = query.path.as_deref() {
        if !path.starts_with('/') {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "path must start with '/'",
            ));
        }
    }

    state.caches.clear_all().await;

    let mut revalidated: Vec<String> = DEFAULT_PATHS.iter().map(ToString::to_string).collect();
    if let Some(path) = query.path {
        if !revalidated.contains(&path) {
            revalidated.push(path);
        }
    }

    tracing::info!(paths = ?revalidated, "cache tiers cleared by revalidation request");

    Ok(Json(ApiResponse {
        data: RevalidateData { revalidated },
        meta: ResponseMeta::new(req_id.0),
    }))
}
