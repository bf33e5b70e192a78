mod products;
mod revalidate;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use keebstock_cms::CmsClient;
use keebstock_core::CategoryLayout;
use keebstock_sheets::SheetsClient;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::cache::{CacheOutcome, Caches};
use crate::etag;
use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub content: Option<Arc<CmsClient>>,
    pub inventory: Option<Arc<SheetsClient>>,
    pub layouts: Arc<Vec<CategoryLayout>>,
    pub caches: Arc<Caches>,
    pub revalidate_secret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    /// How the cache satisfied this request; omitted on uncached routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    content: &'static str,
    inventory: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            cache: None,
        }
    }

    pub(super) fn with_cache(mut self, outcome: CacheOutcome) -> Self {
        self.cache = Some(outcome.as_str());
        self
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_unavailable" => StatusCode::BAD_GATEWAY,
            "configuration_missing" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// The content adapter, or `configuration_missing` when its credentials were
/// absent at startup.
pub(super) fn require_content(
    state: &AppState,
    request_id: &str,
) -> Result<Arc<CmsClient>, ApiError> {
    state.content.clone().ok_or_else(|| {
        ApiError::new(
            request_id,
            "configuration_missing",
            "content store credentials are not configured",
        )
    })
}

pub(super) fn require_inventory(
    state: &AppState,
    request_id: &str,
) -> Result<Arc<SheetsClient>, ApiError> {
    state.inventory.clone().ok_or_else(|| {
        ApiError::new(
            request_id,
            "configuration_missing",
            "inventory sheet credentials are not configured",
        )
    })
}

pub(super) fn map_content_error(request_id: String, error: &keebstock_cms::CmsError) -> ApiError {
    tracing::error!(error = %error, "content API request failed");
    ApiError::new(
        request_id,
        "upstream_unavailable",
        "content store is unavailable",
    )
}

pub(super) fn map_inventory_error(
    request_id: String,
    error: &keebstock_sheets::SheetsError,
) -> ApiError {
    tracing::error!(error = %error, "inventory API request failed");
    ApiError::new(
        request_id,
        "upstream_unavailable",
        "inventory sheet is unavailable",
    )
}

/// Edge cache directives for a served payload: fresh for `ttl`, then
/// stale-servable for `grace` while a background refresh runs downstream.
pub(super) fn cache_control(ttl: Duration, grace: Duration) -> String {
    format!(
        "public, s-maxage={}, stale-while-revalidate={}",
        ttl.as_secs(),
        grace.as_secs()
    )
}

/// Terminal response builder for the product routes.
///
/// Computes a strong ETag over `data`, answers `If-None-Match` revisits with
/// `304 Not Modified`, and stamps the tier's cache directives on either
/// outcome.
pub(super) fn cacheable_response<T: Serialize>(
    request_headers: &HeaderMap,
    directives: &str,
    request_id: String,
    outcome: Option<CacheOutcome>,
    data: T,
) -> Result<Response, ApiError> {
    let tag = match etag::strong_etag(&data) {
        Ok(tag) => tag,
        Err(e) => {
            tracing::error!(error = %e, "response payload serialization failed");
            return Err(ApiError::new(
                request_id,
                "internal_error",
                "response serialization failed",
            ));
        }
    };

    let mut response = if etag::if_none_match(request_headers, &tag) {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        let meta = match outcome {
            Some(outcome) => ResponseMeta::new(request_id).with_cache(outcome),
            None => ResponseMeta::new(request_id),
        };
        Json(ApiResponse { data, meta }).into_response()
    };

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(directives) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    if let Ok(value) = HeaderValue::from_str(&tag) {
        headers.insert(header::ETAG, value);
    }
    Ok(response)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::IF_NONE_MATCH,
            HeaderName::from_static("x-request-id"),
        ])
}

fn limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list_products))
        .route("/products/basic", get(products::basic_products))
        .route("/products/stock", get(products::stock_levels))
        .route("/products/{slug}", get(products::get_product))
        .route(
            "/revalidate",
            get(revalidate::revalidate).post(revalidate::revalidate),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(CompressionLayer::new())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let content = if state.content.is_some() {
        "configured"
    } else {
        "unconfigured"
    };
    let inventory = if state.inventory.is_some() {
        "configured"
    } else {
        "unconfigured"
    };

    if state.content.is_some() && state.inventory.is_some() {
        (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    content,
                    inventory,
                },
                meta,
            }),
        )
    } else {
        tracing::warn!("health check: upstream adapter credentials missing");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                data: HealthData {
                    status: "degraded",
                    content,
                    inventory,
                },
                meta,
            }),
        )
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}
