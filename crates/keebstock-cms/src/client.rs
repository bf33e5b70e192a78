//! HTTP client for the content store's entries endpoint.
//!
//! Wraps `reqwest` with bearer-token auth, typed error handling, and paging.
//! Responses are deserialized into [`EntriesResponse`] and mapped to
//! [`ContentProduct`] values via [`crate::normalize`].

use std::time::Duration;

use reqwest::{Client, Url};

use keebstock_core::ContentProduct;

use crate::error::CmsError;
use crate::normalize::{entry_to_product, index_assets};
use crate::retry::retry_with_backoff;
use crate::types::EntriesResponse;

const DEFAULT_BASE_URL: &str = "https://cdn.contentful.com/";

/// Content type of catalog entries in the store.
const PRODUCT_CONTENT_TYPE: &str = "product";

/// Page size for entry queries. The catalog is tens of entries, so a single
/// page is the normal case and the paging loop exists for safety.
const PAGE_LIMIT: u32 = 1000;

/// Maximum number of pages to fetch before returning an error.
/// Prevents infinite loops if the reported total never reconciles with the
/// items actually served.
const MAX_PAGES: usize = 20;

/// Client for the product catalog in the content store.
///
/// Manages the HTTP client, credentials, and base URL. Use [`CmsClient::new`]
/// for production or [`CmsClient::with_base_url`] to point at a mock server
/// in tests.
///
/// Transient errors (429, 5xx, network failures) are automatically retried
/// with exponential backoff up to `max_retries` additional attempts.
pub struct CmsClient {
    client: Client,
    space_id: String,
    environment: String,
    access_token: String,
    base_url: Url,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    backoff_base_ms: u64,
}

impl CmsClient {
    /// Creates a client pointed at the production content delivery host.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(
        space_id: &str,
        access_token: &str,
        environment: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, CmsError> {
        Self::with_base_url(
            space_id,
            access_token,
            environment,
            timeout_secs,
            user_agent,
            max_retries,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`CmsError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    #[allow(clippy::too_many_arguments)]
    pub fn with_base_url(
        space_id: &str,
        access_token: &str,
        environment: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, CmsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: a trailing slash makes Url::join treat the last path
        // segment as a directory, so the entries path appends to the base
        // instead of replacing its final segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CmsError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            space_id: space_id.to_owned(),
            environment: environment.to_owned(),
            access_token: access_token.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches the complete product catalog, following pagination until every
    /// entry has been retrieved.
    ///
    /// Entries that cannot be mapped (no slug or no name) are skipped with a
    /// warning; they count towards paging but not towards the result.
    ///
    /// # Errors
    ///
    /// - [`CmsError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`CmsError::UnexpectedStatus`] — non-2xx status (5xx after retries).
    /// - [`CmsError::Http`] — network or TLS failure after all retries.
    /// - [`CmsError::Deserialize`] — response body does not match the
    ///   expected shape (not retried).
    /// - [`CmsError::PaginationLimit`] — the paging loop exceeded
    ///   [`MAX_PAGES`] without draining the collection.
    pub async fn fetch_catalog(&self) -> Result<Vec<ContentProduct>, CmsError> {
        let mut products: Vec<ContentProduct> = Vec::new();
        let mut fetched = 0usize;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(CmsError::PaginationLimit {
                    space_id: self.space_id.clone(),
                    max_pages: MAX_PAGES,
                });
            }

            let response = self.fetch_entries_page(fetched, None).await?;
            let page_len = response.items.len();
            let assets = index_assets(&response.includes.assets);
            products.extend(
                response
                    .items
                    .into_iter()
                    .filter_map(|entry| entry_to_product(entry, &assets)),
            );

            fetched += page_len;
            if page_len == 0 || fetched >= response.total {
                break;
            }
        }

        tracing::debug!(
            products = products.len(),
            pages = page_count,
            "fetched product catalog"
        );
        Ok(products)
    }

    /// Fetches a single product by its URL slug.
    ///
    /// Filters server-side on the slug field, so an unknown slug is an empty
    /// result (`Ok(None)`), not an HTTP 404.
    ///
    /// # Errors
    ///
    /// Propagates the same errors as [`Self::fetch_catalog`], minus
    /// [`CmsError::PaginationLimit`].
    pub async fn fetch_product_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ContentProduct>, CmsError> {
        let response = self.fetch_entries_page(0, Some(slug)).await?;
        let assets = index_assets(&response.includes.assets);
        Ok(response
            .items
            .into_iter()
            .find_map(|entry| entry_to_product(entry, &assets)))
    }

    /// Fetches one page of entries, with automatic retry on transient errors.
    async fn fetch_entries_page(
        &self,
        skip: usize,
        slug: Option<&str>,
    ) -> Result<EntriesResponse, CmsError> {
        let url = self.entries_url(skip, slug)?;

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .bearer_auth(&self.access_token)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(CmsError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    return Err(CmsError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<EntriesResponse>(&body).map_err(|e| {
                    CmsError::Deserialize {
                        context: format!("entries page for space {}", self.space_id),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    /// Builds the entries URL with properly percent-encoded query parameters.
    fn entries_url(&self, skip: usize, slug: Option<&str>) -> Result<Url, CmsError> {
        let path = format!(
            "spaces/{}/environments/{}/entries",
            self.space_id, self.environment
        );
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| CmsError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("content_type", PRODUCT_CONTENT_TYPE);
            pairs.append_pair("include", "1");
            // A slug is unique within the space, so the filtered lookup asks
            // for exactly one entry.
            let limit = if slug.is_some() {
                "1".to_string()
            } else {
                PAGE_LIMIT.to_string()
            };
            pairs.append_pair("limit", &limit);
            pairs.append_pair("skip", &skip.to_string());
            if let Some(slug) = slug {
                pairs.append_pair("fields.slug", slug);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> CmsClient {
        CmsClient::with_base_url(
            "space1",
            "test-token",
            "master",
            30,
            "keebstock-test/0.1",
            0,
            0,
            base_url,
        )
        .expect("client construction should not fail")
    }

    #[test]
    fn entries_url_includes_space_environment_and_paging() {
        let client = test_client("https://cdn.example.net");
        let url = client.entries_url(0, None).expect("url should build");
        assert_eq!(
            url.as_str(),
            "https://cdn.example.net/spaces/space1/environments/master/entries\
             ?content_type=product&include=1&limit=1000&skip=0"
        );
    }

    #[test]
    fn entries_url_strips_trailing_slash() {
        let client = test_client("https://cdn.example.net/");
        let url = client.entries_url(25, None).expect("url should build");
        assert!(
            url.as_str()
                .starts_with("https://cdn.example.net/spaces/space1/"),
            "base slash must not double up: {url}"
        );
        assert!(url.as_str().ends_with("skip=25"), "skip should carry: {url}");
    }

    #[test]
    fn entries_url_appends_slug_filter_with_single_entry_limit() {
        let client = test_client("https://cdn.example.net");
        let url = client
            .entries_url(0, Some("blue-switch-set"))
            .expect("url should build");
        assert_eq!(
            url.as_str(),
            "https://cdn.example.net/spaces/space1/environments/master/entries\
             ?content_type=product&include=1&limit=1&skip=0&fields.slug=blue-switch-set"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = CmsClient::with_base_url(
            "space1",
            "t",
            "master",
            30,
            "keebstock-test/0.1",
            0,
            0,
            "not a url",
        );
        assert!(matches!(result, Err(CmsError::InvalidBaseUrl { .. })));
    }
}
