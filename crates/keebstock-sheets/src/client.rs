//! HTTP client for the spreadsheet values API.
//!
//! Reads one A1 range per category tab and normalizes the rows via
//! [`crate::normalize`]. A single unreadable range is logged and skipped so a
//! renamed tab cannot take the whole inventory feed down; only a total read
//! failure is surfaced as an error.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, Url};

use keebstock_core::{CategoryLayout, InventoryRecord};

use crate::error::SheetsError;
use crate::normalize::rows_to_records;
use crate::retry::retry_with_backoff;
use crate::types::ValueRange;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/";

/// Characters escaped when an A1 range is embedded as a URL path segment.
/// `!` and `:` are valid in path segments and stay literal, which keeps
/// ranges readable in logs and error messages.
const RANGE_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Client for the shop's inventory spreadsheet.
///
/// Manages the HTTP client, API key, and base URL. Use [`SheetsClient::new`]
/// for production or [`SheetsClient::with_base_url`] to point at a mock
/// server in tests.
///
/// Transient errors (429, 5xx, network failures) are automatically retried
/// with exponential backoff up to `max_retries` additional attempts.
pub struct SheetsClient {
    client: Client,
    sheet_id: String,
    api_key: String,
    base_url: Url,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    backoff_base_ms: u64,
}

impl SheetsClient {
    /// Creates a client pointed at the production values API.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        sheet_id: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, SheetsError> {
        Self::with_base_url(
            sheet_id,
            api_key,
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
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SheetsError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        sheet_id: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: a trailing slash makes Url::join treat the last path
        // segment as a directory, so the values path appends to the base
        // instead of replacing its final segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SheetsError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            sheet_id: sheet_id.to_owned(),
            api_key: api_key.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches the raw cell rows for one A1 range, with automatic retry on
    /// transient errors.
    ///
    /// An empty range is an empty row list, not an error.
    ///
    /// # Errors
    ///
    /// - [`SheetsError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`SheetsError::UnexpectedStatus`] — non-2xx status (5xx after
    ///   retries). A 400 usually means the range itself is malformed.
    /// - [`SheetsError::Http`] — network or TLS failure after all retries.
    /// - [`SheetsError::Deserialize`] — response body does not match the
    ///   expected shape (not retried).
    pub async fn fetch_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(range)?;

        let value_range = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(SheetsError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    return Err(SheetsError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<ValueRange>(&body).map_err(|e| SheetsError::Deserialize {
                    context: format!("values for range {range}"),
                    source: e,
                })
            }
        })
        .await?;

        Ok(value_range.values)
    }

    /// Fetches and normalizes inventory rows for every configured category.
    ///
    /// Categories are read sequentially; a range that fails to load is
    /// logged and skipped so the rest of the inventory still comes through.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::AllRangesFailed`] only when every configured
    /// range failed to load. An empty `layouts` slice is `Ok(vec![])`.
    pub async fn fetch_inventory(
        &self,
        layouts: &[CategoryLayout],
    ) -> Result<Vec<InventoryRecord>, SheetsError> {
        let mut records: Vec<InventoryRecord> = Vec::new();
        let mut failed = 0usize;

        for layout in layouts {
            match self.fetch_range(&layout.range).await {
                Ok(rows) => {
                    let parsed = rows_to_records(layout, &rows);
                    tracing::debug!(
                        category = %layout.category,
                        rows = rows.len(),
                        records = parsed.len(),
                        "loaded category range"
                    );
                    records.extend(parsed);
                }
                Err(err) => {
                    failed += 1;
                    tracing::warn!(
                        category = %layout.category,
                        range = %layout.range,
                        error = %err,
                        "failed to load category range, skipping"
                    );
                }
            }
        }

        if failed > 0 && failed == layouts.len() {
            return Err(SheetsError::AllRangesFailed {
                attempted: layouts.len(),
            });
        }
        Ok(records)
    }

    /// Builds the values URL for one range, percent-encoding the range as a
    /// single path segment and appending the API key.
    fn values_url(&self, range: &str) -> Result<Url, SheetsError> {
        let encoded = utf8_percent_encode(range, RANGE_SEGMENT);
        let path = format!("v4/spreadsheets/{}/values/{encoded}", self.sheet_id);
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| SheetsError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> SheetsClient {
        SheetsClient::with_base_url(
            "sheet1",
            "test-key",
            30,
            "keebstock-test/0.1",
            0,
            0,
            base_url,
        )
        .expect("client construction should not fail")
    }

    #[test]
    fn values_url_keeps_range_punctuation_literal() {
        let client = test_client("https://sheets.example.net");
        let url = client
            .values_url("Switches!C8:H50")
            .expect("url should build");
        assert_eq!(
            url.as_str(),
            "https://sheets.example.net/v4/spreadsheets/sheet1/values/Switches!C8:H50?key=test-key"
        );
    }

    #[test]
    fn values_url_encodes_spaces_in_tab_names() {
        let client = test_client("https://sheets.example.net");
        let url = client
            .values_url("Desk Mats!A3:E45")
            .expect("url should build");
        assert!(
            url.as_str().contains("/values/Desk%20Mats!A3:E45"),
            "space should be percent-encoded: {url}"
        );
    }

    #[test]
    fn values_url_strips_trailing_slash() {
        let client = test_client("https://sheets.example.net/");
        let url = client
            .values_url("Switches!C8:H50")
            .expect("url should build");
        assert!(
            url.as_str()
                .starts_with("https://sheets.example.net/v4/spreadsheets/"),
            "base slash must not double up: {url}"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = SheetsClient::with_base_url(
            "sheet1",
            "test-key",
            30,
            "keebstock-test/0.1",
            0,
            0,
            "not a url",
        );
        assert!(matches!(result, Err(SheetsError::InvalidBaseUrl { .. })));
    }
}
