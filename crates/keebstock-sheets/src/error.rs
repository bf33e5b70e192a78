use thiserror::Error;

/// Errors returned by the inventory sheet client.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The values API answered 429.
    #[error("rate limited by sheets API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Any non-2xx status other than 429. A 400 here usually means a
    /// malformed A1 range, a 404 a wrong spreadsheet ID.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Every configured category range failed to load. Partial failures are
    /// logged and skipped; this fires only when nothing could be read at all.
    #[error("all {attempted} category ranges failed to load")]
    AllRangesFailed { attempted: usize },

    /// The configured base URL could not be parsed.
    #[error("invalid sheets API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
