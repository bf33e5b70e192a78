use thiserror::Error;

/// Errors returned by the content store client.
#[derive(Debug, Error)]
pub enum CmsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The content API answered 429; the delivery tier is metered.
    #[error("rate limited by content API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Any non-2xx status other than 429. A 404 here means the space or
    /// environment in the URL does not exist.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The paging loop exceeded its page cap without draining the collection.
    #[error("pagination limit reached for space {space_id}: exceeded {max_pages} pages")]
    PaginationLimit { space_id: String, max_pages: usize },

    /// The configured base URL could not be parsed.
    #[error("invalid content API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
