//! Strong ETags for conditional GET support on the product routes.

use axum::http::{header, HeaderMap};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute a strong, quoted ETag for a response's data payload.
///
/// The tag hashes the JSON serialization of `data` alone, not the response
/// envelope, so per-request metadata (timestamps, request IDs) does not
/// defeat revalidation.
///
/// # Errors
///
/// Returns the underlying `serde_json` error if `data` cannot be serialized.
pub fn strong_etag<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(data)?;
    Ok(format!("\"{:x}\"", Sha256::digest(&bytes)))
}

/// True when the request's `If-None-Match` header matches `etag`.
///
/// Accepts comma-separated candidate lists, weak-validator prefixes, and the
/// `*` wildcard.
#[must_use]
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    let Some(candidates) = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    candidates
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn etag_is_stable_for_identical_data() {
        let a = strong_etag(&serde_json::json!({"stock": 45})).unwrap();
        let b = strong_etag(&serde_json::json!({"stock": 45})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn etag_changes_when_data_changes() {
        let a = strong_etag(&serde_json::json!({"stock": 45})).unwrap();
        let b = strong_etag(&serde_json::json!({"stock": 44})).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn etag_is_quoted() {
        let tag = strong_etag(&serde_json::json!([])).unwrap();
        assert!(tag.starts_with('"') && tag.ends_with('"'), "got: {tag}");
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn if_none_match_exact() {
        assert!(if_none_match(&headers_with("\"abc\""), "\"abc\""));
        assert!(!if_none_match(&headers_with("\"abc\""), "\"def\""));
    }

    #[test]
    fn if_none_match_candidate_list() {
        let headers = headers_with("\"abc\", \"def\"");
        assert!(if_none_match(&headers, "\"def\""));
    }

    #[test]
    fn if_none_match_weak_prefix_and_wildcard() {
        assert!(if_none_match(&headers_with("W/\"abc\""), "\"abc\""));
        assert!(if_none_match(&headers_with("*"), "\"anything\""));
    }

    #[test]
    fn if_none_match_absent_header() {
        assert!(!if_none_match(&HeaderMap::new(), "\"abc\""));
    }
}
