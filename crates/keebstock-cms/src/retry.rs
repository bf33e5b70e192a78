//! Retry with exponential back-off and jitter for the content store client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 429, 5xx). Everything else is returned
//! immediately without a retry.

use std::future::Future;
use std::time::Duration;

use crate::error::CmsError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - [`CmsError::RateLimited`] — the API asked us to back off.
/// - [`CmsError::UnexpectedStatus`] with a 5xx status — transient server error.
/// - [`CmsError::Http`] timeouts and connection failures.
///
/// **Not retriable (hard stop):**
/// - [`CmsError::UnexpectedStatus`] with a 4xx status — the request itself is
///   wrong (bad token, bad space); retrying won't fix it.
/// - [`CmsError::Deserialize`] — malformed response; retrying won't fix it.
/// - [`CmsError::PaginationLimit`] and [`CmsError::InvalidBaseUrl`] — local
///   guards, not upstream conditions.
fn is_retriable(err: &CmsError) -> bool {
    match err {
        CmsError::Http(e) => e.is_timeout() || e.is_connect(),
        CmsError::RateLimited { .. } => true,
        CmsError::UnexpectedStatus { status, .. } => *status >= 500,
        CmsError::Deserialize { .. }
        | CmsError::PaginationLimit { .. }
        | CmsError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors.
///
/// The wait before the n-th retry is `backoff_base_ms * 2^(n-1)` milliseconds
/// with ±25 % jitter, capped at 30 s. A rate-limited attempt's `Retry-After`
/// value floors the wait, under the same cap. Non-retriable errors are
/// returned immediately; once retries are exhausted the last error is
/// returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, CmsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CmsError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let mut delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                if let CmsError::RateLimited { retry_after_secs } = &err {
                    // Retry-After floors the wait; the overall cap still bounds it.
                    delay_ms = delay_ms.max(retry_after_secs.saturating_mul(1000).min(MAX_DELAY_MS));
                }
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient content API error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
