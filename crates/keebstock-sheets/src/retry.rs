//! Retry utilities for the sheets client.
//!
//! Provides exponential backoff retry for transient HTTP errors (429, 5xx,
//! network failures). Non-retriable errors are propagated immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::SheetsError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay. Rate limits, 5xx statuses, and
/// network-level failures qualify; everything else is propagated as-is.
fn is_retriable(err: &SheetsError) -> bool {
    match err {
        SheetsError::RateLimited { .. } => true,
        SheetsError::UnexpectedStatus { status, .. } => *status >= 500,
        SheetsError::Http(e) => e.is_timeout() || e.is_connect(),
        SheetsError::Deserialize { .. }
        | SheetsError::AllRangesFailed { .. }
        | SheetsError::InvalidBaseUrl { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// The wait before the n-th retry is `backoff_base_ms * 2^(n-1)` milliseconds
/// with ±25 % jitter, capped at 30 s. A rate-limited attempt's `Retry-After`
/// value floors the wait, under the same cap. With `max_retries = 2` the
/// operation is attempted at most 3 times total; the last error is returned
/// once retries are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SheetsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SheetsError>>,
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
                if let SheetsError::RateLimited { retry_after_secs } = &err {
                    // Retry-After floors the wait; the overall cap still bounds it.
                    delay_ms = delay_ms.max(retry_after_secs.saturating_mul(1000).min(MAX_DELAY_MS));
                }
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient sheets API error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
