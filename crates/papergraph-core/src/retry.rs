//! Opt-in retry with exponential backoff for API requests
//!
//! Nothing retries implicitly: callers pass `max_retries`, and the default
//! used throughout the workspace is 0 (a single attempt).

use std::time::Duration;

use crate::error::FetchError;

/// Exponential backoff: 2^attempt seconds (2s, 4s, 8s, ...)
pub const fn backoff_duration(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt))
}

/// Retry a fallible request with exponential backoff.
///
/// On retryable errors, logs the failure, sleeps and retries up to `max_retries`.
///
/// Returns `Ok(T)` on first success, or the final `Err` on exhaustion / non-retryable error.
pub fn retry_with_backoff<T>(
    label: &str,
    max_retries: u32,
    mut attempt_fn: impl FnMut() -> Result<T, FetchError>,
) -> Result<T, FetchError> {
    retry_with_sleep(label, max_retries, &mut attempt_fn, std::thread::sleep)
}

fn retry_with_sleep<T>(
    label: &str,
    max_retries: u32,
    attempt_fn: &mut impl FnMut() -> Result<T, FetchError>,
    mut sleep: impl FnMut(Duration),
) -> Result<T, FetchError> {
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                attempt += 1;
                log::warn!("{label}: attempt {attempt}/{max_retries} failed: {e}, retrying...");
                sleep(backoff_duration(attempt));
            }
            Err(e) => {
                log::error!("{label}: request failed: {e}");
                return Err(e);
            }
        }
    }
}
