//! Caller-side retry policy for transient probe outcomes.
//!
//! [`Prober::probe`](super::prober::Prober::probe) never retries. Batch
//! callers that opt in use these helpers to decide whether and how long to
//! wait before probing the same descriptor again.

use crate::types::{ProbeStatus, RetryAfter};
use std::time::Duration;

/// Longest wait between attempts.
const MAX_DELAY_MS: u64 = 30_000;

/// Determine whether a probe status is worth retrying.
///
/// Retryable: timeouts, rate limits (429), cold starts, server errors (5xx).
/// Non-retryable: auth failures, bad requests, success.
pub fn is_retryable(status: &ProbeStatus) -> bool {
    match status {
        ProbeStatus::Timeout
        | ProbeStatus::RateLimited
        | ProbeStatus::TransientUnavailable { .. } => true,
        ProbeStatus::UnknownError { code: Some(code) } => (500..=599).contains(code),
        _ => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(MAX_DELAY_MS))
}

/// How long to wait before the next attempt.
///
/// A cold-start estimate from the endpoint wins over backoff, within the cap.
pub fn wait_hint(status: &ProbeStatus, attempt: u32, base_delay_ms: u64) -> Duration {
    match status {
        ProbeStatus::TransientUnavailable {
            retry_after: RetryAfter::Seconds(secs),
        } => Duration::from_millis(((secs * 1000.0) as u64).min(MAX_DELAY_MS)),
        _ => backoff_duration(attempt, base_delay_ms),
    }
}
