//! Response classification.
//!
//! HTTP status decides first. The body only refines the result: it supplies
//! the excerpt, token usage, and the cold-start marker on a 503.

use super::provider::LlmProvider;
use crate::types::{truncate_excerpt, ProbeStatus, RetryAfter, TokenUsage};
use serde_json::Value;

/// Status, excerpt and usage extracted from one HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub status: ProbeStatus,
    pub excerpt: String,
    pub token_usage: Option<TokenUsage>,
}

/// Classify a raw response using `provider` for body extraction.
pub fn classify_response<P: LlmProvider + ?Sized>(
    provider: &P,
    status: u16,
    body: &str,
    excerpt_chars: usize,
) -> Classified {
    let failure = |status: ProbeStatus| Classified {
        status,
        excerpt: truncate_excerpt(body, excerpt_chars),
        token_usage: None,
    };

    match status {
        200..=299 => {
            let parsed: Option<Value> = serde_json::from_str(body).ok();
            let text = parsed
                .as_ref()
                .and_then(|v| provider.extract_text(v))
                .filter(|t| !t.trim().is_empty());
            let token_usage = parsed.as_ref().and_then(|v| provider.extract_usage(v));

            match text {
                Some(text) => Classified {
                    status: ProbeStatus::Success,
                    excerpt: truncate_excerpt(&text, excerpt_chars),
                    token_usage,
                },
                // Unrecognised but non-empty payloads still prove the model answered
                None if !body.trim().is_empty() => Classified {
                    status: ProbeStatus::Success,
                    excerpt: truncate_excerpt(body, excerpt_chars),
                    token_usage,
                },
                None => Classified {
                    status: ProbeStatus::UnknownError { code: Some(status) },
                    excerpt: "empty response body".to_string(),
                    token_usage: None,
                },
            }
        }
        401 => failure(ProbeStatus::Unauthorized),
        403 => failure(ProbeStatus::Forbidden),
        400 | 422 => failure(ProbeStatus::BadRequest),
        429 => failure(ProbeStatus::RateLimited),
        503 if is_loading(body) => failure(ProbeStatus::TransientUnavailable {
            retry_after: estimated_time(body),
        }),
        other => failure(ProbeStatus::UnknownError { code: Some(other) }),
    }
}

/// True when a 503 body reports a model still loading.
pub fn is_loading(body: &str) -> bool {
    body.to_lowercase().contains("loading")
}

/// Parse `estimated_time` (seconds) from a JSON body.
pub fn estimated_time(body: &str) -> RetryAfter {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("estimated_time").and_then(Value::as_f64))
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map_or(RetryAfter::Unknown, RetryAfter::Seconds)
}
