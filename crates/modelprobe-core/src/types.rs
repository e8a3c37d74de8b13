//! Core data types for probe results.
//!
//! A [`ProbeOutcome`] is produced for every provider descriptor attempted,
//! successful or not, and is immutable once built.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Estimated wait before a cold-starting model can serve requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryAfter {
    /// Seconds reported by the endpoint
    Seconds(f64),
    /// The endpoint did not report an estimate
    Unknown,
}

impl fmt::Display for RetryAfter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryAfter::Seconds(secs) => write!(f, "~{secs:.0}s"),
            RetryAfter::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classification of a single probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeStatus {
    /// HTTP 2xx with a usable body
    Success,
    /// HTTP 429
    RateLimited,
    /// HTTP 401: credential invalid
    Unauthorized,
    /// HTTP 403: model needs an elevated access tier
    Forbidden,
    /// HTTP 400/422: payload shape rejected
    BadRequest,
    /// HTTP 503 with a "loading" marker (cold start)
    TransientUnavailable { retry_after: RetryAfter },
    /// The call exceeded its timeout
    Timeout,
    /// Anything else. `code` is absent for a recorded transport fault.
    UnknownError { code: Option<u16> },
}

impl ProbeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeStatus::Success)
    }

    /// True when the endpoint rejected the request shape, so a different
    /// candidate format may still be accepted.
    pub fn is_format_rejection(&self) -> bool {
        matches!(self, ProbeStatus::BadRequest)
    }

    /// True for a cold-starting model.
    pub fn is_loading(&self) -> bool {
        matches!(self, ProbeStatus::TransientUnavailable { .. })
    }

    /// Short uppercase label for status blocks.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeStatus::Success => "OK",
            ProbeStatus::RateLimited => "RATE LIMITED",
            ProbeStatus::Unauthorized => "UNAUTHORIZED",
            ProbeStatus::Forbidden => "FORBIDDEN",
            ProbeStatus::BadRequest => "BAD REQUEST",
            ProbeStatus::TransientUnavailable { .. } => "LOADING",
            ProbeStatus::Timeout => "TIMEOUT",
            ProbeStatus::UnknownError { .. } => "ERROR",
        }
    }

    /// Operator hint for failure classes that have one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ProbeStatus::Unauthorized => Some("check the API key"),
            ProbeStatus::Forbidden => {
                Some("model may require a Pro subscription or a license agreement")
            }
            ProbeStatus::BadRequest => Some("payload shape not accepted by this model"),
            ProbeStatus::RateLimited => Some("quota exhausted, try again later"),
            ProbeStatus::TransientUnavailable { .. } => {
                Some("model is loading (cold start), retry later")
            }
            _ => None,
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::TransientUnavailable { retry_after } => {
                write!(f, "LOADING (wait {retry_after})")
            }
            ProbeStatus::UnknownError { code: Some(code) } => write!(f, "ERROR {code}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Token accounting reported by the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
}

impl TokenUsage {
    /// Total tokens, summing the parts when the endpoint omits the total.
    pub fn total(&self) -> Option<u32> {
        self.total_tokens.or(match (self.prompt_tokens, self.completion_tokens) {
            (Some(p), Some(c)) => Some(p + c),
            _ => None,
        })
    }
}

/// The result of probing one provider descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Provider name ("gemini", "groq", "huggingface")
    pub provider_name: String,

    /// Model identifier as sent to the endpoint
    pub model: String,

    /// Classified status
    pub status: ProbeStatus,

    /// Response text or error body, truncated
    pub excerpt: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,

    /// HTTP status of the final attempt, absent on timeout or transport fault
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,

    /// Wall time across all candidate formats, in milliseconds
    pub latency_ms: u64,

    /// 1-based index of the candidate format that produced this outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_index: Option<usize>,

    /// Number of candidate formats sent
    pub formats_tried: usize,
}

impl ProbeOutcome {
    /// Display name used in summaries, e.g. `groq/llama-3.3-70b-versatile`.
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.provider_name, self.model)
    }
}

/// Truncate `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
