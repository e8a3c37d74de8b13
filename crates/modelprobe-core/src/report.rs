//! Aggregate report over a probe run.

use crate::cascade;
use crate::prompt::TestPrompt;
use crate::types::ProbeOutcome;
use serde::{Deserialize, Serialize};

/// Outcome counts by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub working: usize,
    /// Cold-starting models that may work after a wait
    pub loading: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_outcomes(outcomes: &[ProbeOutcome]) -> Self {
        let working = outcomes.iter().filter(|o| o.status.is_success()).count();
        let loading = outcomes.iter().filter(|o| o.status.is_loading()).count();
        Self {
            total: outcomes.len(),
            working,
            loading,
            failed: outcomes.len() - working - loading,
        }
    }
}

/// Everything a run produced, in cascade order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    /// modelprobe version that produced the report
    pub version: String,
    /// Prompt text sent to every model
    pub prompt: String,
    /// Whether an image was attached
    pub vision: bool,
    pub outcomes: Vec<ProbeOutcome>,
    pub summary: Summary,
    /// `provider/model` of the first available entry, if any
    pub recommended: Option<String>,
}

impl ProbeReport {
    pub fn new(prompt: &TestPrompt, outcomes: Vec<ProbeOutcome>) -> Self {
        let summary = Summary::from_outcomes(&outcomes);
        let recommended = cascade::select(&outcomes).map(|s| s.outcome.display_name());
        Self {
            version: crate::VERSION.to_string(),
            prompt: prompt.text.clone(),
            vision: prompt.is_vision(),
            outcomes,
            summary,
            recommended,
        }
    }

    pub fn working(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_success())
    }

    pub fn loading(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_loading())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !o.status.is_success() && !o.status.is_loading())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProbeStatus, RetryAfter};

    fn outcome(model: &str, status: ProbeStatus) -> ProbeOutcome {
        ProbeOutcome {
            provider_name: "huggingface".to_string(),
            model: model.to_string(),
            status,
            excerpt: String::new(),
            token_usage: None,
            http_status: None,
            latency_ms: 0,
            format_index: None,
            formats_tried: 1,
        }
    }

    #[test]
    fn test_report_groups_and_recommends() {
        let outcomes = vec![
            outcome(
                "a",
                ProbeStatus::TransientUnavailable {
                    retry_after: RetryAfter::Unknown,
                },
            ),
            outcome("b", ProbeStatus::Forbidden),
            outcome("c", ProbeStatus::Success),
        ];
        let report = ProbeReport::new(&TestPrompt::default(), outcomes);

        assert_eq!(
            report.summary,
            Summary {
                total: 3,
                working: 1,
                loading: 1,
                failed: 1
            }
        );
        assert_eq!(report.recommended.as_deref(), Some("huggingface/c"));
        assert_eq!(report.failed().count(), 1);
        assert!(!report.vision);
    }

    #[test]
    fn test_report_without_success_has_no_recommendation() {
        let report = ProbeReport::new(
            &TestPrompt::default(),
            vec![outcome("a", ProbeStatus::Unauthorized)],
        );
        assert!(report.recommended.is_none());
        assert_eq!(report.working().count(), 0);
    }
}
