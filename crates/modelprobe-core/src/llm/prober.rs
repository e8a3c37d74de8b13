//! Sequential provider prober.
//!
//! [`Prober::probe`] sends one descriptor's candidate requests and classifies
//! the result into exactly one [`ProbeOutcome`]. [`Prober::probe_batch`] runs
//! a list of providers strictly one after another, reporting each outcome
//! through a [`BatchObserver`] as it completes.

use super::classify::Classified;
use super::provider::LlmProvider;
use super::retry;
use super::transport::{Transport, TransportError};
use crate::error::ProbeError;
use crate::prompt::TestPrompt;
use crate::types::{ProbeOutcome, ProbeStatus};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default maximum excerpt length, in characters.
pub const DEFAULT_EXCERPT_CHARS: usize = 300;

/// What a batch does when a transport fault (not a timeout) occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Stop the batch and return the error
    Abort,
    /// Record an `UnknownError` outcome without a code and continue
    #[default]
    Record,
}

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Per-request timeout, unless the provider overrides it
    pub timeout: Duration,
    /// Transport fault handling
    pub fault_policy: FaultPolicy,
    /// Extra attempts for retryable outcomes (0 disables retries)
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            fault_policy: FaultPolicy::Record,
            retry_attempts: 0,
            retry_delay_ms: 1000,
        }
    }
}

/// Progress callbacks for [`Prober::probe_batch`]. All methods default to no-ops.
pub trait BatchObserver {
    /// A provider is about to be probed.
    fn on_start(&mut self, _provider: &dyn LlmProvider) {}

    /// A retryable outcome will be probed again after `wait`.
    fn on_retry(&mut self, _outcome: &ProbeOutcome, _attempt: u32, _wait: Duration) {}

    /// A provider's final outcome is ready.
    fn on_outcome(&mut self, _outcome: &ProbeOutcome) {}
}

impl BatchObserver for () {}

/// Probes providers through a [`Transport`].
pub struct Prober {
    transport: Arc<dyn Transport>,
    excerpt_chars: usize,
}

impl Prober {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }

    pub fn with_excerpt_chars(mut self, excerpt_chars: usize) -> Self {
        self.excerpt_chars = excerpt_chars;
        self
    }

    /// Probe one provider.
    ///
    /// Candidate formats are sent in order; the next one is tried only after
    /// a `BadRequest` rejection. Timeouts become [`ProbeStatus::Timeout`].
    /// Other transport faults return [`ProbeError::Transport`].
    pub async fn probe(
        &self,
        provider: &dyn LlmProvider,
        prompt: &TestPrompt,
        timeout: Duration,
    ) -> Result<ProbeOutcome, ProbeError> {
        let start = Instant::now();
        let candidates = provider.build_requests(prompt);
        let total = candidates.len();
        let mut last: Option<(Classified, u16, usize)> = None;

        for (idx, request) in candidates.iter().enumerate() {
            tracing::debug!(
                provider = provider.name(),
                model = provider.model(),
                format = %request.format_label,
                url = request.redacted_url(),
                "Sending probe request ({}/{total})",
                idx + 1
            );

            let raw = match self.transport.send(request, timeout).await {
                Ok(raw) => raw,
                Err(TransportError::Timeout) => {
                    let outcome = ProbeOutcome {
                        provider_name: provider.name().to_string(),
                        model: provider.model().to_string(),
                        status: ProbeStatus::Timeout,
                        excerpt: format!("no response within {}ms", timeout.as_millis()),
                        token_usage: None,
                        http_status: None,
                        latency_ms: start.elapsed().as_millis() as u64,
                        format_index: Some(idx + 1),
                        formats_tried: idx + 1,
                    };
                    log_outcome(&outcome);
                    return Ok(outcome);
                }
                Err(TransportError::Connection(message)) => {
                    return Err(ProbeError::Transport {
                        provider: provider.name().to_string(),
                        model: provider.model().to_string(),
                        message,
                        latency_ms: start.elapsed().as_millis() as u64,
                        attempts: idx + 1,
                    });
                }
            };

            let classified = provider.classify_response(raw.status, &raw.body, self.excerpt_chars);
            let rejected = classified.status.is_format_rejection();
            last = Some((classified, raw.status, idx + 1));

            if rejected && idx + 1 < total {
                tracing::debug!(
                    "{}/{}: format '{}' rejected with HTTP {}, trying next",
                    provider.name(),
                    provider.model(),
                    request.format_label,
                    raw.status
                );
                continue;
            }
            break;
        }

        let outcome = match last {
            Some((classified, http_status, format_index)) => ProbeOutcome {
                provider_name: provider.name().to_string(),
                model: provider.model().to_string(),
                status: classified.status,
                excerpt: classified.excerpt,
                token_usage: classified.token_usage,
                http_status: Some(http_status),
                latency_ms: start.elapsed().as_millis() as u64,
                format_index: Some(format_index),
                formats_tried: format_index,
            },
            None => ProbeOutcome {
                provider_name: provider.name().to_string(),
                model: provider.model().to_string(),
                status: ProbeStatus::UnknownError { code: None },
                excerpt: "provider rendered no request".to_string(),
                token_usage: None,
                http_status: None,
                latency_ms: 0,
                format_index: None,
                formats_tried: 0,
            },
        };
        log_outcome(&outcome);
        Ok(outcome)
    }

    /// Probe every provider in order, one at a time.
    ///
    /// Returns exactly one outcome per provider unless the fault policy is
    /// [`FaultPolicy::Abort`] and a transport fault occurs.
    pub async fn probe_batch(
        &self,
        providers: &[Box<dyn LlmProvider>],
        prompt: &TestPrompt,
        options: &BatchOptions,
        observer: &mut dyn BatchObserver,
    ) -> Result<Vec<ProbeOutcome>, ProbeError> {
        let mut outcomes = Vec::with_capacity(providers.len());

        for provider in providers {
            let provider = provider.as_ref();
            observer.on_start(provider);
            let timeout = provider.timeout().unwrap_or(options.timeout);

            let mut attempt = 0u32;
            let outcome = loop {
                let outcome = match self.probe(provider, prompt, timeout).await {
                    Ok(outcome) => outcome,
                    Err(ProbeError::Transport {
                        message,
                        latency_ms,
                        attempts,
                        ..
                    }) if options.fault_policy == FaultPolicy::Record => {
                        tracing::warn!(
                            "Transport fault probing {}/{}: {message}",
                            provider.name(),
                            provider.model()
                        );
                        fault_outcome(provider, message, latency_ms, attempts)
                    }
                    Err(e) => return Err(e),
                };

                if attempt < options.retry_attempts && retry::is_retryable(&outcome.status) {
                    let wait = retry::wait_hint(&outcome.status, attempt, options.retry_delay_ms);
                    attempt += 1;
                    tracing::debug!(
                        "Retry {attempt}/{} for {} after {wait:?}",
                        options.retry_attempts,
                        outcome.display_name()
                    );
                    observer.on_retry(&outcome, attempt, wait);
                    tokio::time::sleep(wait).await;
                    continue;
                }
                break outcome;
            };

            observer.on_outcome(&outcome);
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

fn fault_outcome(
    provider: &dyn LlmProvider,
    message: String,
    latency_ms: u64,
    attempts: usize,
) -> ProbeOutcome {
    ProbeOutcome {
        provider_name: provider.name().to_string(),
        model: provider.model().to_string(),
        status: ProbeStatus::UnknownError { code: None },
        excerpt: message,
        token_usage: None,
        http_status: None,
        latency_ms,
        format_index: Some(attempts),
        formats_tried: attempts,
    }
}

fn log_outcome(outcome: &ProbeOutcome) {
    if outcome.status.is_success() {
        tracing::info!(
            "{}: {} in {}ms",
            outcome.display_name(),
            outcome.status,
            outcome.latency_ms
        );
    } else {
        tracing::info!(
            "{}: {} - {}",
            outcome.display_name(),
            outcome.status,
            outcome.excerpt
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::{LlmProviderFactory, ProviderDescriptor, RequestShape};
    use crate::llm::request::{ApiKey, AuthScheme, ProbeRequest};
    use crate::llm::transport::RawResponse;
    use crate::prompt::{ImageInput, ImageRef};
    use crate::types::RetryAfter;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    type ResponseFn =
        Box<dyn Fn(u32, &ProbeRequest) -> Result<RawResponse, TransportError> + Send + Sync>;

    /// A scripted transport.
    ///
    /// Each call to `send()` invokes the response factory with the current
    /// call index and the request, so tests can answer per attempt or per URL.
    struct MockTransport {
        response_fn: ResponseFn,
        call_count: AtomicU32,
        /// Format labels of every request sent, in order.
        seen: Mutex<Vec<String>>,
    }

    impl MockTransport {
        fn new(
            f: impl Fn(u32, &ProbeRequest) -> Result<RawResponse, TransportError>
                + Send
                + Sync
                + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                response_fn: Box::new(f),
                call_count: AtomicU32::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn always(status: u16, body: &str) -> Arc<Self> {
            let body = body.to_string();
            Self::new(move |_, _| {
                Ok(RawResponse {
                    status,
                    body: body.clone(),
                })
            })
        }

        fn calls(&self) -> u32 {
            self.call_count.load(Ordering::SeqCst)
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(
            &self,
            request: &ProbeRequest,
            _timeout: Duration,
        ) -> Result<RawResponse, TransportError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.format_label.clone());
            (self.response_fn)(idx, request)
        }
    }

    fn resp(status: u16, body: &str) -> Result<RawResponse, TransportError> {
        Ok(RawResponse {
            status,
            body: body.to_string(),
        })
    }

    fn provider(name: &str, model: &str, shape: RequestShape) -> Box<dyn LlmProvider> {
        LlmProviderFactory::create(ProviderDescriptor {
            provider_name: name.to_string(),
            endpoint_url: format!("https://{name}.test"),
            auth: AuthScheme::Bearer(ApiKey::new("k")),
            model: model.to_string(),
            shape,
            timeout: None,
        })
    }

    fn groq(model: &str) -> Box<dyn LlmProvider> {
        provider("groq", model, RequestShape::ChatCompletions)
    }

    fn huggingface() -> Box<dyn LlmProvider> {
        provider(
            "huggingface",
            "meta-llama/Llama-3.2-11B-Vision-Instruct",
            RequestShape::HuggingFace,
        )
    }

    fn vision_prompt() -> TestPrompt {
        TestPrompt::text("What color is this image?", 50)
            .with_image(ImageRef::Inline(ImageInput::red_pixel()))
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_probe_chat_success_end_to_end() {
        let transport = MockTransport::always(200, r#"{"choices":[{"message":{"content":"Ciao!"}}]}"#);
        let prober = Prober::new(transport.clone());
        let outcome = prober
            .probe(groq("llama-3.3-70b-versatile").as_ref(), &TestPrompt::default(), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(outcome.status, ProbeStatus::Success);
        assert_eq!(outcome.excerpt, "Ciao!");
        assert_eq!(outcome.http_status, Some(200));
        assert_eq!(outcome.format_index, Some(1));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_probe_timeout_is_status_not_error() {
        let transport = MockTransport::new(|_, _| Err(TransportError::Timeout));
        let prober = Prober::new(transport);
        let outcome = prober
            .probe(groq("m").as_ref(), &TestPrompt::default(), TIMEOUT)
            .await
            .unwrap();
        assert_eq!(outcome.status, ProbeStatus::Timeout);
        assert_eq!(outcome.http_status, None);
        assert!(outcome.excerpt.contains("5000ms"));
    }

    #[tokio::test]
    async fn test_probe_connection_fault_propagates() {
        let transport =
            MockTransport::new(|_, _| Err(TransportError::Connection("dns error".to_string())));
        let prober = Prober::new(transport);
        let err = prober
            .probe(groq("m").as_ref(), &TestPrompt::default(), TIMEOUT)
            .await
            .unwrap_err();
        match err {
            ProbeError::Transport {
                provider, message, ..
            } => {
                assert_eq!(provider, "groq");
                assert_eq!(message, "dns error");
            }
            other => panic!("Expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_huggingface_walks_formats_until_accepted() {
        // First format rejected (422), second accepted
        let transport = MockTransport::new(|idx, _| match idx {
            0 => resp(422, r#"{"error":"Input validation error"}"#),
            _ => resp(200, r#"[{"generated_text":"red"}]"#),
        });
        let prober = Prober::new(transport.clone());
        let outcome = prober
            .probe(huggingface().as_ref(), &vision_prompt(), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(outcome.status, ProbeStatus::Success);
        assert_eq!(outcome.excerpt, "red");
        assert_eq!(outcome.format_index, Some(2));
        assert_eq!(outcome.formats_tried, 2);
        assert_eq!(transport.seen(), vec!["inputs-object", "messages"]);
    }

    #[tokio::test]
    async fn test_huggingface_stops_on_definitive_error() {
        let transport = MockTransport::always(403, "Access to model is restricted");
        let prober = Prober::new(transport.clone());
        let outcome = prober
            .probe(huggingface().as_ref(), &vision_prompt(), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(outcome.status, ProbeStatus::Forbidden);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_huggingface_cold_start_reported_not_waited() {
        let transport = MockTransport::always(
            503,
            r#"{"error":"Model is currently loading","estimated_time":42.0}"#,
        );
        let prober = Prober::new(transport.clone());
        let outcome = prober
            .probe(huggingface().as_ref(), &vision_prompt(), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(
            outcome.status,
            ProbeStatus::TransientUnavailable {
                retry_after: RetryAfter::Seconds(42.0)
            }
        );
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_huggingface_all_formats_rejected() {
        let transport = MockTransport::always(400, "bad input");
        let prober = Prober::new(transport.clone());
        let outcome = prober
            .probe(huggingface().as_ref(), &vision_prompt(), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(outcome.status, ProbeStatus::BadRequest);
        assert_eq!(outcome.formats_tried, 3);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_batch_one_outcome_per_provider() {
        // Calls map 1:1 to providers here: all chat-shaped, single candidate
        let transport = MockTransport::new(|idx, _| match idx {
            0 => resp(401, "invalid key"),
            1 => resp(429, "rate limited"),
            2 => resp(500, "boom"),
            _ => resp(200, r#"{"choices":[{"message":{"content":"Ciao!"}}]}"#),
        });
        let providers: Vec<_> = ["a", "b", "c", "d"].iter().map(|m| groq(m)).collect();
        let prober = Prober::new(transport);
        let outcomes = prober
            .probe_batch(&providers, &TestPrompt::default(), &BatchOptions::default(), &mut ())
            .await
            .unwrap();

        assert_eq!(outcomes.len(), providers.len());
        let models: Vec<&str> = outcomes.iter().map(|o| o.model.as_str()).collect();
        assert_eq!(models, vec!["a", "b", "c", "d"]);
        assert_eq!(outcomes[0].status, ProbeStatus::Unauthorized);
        assert_eq!(outcomes[1].status, ProbeStatus::RateLimited);
        assert_eq!(outcomes[2].status, ProbeStatus::UnknownError { code: Some(500) });
        assert_eq!(outcomes[3].status, ProbeStatus::Success);
    }

    #[tokio::test]
    async fn test_batch_records_transport_fault() {
        let transport = MockTransport::new(|idx, _| match idx {
            0 => Err(TransportError::Connection("connection reset".to_string())),
            _ => resp(200, r#"{"choices":[{"message":{"content":"hi"}}]}"#),
        });
        let providers = vec![groq("a"), groq("b")];
        let prober = Prober::new(transport);
        let outcomes = prober
            .probe_batch(&providers, &TestPrompt::default(), &BatchOptions::default(), &mut ())
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].status, ProbeStatus::UnknownError { code: None });
        assert_eq!(outcomes[0].excerpt, "connection reset");
        assert!(outcomes[1].status.is_success());
    }

    #[tokio::test]
    async fn test_recorded_fault_keeps_attempts_and_latency() {
        // Inline form is rejected, the messages form dies mid-flight
        let transport = MockTransport::new(|idx, _| match idx {
            0 => resp(422, "unsupported input"),
            _ => {
                std::thread::sleep(Duration::from_millis(5));
                Err(TransportError::Connection("connection reset".to_string()))
            }
        });
        let prober = Prober::new(transport);
        let outcomes = prober
            .probe_batch(&[huggingface()], &vision_prompt(), &BatchOptions::default(), &mut ())
            .await
            .unwrap();

        let outcome = &outcomes[0];
        assert_eq!(outcome.status, ProbeStatus::UnknownError { code: None });
        assert_eq!(outcome.formats_tried, 2);
        assert_eq!(outcome.format_index, Some(2));
        assert!(outcome.latency_ms >= 5);
    }

    #[tokio::test]
    async fn test_groq_remote_image_falls_back_to_inline() {
        let transport = MockTransport::new(|idx, _| match idx {
            0 => resp(400, r#"{"error":{"message":"failed to retrieve media"}}"#),
            _ => resp(200, r#"{"choices":[{"message":{"content":"Red"}}]}"#),
        });
        let prompt = TestPrompt::text("What color is this image?", 50)
            .with_image(ImageRef::Remote("https://example.com/cat.png".to_string()))
            .with_fallback_image(ImageInput::red_pixel());
        let prober = Prober::new(transport.clone());
        let outcome = prober
            .probe(groq("meta-llama/llama-4-scout-17b-16e-instruct").as_ref(), &prompt, TIMEOUT)
            .await
            .unwrap();

        assert_eq!(outcome.status, ProbeStatus::Success);
        assert_eq!(outcome.excerpt, "Red");
        assert_eq!(outcome.format_index, Some(2));
        assert_eq!(
            transport.seen(),
            vec!["chat-completions", "chat-completions-inline"]
        );
    }

    #[tokio::test]
    async fn test_huggingface_text_walks_to_messages() {
        let transport = MockTransport::new(|idx, _| match idx {
            0 => resp(422, r#"{"error":"Template error: inputs must be a list"}"#),
            _ => resp(200, r#"[{"generated_text":"Ciao!"}]"#),
        });
        let prober = Prober::new(transport.clone());
        let outcome = prober
            .probe(huggingface().as_ref(), &TestPrompt::default(), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(outcome.status, ProbeStatus::Success);
        assert_eq!(outcome.excerpt, "Ciao!");
        assert_eq!(outcome.formats_tried, 2);
        assert_eq!(transport.seen(), vec!["inputs-text", "messages"]);
    }

    #[tokio::test]
    async fn test_batch_abort_policy_returns_error() {
        let transport = MockTransport::new(|_, _| Err(TransportError::Connection("refused".into())));
        let providers = vec![groq("a"), groq("b")];
        let options = BatchOptions {
            fault_policy: FaultPolicy::Abort,
            ..BatchOptions::default()
        };
        let prober = Prober::new(transport.clone());
        let result = prober
            .probe_batch(&providers, &TestPrompt::default(), &options, &mut ())
            .await;

        assert!(matches!(result, Err(ProbeError::Transport { .. })));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_batch_retries_when_opted_in() {
        let transport = MockTransport::new(|idx, _| match idx {
            0 => resp(429, "rate limited"),
            _ => resp(200, r#"{"choices":[{"message":{"content":"Recovered"}}]}"#),
        });
        let options = BatchOptions {
            retry_attempts: 2,
            retry_delay_ms: 1,
            ..BatchOptions::default()
        };

        #[derive(Default)]
        struct Recorder {
            retries: u32,
            outcomes: u32,
        }
        impl BatchObserver for Recorder {
            fn on_retry(&mut self, _: &ProbeOutcome, _: u32, _: Duration) {
                self.retries += 1;
            }
            fn on_outcome(&mut self, _: &ProbeOutcome) {
                self.outcomes += 1;
            }
        }

        let mut recorder = Recorder::default();
        let prober = Prober::new(transport.clone());
        let outcomes = prober
            .probe_batch(&[groq("a")], &TestPrompt::default(), &options, &mut recorder)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].excerpt, "Recovered");
        assert_eq!(transport.calls(), 2);
        assert_eq!(recorder.retries, 1);
        assert_eq!(recorder.outcomes, 1);
    }

    #[tokio::test]
    async fn test_batch_does_not_retry_by_default() {
        let transport = MockTransport::always(429, "rate limited");
        let prober = Prober::new(transport.clone());
        let outcomes = prober
            .probe_batch(&[groq("a")], &TestPrompt::default(), &BatchOptions::default(), &mut ())
            .await
            .unwrap();
        assert_eq!(outcomes[0].status, ProbeStatus::RateLimited);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_excerpt_truncated_to_configured_length() {
        let long = format!(r#"{{"choices":[{{"message":{{"content":"{}"}}}}]}}"#, "a".repeat(50));
        let transport = MockTransport::always(200, &long);
        let prober = Prober::new(transport).with_excerpt_chars(10);
        let outcome = prober
            .probe(groq("m").as_ref(), &TestPrompt::default(), TIMEOUT)
            .await
            .unwrap();
        assert_eq!(outcome.excerpt, format!("{}...", "a".repeat(10)));
    }
}
