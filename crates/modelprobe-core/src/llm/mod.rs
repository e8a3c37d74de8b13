//! Hosted LLM endpoint probing.
//!
//! Provides a provider abstraction over several inference backends (Gemini,
//! OpenAI-compatible Chat Completions, HuggingFace Inference), response
//! classification, and a sequential prober that turns each provider into
//! exactly one outcome.

pub mod catalog;
pub(crate) mod classify;
pub(crate) mod gemini;
pub(crate) mod huggingface;
pub(crate) mod openai;
pub mod prober;
pub mod provider;
pub mod request;
pub mod retry;
pub mod transport;

pub use classify::Classified;
pub use prober::{BatchObserver, BatchOptions, FaultPolicy, Prober};
pub use provider::{LlmProvider, LlmProviderFactory, ProviderDescriptor, RequestShape};
pub use request::{ApiKey, AuthScheme, ProbeRequest};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};
