//! modelprobe core - availability probing for hosted LLM endpoints.
//!
//! Sends one small fixed prompt to each configured (provider, model) pair,
//! classifies the answer into a [`ProbeStatus`], and picks the first working
//! entry of a priority-ordered fallback cascade.
//!
//! # Architecture
//!
//! ```text
//! Config → Descriptors → Prober (candidate formats → Transport → classify) → Outcomes → Cascade
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use modelprobe_core::{Config, ModelProbe};
//!
//! #[tokio::main]
//! async fn main() -> modelprobe_core::Result<()> {
//!     let probe = ModelProbe::new(Config::load()?);
//!     let providers = probe.providers(&[], &[])?;
//!     let report = probe
//!         .run(&providers, &probe.text_prompt(), &probe.batch_options(), &mut ())
//!         .await?;
//!     println!("Use: {:?}", report.recommended);
//!     Ok(())
//! }
//! ```

pub mod cascade;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod prompt;
pub mod report;
pub mod types;

pub use cascade::{select, Selection};
pub use config::Config;
pub use error::{ConfigError, ProbeError, Result};
pub use llm::{
    BatchObserver, BatchOptions, FaultPolicy, HttpTransport, LlmProvider, LlmProviderFactory,
    Prober, Transport,
};
pub use output::{OutputFormat, ReportWriter};
pub use prompt::{ImageInput, ImageRef, TestPrompt};
pub use report::{ProbeReport, Summary};
pub use types::{ProbeOutcome, ProbeStatus, RetryAfter, TokenUsage};

use std::sync::Arc;
use std::time::Duration;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry point tying configuration, transport and prober together.
pub struct ModelProbe {
    config: Config,
    prober: Prober,
}

impl ModelProbe {
    /// Create a probe session over real HTTP.
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Create a probe session over a custom transport.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        tracing::debug!("Initializing modelprobe v{}", VERSION);
        let prober = Prober::new(transport).with_excerpt_chars(config.probe.excerpt_chars);
        Self { config, prober }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Text-only prompt from config.
    pub fn text_prompt(&self) -> TestPrompt {
        TestPrompt::text(&self.config.probe.text_prompt, self.config.probe.max_tokens)
    }

    /// Vision prompt from config.
    ///
    /// `image` wins over the configured `image_url`; with neither, a red
    /// square of `image_size` pixels is attached. Remote images carry that
    /// square as their inline fallback.
    pub fn vision_prompt(&self, image: Option<ImageRef>) -> Result<TestPrompt> {
        let image = match (image, &self.config.probe.image_url) {
            (Some(image), _) => image,
            (None, Some(url)) => ImageRef::Remote(url.clone()),
            (None, None) => ImageRef::Inline(self.test_image()?),
        };
        let prompt =
            TestPrompt::text(&self.config.probe.vision_prompt, self.config.probe.max_tokens);
        Ok(match image {
            ImageRef::Remote(_) => prompt
                .with_image(image)
                .with_fallback_image(self.test_image()?),
            ImageRef::Inline(_) => prompt.with_image(image),
        })
    }

    fn test_image(&self) -> Result<ImageInput> {
        match self.config.probe.image_size {
            0 | 1 => Ok(ImageInput::red_pixel()),
            size => ImageInput::solid_png(size, size, [255, 0, 0, 255]),
        }
    }

    /// Batch options from config, with the default fault policy.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            timeout: self.config.timeout(),
            retry_attempts: self.config.probe.retry_attempts,
            retry_delay_ms: self.config.probe.retry_delay_ms,
            ..BatchOptions::default()
        }
    }

    /// Providers for `selection` in cascade order. See
    /// [`LlmProviderFactory::from_config`].
    pub fn providers(
        &self,
        selection: &[String],
        model_override: &[String],
    ) -> Result<Vec<Box<dyn LlmProvider>>> {
        Ok(LlmProviderFactory::from_config(
            &self.config,
            selection,
            model_override,
        )?)
    }

    /// Probe a single provider.
    pub async fn probe_one(
        &self,
        provider: &dyn LlmProvider,
        prompt: &TestPrompt,
        timeout: Duration,
    ) -> Result<ProbeOutcome> {
        self.prober.probe(provider, prompt, timeout).await
    }

    /// Probe every provider in order and build the report.
    pub async fn run(
        &self,
        providers: &[Box<dyn LlmProvider>],
        prompt: &TestPrompt,
        options: &BatchOptions,
        observer: &mut dyn BatchObserver,
    ) -> Result<ProbeReport> {
        let outcomes = self
            .prober
            .probe_batch(providers, prompt, options, observer)
            .await?;
        Ok(ProbeReport::new(prompt, outcomes))
    }
}
