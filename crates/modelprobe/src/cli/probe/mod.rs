//! The `modelprobe probe` command.

mod progress;
mod render;

use super::ProviderName;
use clap::{Args, ValueEnum};
use modelprobe_core::{
    Config, FaultPolicy, ImageInput, ImageRef, ModelProbe, OutputFormat as CoreOutputFormat,
    ReportWriter, TestPrompt,
};
use progress::SpinnerObserver;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Report dump formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Whole report as one JSON document
    Json,
    /// One outcome per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Arguments for the `probe` command.
#[derive(Args, Debug, Default)]
pub struct ProbeArgs {
    /// Providers to probe (repeatable); defaults to every enabled provider
    #[arg(short, long = "provider", value_enum)]
    pub providers: Vec<ProviderName>,

    /// Models to probe instead of the configured list (repeatable)
    #[arg(short, long = "model")]
    pub models: Vec<String>,

    /// Prompt text, replacing the configured one
    #[arg(long)]
    pub prompt: Option<String>,

    /// Attach a test image (vision probe)
    #[arg(long)]
    pub vision: bool,

    /// Remote image to attach; implies --vision
    #[arg(long, conflicts_with = "image_file")]
    pub image_url: Option<String>,

    /// Local image file to attach inline; implies --vision
    #[arg(long)]
    pub image_file: Option<PathBuf>,

    /// Per-request timeout in seconds (at most one day)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=86_400))]
    pub timeout: Option<u64>,

    /// Maximum tokens to generate
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_tokens: Option<u32>,

    /// Extra attempts for rate-limited, loading or timed-out models
    #[arg(long)]
    pub retries: Option<u32>,

    /// Stop at the first network fault instead of recording it
    #[arg(long)]
    pub abort_on_fault: bool,

    /// Also write the report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report file format (defaults to output.format from config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl ProbeArgs {
    fn wants_vision(&self) -> bool {
        self.vision || self.image_url.is_some() || self.image_file.is_some()
    }

    /// Fold command-line overrides into the loaded config.
    fn apply_to(&self, config: &mut Config) {
        // An explicit timeout also replaces per-provider overrides
        if let Some(secs) = self.timeout {
            config.probe.timeout_ms = secs.saturating_mul(1000);
            config.providers.gemini.timeout_ms = None;
            config.providers.groq.timeout_ms = None;
            config.providers.huggingface.timeout_ms = None;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.probe.max_tokens = max_tokens;
        }
        if let Some(retries) = self.retries {
            config.probe.retry_attempts = retries;
        }
        if let Some(ref url) = self.image_url {
            config.probe.image_url = Some(url.clone());
        }
    }
}

/// Execute the probe command.
pub async fn execute(args: ProbeArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply_to(&mut config);
    let report_format = args
        .format
        .map(CoreOutputFormat::from)
        .or_else(|| CoreOutputFormat::parse(&config.output.format))
        .unwrap_or(CoreOutputFormat::Json);
    let pretty = config.output.pretty;

    let probe = ModelProbe::new(config);
    let prompt = build_prompt(&probe, &args)?;

    let selection: Vec<String> = args.providers.iter().map(|p| p.to_string()).collect();
    let providers = probe.providers(&selection, &args.models)?;
    if providers.is_empty() {
        anyhow::bail!(
            "No providers to probe. Set GEMINI_API_KEY, GROQ_API_KEY or HF_TOKEN, \
             or configure api_key in {}",
            Config::default_path().display()
        );
    }
    tracing::info!(
        "Probing {} model(s) with a {} prompt",
        providers.len(),
        if prompt.is_vision() { "vision" } else { "text" }
    );

    let mut options = probe.batch_options();
    if args.abort_on_fault {
        options.fault_policy = FaultPolicy::Abort;
    }

    let mut observer = SpinnerObserver::new(providers.len() as u64);
    let result = probe.run(&providers, &prompt, &options, &mut observer).await;
    observer.finish();
    let report = result?;

    println!("{}", render::summary(&report));

    if let Some(ref output) = args.output {
        let path = PathBuf::from(shellexpand::tilde(&output.to_string_lossy()).into_owned());
        let file = File::create(&path)?;
        let mut writer = ReportWriter::new(BufWriter::new(file), report_format, pretty);
        writer.write_report(&report)?;
        tracing::info!("Report written to {:?}", path);
    }

    if report.recommended.is_none() {
        anyhow::bail!("none of the {} probed model(s) responded", report.summary.total);
    }
    Ok(())
}

fn build_prompt(probe: &ModelProbe, args: &ProbeArgs) -> anyhow::Result<TestPrompt> {
    let mut prompt = if args.wants_vision() {
        let image = match &args.image_file {
            Some(path) => Some(ImageRef::Inline(load_image(path)?)),
            None => None,
        };
        probe.vision_prompt(image)?
    } else {
        probe.text_prompt()
    };
    if let Some(ref text) = args.prompt {
        prompt.text = text.clone();
    }
    Ok(prompt)
}

fn load_image(path: &Path) -> anyhow::Result<ImageInput> {
    let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    let bytes = std::fs::read(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read image {}: {e}", path.display()))?;
    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();
    Ok(ImageInput::from_bytes(&bytes, &format))
}
