//! Sub-configuration structs with their defaults.

use crate::prompt::{DEFAULT_TEXT_PROMPT, DEFAULT_VISION_PROMPT};
use serde::{Deserialize, Serialize};

/// Probe run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Characters of generated text or error body kept per outcome
    pub excerpt_chars: usize,

    /// Prompt for text-only probes
    pub text_prompt: String,

    /// Prompt for vision probes
    pub vision_prompt: String,

    /// Edge length in pixels of the generated red test image
    pub image_size: u32,

    /// Remote image for vision probes; the generated test image when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Extra attempts for retryable outcomes (0 disables retries)
    pub retry_attempts: u32,

    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_tokens: 50,
            excerpt_chars: 300,
            text_prompt: DEFAULT_TEXT_PROMPT.to_string(),
            vision_prompt: DEFAULT_VISION_PROMPT.to_string(),
            image_size: 1,
            image_url: None,
            retry_attempts: 0,
            retry_delay_ms: 1000,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default dump format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Hosted provider configurations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    pub gemini: GeminiConfig,
    pub groq: GroqConfig,
    pub huggingface: HuggingFaceConfig,
}

impl ProvidersConfig {
    /// Whether the named provider is enabled. Unknown names are not.
    pub fn is_enabled(&self, provider: &str) -> bool {
        match provider {
            "gemini" => self.gemini.enabled,
            "groq" => self.groq.enabled,
            "huggingface" => self.huggingface.enabled,
            _ => false,
        }
    }

    /// `(name, enabled, models, timeout_ms)` for every provider section.
    pub(crate) fn sections(&self) -> [(&'static str, bool, &[String], Option<u64>); 3] {
        [
            (
                "gemini",
                self.gemini.enabled,
                self.gemini.models.as_slice(),
                self.gemini.timeout_ms,
            ),
            ("groq", self.groq.enabled, self.groq.models.as_slice(), self.groq.timeout_ms),
            (
                "huggingface",
                self.huggingface.enabled,
                self.huggingface.models.as_slice(),
                self.huggingface.timeout_ms,
            ),
        ]
    }
}

/// Google Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub enabled: bool,

    /// API base, without the `/models/...` suffix
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Models probed in order
    pub models: Vec<String>,

    /// Timeout override in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
            models: vec!["gemini-2.5-pro".to_string(), "gemini-2.0-flash".to_string()],
            timeout_ms: None,
        }
    }
}

/// Groq configuration (OpenAI-compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroqConfig {
    pub enabled: bool,

    /// API base, without the `/chat/completions` suffix
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Models probed in order
    pub models: Vec<String>,

    /// Timeout override in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.groq.com/openai/v1".to_string(),
            api_key: "${GROQ_API_KEY}".to_string(),
            models: vec![
                "meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
                "llama-3.3-70b-versatile".to_string(),
            ],
            timeout_ms: None,
        }
    }
}

/// HuggingFace Inference API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HuggingFaceConfig {
    pub enabled: bool,

    /// Inference API base; the model id is appended
    pub endpoint: String,

    /// Hub metadata API used by `models info`
    pub hub_endpoint: String,

    /// Access token (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Models probed in order
    pub models: Vec<String>,

    /// Timeout override in milliseconds. Cold starts are slow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            hub_endpoint: "https://huggingface.co/api/models".to_string(),
            api_key: "${HF_TOKEN}".to_string(),
            models: vec![
                "meta-llama/Llama-3.2-11B-Vision-Instruct".to_string(),
                "Qwen/Qwen2-VL-7B-Instruct".to_string(),
            ],
            timeout_ms: Some(60000),
        }
    }
}

/// Fallback cascade settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Provider priority, highest first
    pub order: Vec<String>,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            order: vec![
                "gemini".to_string(),
                "groq".to_string(),
                "huggingface".to_string(),
            ],
        }
    }
}
