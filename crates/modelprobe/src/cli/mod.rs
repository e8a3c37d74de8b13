//! Command handlers.

pub mod config;
pub mod models;
pub mod probe;

use clap::ValueEnum;

/// Providers selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderName {
    /// Google Gemini
    Gemini,
    /// Groq (OpenAI-compatible)
    Groq,
    /// HuggingFace Inference API
    Huggingface,
}

impl ProviderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::Gemini => "gemini",
            ProviderName::Groq => "groq",
            ProviderName::Huggingface => "huggingface",
        }
    }
}

impl std::fmt::Display for ProviderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
