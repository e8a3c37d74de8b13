//! Provider trait, descriptors, and the factory that builds them.
//!
//! Every hosted endpoint is reached through one [`LlmProvider`] variant that
//! knows how to render candidate requests and read the response body. The
//! factory turns config sections into descriptors, one per model.

use super::classify::{self, Classified};
use super::request::{ApiKey, AuthScheme, ProbeRequest};
use crate::config::{Config, ProvidersConfig};
use crate::error::ConfigError;
use crate::prompt::TestPrompt;
use crate::types::TokenUsage;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

/// Providers the factory knows how to build.
pub const KNOWN_PROVIDERS: &[&str] = &["gemini", "groq", "huggingface"];

/// Request/response shape a descriptor speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// Gemini `generateContent`
    Gemini,
    /// OpenAI-compatible Chat Completions
    ChatCompletions,
    /// HuggingFace Inference API, several candidate payloads
    HuggingFace,
}

/// Everything needed to probe one model. Immutable once built.
#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    pub provider_name: String,
    pub endpoint_url: String,
    pub auth: AuthScheme,
    pub model: String,
    pub shape: RequestShape,
    /// Per-provider timeout, overriding the run default
    pub timeout: Option<Duration>,
}

/// Trait that all provider variants implement.
///
/// Building requests and reading bodies is pure; the network call belongs to
/// the [`Prober`](super::prober::Prober).
pub trait LlmProvider: Send + Sync {
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Provider name for logging (e.g., "gemini", "groq").
    fn name(&self) -> &str {
        &self.descriptor().provider_name
    }

    fn model(&self) -> &str {
        &self.descriptor().model
    }

    /// Per-request timeout for this provider, if it overrides the default.
    fn timeout(&self) -> Option<Duration> {
        self.descriptor().timeout
    }

    /// Candidate requests for `prompt`, in the order they should be tried.
    fn build_requests(&self, prompt: &TestPrompt) -> Vec<ProbeRequest>;

    /// Generated text from a successful response body.
    fn extract_text(&self, body: &Value) -> Option<String>;

    /// Token accounting from a successful response body.
    fn extract_usage(&self, _body: &Value) -> Option<TokenUsage> {
        None
    }

    /// Map a raw response to a status, excerpt and usage.
    fn classify_response(&self, status: u16, body: &str, excerpt_chars: usize) -> Classified {
        classify::classify_response(self, status, body, excerpt_chars)
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Resolve a credential reference, naming the missing variable on failure.
pub fn resolve_credential(provider: &str, value: &str) -> Result<ApiKey, ConfigError> {
    resolve_env_var(value)
        .map(ApiKey::new)
        .ok_or_else(|| ConfigError::MissingCredential {
            provider: provider.to_string(),
            variable: value
                .strip_prefix("${")
                .and_then(|v| v.strip_suffix('}'))
                .unwrap_or("api_key")
                .to_string(),
        })
}

/// Factory that creates providers from descriptors and config.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Build the provider variant matching the descriptor's shape.
    pub fn create(descriptor: ProviderDescriptor) -> Box<dyn LlmProvider> {
        match descriptor.shape {
            RequestShape::Gemini => Box::new(super::gemini::GeminiProvider::new(descriptor)),
            RequestShape::ChatCompletions => {
                Box::new(super::openai::OpenAiCompatProvider::new(descriptor))
            }
            RequestShape::HuggingFace => {
                Box::new(super::huggingface::HuggingFaceProvider::new(descriptor))
            }
        }
    }

    /// Descriptors for every model of one provider section.
    ///
    /// # Arguments
    /// * `provider` - Provider identifier ("gemini", "groq", "huggingface")
    /// * `config` - The providers config section
    /// * `model_override` - Models that replace the configured list when non-empty
    pub fn descriptors(
        provider: &str,
        config: &ProvidersConfig,
        model_override: &[String],
    ) -> Result<Vec<ProviderDescriptor>, ConfigError> {
        let (endpoint, auth, models, shape, timeout_ms) = match provider {
            "gemini" => {
                let cfg = &config.gemini;
                let key = resolve_credential(provider, &cfg.api_key)?;
                (
                    cfg.endpoint.trim_end_matches('/').to_string(),
                    AuthScheme::QueryKey {
                        param: "key".to_string(),
                        key,
                    },
                    &cfg.models,
                    RequestShape::Gemini,
                    cfg.timeout_ms,
                )
            }
            "groq" => {
                let cfg = &config.groq;
                let key = resolve_credential(provider, &cfg.api_key)?;
                (
                    cfg.endpoint.trim_end_matches('/').to_string(),
                    AuthScheme::Bearer(key),
                    &cfg.models,
                    RequestShape::ChatCompletions,
                    cfg.timeout_ms,
                )
            }
            "huggingface" => {
                let cfg = &config.huggingface;
                let key = resolve_credential(provider, &cfg.api_key)?;
                (
                    cfg.endpoint.trim_end_matches('/').to_string(),
                    AuthScheme::Bearer(key),
                    &cfg.models,
                    RequestShape::HuggingFace,
                    cfg.timeout_ms,
                )
            }
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Unknown provider: {other}"
                )))
            }
        };

        let models = if model_override.is_empty() {
            models.as_slice()
        } else {
            model_override
        };

        Ok(models
            .iter()
            .map(|model| ProviderDescriptor {
                provider_name: provider.to_string(),
                endpoint_url: endpoint.clone(),
                auth: auth.clone(),
                model: model.clone(),
                shape,
                timeout: timeout_ms.map(Duration::from_millis),
            })
            .collect())
    }

    /// Build providers for `selection` (or every enabled provider when empty),
    /// in cascade order.
    ///
    /// Providers without a resolvable credential are skipped with a warning;
    /// an unknown provider name is an error.
    pub fn from_config(
        config: &Config,
        selection: &[String],
        model_override: &[String],
    ) -> Result<Vec<Box<dyn LlmProvider>>, ConfigError> {
        let mut names: Vec<String> = if selection.is_empty() {
            config
                .cascade
                .order
                .iter()
                .filter(|name| config.providers.is_enabled(name))
                .cloned()
                .collect()
        } else {
            selection.to_vec()
        };
        let mut seen = HashSet::new();
        names.retain(|name| seen.insert(name.clone()));
        crate::cascade::sort_by_priority(&mut names, &config.cascade.order, |n| n.as_str());

        let mut providers = Vec::new();
        for name in &names {
            match Self::descriptors(name, &config.providers, model_override) {
                Ok(descriptors) => providers.extend(descriptors.into_iter().map(Self::create)),
                Err(e @ ConfigError::MissingCredential { .. }) => {
                    tracing::warn!("Skipping {name}: {e}");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(providers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_missing_credential_names_variable() {
        let mut config = ProvidersConfig::default();
        config.groq.api_key = "${MODELPROBE_TEST_UNSET_GROQ}".to_string();
        let err = LlmProviderFactory::descriptors("groq", &config, &[]).unwrap_err();
        assert!(err.to_string().contains("MODELPROBE_TEST_UNSET_GROQ"));
    }

    #[test]
    fn test_descriptors_one_per_model() {
        let mut config = ProvidersConfig::default();
        config.gemini.api_key = "literal-key".to_string();
        config.gemini.models = vec!["gemini-2.5-pro".into(), "gemini-2.0-flash".into()];
        let descriptors = LlmProviderFactory::descriptors("gemini", &config, &[]).unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[1].model, "gemini-2.0-flash");
        assert_eq!(descriptors[0].shape, RequestShape::Gemini);
        assert!(matches!(descriptors[0].auth, AuthScheme::QueryKey { .. }));
    }

    #[test]
    fn test_model_override_replaces_list() {
        let mut config = ProvidersConfig::default();
        config.groq.api_key = "literal-key".to_string();
        let overrides = vec!["llama-3.1-8b-instant".to_string()];
        let descriptors = LlmProviderFactory::descriptors("groq", &config, &overrides).unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].model, "llama-3.1-8b-instant");
    }

    #[test]
    fn test_huggingface_timeout_override() {
        let mut config = ProvidersConfig::default();
        config.huggingface.api_key = "hf_literal".to_string();
        let descriptors = LlmProviderFactory::descriptors("huggingface", &config, &[]).unwrap();
        assert_eq!(descriptors[0].timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_unknown_provider_is_error() {
        let config = ProvidersConfig::default();
        assert!(LlmProviderFactory::descriptors("anthropic", &config, &[]).is_err());
    }

    #[test]
    fn test_from_config_skips_missing_credentials_and_keeps_cascade_order() {
        let mut config = Config::default();
        config.providers.gemini.api_key = "${MODELPROBE_TEST_UNSET_GEMINI}".to_string();
        config.providers.groq.api_key = "gsk_literal".to_string();
        config.providers.groq.models = vec!["a".into()];
        config.providers.huggingface.api_key = "hf_literal".to_string();
        config.providers.huggingface.models = vec!["b".into()];

        let selection = vec!["huggingface".to_string(), "groq".to_string(), "gemini".to_string()];
        let providers = LlmProviderFactory::from_config(&config, &selection, &[]).unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["groq", "huggingface"]);
    }
}
