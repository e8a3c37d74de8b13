//! Model catalog lookups.
//!
//! Lists the models a provider serves and fetches HuggingFace Hub metadata,
//! to help pick identifiers before probing them.

use super::request::{ApiKey, AuthScheme, ProbeRequest};
use super::transport::{Transport, TransportError};
use crate::error::ProbeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

/// One entry of a provider's model listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u64>,
}

#[derive(Deserialize)]
struct OpenAiModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    input_token_limit: Option<u64>,
}

/// HuggingFace Hub metadata for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(alias = "modelId")]
    pub id: String,

    #[serde(default)]
    pub pipeline_tag: Option<String>,

    #[serde(default)]
    pub library_name: Option<String>,

    #[serde(default)]
    pub downloads: Option<u64>,

    /// Inference API state as reported by the Hub ("warm", "cold", ...)
    #[serde(default)]
    pub inference: Option<Value>,

    #[serde(default)]
    pub gated: Option<Value>,
}

async fn fetch(
    transport: &dyn Transport,
    source: &str,
    request: &ProbeRequest,
    timeout: Duration,
) -> Result<Value, ProbeError> {
    let start = Instant::now();
    let raw = transport
        .send(request, timeout)
        .await
        .map_err(|e| ProbeError::Transport {
            provider: source.to_string(),
            model: "-".to_string(),
            message: match e {
                TransportError::Timeout => format!("no response within {}ms", timeout.as_millis()),
                TransportError::Connection(message) => message,
            },
            latency_ms: start.elapsed().as_millis() as u64,
            attempts: 1,
        })?;

    if !(200..300).contains(&raw.status) {
        return Err(ProbeError::Http {
            status: raw.status,
            body: crate::types::truncate_excerpt(&raw.body, 300),
        });
    }
    Ok(serde_json::from_str(&raw.body)?)
}

/// List models from an OpenAI-compatible `GET {endpoint}/models`.
pub async fn list_openai_models(
    transport: &dyn Transport,
    endpoint: &str,
    key: &ApiKey,
    timeout: Duration,
) -> Result<Vec<ModelEntry>, ProbeError> {
    let url = format!("{}/models", endpoint.trim_end_matches('/'));
    let request = ProbeRequest::get(&url, &AuthScheme::Bearer(key.clone()));
    let body = fetch(transport, "openai-compatible", &request, timeout).await?;
    let mut list: OpenAiModelList = serde_json::from_value(body)?;
    list.data.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(list.data)
}

/// List models from Gemini's `GET {endpoint}/models?key=`.
pub async fn list_gemini_models(
    transport: &dyn Transport,
    endpoint: &str,
    key: &ApiKey,
    timeout: Duration,
) -> Result<Vec<ModelEntry>, ProbeError> {
    let url = format!("{}/models", endpoint.trim_end_matches('/'));
    let auth = AuthScheme::QueryKey {
        param: "key".to_string(),
        key: key.clone(),
    };
    let request = ProbeRequest::get(&url, &auth);
    let body = fetch(transport, "gemini", &request, timeout).await?;
    let list: GeminiModelList = serde_json::from_value(body)?;
    Ok(list
        .models
        .into_iter()
        .map(|m| ModelEntry {
            id: m
                .name
                .strip_prefix("models/")
                .unwrap_or(&m.name)
                .to_string(),
            owned_by: Some("google".to_string()),
            context_window: m.input_token_limit,
        })
        .collect())
}

/// Fetch HuggingFace Hub metadata from `GET {hub_endpoint}/{model_id}`.
///
/// A 404 means the model id does not exist.
pub async fn model_info(
    transport: &dyn Transport,
    hub_endpoint: &str,
    model_id: &str,
    timeout: Duration,
) -> Result<ModelInfo, ProbeError> {
    let url = format!("{}/{model_id}", hub_endpoint.trim_end_matches('/'));
    let request = ProbeRequest::get(&url, &AuthScheme::None);
    let body = fetch(transport, "huggingface-hub", &request, timeout).await?;
    Ok(serde_json::from_value(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::transport::RawResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns one canned response and remembers the requested URL.
    struct CannedTransport {
        status: u16,
        body: String,
        last_url: Mutex<Option<String>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                last_url: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn send(
            &self,
            request: &ProbeRequest,
            _timeout: Duration,
        ) -> Result<RawResponse, TransportError> {
            *self.last_url.lock().unwrap() = Some(request.url.clone());
            Ok(RawResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_list_openai_models_sorted() {
        let transport = CannedTransport::new(
            200,
            r#"{"object":"list","data":[
                {"id":"llama-3.3-70b-versatile","owned_by":"Meta","context_window":131072},
                {"id":"gemma2-9b-it","owned_by":"Google"}
            ]}"#,
        );
        let models = list_openai_models(
            &transport,
            "https://api.groq.com/openai/v1/",
            &ApiKey::new("gsk"),
            TIMEOUT,
        )
        .await
        .unwrap();

        let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["gemma2-9b-it", "llama-3.3-70b-versatile"]);
        assert_eq!(models[1].context_window, Some(131072));
        assert_eq!(
            transport.last_url.lock().unwrap().as_deref(),
            Some("https://api.groq.com/openai/v1/models")
        );
    }

    #[tokio::test]
    async fn test_list_gemini_models_strips_prefix() {
        let transport = CannedTransport::new(
            200,
            r#"{"models":[{"name":"models/gemini-2.0-flash","inputTokenLimit":1048576}]}"#,
        );
        let models = list_gemini_models(&transport, "https://g/v1beta", &ApiKey::new("k"), TIMEOUT)
            .await
            .unwrap();
        assert_eq!(models[0].id, "gemini-2.0-flash");
        assert_eq!(models[0].context_window, Some(1048576));
        assert_eq!(
            transport.last_url.lock().unwrap().as_deref(),
            Some("https://g/v1beta/models?key=k")
        );
    }

    #[tokio::test]
    async fn test_model_info_parses_hub_metadata() {
        let transport = CannedTransport::new(
            200,
            r#"{"id":"Qwen/Qwen2-VL-7B-Instruct","pipeline_tag":"image-text-to-text",
                "library_name":"transformers","downloads":123456,"inference":"warm"}"#,
        );
        let info = model_info(&transport, "https://huggingface.co/api/models", "Qwen/Qwen2-VL-7B-Instruct", TIMEOUT)
            .await
            .unwrap();
        assert_eq!(info.pipeline_tag.as_deref(), Some("image-text-to-text"));
        assert_eq!(info.downloads, Some(123456));
        assert_eq!(info.inference, Some(Value::String("warm".to_string())));
    }

    #[tokio::test]
    async fn test_model_info_not_found_is_http_error() {
        let transport = CannedTransport::new(404, r#"{"error":"Repository not found"}"#);
        let err = model_info(&transport, "https://hub", "nobody/nothing", TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Http { status: 404, .. }));
    }
}
