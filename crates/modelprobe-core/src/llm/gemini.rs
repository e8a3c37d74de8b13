//! Gemini provider using the `generateContent` API.
//!
//! The key travels as a `?key=` query parameter. Images are sent as an
//! `inlineData` part (base64) or a `fileData` part (remote URI).

use super::provider::{LlmProvider, ProviderDescriptor};
use super::request::ProbeRequest;
use crate::prompt::{ImageRef, TestPrompt};
use crate::types::TokenUsage;
use serde::Deserialize;
use serde_json::{json, Value};

/// Gemini provider for one model.
pub struct GeminiProvider {
    descriptor: ProviderDescriptor,
}

impl GeminiProvider {
    pub fn new(descriptor: ProviderDescriptor) -> Self {
        Self { descriptor }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.descriptor.endpoint_url, self.descriptor.model
        )
    }
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

impl LlmProvider for GeminiProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn build_requests(&self, prompt: &TestPrompt) -> Vec<ProbeRequest> {
        let mut parts = vec![json!({ "text": prompt.text })];
        match &prompt.image {
            Some(ImageRef::Inline(image)) => parts.push(json!({
                "inlineData": { "mimeType": image.media_type, "data": image.data }
            })),
            Some(remote @ ImageRef::Remote(url)) => parts.push(json!({
                "fileData": { "mimeType": remote.media_type(), "fileUri": url }
            })),
            None => {}
        }

        let body = json!({
            "contents": [{ "parts": parts }],
            "generationConfig": { "maxOutputTokens": prompt.max_tokens },
        });

        vec![ProbeRequest::post_json(
            &self.url(),
            &self.descriptor.auth,
            body,
            "generate-content",
        )]
    }

    fn extract_text(&self, body: &Value) -> Option<String> {
        let resp = GenerateContentResponse::deserialize(body).ok()?;
        let text: String = resp
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        Some(text.trim().to_string())
    }

    fn extract_usage(&self, body: &Value) -> Option<TokenUsage> {
        let usage = GenerateContentResponse::deserialize(body)
            .ok()?
            .usage_metadata?;
        Some(TokenUsage {
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::RequestShape;
    use crate::llm::request::{ApiKey, AuthScheme};
    use crate::prompt::ImageInput;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(ProviderDescriptor {
            provider_name: "gemini".to_string(),
            endpoint_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            auth: AuthScheme::QueryKey {
                param: "key".to_string(),
                key: ApiKey::new("AIzaTest"),
            },
            model: "gemini-2.0-flash".to_string(),
            shape: RequestShape::Gemini,
            timeout: None,
        })
    }

    #[test]
    fn test_text_request_shape() {
        let requests = provider().build_requests(&TestPrompt::default());
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(
            req.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent?key=AIzaTest"
        );
        let body = req.body.as_ref().unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Say ciao");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 50);
    }

    #[test]
    fn test_inline_image_part() {
        let prompt = TestPrompt::default().with_image(ImageRef::Inline(ImageInput::red_pixel()));
        let requests = provider().build_requests(&prompt);
        let part = &requests[0].body.as_ref().unwrap()["contents"][0]["parts"][1];
        assert_eq!(part["inlineData"]["mimeType"], "image/png");
        assert!(part["inlineData"]["data"].as_str().unwrap().starts_with("iVBOR"));
    }

    #[test]
    fn test_remote_image_part() {
        let prompt = TestPrompt::default()
            .with_image(ImageRef::Remote("https://example.com/logo.png".to_string()));
        let requests = provider().build_requests(&prompt);
        let part = &requests[0].body.as_ref().unwrap()["contents"][0]["parts"][1];
        assert_eq!(part["fileData"]["fileUri"], "https://example.com/logo.png");
    }

    #[test]
    fn test_extract_text_and_usage() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "Ciao! "}], "role": "model"}}],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5}
        });
        let p = provider();
        assert_eq!(p.extract_text(&body).as_deref(), Some("Ciao!"));
        assert_eq!(p.extract_usage(&body).unwrap().total_tokens, Some(5));
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert_eq!(provider().extract_text(&body), None);
    }
}
