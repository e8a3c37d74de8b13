//! OpenAI-compatible provider using the Chat Completions API (Groq).
//!
//! Text probes send a plain string message; vision probes send a content
//! array with a text part and an `image_url` part (remote URL or data URL).
//! A remote image is followed by a second candidate carrying the prompt's
//! inline fallback, for endpoints that cannot fetch the URL.

use super::provider::{LlmProvider, ProviderDescriptor};
use super::request::ProbeRequest;
use crate::prompt::{ImageInput, ImageRef, TestPrompt};
use crate::types::TokenUsage;
use serde::Deserialize;
use serde_json::{json, Value};

/// OpenAI-compatible Chat Completions provider for one model.
pub struct OpenAiCompatProvider {
    descriptor: ProviderDescriptor,
}

impl OpenAiCompatProvider {
    pub fn new(descriptor: ProviderDescriptor) -> Self {
        Self { descriptor }
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

impl OpenAiCompatProvider {
    fn body(&self, prompt: &TestPrompt, image: Option<&ImageRef>) -> Value {
        let content = match image {
            None => json!(prompt.text),
            Some(image) => json!([
                { "type": "text", "text": prompt.text },
                { "type": "image_url", "image_url": { "url": image.url() } },
            ]),
        };

        json!({
            "model": self.descriptor.model,
            "messages": [{ "role": "user", "content": content }],
            "max_tokens": prompt.max_tokens,
        })
    }
}

impl LlmProvider for OpenAiCompatProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn build_requests(&self, prompt: &TestPrompt) -> Vec<ProbeRequest> {
        let url = format!("{}/chat/completions", self.descriptor.endpoint_url);
        let request = |image: Option<&ImageRef>, label: &str| {
            ProbeRequest::post_json(&url, &self.descriptor.auth, self.body(prompt, image), label)
        };

        let mut requests = vec![request(prompt.image.as_ref(), "chat-completions")];
        if let Some(ImageRef::Remote(_)) = &prompt.image {
            let inline = ImageRef::Inline(
                prompt
                    .fallback_image
                    .clone()
                    .unwrap_or_else(ImageInput::red_pixel),
            );
            requests.push(request(Some(&inline), "chat-completions-inline"));
        }
        requests
    }

    fn extract_text(&self, body: &Value) -> Option<String> {
        ChatResponse::deserialize(body)
            .ok()?
            .choices
            .into_iter()
            .next()?
            .message
            .content
            .map(|t| t.trim().to_string())
    }

    fn extract_usage(&self, body: &Value) -> Option<TokenUsage> {
        let usage = ChatResponse::deserialize(body).ok()?.usage?;
        Some(TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        })
    }
}
