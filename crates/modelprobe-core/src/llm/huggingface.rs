//! HuggingFace Inference API provider.
//!
//! The expected payload is model-dependent and mostly undocumented, so this
//! provider renders an ordered list of candidate formats. The prober walks
//! them until one is accepted or rejected for a reason other than its shape.

use super::provider::{LlmProvider, ProviderDescriptor};
use super::request::ProbeRequest;
use crate::prompt::{ImageRef, TestPrompt};
use serde_json::{json, Value};

/// HuggingFace Inference provider for one model.
pub struct HuggingFaceProvider {
    descriptor: ProviderDescriptor,
}

impl HuggingFaceProvider {
    pub fn new(descriptor: ProviderDescriptor) -> Self {
        Self { descriptor }
    }

    fn url(&self) -> String {
        format!("{}/{}", self.descriptor.endpoint_url, self.descriptor.model)
    }

    fn request(&self, body: Value, label: &str) -> ProbeRequest {
        ProbeRequest::post_json(&self.url(), &self.descriptor.auth, body, label)
    }
}

/// Value for the `image` field: bare base64 for inline images, the URL otherwise.
fn image_field(image: &ImageRef) -> String {
    match image {
        ImageRef::Inline(input) => input.data.clone(),
        ImageRef::Remote(url) => url.clone(),
    }
}

impl LlmProvider for HuggingFaceProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn build_requests(&self, prompt: &TestPrompt) -> Vec<ProbeRequest> {
        let parameters = json!({ "max_new_tokens": prompt.max_tokens });

        match &prompt.image {
            None => vec![
                self.request(
                    json!({ "inputs": prompt.text, "parameters": parameters }),
                    "inputs-text",
                ),
                self.request(
                    json!({
                        "inputs": [{ "role": "user", "content": prompt.text }],
                        "parameters": parameters,
                    }),
                    "messages",
                ),
            ],
            Some(image) => vec![
                self.request(
                    json!({
                        "inputs": { "image": image_field(image), "text": prompt.text },
                        "parameters": parameters,
                    }),
                    "inputs-object",
                ),
                self.request(
                    json!({
                        "inputs": [{
                            "role": "user",
                            "content": [
                                { "type": "text", "text": prompt.text },
                                { "type": "image_url", "image_url": { "url": image.url() } },
                            ],
                        }],
                        "parameters": parameters,
                    }),
                    "messages",
                ),
                self.request(
                    json!({ "inputs": image.url(), "parameters": parameters }),
                    "inputs-uri",
                ),
            ],
        }
    }

    fn extract_text(&self, body: &Value) -> Option<String> {
        let first = match body {
            Value::Array(items) => items.first()?,
            other => other,
        };
        let text = match first {
            Value::String(s) => s.as_str(),
            Value::Object(map) => map
                .get("generated_text")
                .or_else(|| map.get("caption"))
                .and_then(Value::as_str)?,
            _ => return None,
        };
        Some(text.trim().to_string())
    }
}
