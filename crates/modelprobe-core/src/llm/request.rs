//! Rendered HTTP requests and credential handling.

use serde_json::Value;
use std::fmt;

/// An API credential. Never printed in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret, for placing on the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First few characters followed by an ellipsis, for operator feedback.
    pub fn preview(&self) -> String {
        let head: String = self.0.chars().take(6).collect();
        format!("{head}...")
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// How a provider expects its credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer(ApiKey),
    /// `?<param>=<key>` appended to the URL
    QueryKey { param: String, key: ApiKey },
    /// No credential (public metadata endpoints)
    None,
}

/// HTTP method of a probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully rendered HTTP request, ready for a [`Transport`](super::transport::Transport).
#[derive(Clone)]
pub struct ProbeRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Name of the candidate payload format this request uses
    pub format_label: String,
}

impl ProbeRequest {
    /// A JSON POST with `auth` applied.
    pub fn post_json(url: &str, auth: &AuthScheme, body: Value, format_label: &str) -> Self {
        let mut request = Self {
            method: Method::Post,
            url: url.to_string(),
            headers: Vec::new(),
            body: Some(body),
            format_label: format_label.to_string(),
        };
        request.apply_auth(auth);
        request
    }

    /// A GET with `auth` applied.
    pub fn get(url: &str, auth: &AuthScheme) -> Self {
        let mut request = Self {
            method: Method::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
            format_label: "get".to_string(),
        };
        request.apply_auth(auth);
        request
    }

    fn apply_auth(&mut self, auth: &AuthScheme) {
        match auth {
            AuthScheme::Bearer(key) => self
                .headers
                .push(("Authorization".to_string(), format!("Bearer {}", key.expose()))),
            AuthScheme::QueryKey { param, key } => {
                let sep = if self.url.contains('?') { '&' } else { '?' };
                self.url = format!("{}{sep}{param}={}", self.url, key.expose());
            }
            AuthScheme::None => {}
        }
    }

    /// The URL without its query string, safe to log.
    pub fn redacted_url(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for ProbeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("ProbeRequest")
            .field("method", &self.method)
            .field("url", &self.redacted_url())
            .field("headers", &header_names)
            .field("format_label", &self.format_label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bearer_auth_sets_header() {
        let auth = AuthScheme::Bearer(ApiKey::new("gsk_secret"));
        let req = ProbeRequest::post_json("https://x/chat", &auth, json!({}), "chat");
        assert_eq!(req.header("authorization"), Some("Bearer gsk_secret"));
        assert_eq!(req.url, "https://x/chat");
    }

    #[test]
    fn test_query_key_appends_param() {
        let auth = AuthScheme::QueryKey {
            param: "key".to_string(),
            key: ApiKey::new("AIza123"),
        };
        let req = ProbeRequest::post_json("https://x/m:generateContent", &auth, json!({}), "g");
        assert_eq!(req.url, "https://x/m:generateContent?key=AIza123");
        assert!(req.headers.is_empty());

        let req = ProbeRequest::get("https://x/models?pageSize=5", &auth);
        assert_eq!(req.url, "https://x/models?pageSize=5&key=AIza123");
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let auth = AuthScheme::QueryKey {
            param: "key".to_string(),
            key: ApiKey::new("AIza123"),
        };
        let req = ProbeRequest::post_json("https://x/m", &auth, json!({}), "g");
        let debug = format!("{req:?} {auth:?}");
        assert!(!debug.contains("AIza123"));
        assert_eq!(req.redacted_url(), "https://x/m");
    }

    #[test]
    fn test_key_preview() {
        assert_eq!(ApiKey::new("hf_abcdefghijk").preview(), "hf_abc...");
    }
}
