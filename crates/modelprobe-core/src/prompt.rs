//! Test prompts sent to every probed model.
//!
//! A prompt is a short text instruction, optionally paired with an image
//! that is either embedded inline (base64) or referenced by URL.

use crate::error::ProbeError;
use base64::Engine;
use std::io::Cursor;

/// A 1x1 red pixel PNG, the smallest image most vision endpoints accept.
pub const RED_PIXEL_PNG_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

/// Default text-only prompt.
pub const DEFAULT_TEXT_PROMPT: &str = "Say ciao";

/// Default prompt when an image is attached.
pub const DEFAULT_VISION_PROMPT: &str = "What color is this image? Reply in one word.";

/// Base64-encoded image ready to embed in a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and a format identifier
    /// ("jpeg", "png", "webp", "gif").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type_for(format).to_string(),
        }
    }

    /// The bundled 1x1 red pixel.
    pub fn red_pixel() -> Self {
        Self {
            data: RED_PIXEL_PNG_B64.to_string(),
            media_type: "image/png".to_string(),
        }
    }

    /// Render a solid-colour PNG of the given size, for endpoints that reject
    /// images below a minimum size.
    pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, ProbeError> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| ProbeError::Image(format!("{width}x{height} image is too large")))?;
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png)
            .map_err(|e| ProbeError::Image(e.to_string()))?;
        Ok(Self::from_bytes(buf.get_ref(), "png"))
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Map a format identifier or file extension to a MIME type.
pub fn media_type_for(format: &str) -> &'static str {
    match format.to_ascii_lowercase().as_str() {
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        other => {
            tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
            "image/jpeg"
        }
    }
}

/// Where the probe image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Embedded in the request body
    Inline(ImageInput),
    /// Fetched by the provider from a public URL
    Remote(String),
}

impl ImageRef {
    /// URL form: a data URI for inline images, the URL itself otherwise.
    pub fn url(&self) -> String {
        match self {
            ImageRef::Inline(input) => input.data_url(),
            ImageRef::Remote(url) => url.clone(),
        }
    }

    /// Best-effort MIME type. Remote URLs are guessed from their extension.
    pub fn media_type(&self) -> String {
        match self {
            ImageRef::Inline(input) => input.media_type.clone(),
            ImageRef::Remote(url) => {
                let path = url.split(['?', '#']).next().unwrap_or(url);
                let file = path.rsplit('/').next().unwrap_or(path);
                match file.rsplit_once('.') {
                    Some((_, ext)) if matches!(ext, "jpg" | "jpeg" | "png" | "webp" | "gif") => {
                        media_type_for(ext).to_string()
                    }
                    _ => "image/png".to_string(),
                }
            }
        }
    }
}

/// The fixed prompt a probe sends.
#[derive(Debug, Clone)]
pub struct TestPrompt {
    /// Instruction text
    pub text: String,
    /// Optional image for vision probes
    pub image: Option<ImageRef>,
    /// Inline copy sent when an endpoint rejects a remote `image`
    pub fallback_image: Option<ImageInput>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl TestPrompt {
    /// A text-only prompt.
    pub fn text(text: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            text: text.into(),
            image: None,
            fallback_image: None,
            max_tokens,
        }
    }

    /// Attach an image, turning this into a vision prompt.
    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_fallback_image(mut self, image: ImageInput) -> Self {
        self.fallback_image = Some(image);
        self
    }

    pub fn is_vision(&self) -> bool {
        self.image.is_some()
    }
}

impl Default for TestPrompt {
    fn default() -> Self {
        Self::text(DEFAULT_TEXT_PROMPT, 50)
    }
}
