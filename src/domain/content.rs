//! Rendered response payloads.

use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

/// How a response body is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum RenderedContent {
    /// Body decoded as text
    Text(String),
    /// Body kept as a displayable image
    Binary(ImageHandle),
}

impl RenderedContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RenderedContent::Text(text) => Some(text),
            RenderedContent::Binary(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageHandle> {
        match self {
            RenderedContent::Text(_) => None,
            RenderedContent::Binary(image) => Some(image),
        }
    }
}

/// Image payload plus a `blob:` display URL.
///
/// The URL plays the role of a browser object URL: it names the bytes for as
/// long as the rendered result lives and is never revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageHandle {
    /// MIME essence, e.g. `image/png`
    pub mime: String,
    /// Display URL, unique per handle
    pub url: String,
    /// Size of the payload in bytes
    pub len: usize,
    #[serde(skip_serializing)]
    pub bytes: Bytes,
}

impl ImageHandle {
    pub fn new(mime: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            mime: mime.into(),
            url: format!("blob:volley/{}", Uuid::new_v4()),
            len: bytes.len(),
            bytes,
        }
    }
}
