//! Response classification: decides whether a body is shown as text or as an image.
//!
//! Classification never fails. A missing or unexpected content type falls back
//! to text.

use bytes::Bytes;

use crate::domain::content::{ImageHandle, RenderedContent};

/// Content types starting with this prefix are rendered as images.
pub const IMAGE_PREFIX: &str = "image/";

/// How a successful body is turned into [`RenderedContent`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyMode {
    /// Let the content type decide (image vs. text)
    #[default]
    Classify,
    /// Always decode as text and keep it verbatim (form submissions)
    Text,
}

/// Returns true if the declared content type names an image.
pub fn is_image(content_type: Option<&str>) -> bool {
    content_type
        .map(str::trim_start)
        .and_then(|ct| ct.get(..IMAGE_PREFIX.len()))
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(IMAGE_PREFIX))
}

/// Classify a response body using its declared content type.
pub fn classify(content_type: Option<&str>, body: Bytes) -> RenderedContent {
    match content_type {
        Some(ct) if is_image(Some(ct)) => {
            RenderedContent::Binary(ImageHandle::new(mime_essence(ct), body))
        }
        _ => RenderedContent::Text(decode_text(&body)),
    }
}

/// Render a body according to `mode`.
pub fn render_body(mode: BodyMode, content_type: Option<&str>, body: Bytes) -> RenderedContent {
    match mode {
        BodyMode::Classify => classify(content_type, body),
        BodyMode::Text => RenderedContent::Text(decode_text(&body)),
    }
}

/// Decode bytes as UTF-8, replacing invalid sequences.
pub fn decode_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}

/// `image/png; charset=binary` -> `image/png`
fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_image_content_type_is_binary() {
        let rendered = classify(Some("image/png"), Bytes::from_static(PNG_MAGIC));
        let image = rendered.as_image().expect("expected binary content");
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.len, PNG_MAGIC.len());
        assert_eq!(image.bytes.as_ref(), PNG_MAGIC);
        assert!(image.url.starts_with("blob:"));
    }

    #[test]
    fn test_image_parameters_are_stripped() {
        let rendered = classify(Some("Image/JPEG; q=1"), Bytes::from_static(b"\xff\xd8"));
        assert_eq!(rendered.as_image().unwrap().mime, "image/jpeg");
    }

    #[test]
    fn test_each_image_gets_its_own_url() {
        let a = classify(Some("image/gif"), Bytes::from_static(b"GIF89a"));
        let b = classify(Some("image/gif"), Bytes::from_static(b"GIF89a"));
        assert_ne!(a.as_image().unwrap().url, b.as_image().unwrap().url);
    }

    #[test]
    fn test_non_image_content_types_are_text() {
        for ct in [
            Some("text/html"),
            Some("text/plain; charset=utf-8"),
            Some("application/json"),
            Some("application/image/png"),
            Some("imagex/png"),
            Some(""),
            None,
        ] {
            let rendered = classify(ct, Bytes::from_static(b"<h1>hola</h1>"));
            assert_eq!(
                rendered.as_text(),
                Some("<h1>hola</h1>"),
                "content type {ct:?} should render as text"
            );
        }
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_rejected() {
        let rendered = classify(Some("text/plain"), Bytes::from_static(b"ok \xff\xfe"));
        assert_eq!(rendered.as_text(), Some("ok \u{fffd}\u{fffd}"));
    }

    #[test]
    fn test_text_mode_ignores_image_content_type() {
        let rendered = render_body(BodyMode::Text, Some("image/png"), Bytes::from_static(b"raw"));
        assert_eq!(rendered.as_text(), Some("raw"));
    }
}
