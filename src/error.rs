//! Error types for the probe harness.
//!
//! None of these errors are fatal to a batch: executors convert every
//! transport failure into a `NetworkError` slot instead of propagating it.

use thiserror::Error;

/// Result type alias using the volley error type.
pub type Result<T> = std::result::Result<T, VolleyError>;

/// Main error type for the harness.
#[derive(Error, Debug)]
pub enum VolleyError {
    /// URI could not be parsed or joined onto the base URL
    #[error("Invalid URI '{0}'")]
    InvalidUri(String),

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client error (connection refused, DNS, timeout, broken body...)
    #[error("HTTP request failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Form fields could not be URL-encoded
    #[error("Form encoding error: {0}")]
    FormEncoding(#[from] serde_urlencoded::ser::Error),

    /// General error from anyhow
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Flattens an error and its source chain into a single human-readable line.
///
/// Sources whose text is already contained in the message are skipped, since
/// `#[from]` wrappers repeat their inner error in both `Display` and `source()`.
pub fn describe_transport_error(error: &VolleyError) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);

    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("connection refused")]
    struct Refused;

    #[derive(Debug, Error)]
    #[error("tcp connect error")]
    struct Connect(#[source] Refused);

    #[test]
    fn test_describe_plain_error() {
        let error = VolleyError::InvalidUri("::nope".to_string());
        assert_eq!(describe_transport_error(&error), "Invalid URI '::nope'");
    }

    #[test]
    fn test_describe_includes_source_chain() {
        let error = VolleyError::Other(anyhow::Error::new(Connect(Refused)).context("GET /x"));
        let described = describe_transport_error(&error);
        assert!(described.starts_with("GET /x"));
        assert!(described.contains("tcp connect error"));
        assert!(described.ends_with("connection refused"));
    }

    #[test]
    fn test_describe_skips_repeated_causes() {
        let error = VolleyError::Other(anyhow::anyhow!("socket closed"));
        assert_eq!(describe_transport_error(&error), "socket closed");
    }
}
