//! Harness configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::descriptor::RequestDescriptor;
use crate::error::{Result, VolleyError};
use crate::presentation::DEFAULT_EVENT_CAPACITY;

/// Default target: the probed server's default listen port.
pub const DEFAULT_BASE_URL: &str = "http://localhost:10000";

/// Endpoint the form submission flow posts to.
pub const DEFAULT_SUBMIT_PATH: &str = "/spin.cgi?2";

/// Configuration for the harness.
///
/// Every field has a default, so a config file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Base URL that relative request URIs are joined onto
    pub base_url: String,

    /// Transport timeout per request in milliseconds.
    /// None means no timeout; the harness itself never aborts a request.
    pub timeout_ms: Option<u64>,

    /// Target of the form submission flow
    pub submit_path: String,

    /// Descriptors launched by the concurrency demo
    pub demo_batch: Vec<RequestDescriptor>,

    /// Capacity of the board's event channel; slower renderers lag past this
    pub event_capacity: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: None,
            submit_path: DEFAULT_SUBMIT_PATH.to_string(),
            demo_batch: demo_batch(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl HarnessConfig {
    /// Parse a JSON config document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: HarnessConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| VolleyError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| VolleyError::Config(format!("invalid base_url '{}': {e}", self.base_url)))?;

        if self.timeout_ms == Some(0) {
            return Err(VolleyError::Config(
                "timeout_ms must be positive (omit it to disable the timeout)".to_string(),
            ));
        }

        if self.event_capacity == 0 {
            return Err(VolleyError::Config(
                "event_capacity must be positive".to_string(),
            ));
        }

        if let Some(position) = self.demo_batch.iter().position(|d| d.uri.trim().is_empty()) {
            return Err(VolleyError::Config(format!(
                "demo_batch[{position}] has an empty uri"
            )));
        }

        Ok(())
    }
}

/// The fixed six-request concurrency demo: one slow CGI, one medium CGI,
/// a 404 and three fast static resources.
pub fn demo_batch() -> Vec<RequestDescriptor> {
    vec![
        RequestDescriptor::new("/spin.cgi?10", "Slow (CGI)"),
        RequestDescriptor::new("/another.html", "Fast (HTML)"),
        RequestDescriptor::new("/file.txt", "Fast (Text)"),
        RequestDescriptor::new("/spin.cgi?5", "Medium (CGI)"),
        RequestDescriptor::new("/no_existe.html", "Fast (404 Error)"),
        RequestDescriptor::new("/another.html", "Fast (HTML)"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.base_url, "http://localhost:10000");
        assert_eq!(config.timeout_ms, None);
        assert_eq!(config.submit_path, "/spin.cgi?2");
        assert_eq!(config.demo_batch.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            HarnessConfig::from_json_str(r#"{"base_url": "http://127.0.0.1:8080", "timeout_ms": 2500}"#)
                .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.timeout_ms, Some(2500));
        assert_eq!(config.submit_path, DEFAULT_SUBMIT_PATH);
        assert_eq!(config.demo_batch, demo_batch());
    }

    #[test]
    fn test_custom_demo_batch() {
        let config = HarnessConfig::from_json_str(
            r#"{"demo_batch": [{"uri": "/a", "label": "A"}, {"uri": "/b", "label": "B"}]}"#,
        )
        .unwrap();
        assert_eq!(
            config.demo_batch,
            vec![RequestDescriptor::new("/a", "A"), RequestDescriptor::new("/b", "B")]
        );
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        assert!(matches!(
            HarnessConfig::from_json_str(r#"{"base_url": "nope"}"#),
            Err(VolleyError::Config(_))
        ));
        assert!(matches!(
            HarnessConfig::from_json_str(r#"{"timeout_ms": 0}"#),
            Err(VolleyError::Config(_))
        ));
        assert!(matches!(
            HarnessConfig::from_json_str(r#"{"demo_batch": [{"uri": " ", "label": "x"}]}"#),
            Err(VolleyError::Config(_))
        ));
        assert!(matches!(
            HarnessConfig::from_json_str("{not json"),
            Err(VolleyError::Serialization(_))
        ));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = HarnessConfig::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(VolleyError::Config(_))));
    }
}
