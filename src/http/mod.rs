//! HTTP client abstraction for probing the target server.
//!
//! This module defines the `HttpClient` trait to abstract request execution,
//! enabling testability with mock implementations.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;

use crate::error::Result;

mod client;
mod mock;

pub use client::ReqwestHttpClient;
pub use mock::{MockCall, MockHttpClient};

/// Content type sent by the form submission flow.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase for the status (e.g. "Not Found")
    pub status_text: String,
    /// Declared `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Raw response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Build a response with the canonical reason phrase for `status`.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: reason_phrase(status),
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// True for the 2xx class.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Canonical reason phrase for a status code, or an empty string if unknown.
pub fn reason_phrase(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
        .to_string()
}

/// Trait for executing HTTP requests.
///
/// Any response, whatever its status code, is `Ok`. `Err` means no response
/// could be obtained (DNS, connection refused, timeout, broken body).
#[async_trait]
pub trait HttpClient: Send + Sync + Clone {
    /// Issue a GET request.
    async fn get(&self, uri: &str) -> Result<HttpResponse>;

    /// Issue a POST request with an explicit content type and body.
    async fn post(&self, uri: &str, content_type: &str, body: String) -> Result<HttpResponse>;
}
