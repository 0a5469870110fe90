//! Production HTTP client using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;

use super::{HttpClient, HttpResponse, reason_phrase};
use crate::config::HarnessConfig;
use crate::error::{Result, VolleyError};

/// HTTP client backed by reqwest.
///
/// Relative URIs such as `/spin.cgi?5` are joined onto the base URL.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl ReqwestHttpClient {
    /// Client without a base URL; every URI must be absolute.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: None,
        }
    }

    /// Client resolving relative URIs against `base_url`.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: Some(parse_base_url(base_url)?),
        })
    }

    /// Build a client from harness configuration (base URL and optional timeout).
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: Some(parse_base_url(&config.base_url)?),
        })
    }

    /// Resolve a descriptor URI to an absolute URL.
    pub fn resolve(&self, uri: &str) -> Result<Url> {
        let resolved = match &self.base_url {
            Some(base) => base.join(uri),
            None => Url::parse(uri),
        };
        resolved.map_err(|e| VolleyError::InvalidUri(format!("{uri}: {e}")))
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        // hyper only records the phrase when it differs from the canonical one
        let status_text = match response.extensions().get::<ReasonPhrase>() {
            Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
            None => reason_phrase(status),
        };
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            status_text,
            content_type,
            body,
        })
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    Url::parse(base_url).map_err(|e| VolleyError::InvalidUri(format!("{base_url}: {e}")))
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    #[tracing::instrument(skip(self))]
    async fn get(&self, uri: &str) -> Result<HttpResponse> {
        let url = self.resolve(uri)?;
        tracing::debug!(url = %url, "Executing GET request");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::debug!(url = %url, error = %e, "GET request failed");
            e
        })?;
        let response = Self::read(response).await?;

        tracing::debug!(
            url = %url,
            status = response.status,
            response_len = response.body.len(),
            "GET request completed"
        );
        Ok(response)
    }

    #[tracing::instrument(skip(self, body), fields(body_len = body.len()))]
    async fn post(&self, uri: &str, content_type: &str, body: String) -> Result<HttpResponse> {
        let url = self.resolve(uri)?;
        tracing::debug!(url = %url, "Executing POST request");

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(url = %url, error = %e, "POST request failed");
                e
            })?;
        let response = Self::read(response).await?;

        tracing::debug!(
            url = %url,
            status = response.status,
            response_len = response.body.len(),
            "POST request completed"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_uri_joins_base() {
        let client = ReqwestHttpClient::with_base_url("http://localhost:10000").unwrap();
        let url = client.resolve("/spin.cgi?10").unwrap();
        assert_eq!(url.as_str(), "http://localhost:10000/spin.cgi?10");
    }

    #[test]
    fn test_absolute_uri_overrides_base() {
        let client = ReqwestHttpClient::with_base_url("http://localhost:10000").unwrap();
        let url = client.resolve("http://example.com/file.txt").unwrap();
        assert_eq!(url.as_str(), "http://example.com/file.txt");
    }

    #[test]
    fn test_relative_uri_without_base_is_invalid() {
        let client = ReqwestHttpClient::new();
        assert!(matches!(
            client.resolve("/file.txt"),
            Err(VolleyError::InvalidUri(_))
        ));
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        assert!(ReqwestHttpClient::with_base_url("not a url").is_err());
    }
}
