//! Mock HTTP client for tests and offline demos.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::{HttpClient, HttpResponse};
use crate::error::{Result, VolleyError};

/// Mock HTTP client for testing.
///
/// Responses are keyed by `"{METHOD} {uri}"` and served in FIFO order, so
/// the same URI can be scripted several times.
///
/// # Example
/// ```ignore
/// let mock = MockHttpClient::new();
/// mock.add_response("GET /file.txt", Ok(HttpResponse::new(200, "hello")));
/// mock.add_delayed_response(
///     "GET /spin.cgi?10",
///     Ok(HttpResponse::new(200, "done")),
///     Duration::from_secs(10),
/// );
/// ```
#[derive(Clone)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    in_flight: Arc<AtomicUsize>,
}

/// A scripted response.
enum MockResponse {
    /// Immediate response
    Immediate(Result<HttpResponse>),
    /// Response delivered after a (tokio) sleep
    Delayed {
        response: Result<HttpResponse>,
        delay: Duration,
    },
    /// Response that waits for a trigger signal before completing
    Triggered {
        response: Result<HttpResponse>,
        trigger: oneshot::Receiver<()>,
    },
}

/// Record of a call made to the mock HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub method: String,
    pub uri: String,
    pub content_type: Option<String>,
    pub body: Option<String>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn push(&self, key: &str, response: MockResponse) {
        self.responses
            .lock()
            .entry(key.to_string())
            .or_default()
            .push_back(response);
    }

    /// Add a predetermined response for `"{METHOD} {uri}"`.
    pub fn add_response(&self, key: &str, response: Result<HttpResponse>) {
        self.push(key, MockResponse::Immediate(response));
    }

    /// Add a response that is delivered after `delay`.
    ///
    /// Uses `tokio::time::sleep`, so paused-clock tests advance through it instantly.
    pub fn add_delayed_response(&self, key: &str, response: Result<HttpResponse>, delay: Duration) {
        self.push(key, MockResponse::Delayed { response, delay });
    }

    /// Add a response that will wait for a manual trigger before completing.
    ///
    /// The request completes once the returned sender fires or is dropped.
    pub fn add_response_with_trigger(
        &self,
        key: &str,
        response: Result<HttpResponse>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(
            key,
            MockResponse::Triggered {
                response,
                trigger: rx,
            },
        );
        tx
    }

    /// Get all calls that have been made to this mock client.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of requests currently waiting on their scripted response.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    async fn respond(&self, call: MockCall) -> Result<HttpResponse> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight.clone();
        let _guard = scopeguard::guard((), move |_| {
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });

        let key = format!("{} {}", call.method, call.uri);
        self.calls.lock().push(call);

        let scripted = self
            .responses
            .lock()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front());

        match scripted {
            Some(MockResponse::Immediate(response)) => response,
            Some(MockResponse::Delayed { response, delay }) => {
                tokio::time::sleep(delay).await;
                response
            }
            Some(MockResponse::Triggered { response, trigger }) => {
                // Either a send or a dropped sender releases the request
                let _ = trigger.await;
                response
            }
            None => Err(VolleyError::Other(anyhow::anyhow!(
                "No mock response configured for {key}"
            ))),
        }
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, uri: &str) -> Result<HttpResponse> {
        self.respond(MockCall {
            method: "GET".to_string(),
            uri: uri.to_string(),
            content_type: None,
            body: None,
        })
        .await
    }

    async fn post(&self, uri: &str, content_type: &str, body: String) -> Result<HttpResponse> {
        self.respond(MockCall {
            method: "POST".to_string(),
            uri: uri.to_string(),
            content_type: Some(content_type.to_string()),
            body: Some(body),
        })
        .await
    }
}
