//! Single-request executor.
//!
//! Drives one request from dispatch to a terminal slot state. Every failure
//! is converted into a slot state here; nothing propagates past an executor.

use metrics::histogram;

use crate::classify::BodyMode;
use crate::domain::slot::{Pending, ResultSlot, SlotCompletion, SlotStateFilter};
use crate::http::{FORM_CONTENT_TYPE, HttpClient};
use crate::metrics::REQUEST_DURATION_SECONDS;
use crate::presentation::{Presentation, SlotHandle, SlotUpdate};

/// The HTTP call an executor performs for its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// GET the descriptor's URI; successful bodies are classified
    Get,
    /// POST an already URL-encoded form body; successful bodies are kept as raw text
    PostForm { body: String },
}

impl RequestKind {
    pub fn method(&self) -> &'static str {
        match self {
            RequestKind::Get => "GET",
            RequestKind::PostForm { .. } => "POST",
        }
    }

    fn body_mode(&self) -> BodyMode {
        match self {
            RequestKind::Get => BodyMode::Classify,
            RequestKind::PostForm { .. } => BodyMode::Text,
        }
    }
}

/// Perform the request bound to `slot` and finalize it.
///
/// Always returns a terminal state: `Success` for 2xx, `HttpError` for any
/// other status, `NetworkError` when no response was obtained.
#[tracing::instrument(
    skip(client, kind, slot),
    fields(slot_id = %slot.data.id, uri = %slot.data.descriptor.uri, method = kind.method())
)]
pub async fn execute<H: HttpClient>(client: &H, kind: &RequestKind, slot: ResultSlot<Pending>) -> SlotCompletion {
    let started = tokio::time::Instant::now();
    let uri = slot.data.descriptor.uri.clone();

    let outcome = match kind {
        RequestKind::Get => client.get(&uri).await,
        RequestKind::PostForm { body } => client.post(&uri, FORM_CONTENT_TYPE, body.clone()).await,
    };

    let completion = slot.complete(outcome, kind.body_mode());
    let elapsed = started.elapsed();
    histogram!(REQUEST_DURATION_SECONDS, "outcome" => completion.state().as_str())
        .record(elapsed.as_secs_f64());

    match &completion {
        SlotCompletion::Success(s) => tracing::info!(
            status = s.state.status_code,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request succeeded"
        ),
        SlotCompletion::HttpError(s) => tracing::warn!(
            status = s.state.status_code,
            status_text = %s.state.status_text,
            elapsed_ms = elapsed.as_millis() as u64,
            "Server answered with an error status"
        ),
        SlotCompletion::NetworkError(s) => tracing::warn!(
            error = %s.state.error_message,
            elapsed_ms = elapsed.as_millis() as u64,
            "No response obtained"
        ),
    }

    completion
}

/// Execute and publish the terminal state to the presentation.
///
/// Returns the terminal state reached and what the presentation did with it.
pub async fn execute_into<H, P>(
    client: &H,
    kind: &RequestKind,
    slot: ResultSlot<Pending>,
    handle: SlotHandle,
    presentation: &P,
) -> (SlotStateFilter, SlotUpdate)
where
    H: HttpClient,
    P: Presentation + ?Sized,
{
    let completion = execute(client, kind, slot).await;
    let state = completion.state();
    let update = presentation.update_slot(handle, completion.into());
    (state, update)
}
