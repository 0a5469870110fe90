//! Single-shot flows: fetch one URI, or submit one form.
//!
//! These are degenerate one-element batches. They use the same executor as
//! the dispatcher but render into one fixed slot and are awaited inline.

use std::sync::Arc;

use crate::domain::descriptor::RequestDescriptor;
use crate::domain::slot::{AnySlot, ResultSlot};
use crate::error::Result;
use crate::executor::{self, RequestKind};
use crate::http::HttpClient;
use crate::presentation::{Presentation, SlotUpdate};

/// Runs single requests into a presentation that holds one slot at a time.
pub struct SingleShot<H, P>
where
    H: HttpClient,
    P: Presentation,
{
    http_client: Arc<H>,
    presentation: Arc<P>,
    submit_path: String,
}

impl<H, P> SingleShot<H, P>
where
    H: HttpClient,
    P: Presentation,
{
    pub fn new(http_client: Arc<H>, presentation: Arc<P>, submit_path: impl Into<String>) -> Self {
        Self {
            http_client,
            presentation,
            submit_path: submit_path.into(),
        }
    }

    pub fn presentation(&self) -> &Arc<P> {
        &self.presentation
    }

    /// GET `uri` and render the outcome. Images render as binary content.
    pub async fn get(&self, uri: &str) -> AnySlot {
        let descriptor = RequestDescriptor::new(uri, format!("GET {uri}"));
        self.run(RequestKind::Get, descriptor).await
    }

    /// URL-encode `fields` in order and POST them to the submit endpoint.
    ///
    /// A successful response body is kept verbatim, markup included.
    pub async fn submit<K, V>(&self, fields: &[(K, V)]) -> Result<AnySlot>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pairs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (k.as_ref(), v.as_ref())).collect();
        let body = serde_urlencoded::to_string(&pairs)?;

        tracing::debug!(fields = pairs.len(), endpoint = %self.submit_path, "Submitting form");
        let descriptor = RequestDescriptor::new(self.submit_path.clone(), format!("POST {}", self.submit_path));
        Ok(self.run(RequestKind::PostForm { body }, descriptor).await)
    }

    async fn run(&self, kind: RequestKind, descriptor: RequestDescriptor) -> AnySlot {
        self.presentation.clear_all();

        let slot = ResultSlot::new(0, descriptor);
        let handle = self.presentation.create_slot(0, slot.clone().into());
        let completion = executor::execute(self.http_client.as_ref(), &kind, slot).await;
        let finalized = AnySlot::from(completion);

        let update = self.presentation.update_slot(handle, finalized.clone());
        if update != SlotUpdate::Applied {
            // Another flow cleared the fixed slot while this request was in flight
            tracing::debug!(slot_id = %handle.id, update = ?update, "Single-shot result not displayed");
        }
        finalized
    }
}
