//! Concurrent batch dispatcher.
//!
//! Fans a list of descriptors out as independent executor tasks. Slots are
//! attached to the presentation in launch order; they finalize in whatever
//! order the network delivers.
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::gauge;
use tokio::sync::watch;

use crate::domain::descriptor::RequestDescriptor;
use crate::domain::slot::{Pending, ResultSlot, SlotStateFilter};
use crate::executor::{self, RequestKind};
use crate::http::HttpClient;
use crate::metrics::REQUESTS_IN_FLIGHT;
use crate::presentation::{Presentation, SlotHandle, SlotUpdate};

pub mod types;

pub use types::{BatchLaunch, DispatcherStats};

#[derive(Default)]
struct Counters {
    launched: AtomicU64,
    succeeded: AtomicU64,
    http_errors: AtomicU64,
    network_errors: AtomicU64,
    discarded: AtomicU64,
}

impl Counters {
    fn record(&self, state: SlotStateFilter, update: SlotUpdate) {
        let counter = match state {
            SlotStateFilter::Success => &self.succeeded,
            SlotStateFilter::HttpError => &self.http_errors,
            SlotStateFilter::NetworkError => &self.network_errors,
            SlotStateFilter::Pending => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if update == SlotUpdate::Stale {
            self.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Launches batches of requests against a presentation.
///
/// Executors are fire-and-forget tasks: no handle is kept, and the only
/// observable effect of each is a single write to its own slot.
pub struct BatchDispatcher<H, P>
where
    H: HttpClient,
    P: Presentation,
{
    http_client: Arc<H>,
    presentation: Arc<P>,
    requests_in_flight: Arc<watch::Sender<usize>>,
    counters: Arc<Counters>,
}

impl<H, P> BatchDispatcher<H, P>
where
    H: HttpClient + 'static,
    P: Presentation + 'static,
{
    pub fn new(http_client: Arc<H>, presentation: Arc<P>) -> Self {
        let (requests_in_flight, _) = watch::channel(0);
        Self {
            http_client,
            presentation,
            requests_in_flight: Arc::new(requests_in_flight),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn presentation(&self) -> &Arc<P> {
        &self.presentation
    }

    /// Launch one executor per descriptor.
    ///
    /// The presentation is cleared first. Then, for each descriptor in order, a
    /// pending slot is created, attached at the descriptor's position and its
    /// executor spawned without waiting on it. Returns once every executor has
    /// been started.
    ///
    /// Must be called from within a Tokio runtime.
    #[tracing::instrument(skip(self, descriptors), fields(batch_size = descriptors.len()))]
    pub fn launch_batch(&self, descriptors: Vec<RequestDescriptor>) -> BatchLaunch {
        let generation = self.presentation.clear_all();

        let mut handles = Vec::with_capacity(descriptors.len());
        for (position, descriptor) in descriptors.into_iter().enumerate() {
            let slot = ResultSlot::new(position, descriptor);
            let handle = self.presentation.create_slot(position, slot.clone().into());

            tracing::debug!(
                slot_id = %handle.id,
                position,
                uri = %slot.data.descriptor.uri,
                "Slot created, spawning executor"
            );

            self.spawn_executor(RequestKind::Get, slot, handle);
            handles.push(handle);
        }

        tracing::info!(generation = %generation, launched = handles.len(), "Batch launched");
        BatchLaunch {
            generation,
            handles,
        }
    }

    /// Clear the presentation.
    ///
    /// In-flight executors keep running; their results are dropped by the
    /// presentation because their slots belong to the previous generation.
    pub fn reset_batch(&self) {
        let in_flight = self.in_flight();
        let generation = self.presentation.clear_all();
        tracing::info!(
            generation = %generation,
            requests_in_flight = in_flight,
            "Batch reset, in-flight results will be discarded"
        );
    }

    /// Number of executors that have not finished yet.
    pub fn in_flight(&self) -> usize {
        *self.requests_in_flight.borrow()
    }

    /// Wait until every executor launched so far has finished, including
    /// executors of batches that were reset.
    pub async fn wait_idle(&self) {
        let mut rx = self.requests_in_flight.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|count| *count == 0).await;
    }

    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            requests_launched: self.counters.launched.load(Ordering::Relaxed),
            requests_succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            requests_http_errors: self.counters.http_errors.load(Ordering::Relaxed),
            requests_network_errors: self.counters.network_errors.load(Ordering::Relaxed),
            updates_discarded: self.counters.discarded.load(Ordering::Relaxed),
            requests_in_flight: self.in_flight(),
        }
    }

    fn spawn_executor(&self, kind: RequestKind, slot: ResultSlot<Pending>, handle: SlotHandle) {
        let http_client = (*self.http_client).clone();
        let presentation = self.presentation.clone();
        let counters = self.counters.clone();
        let requests_in_flight = self.requests_in_flight.clone();

        counters.launched.fetch_add(1, Ordering::Relaxed);
        requests_in_flight.send_modify(|count| *count += 1);
        gauge!(REQUESTS_IN_FLIGHT).increment(1.0);

        tokio::spawn(async move {
            // Ensure we decrement the counter when this task completes
            let _guard = scopeguard::guard((), move |_| {
                requests_in_flight.send_modify(|count| *count -= 1);
                gauge!(REQUESTS_IN_FLIGHT).decrement(1.0);
            });

            let slot_id = handle.id;
            let (state, update) =
                executor::execute_into(&http_client, &kind, slot, handle, presentation.as_ref()).await;
            counters.record(state, update);

            match update {
                SlotUpdate::Applied => {
                    tracing::debug!(slot_id = %slot_id, state = %state, "Slot finalized");
                }
                SlotUpdate::Stale => {
                    tracing::info!(
                        slot_id = %slot_id,
                        state = %state,
                        "Result arrived after batch reset, discarded"
                    );
                }
                SlotUpdate::AlreadyFinal | SlotUpdate::Unknown => {
                    tracing::warn!(slot_id = %slot_id, update = ?update, "Slot could not be finalized");
                }
            }
        });
    }
}
