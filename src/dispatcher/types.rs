//! Types returned by the batch dispatcher.

use serde::Serialize;

use crate::domain::descriptor::Generation;
use crate::presentation::SlotHandle;

/// What a call to `launch_batch` attached to the presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchLaunch {
    /// Generation the batch's slots belong to
    pub generation: Generation,
    /// One handle per descriptor, in launch order
    pub handles: Vec<SlotHandle>,
}

impl BatchLaunch {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Counters tracked by a dispatcher across all batches it launched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatcherStats {
    /// Executors started
    pub requests_launched: u64,
    /// Finalized as Success
    pub requests_succeeded: u64,
    /// Finalized as HttpError
    pub requests_http_errors: u64,
    /// Finalized as NetworkError
    pub requests_network_errors: u64,
    /// Finalizations dropped because their batch was reset
    pub updates_discarded: u64,
    /// Executors still running
    pub requests_in_flight: usize,
}

impl DispatcherStats {
    pub fn requests_finished(&self) -> u64 {
        self.requests_succeeded + self.requests_http_errors + self.requests_network_errors
    }
}
