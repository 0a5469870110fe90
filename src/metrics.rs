//! Metric names recorded through the `metrics` facade.
//!
//! The library only records; installing an exporter is left to the embedding
//! application. Without one, every call is a no-op.

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};

/// Counter of finalized requests, labelled by `outcome` (and `status` for HTTP errors).
pub const REQUESTS_TOTAL: &str = "volley_requests_total";

/// Histogram of time from dispatch to finalization.
pub const REQUEST_DURATION_SECONDS: &str = "volley_request_duration_seconds";

/// Gauge of executors still running.
pub const REQUESTS_IN_FLIGHT: &str = "volley_requests_in_flight";

/// Counter of finalizations dropped because their batch was reset.
pub const STALE_UPDATES_TOTAL: &str = "volley_stale_updates_total";

/// Register descriptions for all metrics with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Requests finalized, by outcome");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        Unit::Seconds,
        "Time from dispatch to finalization"
    );
    describe_gauge!(REQUESTS_IN_FLIGHT, "Executors still waiting on the network");
    describe_counter!(
        STALE_UPDATES_TOTAL,
        "Finalizations discarded because their batch was reset"
    );
}
