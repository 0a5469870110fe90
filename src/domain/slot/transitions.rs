//! State transitions for result slots using the typestate pattern.
//!
//! ```text
//! ResultSlot<Pending> ──succeed()──> ResultSlot<Success>
//!                     ──reject()───> ResultSlot<HttpError>
//!                     ──fail()─────> ResultSlot<NetworkError>
//! ```
//!
//! Every transition consumes the pending slot, so the compiler rules out a
//! second terminal transition. [`ResultSlot::complete`] maps the raw outcome
//! of an HTTP call onto exactly one of the three.

use metrics::counter;

use crate::classify::{self, BodyMode};
use crate::domain::content::RenderedContent;
use crate::domain::descriptor::{RequestDescriptor, SlotId};
use crate::error::{Result, describe_transport_error};
use crate::http::HttpResponse;
use crate::metrics::REQUESTS_TOTAL;

use super::state::{
    HttpError, NetworkError, Pending, ResultSlot, SlotCompletion, SlotData, Success,
};

impl ResultSlot<Pending> {
    /// Create a fresh pending slot, stamping `created_at` now.
    pub fn new(position: usize, descriptor: RequestDescriptor) -> Self {
        ResultSlot {
            data: SlotData {
                id: SlotId::new(),
                position,
                descriptor,
            },
            state: Pending {
                created_at: chrono::Utc::now(),
            },
        }
    }

    pub fn succeed(
        self,
        status_code: u16,
        status_text: String,
        body: RenderedContent,
    ) -> ResultSlot<Success> {
        ResultSlot {
            data: self.data,
            state: Success {
                created_at: self.state.created_at,
                completed_at: chrono::Utc::now(),
                status_code,
                status_text,
                body,
            },
        }
    }

    pub fn reject(self, status_code: u16, status_text: String, body: String) -> ResultSlot<HttpError> {
        ResultSlot {
            data: self.data,
            state: HttpError {
                created_at: self.state.created_at,
                completed_at: chrono::Utc::now(),
                status_code,
                status_text,
                body,
            },
        }
    }

    pub fn fail(self, error_message: String) -> ResultSlot<NetworkError> {
        ResultSlot {
            data: self.data,
            state: NetworkError {
                created_at: self.state.created_at,
                completed_at: chrono::Utc::now(),
                error_message,
            },
        }
    }

    /// Finalize the slot from the outcome of its HTTP call.
    ///
    /// - `Ok` with a 2xx status: `Success`, body rendered according to `mode`
    /// - `Ok` with any other status: `HttpError`, body always kept as text
    /// - `Err`: `NetworkError` with the flattened error chain
    pub fn complete(self, outcome: Result<HttpResponse>, mode: BodyMode) -> SlotCompletion {
        match outcome {
            Ok(response) if response.is_success() => {
                counter!(REQUESTS_TOTAL, "outcome" => "success").increment(1);
                let body = classify::render_body(mode, response.content_type.as_deref(), response.body);
                SlotCompletion::Success(self.succeed(response.status, response.status_text, body))
            }
            Ok(response) => {
                counter!(
                    REQUESTS_TOTAL,
                    "outcome" => "http_error",
                    "status" => response.status.to_string()
                )
                .increment(1);
                let body = classify::decode_text(&response.body);
                SlotCompletion::HttpError(self.reject(response.status, response.status_text, body))
            }
            Err(e) => {
                counter!(REQUESTS_TOTAL, "outcome" => "network_error").increment(1);
                SlotCompletion::NetworkError(self.fail(describe_transport_error(&e)))
            }
        }
    }
}
