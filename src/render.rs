//! Terminal rendering of result slots.
//!
//! Success, HTTP errors and network errors each get their own marker and
//! wording, so an operator can tell "server answered but rejected" from
//! "server unreachable" at a glance.

use chrono::{DateTime, Local, Utc};

use crate::domain::content::RenderedContent;
use crate::domain::slot::AnySlot;

pub const PENDING_MARKER: &str = "[pending]";
pub const SUCCESS_MARKER: &str = "[ok]";
pub const ERROR_MARKER: &str = "[error]";

/// Placeholder body shown while a request is in flight.
pub const PENDING_TEXT: &str = "Processing...";

pub fn marker(slot: &AnySlot) -> &'static str {
    if slot.is_pending() {
        PENDING_MARKER
    } else if slot.is_error() {
        ERROR_MARKER
    } else {
        SUCCESS_MARKER
    }
}

fn clock(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// `Started at HH:MM:SS` while pending, `Completed at HH:MM:SS` afterwards.
pub fn timestamp_line(slot: &AnySlot) -> String {
    match slot.completed_at() {
        Some(completed_at) => format!("Completed at {}", clock(completed_at)),
        None => format!("Started at {}", clock(slot.created_at())),
    }
}

pub fn header(slot: &AnySlot) -> String {
    let descriptor = slot.descriptor();
    format!(
        "{} {} {} ({})",
        marker(slot),
        descriptor.label,
        descriptor.uri,
        timestamp_line(slot)
    )
}

/// The slot's body text. Successful text bodies are passed through verbatim,
/// markup included.
pub fn body(slot: &AnySlot) -> String {
    match slot {
        AnySlot::Pending(_) => PENDING_TEXT.to_string(),
        AnySlot::Success(s) => match &s.state.body {
            RenderedContent::Text(text) => text.clone(),
            RenderedContent::Binary(image) => {
                format!("[image {}, {} bytes] {}", image.mime, image.len, image.url)
            }
        },
        AnySlot::HttpError(s) => format!(
            "Error {}: {}\n\n{}",
            s.state.status_code, s.state.status_text, s.state.body
        ),
        AnySlot::NetworkError(s) => format!("Network error: {}", s.state.error_message),
    }
}

/// Header line followed by the body.
pub fn render_slot(slot: &AnySlot) -> String {
    format!("{}\n{}", header(slot), body(slot))
}
