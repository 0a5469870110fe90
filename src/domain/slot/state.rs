//! Result slot states.
//!
//! This module defines the per-request slot lifecycle using the typestate pattern.
//! A slot starts `Pending` and moves to exactly one terminal state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::content::RenderedContent;
use crate::domain::descriptor::{RequestDescriptor, SlotId};

/// State name for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStateFilter {
    Pending,
    Success,
    HttpError,
    NetworkError,
}

impl SlotStateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStateFilter::Pending => "pending",
            SlotStateFilter::Success => "success",
            SlotStateFilter::HttpError => "http_error",
            SlotStateFilter::NetworkError => "network_error",
        }
    }
}

impl std::fmt::Display for SlotStateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker trait for valid slot states.
pub trait SlotState: Send + Sync {}

/// A per-request presentation unit.
///
/// The generic parameter `T` is the current state. Transitions consume
/// `ResultSlot<Pending>`, so a slot can be finalized at most once.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSlot<T: SlotState> {
    /// The current state of the slot.
    pub state: T,
    /// Identity and request data, fixed at creation.
    pub data: SlotData,
}

/// Immutable slot data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotData {
    pub id: SlotId,
    /// Position in the batch (display order)
    pub position: usize,
    pub descriptor: RequestDescriptor,
}

// ============================================================================
// Slot States
// ============================================================================

/// Request dispatched, no outcome yet.
#[derive(Debug, Clone, Serialize)]
pub struct Pending {
    pub created_at: DateTime<Utc>,
}

impl SlotState for Pending {}

/// Response received with a 2xx status.
#[derive(Debug, Clone, Serialize)]
pub struct Success {
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub status_code: u16,
    pub status_text: String,
    pub body: RenderedContent,
}

impl SlotState for Success {}

/// Response received with a non-2xx status. The body is kept as text.
#[derive(Debug, Clone, Serialize)]
pub struct HttpError {
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub status_code: u16,
    pub status_text: String,
    pub body: String,
}

impl SlotState for HttpError {}

/// No response could be obtained.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkError {
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub error_message: String,
}

impl SlotState for NetworkError {}

// ============================================================================
// Unified Slot Representation
// ============================================================================

/// Outcome of executing a pending slot.
///
/// Only terminal states are representable here, which is what lets the
/// executor promise exactly one terminal transition per run.
#[derive(Debug, Clone)]
pub enum SlotCompletion {
    Success(ResultSlot<Success>),
    HttpError(ResultSlot<HttpError>),
    NetworkError(ResultSlot<NetworkError>),
}

impl SlotCompletion {
    pub fn state(&self) -> SlotStateFilter {
        match self {
            SlotCompletion::Success(_) => SlotStateFilter::Success,
            SlotCompletion::HttpError(_) => SlotStateFilter::HttpError,
            SlotCompletion::NetworkError(_) => SlotStateFilter::NetworkError,
        }
    }
}

/// Enum that can hold a slot in any state.
///
/// This is what the presentation layer stores, so it can handle slots
/// uniformly regardless of their current state.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "slot", rename_all = "snake_case")]
pub enum AnySlot {
    Pending(ResultSlot<Pending>),
    Success(ResultSlot<Success>),
    HttpError(ResultSlot<HttpError>),
    NetworkError(ResultSlot<NetworkError>),
}

impl AnySlot {
    pub fn data(&self) -> &SlotData {
        match self {
            AnySlot::Pending(s) => &s.data,
            AnySlot::Success(s) => &s.data,
            AnySlot::HttpError(s) => &s.data,
            AnySlot::NetworkError(s) => &s.data,
        }
    }

    pub fn id(&self) -> SlotId {
        self.data().id
    }

    pub fn position(&self) -> usize {
        self.data().position
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.data().descriptor
    }

    pub fn state(&self) -> SlotStateFilter {
        match self {
            AnySlot::Pending(_) => SlotStateFilter::Pending,
            AnySlot::Success(_) => SlotStateFilter::Success,
            AnySlot::HttpError(_) => SlotStateFilter::HttpError,
            AnySlot::NetworkError(_) => SlotStateFilter::NetworkError,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            AnySlot::Pending(s) => s.state.created_at,
            AnySlot::Success(s) => s.state.created_at,
            AnySlot::HttpError(s) => s.state.created_at,
            AnySlot::NetworkError(s) => s.state.created_at,
        }
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            AnySlot::Pending(_) => None,
            AnySlot::Success(s) => Some(s.state.completed_at),
            AnySlot::HttpError(s) => Some(s.state.completed_at),
            AnySlot::NetworkError(s) => Some(s.state.completed_at),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            AnySlot::Success(s) => Some(s.state.status_code),
            AnySlot::HttpError(s) => Some(s.state.status_code),
            AnySlot::Pending(_) | AnySlot::NetworkError(_) => None,
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        match self {
            AnySlot::Success(s) => Some(&s.state.status_text),
            AnySlot::HttpError(s) => Some(&s.state.status_text),
            AnySlot::Pending(_) | AnySlot::NetworkError(_) => None,
        }
    }

    /// Rendered body of a successful slot.
    pub fn body(&self) -> Option<&RenderedContent> {
        match self {
            AnySlot::Success(s) => Some(&s.state.body),
            _ => None,
        }
    }

    /// Diagnostic body text of an HTTP error slot.
    pub fn error_body(&self) -> Option<&str> {
        match self {
            AnySlot::HttpError(s) => Some(&s.state.body),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AnySlot::NetworkError(s) => Some(&s.state.error_message),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AnySlot::Pending(_))
    }

    /// Check if this slot is in a terminal state (Success, HttpError or NetworkError).
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AnySlot::HttpError(_) | AnySlot::NetworkError(_))
    }
}

// Conversion traits for going from typed ResultSlot to AnySlot

impl From<ResultSlot<Pending>> for AnySlot {
    fn from(s: ResultSlot<Pending>) -> Self {
        AnySlot::Pending(s)
    }
}

impl From<ResultSlot<Success>> for AnySlot {
    fn from(s: ResultSlot<Success>) -> Self {
        AnySlot::Success(s)
    }
}

impl From<ResultSlot<HttpError>> for AnySlot {
    fn from(s: ResultSlot<HttpError>) -> Self {
        AnySlot::HttpError(s)
    }
}

impl From<ResultSlot<NetworkError>> for AnySlot {
    fn from(s: ResultSlot<NetworkError>) -> Self {
        AnySlot::NetworkError(s)
    }
}

impl From<SlotCompletion> for AnySlot {
    fn from(completion: SlotCompletion) -> Self {
        match completion {
            SlotCompletion::Success(s) => AnySlot::Success(s),
            SlotCompletion::HttpError(s) => AnySlot::HttpError(s),
            SlotCompletion::NetworkError(s) => AnySlot::NetworkError(s),
        }
    }
}
