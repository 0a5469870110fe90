//! Request descriptors and the identifiers used to track slots and batches.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::VolleyError;

/// What to fetch, plus a human-readable category label for display.
///
/// Descriptors are immutable once created; a batch consumes its descriptors
/// and each one ends up paired with exactly one result slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Target URI, either absolute or relative to the configured base URL
    pub uri: String,
    /// Display label (e.g. "Slow (CGI)")
    pub label: String,
}

impl RequestDescriptor {
    pub fn new(uri: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: label.into(),
        }
    }
}

/// Parses `URI` or `URI,LABEL`. A missing label defaults to `GET`.
impl std::str::FromStr for RequestDescriptor {
    type Err = VolleyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (uri, label) = match s.split_once(',') {
            Some((uri, label)) => (uri.trim(), label.trim()),
            None => (s.trim(), "GET"),
        };

        if uri.is_empty() {
            return Err(VolleyError::InvalidUri(s.to_string()));
        }

        Ok(RequestDescriptor::new(uri, label))
    }
}

/// Unique identifier for a result slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SlotId(pub Uuid);

impl SlotId {
    pub fn new() -> Self {
        SlotId(Uuid::new_v4())
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display only first 8 characters for readability in logs
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

impl From<Uuid> for SlotId {
    fn from(uuid: Uuid) -> Self {
        SlotId(uuid)
    }
}

impl std::ops::Deref for SlotId {
    type Target = Uuid;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Batch generation counter.
///
/// Every clear of the presentation starts a new generation. Slot handles
/// remember the generation they were created in, so writes from a batch that
/// has since been reset can be recognised and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
