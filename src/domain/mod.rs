//! Core domain types for the probe harness.
//!
//! Pure data with no I/O:
//! - Request descriptors, slot ids and batch generations
//! - Rendered content
//! - Result slot typestate machine

pub mod content;
pub mod descriptor;
pub mod slot;
