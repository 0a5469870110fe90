//! Result slot aggregate - states and transitions.

pub mod state;
pub mod transitions;

pub use state::*;
