//! Domain model types for learned vehicle routing.
//!
//! Provides the core abstractions: stops with demands and time windows,
//! and the constraint violations that terminate an episode.

mod stop;
mod violation;

pub use stop::{Stop, TimeWindow};
pub use violation::Violation;
