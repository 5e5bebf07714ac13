//! # q-routing
//!
//! Learned vehicle routing: instead of a combinatorial solver, a DQN-style
//! agent is trained against a simulated single-vehicle routing environment
//! with capacity and time-window constraints, then compared against a
//! nearest-neighbor baseline.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (Stop, TimeWindow, Violation)
//! - [`distance`] — Haversine distance and travel time matrix
//! - [`dataset`] — Stop table loading, validation, and simulated generation
//! - [`env`] — Finite-horizon routing simulator (reset/step, reward, masking)
//! - [`agent`] — Q-network, replay memory, and the epsilon-greedy DQN agent
//! - [`training`] — Episode loop, metrics log, checkpoints, convergence
//! - [`evaluation`] — Nearest-neighbor baseline and greedy evaluation harness
//! - [`config`] — Flat configuration surface with documented defaults

pub mod agent;
pub mod config;
pub mod dataset;
pub mod distance;
pub mod env;
mod error;
pub mod evaluation;
pub mod models;
pub mod training;

pub use error::{Error, Result};
