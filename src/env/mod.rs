//! Finite-horizon routing simulator.
//!
//! - [`Environment`] — reset/step over a dataset, constraint enforcement,
//!   reward signal, valid-action masking
//! - [`StateVector`] — fixed-schema observation encoding
//! - [`ImpactModel`] — weather/traffic collaborator contract

mod environment;
mod impact;
mod state;

pub use environment::{
    EnvOptions, Environment, RewardWeights, StepInfo, StepOutcome, VIOLATION_PENALTY,
};
pub use impact::{ImpactModel, UniformImpact};
pub use state::{StateVector, FIXED_FEATURES};
