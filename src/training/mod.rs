//! Training loop, metrics log, checkpoints, and convergence diagnostics.

mod checkpoint;
mod metrics;
mod trainer;

pub use checkpoint::CheckpointStore;
pub use metrics::{
    analyze_convergence, moving_average, ConvergenceReport, MetricsLog, TrainingRecord,
};
pub use trainer::{train, TrainingOptions};
