//! Crate error type.

/// Errors surfaced by dataset IO, checkpointing, and agent contracts.
///
/// Constraint violations during an episode are deliberately *not* errors:
/// they terminate the episode with a penalty and travel in
/// [`StepInfo`](crate::env::StepInfo).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Dataset failed validation (bad depot row, negative demand, etc.).
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// `act` was called with an empty valid-action set. The training loop
    /// must never ask for an action once an episode is done.
    #[error("act called with an empty valid-action set")]
    EmptyActionSet,

    /// A checkpoint file could not be read or parsed.
    #[error("checkpoint {path}: {reason}")]
    Checkpoint { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;
