//! Checkpoint naming and discovery.

use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;

/// Maps monotonically-ordered checkpoint keys to file paths and finds the
/// most recent checkpoint in a directory.
///
/// The key is opaque to the store beyond its ordering — episode indices,
/// step counts, and timestamps all work. Writing itself is done by
/// [`DqnAgent::save`](crate::agent::DqnAgent::save), which replaces files
/// atomically.
///
/// # Examples
///
/// ```
/// use q_routing::training::CheckpointStore;
///
/// let store = CheckpointStore::new("model/checkpoints", "dqn");
/// assert!(store.path_for(900).ends_with("dqn_episode_900.json"));
/// assert!(store.final_path().ends_with("dqn_final.json"));
/// ```
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
    prefix: String,
}

impl CheckpointStore {
    /// Creates a store rooted at `dir` with the given filename prefix.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Path for an interval checkpoint with the given key.
    pub fn path_for(&self, key: u64) -> PathBuf {
        self.dir.join(format!("{}_episode_{key}.json", self.prefix))
    }

    /// Path for the distinguished end-of-training checkpoint.
    pub fn final_path(&self) -> PathBuf {
        self.dir.join(format!("{}_final.json", self.prefix))
    }

    /// The store's directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Most recent checkpoint on disk: the final checkpoint if present,
    /// otherwise the interval checkpoint with the largest key.
    pub fn latest(&self) -> Result<Option<PathBuf>> {
        let final_path = self.final_path();
        if final_path.exists() {
            return Ok(Some(final_path));
        }
        if !self.dir.exists() {
            return Ok(None);
        }

        let interval_prefix = format!("{}_episode_", self.prefix);
        let mut best: Option<(u64, PathBuf)> = None;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(key) = name
                .strip_prefix(&interval_prefix)
                .and_then(|rest| rest.strip_suffix(".json"))
                .and_then(|key| key.parse::<u64>().ok())
            else {
                continue;
            };
            if best.as_ref().is_none_or(|(k, _)| key > *k) {
                best = Some((key, path));
            }
        }
        Ok(best.map(|(_, path)| path))
    }
}
