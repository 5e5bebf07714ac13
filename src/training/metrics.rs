//! Training metrics log and convergence diagnostics.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// One row of the training metrics log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// Episode index (1-based).
    pub episode: u64,
    /// Sum of rewards over the episode.
    pub total_reward: f64,
    /// Cumulative travel distance, km.
    pub total_distance: f64,
    /// Cumulative travel time, hours.
    pub total_time: f64,
    /// Destinations served.
    pub visited_customers: usize,
    /// Exploration rate at episode end.
    pub epsilon: f64,
}

/// Append-only, one-record-per-episode training log.
#[derive(Debug, Clone, Default)]
pub struct MetricsLog {
    records: Vec<TrainingRecord>,
}

impl MetricsLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one episode's record.
    pub fn push(&mut self, record: TrainingRecord) {
        self.records.push(record);
    }

    /// All records in episode order.
    pub fn records(&self) -> &[TrainingRecord] {
        &self.records
    }

    /// Number of recorded episodes.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no episodes have been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes the log as CSV.
    pub fn write_csv_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Reads a log previously written with
    /// [`write_csv_path`](Self::write_csv_path).
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(Self { records })
    }
}

/// Trailing moving average with an expanding warm-up.
///
/// `out[i]` averages the last `window` values ending at `i`; the first
/// `window - 1` entries average everything seen so far.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window > 0, "window must be positive");
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for i in 0..values.len() {
        sum += values[i];
        if i >= window {
            sum -= values[i - window];
        }
        let count = (i + 1).min(window);
        out.push(sum / count as f64);
    }
    out
}

/// Convergence diagnostics derived from a training log.
///
/// Diagnostic only — training always runs the configured episode count.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceReport {
    /// Episode maximizing the reward moving average.
    pub optimal_episode: u64,
    /// The moving-average value at that episode.
    pub optimal_moving_average: f64,
    /// Standard deviation of the trailing moving-average points.
    pub trailing_std: f64,
    /// Whether the trailing moving average has stabilized.
    pub converged: bool,
}

/// Window of trailing moving-average points examined for stability.
const STABILITY_TAIL: usize = 100;

/// Fraction of the tail mean below which the tail std counts as stable.
const STABILITY_THRESHOLD: f64 = 0.05;

/// Analyzes reward convergence with the given moving-average window.
///
/// Returns `None` for an empty log. The log is judged converged once the
/// standard deviation of the last 100 moving-average points falls below 5%
/// of their mean magnitude (requires at least 100 episodes).
pub fn analyze_convergence(log: &MetricsLog, window: usize) -> Option<ConvergenceReport> {
    if log.is_empty() {
        return None;
    }
    let rewards: Vec<f64> = log.records().iter().map(|r| r.total_reward).collect();
    let averages = moving_average(&rewards, window);

    let (best_index, best_value) = averages
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).expect("rewards should not be NaN"))?;

    let tail = &averages[averages.len().saturating_sub(STABILITY_TAIL)..];
    let mean = tail.iter().sum::<f64>() / tail.len() as f64;
    let variance = tail.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / tail.len() as f64;
    let trailing_std = variance.sqrt();

    let converged =
        averages.len() >= STABILITY_TAIL && trailing_std < STABILITY_THRESHOLD * mean.abs();

    Some(ConvergenceReport {
        optimal_episode: log.records()[best_index].episode,
        optimal_moving_average: *best_value,
        trailing_std,
        converged,
    })
}
