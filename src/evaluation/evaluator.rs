//! Greedy evaluation harness.

use std::path::Path;

use rand::Rng;
use serde::Serialize;

use crate::agent::{DqnAgent, ValueEstimator};
use crate::env::Environment;
use crate::Result;

use super::baseline::BaselineRoute;

/// One greedy rollout's metrics, immutable after creation.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRecord {
    /// Sum of rewards over the rollout.
    pub reward: f64,
    /// Travel distance, km.
    pub distance: f64,
    /// Travel time, hours.
    pub time: f64,
    /// Destinations served over total destinations, in `[0, 1]`.
    pub completion_rate: f64,
    /// Used capacity as a percentage of the maximum.
    pub utilization: f64,
    /// Capacity violations this rollout (0 or 1).
    pub capacity_violations: u32,
    /// Time violations this rollout (missed window or horizon; 0 or 1).
    pub time_window_violations: u32,
}

/// Aggregate metrics over all evaluation rollouts.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    /// Number of rollouts.
    pub episodes: usize,
    /// Mean rollout reward.
    pub average_reward: f64,
    /// Mean rollout distance, km.
    pub average_distance: f64,
    /// Mean rollout time, hours.
    pub average_time: f64,
    /// Mean completion rate, in `[0, 1]`.
    pub average_completion_rate: f64,
    /// Mean utilization percentage.
    pub average_utilization: f64,
    /// Total capacity violations.
    pub capacity_violations: u32,
    /// Total time violations.
    pub time_window_violations: u32,
    /// Nearest-neighbor baseline distance, km.
    pub baseline_distance: f64,
    /// Nearest-neighbor baseline time, hours.
    pub baseline_time: f64,
    /// `baseline / mean(agent distance) × 100`.
    pub route_efficiency: f64,
    /// `(baseline − mean(agent distance)) / baseline × 100`.
    pub distance_optimization: f64,
}

/// Evaluation options.
#[derive(Debug, Clone)]
pub struct EvaluationOptions {
    /// Number of greedy rollouts.
    pub episodes: usize,
    /// Step cap per rollout.
    pub max_steps: usize,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            episodes: 50,
            max_steps: 100,
        }
    }
}

/// Runs greedy (epsilon = 0) rollouts and aggregates metrics against the
/// baseline.
///
/// Identical to the training loop's inner loop but with exploration disabled
/// and no remember/replay — the agent's estimator is read, never written.
/// Constraint violations are counted per category, not raised.
pub fn evaluate<M, R>(
    env: &mut Environment,
    agent: &mut DqnAgent<M>,
    baseline: &BaselineRoute,
    options: &EvaluationOptions,
    rng: &mut R,
) -> Result<(EvaluationSummary, Vec<EvaluationRecord>)>
where
    M: ValueEstimator + Clone,
    R: Rng,
{
    agent.set_epsilon(0.0);

    let mut records = Vec::with_capacity(options.episodes);
    for _ in 0..options.episodes {
        let mut state = env.reset();
        let mut reward = 0.0;
        let mut capacity_violations = 0;
        let mut time_window_violations = 0;
        let mut distance = 0.0;
        let mut time = 0.0;

        for _ in 0..options.max_steps {
            let valid_actions = env.valid_actions();
            if valid_actions.is_empty() {
                break;
            }
            let action = agent.act(&state, &valid_actions, rng)?;
            let outcome = env.step(action);

            state = outcome.state;
            reward += outcome.reward;
            distance = outcome.info.total_distance;
            time = outcome.info.total_time;

            if let Some(violation) = &outcome.info.violation {
                if violation.is_capacity() {
                    capacity_violations += 1;
                }
                if violation.is_time() {
                    time_window_violations += 1;
                }
            }
            if outcome.done {
                break;
            }
        }

        let max_capacity = env.max_capacity();
        let utilization = if max_capacity > 0.0 {
            (max_capacity - env.remaining_capacity()) / max_capacity * 100.0
        } else {
            0.0
        };

        records.push(EvaluationRecord {
            reward,
            distance,
            time,
            completion_rate: env.completion_rate(),
            utilization,
            capacity_violations,
            time_window_violations,
        });
    }

    let summary = summarize(&records, baseline);
    Ok((summary, records))
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        values.sum::<f64>() / count as f64
    }
}

fn summarize(records: &[EvaluationRecord], baseline: &BaselineRoute) -> EvaluationSummary {
    let n = records.len();
    let average_distance = mean(records.iter().map(|r| r.distance), n);
    let baseline_distance = baseline.total_distance();

    let route_efficiency = if average_distance > 0.0 {
        baseline_distance / average_distance * 100.0
    } else {
        0.0
    };
    let distance_optimization = if baseline_distance > 0.0 {
        (baseline_distance - average_distance) / baseline_distance * 100.0
    } else {
        0.0
    };

    EvaluationSummary {
        episodes: n,
        average_reward: mean(records.iter().map(|r| r.reward), n),
        average_distance,
        average_time: mean(records.iter().map(|r| r.time), n),
        average_completion_rate: mean(records.iter().map(|r| r.completion_rate), n),
        average_utilization: mean(records.iter().map(|r| r.utilization), n),
        capacity_violations: records.iter().map(|r| r.capacity_violations).sum(),
        time_window_violations: records.iter().map(|r| r.time_window_violations).sum(),
        baseline_distance,
        baseline_time: baseline.total_time(),
        route_efficiency,
        distance_optimization,
    }
}

/// Writes the aggregate summary as a single-row CSV.
pub fn write_summary_csv(path: impl AsRef<Path>, summary: &EvaluationSummary) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.serialize(summary)?;
    writer.flush()?;
    Ok(())
}

/// Writes the per-rollout records as CSV.
pub fn write_records_csv(path: impl AsRef<Path>, records: &[EvaluationRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentOptions;
    use crate::dataset::Dataset;
    use crate::distance::DistanceMatrix;
    use crate::env::EnvOptions;
    use crate::evaluation::nearest_neighbor_baseline;
    use crate::models::{Stop, TimeWindow};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn jabodetabek() -> Dataset {
        let tw = TimeWindow::new(0.0, 24.0).expect("valid");
        Dataset::from_stops(vec![
            Stop::depot(-6.2088, 106.8456).with_time_window(tw),
            Stop::new(1, -6.1702, 106.9417, 1700.0, 1.0).with_time_window(tw),
            Stop::new(2, -6.2383, 106.9756, 500.0, 1.0).with_time_window(tw),
            Stop::new(3, -6.5950, 106.8167, 2000.0, 1.0).with_time_window(tw),
            Stop::new(4, -6.1783, 106.6319, 700.0, 1.0).with_time_window(tw),
        ])
        .expect("valid dataset")
    }

    fn setup(capacity: f64) -> (Environment, DqnAgent, BaselineRoute) {
        let dataset = jabodetabek();
        let dm = DistanceMatrix::from_stops(dataset.stops());
        let baseline = nearest_neighbor_baseline(&dataset, &dm, 50.0);
        let env = Environment::new(
            dataset,
            EnvOptions::default().with_max_capacity(capacity),
        );

        let agent_options = AgentOptions {
            hidden_layers: vec![16],
            ..AgentOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let agent = DqnAgent::new(env.state_len(), env.action_len(), &agent_options, &mut rng);
        (env, agent, baseline)
    }

    // Scenario: capacity 6000 never binds, greedy rollouts complete fully
    #[test]
    fn test_greedy_rollouts_complete_with_ample_capacity() {
        let (mut env, mut agent, baseline) = setup(6000.0);
        let options = EvaluationOptions {
            episodes: 3,
            max_steps: 20,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let (summary, records) =
            evaluate(&mut env, &mut agent, &baseline, &options, &mut rng).expect("evaluate");

        assert_eq!(records.len(), 3);
        for record in &records {
            assert_eq!(record.completion_rate, 1.0);
            assert_eq!(record.capacity_violations, 0);
            // all 4900 units delivered out of 6000
            assert!((record.utilization - 4900.0 / 6000.0 * 100.0).abs() < 1e-9);
        }
        assert_eq!(summary.average_completion_rate, 1.0);
        assert_eq!(summary.capacity_violations, 0);
    }

    // Scenario: capacity 1000 makes full completion impossible
    #[test]
    fn test_tight_capacity_reports_violations_or_partial_completion() {
        let (mut env, mut agent, baseline) = setup(1000.0);
        let options = EvaluationOptions {
            episodes: 5,
            max_steps: 20,
        };
        let mut rng = StdRng::seed_from_u64(2);
        let (summary, records) =
            evaluate(&mut env, &mut agent, &baseline, &options, &mut rng).expect("evaluate");

        for record in &records {
            assert!(record.completion_rate < 1.0);
            assert!(record.completion_rate >= 0.0);
        }
        assert!(summary.average_completion_rate < 1.0);
    }

    #[test]
    fn test_greedy_rollouts_are_identical() {
        let (mut env, mut agent, baseline) = setup(6000.0);
        let options = EvaluationOptions {
            episodes: 4,
            max_steps: 20,
        };
        let mut rng = StdRng::seed_from_u64(3);
        let (_, records) =
            evaluate(&mut env, &mut agent, &baseline, &options, &mut rng).expect("evaluate");

        // At epsilon 0 every rollout follows the same greedy policy
        for record in &records[1..] {
            assert_eq!(record.distance, records[0].distance);
            assert_eq!(record.reward, records[0].reward);
        }
    }

    #[test]
    fn test_efficiency_metrics_consistency() {
        let (mut env, mut agent, baseline) = setup(6000.0);
        let options = EvaluationOptions {
            episodes: 2,
            max_steps: 20,
        };
        let mut rng = StdRng::seed_from_u64(4);
        let (summary, _) =
            evaluate(&mut env, &mut agent, &baseline, &options, &mut rng).expect("evaluate");

        assert!(summary.baseline_distance > 0.0);
        assert!(summary.average_distance > 0.0);
        let expected_efficiency = summary.baseline_distance / summary.average_distance * 100.0;
        assert!((summary.route_efficiency - expected_efficiency).abs() < 1e-9);
        let expected_optimization = (summary.baseline_distance - summary.average_distance)
            / summary.baseline_distance
            * 100.0;
        assert!((summary.distance_optimization - expected_optimization).abs() < 1e-9);
    }

    #[test]
    fn test_summary_csv_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let summary_path = dir.path().join("evaluation_summary.csv");
        let records_path = dir.path().join("evaluation_episodes.csv");

        let (mut env, mut agent, baseline) = setup(6000.0);
        let options = EvaluationOptions {
            episodes: 2,
            max_steps: 20,
        };
        let mut rng = StdRng::seed_from_u64(5);
        let (summary, records) =
            evaluate(&mut env, &mut agent, &baseline, &options, &mut rng).expect("evaluate");

        write_summary_csv(&summary_path, &summary).expect("summary csv");
        write_records_csv(&records_path, &records).expect("records csv");

        let summary_text = std::fs::read_to_string(&summary_path).expect("read");
        assert!(summary_text.contains("route_efficiency"));
        let records_text = std::fs::read_to_string(&records_path).expect("read");
        assert_eq!(records_text.lines().count(), 1 + records.len());
    }
}
