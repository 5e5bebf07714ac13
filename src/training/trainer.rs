//! Episode-driven training loop.

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::agent::{DqnAgent, Transition, ValueEstimator};
use crate::env::Environment;
use crate::Result;

use super::checkpoint::CheckpointStore;
use super::metrics::{MetricsLog, TrainingRecord};

/// Training loop options.
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    /// Number of episodes to run.
    pub episodes: u64,
    /// Step cap per episode; exhaustion ends the episode without error.
    pub max_steps: usize,
    /// Episode cadence for interval checkpoints.
    pub save_interval: u64,
    /// Episode cadence for target network syncs.
    pub target_update_interval: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            episodes: 1000,
            max_steps: 100,
            save_interval: 100,
            target_update_interval: 10,
        }
    }
}

impl TrainingOptions {
    /// Sets the episode count.
    pub fn with_episodes(mut self, episodes: u64) -> Self {
        self.episodes = episodes;
        self
    }

    /// Sets the per-episode step cap.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the checkpoint cadence.
    pub fn with_save_interval(mut self, interval: u64) -> Self {
        self.save_interval = interval;
        self
    }

    /// Sets the target sync cadence.
    pub fn with_target_update_interval(mut self, interval: u64) -> Self {
        self.target_update_interval = interval;
        self
    }
}

/// Trains the agent against the environment for the configured episode
/// count, returning the per-episode metrics log.
///
/// Each episode runs act → step → remember → replay until the environment
/// reports done or `max_steps` is exhausted. The target network is synced
/// every `target_update_interval` episodes; checkpoints are written every
/// `save_interval` episodes and once more at the end of training when a
/// store is given.
///
/// Running zero episodes leaves the agent untouched and returns an empty
/// log.
pub fn train<M, R>(
    env: &mut Environment,
    agent: &mut DqnAgent<M>,
    options: &TrainingOptions,
    checkpoints: Option<&CheckpointStore>,
    rng: &mut R,
) -> Result<MetricsLog>
where
    M: ValueEstimator + Clone + Serialize + DeserializeOwned,
    R: Rng,
{
    let mut log = MetricsLog::new();

    for episode in 1..=options.episodes {
        let mut state = env.reset();
        let mut total_reward = 0.0;
        let mut total_distance = 0.0;
        let mut total_time = 0.0;
        let mut visited_count = 0;
        let mut completed = false;

        for _ in 0..options.max_steps {
            let valid_actions = env.valid_actions();
            if valid_actions.is_empty() {
                completed = true;
                break;
            }

            let action = agent.act(&state, &valid_actions, rng)?;
            let outcome = env.step(action);
            agent.remember(Transition {
                state,
                action,
                reward: outcome.reward,
                next_state: outcome.state.clone(),
                done: outcome.done,
            });
            agent.replay(rng);

            state = outcome.state;
            total_reward += outcome.reward;
            total_distance = outcome.info.total_distance;
            total_time = outcome.info.total_time;
            visited_count = outcome.info.visited_count;

            if outcome.done {
                completed = true;
                break;
            }
        }

        if !completed {
            debug!(episode, "episode exhausted max_steps without finishing");
        }

        if options.target_update_interval > 0 && episode % options.target_update_interval == 0 {
            agent.update_target();
        }

        if let Some(store) = checkpoints {
            if options.save_interval > 0 && episode % options.save_interval == 0 {
                agent.save(store.path_for(episode))?;
            }
        }

        log.push(TrainingRecord {
            episode,
            total_reward,
            total_distance,
            total_time,
            visited_customers: visited_count,
            epsilon: agent.epsilon(),
        });

        if episode % 100 == 0 || episode == options.episodes {
            info!(
                episode,
                total_reward,
                total_distance,
                visited_count,
                epsilon = agent.epsilon(),
                "training progress"
            );
        }
    }

    if let Some(store) = checkpoints {
        if options.episodes > 0 {
            agent.save(store.final_path())?;
        }
    }

    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentOptions;
    use crate::dataset::Dataset;
    use crate::env::EnvOptions;
    use crate::models::{Stop, TimeWindow};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_setup() -> (Environment, DqnAgent) {
        let tw = TimeWindow::new(0.0, 24.0).expect("valid");
        let dataset = Dataset::from_stops(vec![
            Stop::depot(-6.2088, 106.8456).with_time_window(tw),
            Stop::new(1, -6.1702, 106.9417, 1700.0, 1.0).with_time_window(tw),
            Stop::new(2, -6.2383, 106.9756, 500.0, 1.0).with_time_window(tw),
        ])
        .expect("valid dataset");
        let env = Environment::new(dataset, EnvOptions::default());

        let agent_options = AgentOptions {
            batch_size: 8,
            memory_size: 500,
            hidden_layers: vec![16],
            ..AgentOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let agent = DqnAgent::new(env.state_len(), env.action_len(), &agent_options, &mut rng);
        (env, agent)
    }

    #[test]
    fn test_zero_episodes_is_noop() {
        let (mut env, mut agent) = small_setup();
        let before = serde_json::to_string(agent.estimator()).expect("serialize");

        let options = TrainingOptions::default().with_episodes(0);
        let mut rng = StdRng::seed_from_u64(1);
        let log = train(&mut env, &mut agent, &options, None, &mut rng).expect("train");

        assert!(log.is_empty());
        let after = serde_json::to_string(agent.estimator()).expect("serialize");
        assert_eq!(before, after);
        assert_eq!(agent.epsilon(), 1.0);
    }

    #[test]
    fn test_log_has_one_record_per_episode() {
        let (mut env, mut agent) = small_setup();
        let options = TrainingOptions::default()
            .with_episodes(20)
            .with_max_steps(10);
        let mut rng = StdRng::seed_from_u64(2);
        let log = train(&mut env, &mut agent, &options, None, &mut rng).expect("train");

        assert_eq!(log.len(), 20);
        for (i, record) in log.records().iter().enumerate() {
            assert_eq!(record.episode, i as u64 + 1);
            assert!(record.visited_customers <= 2);
        }
    }

    #[test]
    fn test_epsilon_non_increasing_across_log() {
        let (mut env, mut agent) = small_setup();
        let options = TrainingOptions::default()
            .with_episodes(40)
            .with_max_steps(10);
        let mut rng = StdRng::seed_from_u64(3);
        let log = train(&mut env, &mut agent, &options, None, &mut rng).expect("train");

        for pair in log.records().windows(2) {
            assert!(pair[1].epsilon <= pair[0].epsilon);
        }
    }

    #[test]
    fn test_checkpoints_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CheckpointStore::new(dir.path(), "dqn");

        let (mut env, mut agent) = small_setup();
        let options = TrainingOptions::default()
            .with_episodes(10)
            .with_max_steps(10)
            .with_save_interval(5);
        let mut rng = StdRng::seed_from_u64(4);
        train(&mut env, &mut agent, &options, Some(&store), &mut rng).expect("train");

        assert!(store.path_for(5).exists());
        assert!(store.path_for(10).exists());
        assert!(store.final_path().exists());
        assert!(!store.path_for(3).exists());
    }

    #[test]
    fn test_training_runs_all_episodes_despite_violations() {
        // Tiny capacity: nearly every episode ends in a capacity violation
        let tw = TimeWindow::new(0.0, 24.0).expect("valid");
        let dataset = Dataset::from_stops(vec![
            Stop::depot(-6.2088, 106.8456).with_time_window(tw),
            Stop::new(1, -6.1702, 106.9417, 1700.0, 1.0).with_time_window(tw),
            Stop::new(2, -6.2383, 106.9756, 500.0, 1.0).with_time_window(tw),
        ])
        .expect("valid dataset");
        let mut env = Environment::new(
            dataset,
            EnvOptions::default().with_max_capacity(600.0),
        );

        let agent_options = AgentOptions {
            batch_size: 8,
            memory_size: 500,
            hidden_layers: vec![16],
            ..AgentOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut agent =
            DqnAgent::new(env.state_len(), env.action_len(), &agent_options, &mut rng);

        let options = TrainingOptions::default()
            .with_episodes(15)
            .with_max_steps(10);
        let log = train(&mut env, &mut agent, &options, None, &mut rng).expect("train");
        assert_eq!(log.len(), 15);
    }
}
