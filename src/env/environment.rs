//! Finite-horizon single-vehicle routing simulator.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::distance::{travel_time, DistanceMatrix};
use crate::models::Violation;

use super::impact::{ImpactModel, UniformImpact};
use super::state::StateVector;

/// Reward for any constraint-violating action. Dominates every achievable
/// per-step reward so violations are never worth trading for distance.
pub const VIOLATION_PENALTY: f64 = -1000.0;

/// Reward shaping weights.
///
/// The shape is fixed — distance penalty, per-visit progress, completion
/// bonus — while the coefficients are a configuration surface. Any weighting
/// that keeps completion strictly more rewarding than non-completion is
/// trainable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardWeights {
    /// Multiplier on the negative distance term, per km.
    pub distance: f64,
    /// Bonus per visited stop, scaled by the running visit count.
    pub progress: f64,
    /// One-time bonus when every destination has been served.
    pub completion: f64,
    /// Bonus for arriving inside a stop's window without waiting.
    pub time_window_bonus: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            distance: 0.01,
            progress: 10.0,
            completion: 50.0,
            time_window_bonus: 0.0,
        }
    }
}

/// Environment construction options.
#[derive(Debug, Clone)]
pub struct EnvOptions {
    /// Maximum vehicle load.
    pub max_capacity: f64,
    /// Reference travel speed in km/h.
    pub speed_kmh: f64,
    /// Episode horizon in hours; elapsed time may never exceed it.
    pub horizon: f64,
    /// Whether arriving after a stop's due time terminates the episode.
    pub enforce_time_windows: bool,
    /// Reward shaping weights.
    pub reward: RewardWeights,
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self {
            max_capacity: 6000.0,
            speed_kmh: 50.0,
            horizon: 24.0,
            enforce_time_windows: true,
            reward: RewardWeights::default(),
        }
    }
}

impl EnvOptions {
    /// Sets the maximum vehicle load.
    pub fn with_max_capacity(mut self, capacity: f64) -> Self {
        self.max_capacity = capacity;
        self
    }

    /// Sets the reference travel speed.
    pub fn with_speed_kmh(mut self, speed: f64) -> Self {
        self.speed_kmh = speed;
        self
    }

    /// Sets the episode horizon.
    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    /// Enables or disables time window enforcement.
    pub fn with_time_windows(mut self, enforce: bool) -> Self {
        self.enforce_time_windows = enforce;
        self
    }

    /// Sets the reward shaping weights.
    pub fn with_reward(mut self, reward: RewardWeights) -> Self {
        self.reward = reward;
        self
    }
}

/// Mutable per-episode bookkeeping, reassigned wholesale on reset.
#[derive(Debug, Clone)]
struct EpisodeState {
    current_stop: usize,
    remaining_capacity: f64,
    elapsed_time: f64,
    visited: Vec<bool>,
    total_distance: f64,
    total_time: f64,
    done: bool,
}

impl EpisodeState {
    fn initial(num_stops: usize, max_capacity: f64) -> Self {
        let mut visited = vec![false; num_stops];
        if num_stops > 0 {
            visited[0] = true; // depot
        }
        Self {
            current_stop: 0,
            remaining_capacity: max_capacity,
            elapsed_time: 0.0,
            visited,
            total_distance: 0.0,
            total_time: 0.0,
            done: num_stops <= 1,
        }
    }
}

/// Running totals carried in every step outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Cumulative travel distance this episode, in km.
    pub total_distance: f64,
    /// Cumulative travel time this episode, in hours (excludes service).
    pub total_time: f64,
    /// Number of destinations served this episode.
    pub visited_count: usize,
    /// The violation that terminated the episode, if any.
    pub violation: Option<Violation>,
}

/// Result of a single `step` call.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// State after the step.
    pub state: StateVector,
    /// Reward for the step.
    pub reward: f64,
    /// Whether the episode has terminated.
    pub done: bool,
    /// Running totals and violation data.
    pub info: StepInfo,
}

/// Simulates one vehicle serving a dataset's stops from the depot, enforcing
/// capacity and time-window feasibility and producing the reward signal.
///
/// # Examples
///
/// ```
/// use q_routing::dataset::Dataset;
/// use q_routing::env::{EnvOptions, Environment};
/// use q_routing::models::Stop;
///
/// let dataset = Dataset::from_stops(vec![
///     Stop::depot(-6.2088, 106.8456),
///     Stop::new(1, -6.1702, 106.9417, 1700.0, 1.0),
/// ])
/// .unwrap();
///
/// let mut env = Environment::new(dataset, EnvOptions::default());
/// let state = env.reset();
/// assert_eq!(state.len(), 5 + 2);
///
/// let outcome = env.step(1);
/// assert!(outcome.done); // single destination served
/// assert_eq!(outcome.info.visited_count, 1);
/// ```
pub struct Environment {
    dataset: Dataset,
    distances: DistanceMatrix,
    options: EnvOptions,
    weather: Box<dyn ImpactModel>,
    traffic: Box<dyn ImpactModel>,
    weather_impact: f64,
    traffic_impact: f64,
    episode: EpisodeState,
}

impl Environment {
    /// Creates an environment over the dataset with neutral impact models.
    pub fn new(dataset: Dataset, options: EnvOptions) -> Self {
        let distances = DistanceMatrix::from_stops(dataset.stops());
        let episode = EpisodeState::initial(dataset.len(), options.max_capacity);
        Self {
            dataset,
            distances,
            options,
            weather: Box::new(UniformImpact::default()),
            traffic: Box::new(UniformImpact::default()),
            weather_impact: 1.0,
            traffic_impact: 1.0,
            episode,
        }
    }

    /// Replaces the weather impact collaborator.
    pub fn with_weather_model(mut self, model: Box<dyn ImpactModel>) -> Self {
        self.weather = model;
        self
    }

    /// Replaces the traffic impact collaborator.
    pub fn with_traffic_model(mut self, model: Box<dyn ImpactModel>) -> Self {
        self.traffic = model;
        self
    }

    /// Resets to the initial episode state and returns the starting
    /// observation: vehicle at the depot, full capacity, zero elapsed time,
    /// only the depot visited. Impact factors are re-sampled once here.
    pub fn reset(&mut self) -> StateVector {
        self.episode = EpisodeState::initial(self.dataset.len(), self.options.max_capacity);
        let depot = &self.dataset.stops()[0];
        self.weather_impact = self.weather.impact(depot.latitude(), depot.longitude());
        self.traffic_impact = self.traffic.impact(depot.latitude(), depot.longitude());
        self.encode_state()
    }

    /// Advances the episode by visiting `action`.
    ///
    /// Violations (revisit, capacity, time window, horizon) terminate the
    /// episode with [`VIOLATION_PENALTY`] and are reported in the outcome's
    /// info — they are episode data, not errors. Callers should restrict
    /// themselves to [`valid_actions`](Self::valid_actions); the checks here
    /// are defensive.
    ///
    /// # Panics
    ///
    /// Panics if `action` is not a stop ID in the dataset.
    pub fn step(&mut self, action: usize) -> StepOutcome {
        assert!(
            action < self.dataset.len(),
            "action {action} out of range for {} stops",
            self.dataset.len()
        );

        if self.episode.visited[action] {
            return self.violation_outcome(Violation::AlreadyVisited { stop_id: action });
        }

        let stop = &self.dataset.stops()[action];
        if stop.demand() > self.episode.remaining_capacity {
            return self.violation_outcome(Violation::CapacityExceeded {
                stop_id: action,
                demand: stop.demand(),
                remaining: self.episode.remaining_capacity,
            });
        }

        let distance = self.distances.get(self.episode.current_stop, action);
        let travel = travel_time(distance, self.options.speed_kmh);
        let arrival = self.episode.elapsed_time + travel;

        let mut waiting = 0.0;
        let mut window_hit = false;
        if self.options.enforce_time_windows {
            if let Some(tw) = stop.time_window() {
                if tw.is_violated(arrival) {
                    return self.violation_outcome(Violation::TimeWindowMissed {
                        stop_id: action,
                        arrival,
                        due: tw.due(),
                    });
                }
                waiting = tw.waiting_time(arrival);
                window_hit = waiting == 0.0;
            }
        }

        let elapsed_after = arrival + waiting + stop.service_time();
        if elapsed_after > self.options.horizon {
            return self.violation_outcome(Violation::HorizonExceeded {
                stop_id: action,
                elapsed: elapsed_after,
                horizon: self.options.horizon,
            });
        }

        self.episode.remaining_capacity -= stop.demand();
        self.episode.elapsed_time = elapsed_after;
        self.episode.visited[action] = true;
        self.episode.current_stop = action;
        self.episode.total_distance += distance;
        self.episode.total_time += travel;

        let visited_count = self.visited_count();
        let completed = visited_count == self.dataset.num_destinations();
        self.episode.done = completed;

        let reward = self.reward_for_visit(distance, visited_count, completed, window_hit);

        StepOutcome {
            state: self.encode_state(),
            reward,
            done: completed,
            info: self.info(None),
        }
    }

    /// Stop IDs still available to visit (unvisited, non-depot).
    pub fn valid_actions(&self) -> Vec<usize> {
        self.episode
            .visited
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, &v)| !v)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of destinations served this episode.
    pub fn visited_count(&self) -> usize {
        self.episode.visited.iter().skip(1).filter(|&&v| v).count()
    }

    /// Fraction of destinations served, in `[0, 1]`.
    pub fn completion_rate(&self) -> f64 {
        let n = self.dataset.num_destinations();
        if n == 0 {
            1.0
        } else {
            self.visited_count() as f64 / n as f64
        }
    }

    /// Whether the episode has terminated.
    pub fn is_done(&self) -> bool {
        self.episode.done
    }

    /// Remaining vehicle capacity.
    pub fn remaining_capacity(&self) -> f64 {
        self.episode.remaining_capacity
    }

    /// Configured maximum vehicle capacity.
    pub fn max_capacity(&self) -> f64 {
        self.options.max_capacity
    }

    /// Elapsed episode time in hours (travel + waiting + service).
    pub fn elapsed_time(&self) -> f64 {
        self.episode.elapsed_time
    }

    /// The dataset this environment simulates.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The precomputed distance matrix.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Length of the state vector: `5 + |stops|`.
    pub fn state_len(&self) -> usize {
        super::state::FIXED_FEATURES + self.dataset.len()
    }

    /// Number of discrete actions (one per stop, depot included).
    pub fn action_len(&self) -> usize {
        self.dataset.len()
    }

    fn encode_state(&self) -> StateVector {
        StateVector::encode(
            self.episode.current_stop,
            self.episode.remaining_capacity,
            self.episode.elapsed_time,
            self.weather_impact,
            self.traffic_impact,
            &self.episode.visited,
        )
    }

    fn info(&self, violation: Option<Violation>) -> StepInfo {
        StepInfo {
            total_distance: self.episode.total_distance,
            total_time: self.episode.total_time,
            visited_count: self.visited_count(),
            violation,
        }
    }

    fn violation_outcome(&mut self, violation: Violation) -> StepOutcome {
        self.episode.done = true;
        StepOutcome {
            state: self.encode_state(),
            reward: VIOLATION_PENALTY,
            done: true,
            info: self.info(Some(violation)),
        }
    }

    fn reward_for_visit(
        &self,
        distance: f64,
        visited_count: usize,
        completed: bool,
        window_hit: bool,
    ) -> f64 {
        let w = &self.options.reward;
        let mut reward = -distance * w.distance + visited_count as f64 * w.progress;
        if window_hit {
            reward += w.time_window_bonus;
        }
        if completed {
            reward += w.completion;
        }
        reward
    }
}
