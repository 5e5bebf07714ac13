//! Value-function agent: estimator contract, Q-network, replay memory, and
//! the epsilon-greedy DQN policy.

mod dqn;
mod estimator;
mod qnet;
mod replay;

pub use dqn::{AgentOptions, DqnAgent};
pub use estimator::ValueEstimator;
pub use qnet::QNetwork;
pub use replay::{ReplayMemory, Transition};
