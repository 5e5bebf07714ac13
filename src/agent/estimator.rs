//! Action-value estimator contract.

use ndarray::{Array2, ArrayView2};

/// Maps state batches to per-action value estimates and learns from
/// squared-error fit steps.
///
/// Any numeric backend satisfies this contract — the bundled
/// [`QNetwork`](super::QNetwork) is a small dense network, but an exact
/// lookup table would do for tiny state spaces.
pub trait ValueEstimator {
    /// Number of input features per state.
    fn state_dim(&self) -> usize;

    /// Number of actions scored per state.
    fn action_dim(&self) -> usize;

    /// Q-values for a batch of states; shape `(batch, action_dim)`.
    fn predict(&self, states: ArrayView2<f32>) -> Array2<f32>;

    /// One squared-error fit step toward `targets`; returns the batch loss.
    ///
    /// `targets` has the same shape as `predict`'s output; entries equal to
    /// the current predictions contribute no gradient, so callers update only
    /// the entries for taken actions.
    fn fit_step(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32;
}
