//! Dense Q-network with hand-rolled backpropagation.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::estimator::ValueEstimator;

/// One fully-connected layer; weights are `(out, in)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DenseLayer {
    weights: Array2<f32>,
    bias: Array1<f32>,
}

impl DenseLayer {
    fn new<R: Rng>(in_dim: usize, out_dim: usize, rng: &mut R) -> Self {
        // Glorot-uniform initialization
        let limit = (6.0 / (in_dim + out_dim) as f64).sqrt();
        let weights =
            Array2::from_shape_fn((out_dim, in_dim), |_| rng.random_range(-limit..limit) as f32);
        Self {
            weights,
            bias: Array1::zeros(out_dim),
        }
    }
}

/// A multilayer perceptron estimating Q-values: ReLU hidden layers, linear
/// output, SGD on mean squared error.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use ndarray::Array2;
/// use q_routing::agent::{QNetwork, ValueEstimator};
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let net = QNetwork::new(9, &[128, 128], 5, 0.0005, &mut rng);
/// assert_eq!(net.state_dim(), 9);
/// assert_eq!(net.action_dim(), 5);
///
/// let states = Array2::zeros((3, 9));
/// let q = net.predict(states.view());
/// assert_eq!(q.shape(), &[3, 5]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QNetwork {
    layers: Vec<DenseLayer>,
    learning_rate: f32,
}

impl QNetwork {
    /// Creates a network with the given hidden layer sizes.
    pub fn new<R: Rng>(
        state_dim: usize,
        hidden: &[usize],
        action_dim: usize,
        learning_rate: f64,
        rng: &mut R,
    ) -> Self {
        let mut dims = Vec::with_capacity(hidden.len() + 2);
        dims.push(state_dim);
        dims.extend_from_slice(hidden);
        dims.push(action_dim);

        let layers = dims
            .windows(2)
            .map(|pair| DenseLayer::new(pair[0], pair[1], rng))
            .collect();
        Self {
            layers,
            learning_rate: learning_rate as f32,
        }
    }

    /// Q-values for a single state.
    pub fn predict_one(&self, state: &[f32]) -> Vec<f32> {
        let states = Array2::from_shape_vec((1, state.len()), state.to_vec())
            .expect("row shape matches state length");
        self.predict(states.view()).row(0).to_vec()
    }

    /// Forward pass keeping pre-activations and activations for backprop.
    fn forward(&self, x: ArrayView2<f32>) -> (Vec<Array2<f32>>, Vec<Array2<f32>>) {
        let mut activations = vec![x.to_owned()];
        let mut pre_activations = Vec::with_capacity(self.layers.len());

        for (l, layer) in self.layers.iter().enumerate() {
            let z = activations[l].dot(&layer.weights.t()) + &layer.bias;
            let a = if l < self.layers.len() - 1 {
                z.mapv(|v| v.max(0.0))
            } else {
                z.clone()
            };
            pre_activations.push(z);
            activations.push(a);
        }
        (pre_activations, activations)
    }
}

impl ValueEstimator for QNetwork {
    fn state_dim(&self) -> usize {
        self.layers[0].weights.ncols()
    }

    fn action_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].weights.nrows()
    }

    fn predict(&self, states: ArrayView2<f32>) -> Array2<f32> {
        let (_, activations) = self.forward(states);
        activations
            .into_iter()
            .next_back()
            .expect("forward yields an output activation")
    }

    fn fit_step(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32 {
        let (pre_activations, activations) = self.forward(states);
        let output = &activations[activations.len() - 1];

        let diff = output - &targets;
        let loss = diff.mapv(|v| v * v).mean().unwrap_or(0.0);

        // dL/d(output) for mean squared error over all entries
        let scale = 2.0 / diff.len() as f32;
        let mut delta = diff * scale;

        for l in (0..self.layers.len()).rev() {
            let grad_w = delta.t().dot(&activations[l]);
            let grad_b = delta.sum_axis(Axis(0));

            if l > 0 {
                let upstream = delta.dot(&self.layers[l].weights);
                let gate = pre_activations[l - 1].mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
                delta = upstream * gate;
            }

            self.layers[l]
                .weights
                .scaled_add(-self.learning_rate, &grad_w);
            self.layers[l].bias.scaled_add(-self.learning_rate, &grad_b);
        }

        loss
    }
}
