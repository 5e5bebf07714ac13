//! Fixed-schema state vector encoding.

/// Number of scalar features preceding the per-stop flags.
pub const FIXED_FEATURES: usize = 5;

/// The fixed-length observation the agent sees.
///
/// Layout (length `5 + |stops|`):
/// `[current_stop, remaining_capacity, elapsed_time, weather_impact,
/// traffic_impact, unvisited_flag_0 .. unvisited_flag_n]`
/// where a flag is `1.0` while the stop is unvisited and `0.0` after.
///
/// The encoding is produced only by the environment; the agent treats it as
/// an opaque feature slice.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    features: Vec<f32>,
}

impl StateVector {
    /// Encodes an episode snapshot into the fixed layout.
    pub(crate) fn encode(
        current_stop: usize,
        remaining_capacity: f64,
        elapsed_time: f64,
        weather_impact: f64,
        traffic_impact: f64,
        visited: &[bool],
    ) -> Self {
        let mut features = Vec::with_capacity(FIXED_FEATURES + visited.len());
        features.push(current_stop as f32);
        features.push(remaining_capacity as f32);
        features.push(elapsed_time as f32);
        features.push(weather_impact as f32);
        features.push(traffic_impact as f32);
        for &v in visited {
            features.push(if v { 0.0 } else { 1.0 });
        }
        Self { features }
    }

    /// The raw feature slice, in the documented order.
    pub fn features(&self) -> &[f32] {
        &self.features
    }

    /// Total feature count (`5 + |stops|`).
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Always `false` for an encoded state; present for slice-like symmetry.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// ID of the stop the vehicle currently occupies.
    pub fn current_stop(&self) -> usize {
        self.features[0] as usize
    }

    /// Remaining vehicle capacity.
    pub fn remaining_capacity(&self) -> f32 {
        self.features[1]
    }

    /// Elapsed episode time in hours.
    pub fn elapsed_time(&self) -> f32 {
        self.features[2]
    }

    /// Weather impact factor sampled at reset.
    pub fn weather_impact(&self) -> f32 {
        self.features[3]
    }

    /// Traffic impact factor sampled at reset.
    pub fn traffic_impact(&self) -> f32 {
        self.features[4]
    }

    /// Per-stop flags, `1.0` while unvisited.
    pub fn unvisited_flags(&self) -> &[f32] {
        &self.features[FIXED_FEATURES..]
    }
}
