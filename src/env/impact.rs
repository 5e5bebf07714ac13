//! Weather and traffic impact collaborators.

/// Supplies a multiplicative impact factor (`>= 1.0`) for a location.
///
/// The environment calls an impact model exactly once per reset and embeds
/// the factor into the state vector as a read-only signal. Retrying, caching,
/// and any upstream API access are the implementor's concern.
pub trait ImpactModel {
    /// Impact factor at the given coordinates.
    fn impact(&self, latitude: f64, longitude: f64) -> f64;
}

/// A location-independent impact factor.
///
/// The default (`1.0`) models neutral conditions, matching a run without
/// weather or traffic feeds.
#[derive(Debug, Clone, Copy)]
pub struct UniformImpact(pub f64);

impl Default for UniformImpact {
    fn default() -> Self {
        Self(1.0)
    }
}

impl ImpactModel for UniformImpact {
    fn impact(&self, _latitude: f64, _longitude: f64) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_impact() {
        let model = UniformImpact::default();
        assert_eq!(model.impact(-6.2, 106.8), 1.0);
        let rainy = UniformImpact(1.3);
        assert_eq!(rainy.impact(0.0, 0.0), 1.3);
    }
}
