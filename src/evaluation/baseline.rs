//! Nearest-neighbor baseline heuristic.
//!
//! The simplest constructive heuristic for routing: starting from the depot,
//! always hop to the nearest unvisited stop. Solution quality is typically
//! 15-25% above optimal, which makes it a useful lower bar for a learned
//! policy. Runs once per dataset and is independent of any agent.

use crate::dataset::Dataset;
use crate::distance::{travel_time, DistanceMatrix};

/// The baseline tour and its totals under the shared travel-time model.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineRoute {
    order: Vec<usize>,
    total_distance: f64,
    total_time: f64,
}

impl BaselineRoute {
    /// Visit order (depot excluded).
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Total tour distance in km.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Total tour time in hours (travel plus service).
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}

/// Computes the nearest-neighbor tour over all destinations.
///
/// Greedy and deterministic: from the depot, repeatedly move to the nearest
/// unvisited stop until every destination is visited, accumulating distance
/// and time with the same model the environment uses. Capacity is ignored —
/// the baseline prices pure routing, not feasibility.
///
/// # Examples
///
/// ```
/// use q_routing::dataset::Dataset;
/// use q_routing::distance::DistanceMatrix;
/// use q_routing::evaluation::nearest_neighbor_baseline;
/// use q_routing::models::Stop;
///
/// let dataset = Dataset::from_stops(vec![
///     Stop::depot(-6.2088, 106.8456),
///     Stop::new(1, -6.1702, 106.9417, 1700.0, 1.0),
///     Stop::new(2, -6.5950, 106.8167, 2000.0, 1.0),
/// ])
/// .unwrap();
/// let dm = DistanceMatrix::from_stops(dataset.stops());
///
/// let baseline = nearest_neighbor_baseline(&dataset, &dm, 50.0);
/// assert_eq!(baseline.order().len(), 2);
/// assert!(baseline.total_distance() > 0.0);
/// ```
pub fn nearest_neighbor_baseline(
    dataset: &Dataset,
    distances: &DistanceMatrix,
    speed_kmh: f64,
) -> BaselineRoute {
    let n = dataset.len();
    let mut unvisited: Vec<usize> = (1..n).collect();
    let mut order = Vec::with_capacity(n.saturating_sub(1));
    let mut current = 0;
    let mut total_distance = 0.0;
    let mut total_time = 0.0;

    while let Some(next) = distances.nearest_neighbor(current, &unvisited) {
        let hop = distances.get(current, next);
        total_distance += hop;
        total_time += travel_time(hop, speed_kmh) + dataset.stops()[next].service_time();
        order.push(next);
        unvisited.retain(|&id| id != next);
        current = next;
    }

    BaselineRoute {
        order,
        total_distance,
        total_time,
    }
}
