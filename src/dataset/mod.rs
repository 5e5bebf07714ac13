//! Stop table loading, validation, and simulated generation.
//!
//! A dataset is an ordered table of stops where row 0 is the depot. Datasets
//! are immutable once loaded; the environment, baseline, and evaluation
//! harness all read from the same instance.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{Stop, TimeWindow};
use crate::{Error, Result};

/// One CSV row of the dataset file.
#[derive(Debug, Serialize, Deserialize)]
struct StopRow {
    customer_id: usize,
    latitude: f64,
    longitude: f64,
    demand: f64,
    time_window_start: f64,
    time_window_end: f64,
    service_time: f64,
}

/// A validated, ordered collection of stops (index 0 = depot).
///
/// # Examples
///
/// ```
/// use q_routing::dataset::Dataset;
/// use q_routing::models::Stop;
///
/// let dataset = Dataset::from_stops(vec![
///     Stop::depot(-6.2088, 106.8456),
///     Stop::new(1, -6.1702, 106.9417, 1700.0, 1.0),
/// ])
/// .unwrap();
/// assert_eq!(dataset.num_destinations(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    stops: Vec<Stop>,
}

impl Dataset {
    /// Builds a dataset from stops, validating the depot convention.
    ///
    /// Requirements: at least one stop, stop IDs equal to their row index,
    /// row 0 with zero demand, non-negative demands, finite coordinates.
    pub fn from_stops(stops: Vec<Stop>) -> Result<Self> {
        if stops.is_empty() {
            return Err(Error::InvalidDataset("no stops".into()));
        }
        if stops[0].demand() != 0.0 {
            return Err(Error::InvalidDataset(format!(
                "depot (row 0) must have zero demand, got {}",
                stops[0].demand()
            )));
        }
        for (i, stop) in stops.iter().enumerate() {
            if stop.id() != i {
                return Err(Error::InvalidDataset(format!(
                    "stop id {} at row {i}; ids must equal row order",
                    stop.id()
                )));
            }
            if stop.demand() < 0.0 || !stop.demand().is_finite() {
                return Err(Error::InvalidDataset(format!(
                    "stop {} has invalid demand {}",
                    stop.id(),
                    stop.demand()
                )));
            }
            if !stop.latitude().is_finite() || !stop.longitude().is_finite() {
                return Err(Error::InvalidDataset(format!(
                    "stop {} has non-finite coordinates",
                    stop.id()
                )));
            }
        }
        Ok(Self { stops })
    }

    /// Loads a dataset from a CSV file with columns
    /// `customer_id, latitude, longitude, demand, time_window_start,
    /// time_window_end, service_time`.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let mut stops = Vec::new();
        for row in reader.deserialize() {
            let row: StopRow = row?;
            let tw = TimeWindow::new(row.time_window_start, row.time_window_end).ok_or_else(
                || {
                    Error::InvalidDataset(format!(
                        "stop {}: bad time window [{}, {}]",
                        row.customer_id, row.time_window_start, row.time_window_end
                    ))
                },
            )?;
            stops.push(
                Stop::new(
                    row.customer_id,
                    row.latitude,
                    row.longitude,
                    row.demand,
                    row.service_time,
                )
                .with_time_window(tw),
            );
        }
        Self::from_stops(stops)
    }

    /// Writes this dataset to a CSV file in the same column layout.
    pub fn write_csv_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for stop in &self.stops {
            let (start, end) = match stop.time_window() {
                Some(tw) => (tw.ready(), tw.due()),
                None => (0.0, f64::MAX),
            };
            writer.serialize(StopRow {
                customer_id: stop.id(),
                latitude: stop.latitude(),
                longitude: stop.longitude(),
                demand: stop.demand(),
                time_window_start: start,
                time_window_end: end,
                service_time: stop.service_time(),
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    /// All stops, depot first.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Returns a stop by ID.
    pub fn get(&self, id: usize) -> Option<&Stop> {
        self.stops.get(id)
    }

    /// Total number of stops including the depot.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if the dataset holds only a depot or nothing.
    pub fn is_empty(&self) -> bool {
        self.stops.len() <= 1
    }

    /// Number of delivery destinations (excluding the depot).
    pub fn num_destinations(&self) -> usize {
        self.stops.len() - 1
    }

    /// Sum of all destination demands.
    pub fn total_demand(&self) -> f64 {
        self.stops.iter().map(|s| s.demand()).sum()
    }
}

/// Generates a simulated delivery dataset around a depot coordinate.
///
/// Destinations are scattered within ±0.1° of the depot with uniform demands,
/// staggered time windows inside the given horizon, and short service times.
/// Deterministic for a fixed RNG seed.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use q_routing::dataset::generate_simulated;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let dataset = generate_simulated(10, -6.2088, 106.8456, 24.0, &mut rng).unwrap();
/// assert_eq!(dataset.num_destinations(), 10);
/// ```
pub fn generate_simulated<R: Rng>(
    n_destinations: usize,
    depot_latitude: f64,
    depot_longitude: f64,
    horizon: f64,
    rng: &mut R,
) -> Result<Dataset> {
    let depot_window =
        TimeWindow::new(0.0, horizon).ok_or_else(|| Error::InvalidDataset("bad horizon".into()))?;
    let mut stops = vec![Stop::depot(depot_latitude, depot_longitude).with_time_window(depot_window)];

    for id in 1..=n_destinations {
        let latitude = depot_latitude + rng.random_range(-0.1..0.1);
        let longitude = depot_longitude + rng.random_range(-0.1..0.1);
        let demand = rng.random_range(10.0..100.0);
        let start = rng.random_range(0.0..horizon / 2.0);
        let end = (start + rng.random_range(horizon / 4.0..horizon / 2.0)).min(horizon);
        let service_time = rng.random_range(0.25..1.0);

        let tw = TimeWindow::new(start, end)
            .ok_or_else(|| Error::InvalidDataset("generated bad time window".into()))?;
        stops.push(Stop::new(id, latitude, longitude, demand, service_time).with_time_window(tw));
    }

    Dataset::from_stops(stops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_stops() -> Vec<Stop> {
        vec![
            Stop::depot(-6.2088, 106.8456),
            Stop::new(1, -6.1702, 106.9417, 1700.0, 1.0),
            Stop::new(2, -6.2383, 106.9756, 500.0, 1.0),
        ]
    }

    #[test]
    fn test_from_stops_valid() {
        let ds = Dataset::from_stops(sample_stops()).expect("valid");
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.num_destinations(), 2);
        assert_eq!(ds.total_demand(), 2200.0);
        assert!(!ds.is_empty());
    }

    #[test]
    fn test_from_stops_empty() {
        assert!(Dataset::from_stops(vec![]).is_err());
    }

    #[test]
    fn test_from_stops_depot_with_demand() {
        let stops = vec![Stop::new(0, -6.2, 106.8, 50.0, 0.0)];
        assert!(Dataset::from_stops(stops).is_err());
    }

    #[test]
    fn test_from_stops_misordered_ids() {
        let stops = vec![
            Stop::depot(-6.2, 106.8),
            Stop::new(2, -6.1, 106.9, 10.0, 1.0),
        ];
        assert!(Dataset::from_stops(stops).is_err());
    }

    #[test]
    fn test_from_stops_negative_demand() {
        let stops = vec![
            Stop::depot(-6.2, 106.8),
            Stop::new(1, -6.1, 106.9, -10.0, 1.0),
        ];
        assert!(Dataset::from_stops(stops).is_err());
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stops.csv");

        let tw = TimeWindow::new(0.0, 24.0).expect("valid");
        let stops: Vec<Stop> = sample_stops()
            .into_iter()
            .map(|s| s.with_time_window(tw))
            .collect();
        let ds = Dataset::from_stops(stops).expect("valid");
        ds.write_csv_path(&path).expect("write");

        let loaded = Dataset::from_csv_path(&path).expect("read");
        assert_eq!(loaded.len(), ds.len());
        assert_eq!(loaded.get(1).expect("stop 1").demand(), 1700.0);
        assert_eq!(
            loaded.get(2).expect("stop 2").time_window().expect("tw").due(),
            24.0
        );
    }

    #[test]
    fn test_generate_simulated() {
        let mut rng = StdRng::seed_from_u64(42);
        let ds = generate_simulated(10, -6.2088, 106.8456, 24.0, &mut rng).expect("generate");
        assert_eq!(ds.num_destinations(), 10);
        assert_eq!(ds.get(0).expect("depot").demand(), 0.0);
        for stop in &ds.stops()[1..] {
            assert!(stop.demand() >= 10.0 && stop.demand() < 100.0);
            let tw = stop.time_window().expect("window");
            assert!(tw.due() <= 24.0);
        }
    }

    #[test]
    fn test_generate_simulated_deterministic() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let da = generate_simulated(5, -6.2, 106.8, 24.0, &mut a).expect("a");
        let db = generate_simulated(5, -6.2, 106.8, 24.0, &mut b).expect("b");
        for (x, y) in da.stops().iter().zip(db.stops()) {
            assert_eq!(x.latitude(), y.latitude());
            assert_eq!(x.demand(), y.demand());
        }
    }
}
