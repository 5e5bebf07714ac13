//! Great-circle distance and travel time.

mod matrix;

pub use matrix::DistanceMatrix;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two coordinates, in kilometers.
///
/// # Examples
///
/// ```
/// use q_routing::distance::haversine;
///
/// // Jakarta to Bogor, roughly 43 km
/// let d = haversine(-6.2088, 106.8456, -6.5950, 106.8167);
/// assert!(d > 40.0 && d < 46.0);
/// ```
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Travel time in hours for a distance at the given reference speed.
///
/// Returns zero for a zero-length hop regardless of speed.
pub fn travel_time(distance_km: f64, speed_kmh: f64) -> f64 {
    if distance_km == 0.0 {
        0.0
    } else {
        distance_km / speed_kmh
    }
}
