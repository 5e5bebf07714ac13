//! Stop and time window types.

/// A time window constraint for service at a stop.
///
/// The vehicle must arrive no later than `due` and may arrive as early as
/// `ready` (waiting is allowed if early).
///
/// # Examples
///
/// ```
/// use q_routing::models::TimeWindow;
///
/// let tw = TimeWindow::new(8.0, 17.0).unwrap();
/// assert!(tw.ready() <= tw.due());
/// assert!(tw.contains(12.0));
/// assert!(!tw.contains(18.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    ready: f64,
    due: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` if `ready > due` or either value is non-finite.
    pub fn new(ready: f64, due: f64) -> Option<Self> {
        if !ready.is_finite() || !due.is_finite() || ready > due {
            return None;
        }
        Some(Self { ready, due })
    }

    /// Earliest allowable arrival time.
    pub fn ready(&self) -> f64 {
        self.ready
    }

    /// Latest allowable arrival time.
    pub fn due(&self) -> f64 {
        self.due
    }

    /// Returns `true` if the given time falls within this window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.ready && time <= self.due
    }

    /// Returns the waiting time if arriving at the given time.
    ///
    /// Zero if the vehicle arrives within or after the window.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        if arrival < self.ready {
            self.ready - arrival
        } else {
            0.0
        }
    }

    /// Returns `true` if arriving at the given time violates this window.
    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.due
    }
}

/// A stop (depot or delivery destination) in a routing episode.
///
/// Stop 0 is conventionally the depot. Stops have geographic coordinates,
/// a demand in load units, an optional time window, and a service duration
/// in hours.
///
/// # Examples
///
/// ```
/// use q_routing::models::Stop;
///
/// let depot = Stop::depot(-6.2088, 106.8456);
/// assert_eq!(depot.id(), 0);
/// assert_eq!(depot.demand(), 0.0);
///
/// let s = Stop::new(1, -6.1702, 106.9417, 1700.0, 1.0);
/// assert_eq!(s.id(), 1);
/// assert_eq!(s.demand(), 1700.0);
/// ```
#[derive(Debug, Clone)]
pub struct Stop {
    id: usize,
    latitude: f64,
    longitude: f64,
    demand: f64,
    service_time: f64,
    time_window: Option<TimeWindow>,
}

impl Stop {
    /// Creates a new stop.
    pub fn new(id: usize, latitude: f64, longitude: f64, demand: f64, service_time: f64) -> Self {
        Self {
            id,
            latitude,
            longitude,
            demand,
            service_time,
            time_window: None,
        }
    }

    /// Creates a depot at the given coordinates (id=0, demand=0).
    pub fn depot(latitude: f64, longitude: f64) -> Self {
        Self::new(0, latitude, longitude, 0.0, 0.0)
    }

    /// Sets a time window for this stop.
    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = Some(tw);
        self
    }

    /// Stop ID (0 = depot).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Demand at this stop (units to deliver).
    pub fn demand(&self) -> f64 {
        self.demand
    }

    /// Service duration at this stop, in hours.
    pub fn service_time(&self) -> f64 {
        self.service_time
    }

    /// Time window constraint, if any.
    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.time_window.as_ref()
    }

    /// Great-circle distance to another stop, in kilometers.
    pub fn distance_to(&self, other: &Stop) -> f64 {
        crate::distance::haversine(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}
