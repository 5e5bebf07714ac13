//! Constraint violation types.

/// A constraint violation that terminates a routing episode.
///
/// Violations are episode-level data, not errors: the environment responds
/// with a fixed penalty reward and a terminal state, and the evaluation
/// harness counts them per category.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// The requested stop was already visited this episode.
    AlreadyVisited {
        /// Stop ID that was revisited.
        stop_id: usize,
    },
    /// The stop's demand exceeds the vehicle's remaining capacity.
    CapacityExceeded {
        /// Stop ID whose demand did not fit.
        stop_id: usize,
        /// Demand at the stop.
        demand: f64,
        /// Capacity remaining before the attempt.
        remaining: f64,
    },
    /// Arrival after the stop's time window closed.
    TimeWindowMissed {
        /// Stop ID where the window was missed.
        stop_id: usize,
        /// Actual arrival time.
        arrival: f64,
        /// Time window due date.
        due: f64,
    },
    /// Serving the stop would push elapsed time past the episode horizon.
    HorizonExceeded {
        /// Stop ID that could not be served in time.
        stop_id: usize,
        /// Elapsed time the visit would have required.
        elapsed: f64,
        /// Episode horizon.
        horizon: f64,
    },
}

impl Violation {
    /// Returns `true` for capacity-class violations.
    pub fn is_capacity(&self) -> bool {
        matches!(self, Violation::CapacityExceeded { .. })
    }

    /// Returns `true` for time-class violations (missed window or horizon).
    pub fn is_time(&self) -> bool {
        matches!(
            self,
            Violation::TimeWindowMissed { .. } | Violation::HorizonExceeded { .. }
        )
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::AlreadyVisited { stop_id } => {
                write!(f, "stop {stop_id} already visited")
            }
            Violation::CapacityExceeded {
                stop_id,
                demand,
                remaining,
            } => write!(
                f,
                "capacity exceeded at stop {stop_id}: demand {demand} > remaining {remaining}"
            ),
            Violation::TimeWindowMissed {
                stop_id,
                arrival,
                due,
            } => write!(
                f,
                "time window missed at stop {stop_id}: arrival {arrival:.2} > due {due:.2}"
            ),
            Violation::HorizonExceeded {
                stop_id,
                elapsed,
                horizon,
            } => write!(
                f,
                "horizon exceeded at stop {stop_id}: {elapsed:.2} > {horizon:.2}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_classes() {
        let cap = Violation::CapacityExceeded {
            stop_id: 3,
            demand: 2000.0,
            remaining: 1000.0,
        };
        assert!(cap.is_capacity());
        assert!(!cap.is_time());

        let tw = Violation::TimeWindowMissed {
            stop_id: 2,
            arrival: 18.0,
            due: 17.0,
        };
        assert!(tw.is_time());
        assert!(!tw.is_capacity());

        let horizon = Violation::HorizonExceeded {
            stop_id: 1,
            elapsed: 25.0,
            horizon: 24.0,
        };
        assert!(horizon.is_time());

        let revisit = Violation::AlreadyVisited { stop_id: 1 };
        assert!(!revisit.is_capacity());
        assert!(!revisit.is_time());
    }

    #[test]
    fn test_violation_display() {
        let v = Violation::AlreadyVisited { stop_id: 2 };
        assert_eq!(v.to_string(), "stop 2 already visited");
    }
}
