//! Vehicle type with capacity and availability.

use serde::{Deserialize, Serialize};

/// A vehicle in the fleet.
///
/// # Examples
///
/// ```
/// use td_routing::models::Vehicle;
///
/// let v = Vehicle::new(0, 20).with_start_time(60.0);
/// assert_eq!(v.id(), 0);
/// assert_eq!(v.capacity(), 20);
/// assert_eq!(v.start_time(), 60.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    id: usize,
    capacity: i64,
    start_time: f64,
}

impl Vehicle {
    /// Creates a vehicle available from time 0.
    pub fn new(id: usize, capacity: i64) -> Self {
        Self {
            id,
            capacity,
            start_time: 0.0,
        }
    }

    /// Sets the time the vehicle becomes available.
    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    /// Vehicle id, equal to its index in the fleet.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Maximum load per cycle.
    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Time the vehicle is first available at the depot.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }
}

/// Builds a fleet from parallel capacity and start-time lists.
///
/// The caller guarantees equal lengths (checked during request validation).
pub fn fleet(capacities: &[i64], start_times: &[f64]) -> Vec<Vehicle> {
    capacities
        .iter()
        .zip(start_times)
        .enumerate()
        .map(|(id, (&q, &t))| Vehicle::new(id, q).with_start_time(t))
        .collect()
}
