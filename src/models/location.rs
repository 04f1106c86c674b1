//! Location type.

use serde::{Deserialize, Serialize};

use crate::duration::haversine_km;

/// Location id reserved for the depot.
pub const DEPOT: usize = 0;

/// A depot or customer location.
///
/// Location 0 is the depot and carries no demand.
///
/// # Examples
///
/// ```
/// use td_routing::models::Location;
///
/// let depot = Location::depot(37.50, 127.03);
/// assert_eq!(depot.id(), 0);
/// assert_eq!(depot.demand(), 0);
///
/// let c = Location::new(1, 37.51, 127.05, 4);
/// assert_eq!(c.id(), 1);
/// assert_eq!(c.demand(), 4);
/// assert!(!c.is_depot());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    id: usize,
    lat: f64,
    lng: f64,
    #[serde(default)]
    demand: i64,
}

impl Location {
    /// Creates a location.
    pub fn new(id: usize, lat: f64, lng: f64, demand: i64) -> Self {
        Self {
            id,
            lat,
            lng,
            demand,
        }
    }

    /// Creates the depot (id 0, demand 0).
    pub fn depot(lat: f64, lng: f64) -> Self {
        Self::new(DEPOT, lat, lng, 0)
    }

    /// Location id (0 = depot).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Units to deliver at this location.
    pub fn demand(&self) -> i64 {
        self.demand
    }

    /// Returns `true` for the depot.
    pub fn is_depot(&self) -> bool {
        self.id == DEPOT
    }

    /// Great-circle distance to another location in kilometres.
    pub fn distance_km(&self, other: &Location) -> f64 {
        haversine_km(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Extracts the demand vector indexed by location id.
///
/// Ids missing from `locations` get demand 0.
pub fn demands_of(locations: &[Location]) -> Vec<i64> {
    let n = locations.iter().map(|l| l.id() + 1).max().unwrap_or(0);
    let mut load = vec![0; n];
    for l in locations {
        load[l.id()] = l.demand();
    }
    load
}
