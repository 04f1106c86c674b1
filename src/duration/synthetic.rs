//! Distance-based duration matrix generation.

use crate::error::StoreError;
use crate::models::Location;

use super::DurationMatrix;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometres.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let dp = (lat2 - lat1).to_radians();
    let dl = (lng2 - lng1).to_radians();
    let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// A source of duration matrices, such as a mapping API client.
pub trait DurationSource {
    /// Produces the matrix for the source's locations.
    fn get_duration_matrix(&self) -> Result<DurationMatrix, StoreError>;
}

/// Generates durations from straight-line distance.
///
/// `duration[u][v][h] = distance_km(u, v) * per_km_time * factor[h]`.
/// One congestion factor per hour-zone; 1.0 everywhere by default.
///
/// # Examples
///
/// ```
/// use td_routing::duration::{DurationSource, SyntheticDurations};
/// use td_routing::models::Location;
///
/// let locations = vec![
///     Location::depot(37.50, 127.00),
///     Location::new(1, 37.51, 127.00, 1),
/// ];
/// let dm = SyntheticDurations::new(locations, 2.0, 12)
///     .with_factors(vec![1.0, 1.5, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0])
///     .get_duration_matrix()
///     .unwrap();
/// assert_eq!(dm.zones(), 12);
/// assert!(dm.get(0, 1, 1) > dm.get(0, 1, 0));
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticDurations {
    locations: Vec<Location>,
    per_km_time: f64,
    factors: Vec<f64>,
}

impl SyntheticDurations {
    /// Creates a generator with `zones` hour-zones and flat congestion.
    pub fn new(locations: Vec<Location>, per_km_time: f64, zones: usize) -> Self {
        Self {
            locations,
            per_km_time,
            factors: vec![1.0; zones],
        }
    }

    /// Sets per-zone congestion factors; the zone count follows the list.
    pub fn with_factors(mut self, factors: Vec<f64>) -> Self {
        self.factors = factors;
        self
    }
}

impl DurationSource for SyntheticDurations {
    fn get_duration_matrix(&self) -> Result<DurationMatrix, StoreError> {
        let n = self.locations.len();
        let mut dm = DurationMatrix::new(n, self.factors.len());
        for (i, a) in self.locations.iter().enumerate() {
            if a.id() != i {
                return Err(StoreError::Backend(format!(
                    "location at position {i} has id {}",
                    a.id()
                )));
            }
            for (j, b) in self.locations.iter().enumerate() {
                if i == j {
                    continue;
                }
                let base = a.distance_km(b) * self.per_km_time;
                for (h, f) in self.factors.iter().enumerate() {
                    dm.set(i, j, h, base * f);
                }
            }
        }
        Ok(dm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_one_degree_latitude() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 0.01);
    }

    #[test]
    fn test_generated_diagonal_zero() {
        let locs = vec![
            Location::depot(37.5, 127.0),
            Location::new(1, 37.6, 127.0, 1),
            Location::new(2, 37.5, 127.1, 1),
        ];
        let dm = SyntheticDurations::new(locs, 1.0, 4)
            .get_duration_matrix()
            .expect("valid");
        for i in 0..3 {
            for h in 0..4 {
                assert_eq!(dm.get(i, i, h), 0.0);
            }
        }
        assert!((dm.get(0, 1, 0) - dm.get(1, 0, 3)).abs() < 1e-10);
    }

    #[test]
    fn test_rejects_misnumbered_locations() {
        let locs = vec![Location::depot(0.0, 0.0), Location::new(5, 0.0, 0.0, 1)];
        let err = SyntheticDurations::new(locs, 1.0, 1)
            .get_duration_matrix()
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
