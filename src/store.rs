//! Persistence collaborator.
//!
//! Solvers never touch storage. Callers load locations and durations
//! through a [`SolutionStore`] before solving and save the annotated result
//! afterwards. [`InMemoryStore`] backs tests and examples.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::duration::{DurationMatrix, DurationSource};
use crate::error::StoreError;
use crate::evaluation::VehicleSchedule;
use crate::models::Location;

/// A solution as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSolution {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Locations the solution refers to.
    pub locations: Vec<Location>,
    /// Annotated routes per vehicle.
    pub vehicles: Vec<VehicleSchedule>,
    /// Latest vehicle finish time.
    pub duration_max: f64,
    /// Sum of vehicle finish times.
    pub duration_sum: f64,
}

/// Where problem data comes from and solutions go.
pub trait SolutionStore {
    /// Locations of a stored problem; index 0 is the depot.
    fn get_locations_by_id(&self, id: u64) -> Result<Vec<Location>, StoreError>;

    /// Duration matrix of a stored problem.
    fn get_durations_by_id(&self, id: u64) -> Result<DurationMatrix, StoreError>;

    /// Persists a solution.
    fn save_solution(
        &mut self,
        name: &str,
        description: &str,
        locations: &[Location],
        vehicles: &[VehicleSchedule],
        duration_max: f64,
        duration_sum: f64,
    ) -> Result<(), StoreError>;
}

/// A [`DurationSource`] reading one stored matrix.
#[derive(Debug)]
pub struct StoredDurations<'a, S> {
    store: &'a S,
    id: u64,
}

impl<'a, S: SolutionStore> StoredDurations<'a, S> {
    /// Reads matrix `id` from `store`.
    pub fn new(store: &'a S, id: u64) -> Self {
        Self { store, id }
    }
}

impl<S: SolutionStore> DurationSource for StoredDurations<'_, S> {
    fn get_duration_matrix(&self) -> Result<DurationMatrix, StoreError> {
        self.store.get_durations_by_id(self.id)
    }
}

/// Keeps everything in memory.
///
/// # Examples
///
/// ```
/// use td_routing::duration::DurationMatrix;
/// use td_routing::models::Location;
/// use td_routing::store::{InMemoryStore, SolutionStore};
///
/// let mut store = InMemoryStore::new();
/// store.insert_locations(1, vec![Location::depot(0.0, 0.0)]);
/// assert_eq!(store.get_locations_by_id(1).unwrap().len(), 1);
/// assert!(store.get_durations_by_id(1).is_err());
///
/// store.save_solution("plan", "", &[], &[], 10.0, 15.0).unwrap();
/// assert_eq!(store.solutions()[0].duration_sum, 15.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    locations: BTreeMap<u64, Vec<Location>>,
    durations: BTreeMap<u64, DurationMatrix>,
    solutions: Vec<SavedSolution>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores locations under `id`, replacing any previous set.
    pub fn insert_locations(&mut self, id: u64, locations: Vec<Location>) {
        self.locations.insert(id, locations);
    }

    /// Stores a duration matrix under `id`, replacing any previous one.
    pub fn insert_durations(&mut self, id: u64, matrix: DurationMatrix) {
        self.durations.insert(id, matrix);
    }

    /// Saved solutions, oldest first.
    pub fn solutions(&self) -> &[SavedSolution] {
        &self.solutions
    }
}

impl SolutionStore for InMemoryStore {
    fn get_locations_by_id(&self, id: u64) -> Result<Vec<Location>, StoreError> {
        self.locations.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn get_durations_by_id(&self, id: u64) -> Result<DurationMatrix, StoreError> {
        self.durations.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn save_solution(
        &mut self,
        name: &str,
        description: &str,
        locations: &[Location],
        vehicles: &[VehicleSchedule],
        duration_max: f64,
        duration_sum: f64,
    ) -> Result<(), StoreError> {
        if !duration_max.is_finite() {
            return Err(StoreError::Backend(format!(
                "refusing to save `{name}` with non-finite duration"
            )));
        }
        self.solutions.push(SavedSolution {
            name: name.to_owned(),
            description: description.to_owned(),
            locations: locations.to_vec(),
            vehicles: vehicles.to_vec(),
            duration_max,
            duration_sum,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_ids() {
        let store = InMemoryStore::new();
        assert_eq!(store.get_locations_by_id(4), Err(StoreError::NotFound(4)));
        assert_eq!(store.get_durations_by_id(5), Err(StoreError::NotFound(5)));
    }

    #[test]
    fn test_stored_durations_source() {
        let mut store = InMemoryStore::new();
        store.insert_durations(2, DurationMatrix::new(3, 12));
        let matrix = StoredDurations::new(&store, 2)
            .get_duration_matrix()
            .expect("stored");
        assert_eq!(matrix.size(), 3);
        assert!(StoredDurations::new(&store, 9).get_duration_matrix().is_err());
    }

    #[test]
    fn test_rejects_infinite_duration() {
        let mut store = InMemoryStore::new();
        let err = store.save_solution("x", "", &[], &[], f64::INFINITY, f64::INFINITY);
        assert!(matches!(err, Err(StoreError::Backend(_))));
        assert!(store.solutions().is_empty());
    }

    #[test]
    fn test_saved_solution_serializes() {
        let mut store = InMemoryStore::new();
        store
            .save_solution("a", "b", &[Location::depot(1.0, 2.0)], &[], 3.0, 4.0)
            .expect("saved");
        let json = serde_json::to_value(&store.solutions()[0]).expect("serializable");
        assert_eq!(json["duration_max"], 3.0);
        assert_eq!(json["locations"][0]["lat"], 1.0);
    }
}
