//! Caller-facing request type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::duration::{DurationMatrix, ServiceTimes, TimeUnit};
use crate::error::InvalidInput;

use super::vehicle::fleet;
use super::{Objective, SolveContext, TspOptions};

/// Vehicle capacity: one value for the whole fleet or one per vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Capacity {
    /// Every vehicle has the same capacity.
    Uniform(i64),
    /// Capacity per vehicle id.
    PerVehicle(Vec<i64>),
}

impl Capacity {
    /// Expands to one capacity per vehicle.
    pub fn per_vehicle(&self, m: usize) -> Result<Vec<i64>, InvalidInput> {
        match self {
            Capacity::Uniform(q) => Ok(vec![*q; m]),
            Capacity::PerVehicle(qs) if qs.len() == m => Ok(qs.clone()),
            Capacity::PerVehicle(qs) => Err(InvalidInput::CapacityCount {
                expected: m,
                found: qs.len(),
            }),
        }
    }
}

/// Which search strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Exhaustive permutation enumeration.
    #[serde(alias = "bf")]
    BruteForce,
    /// Ant colony optimisation with hyperparameter sampling.
    #[serde(alias = "aco")]
    AntColony,
    /// Simulated annealing.
    #[serde(alias = "sa")]
    SimulatedAnnealing,
    /// Genetic algorithm.
    #[serde(alias = "ga")]
    Genetic,
}

/// An already-parsed solve request.
///
/// # Examples
///
/// ```
/// use td_routing::models::SolveRequest;
///
/// let request: SolveRequest = serde_json::from_str(r#"{
///     "n": 2, "m": 1, "k": 1, "q": 5,
///     "duration": [[[0.0], [4.0]], [[4.0], [0.0]]],
///     "load": [0, 1],
///     "customers": [1],
///     "vehicle_start_times": [0.0],
///     "algorithm": "bf"
/// }"#).unwrap();
/// let ctx = request.validate().unwrap();
/// assert_eq!(ctx.customers(), &[1]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    /// Number of locations including the depot.
    pub n: usize,
    /// Number of vehicles.
    pub m: usize,
    /// Cycle limit (VRP) or 0 (TSP).
    pub k: usize,
    /// Vehicle capacity.
    pub q: Capacity,
    /// Durations indexed `[from][to][zone]`.
    pub duration: Vec<Vec<Vec<f64>>>,
    /// Demand per location; `load[0] == 0`.
    pub load: Vec<i64>,
    /// Customers to visit.
    pub customers: Vec<usize>,
    /// Customers excluded from this solve.
    #[serde(default)]
    pub ignored_customers: Vec<usize>,
    /// Availability of each vehicle.
    pub vehicle_start_times: Vec<f64>,
    /// What to minimise.
    #[serde(default)]
    pub objective: Objective,
    /// Reject trips past the horizon instead of clamping.
    #[serde(default)]
    pub ignore_long_trip: bool,
    /// Unit of durations and times.
    #[serde(default)]
    pub time_unit: TimeUnit,
    /// Loading/unloading times.
    #[serde(default)]
    pub service_times: ServiceTimes,
    /// Travelling-salesman options.
    #[serde(default)]
    pub tsp: TspOptions,
    /// Search strategy.
    pub algorithm: Algorithm,
    /// Strategy-specific hyperparameters.
    #[serde(default)]
    pub algorithm_params: Map<String, Value>,
}

impl SolveRequest {
    /// Checks the request and builds the solver context.
    pub fn validate(&self) -> Result<SolveContext, InvalidInput> {
        if self.m == 0 {
            return Err(InvalidInput::NoVehicles);
        }
        let capacities = self.q.per_vehicle(self.m)?;
        if self.vehicle_start_times.len() != self.m {
            return Err(InvalidInput::StartTimeCount {
                expected: self.m,
                found: self.vehicle_start_times.len(),
            });
        }
        let matrix = DurationMatrix::from_nested(self.duration.clone())?;
        if matrix.size() != self.n {
            return Err(InvalidInput::MatrixShape {
                n: self.n,
                reason: format!("matrix has {} rows", matrix.size()),
            });
        }

        SolveContext::builder(matrix, self.load.clone())
            .vehicles(fleet(&capacities, &self.vehicle_start_times))
            .customers(self.customers.clone())
            .ignored(self.ignored_customers.clone())
            .max_cycles(self.k)
            .objective(self.objective)
            .time_unit(self.time_unit)
            .ignore_long_trip(self.ignore_long_trip)
            .service_times(self.service_times)
            .tsp_options(self.tsp.clone())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SolveRequest {
        SolveRequest {
            n: 3,
            m: 2,
            k: 2,
            q: Capacity::Uniform(5),
            duration: vec![
                vec![vec![0.0], vec![3.0], vec![4.0]],
                vec![vec![3.0], vec![0.0], vec![2.0]],
                vec![vec![4.0], vec![2.0], vec![0.0]],
            ],
            load: vec![0, 2, 3],
            customers: vec![1, 2],
            ignored_customers: vec![],
            vehicle_start_times: vec![0.0, 10.0],
            objective: Objective::MinMaxTime,
            ignore_long_trip: false,
            time_unit: TimeUnit::Minutes,
            service_times: ServiceTimes::default(),
            tsp: TspOptions::default(),
            algorithm: Algorithm::BruteForce,
            algorithm_params: Map::new(),
        }
    }

    #[test]
    fn test_validate_ok() {
        let ctx = request().validate().expect("valid");
        assert_eq!(ctx.vehicles().len(), 2);
        assert_eq!(ctx.vehicles()[1].start_time(), 10.0);
        assert_eq!(ctx.max_cycles(), 2);
    }

    #[test]
    fn test_capacity_list_mismatch() {
        let mut r = request();
        r.q = Capacity::PerVehicle(vec![5]);
        assert_eq!(
            r.validate().unwrap_err(),
            InvalidInput::CapacityCount {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_start_time_mismatch() {
        let mut r = request();
        r.vehicle_start_times = vec![0.0];
        assert_eq!(
            r.validate().unwrap_err(),
            InvalidInput::StartTimeCount {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_matrix_size_mismatch() {
        let mut r = request();
        r.n = 4;
        assert!(matches!(
            r.validate().unwrap_err(),
            InvalidInput::MatrixShape { n: 4, .. }
        ));
    }

    #[test]
    fn test_capacity_untagged() {
        let q: Capacity = serde_json::from_str("7").expect("scalar");
        assert_eq!(q, Capacity::Uniform(7));
        let q: Capacity = serde_json::from_str("[1, 2]").expect("list");
        assert_eq!(q.per_vehicle(2).expect("len 2"), vec![1, 2]);
    }

    #[test]
    fn test_algorithm_aliases() {
        let a: Algorithm = serde_json::from_str("\"aco\"").expect("alias");
        assert_eq!(a, Algorithm::AntColony);
        let a: Algorithm = serde_json::from_str("\"genetic\"").expect("name");
        assert_eq!(a, Algorithm::Genetic);
    }
}
