//! Validated problem context shared by every solver.

use serde::{Deserialize, Serialize};

use crate::duration::{DurationMatrix, DurationModel, ServiceTimes, TimeHorizon, TimeUnit};
use crate::error::InvalidInput;

use super::{Objective, Vehicle, DEPOT};

/// Travelling-salesman options (used when `max_cycles == 0`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TspOptions {
    /// Node the tour starts from; the tour always ends at the depot.
    pub start_node: usize,
    /// Customers kept in the tour order but skipped when driving.
    pub cancelled: Vec<usize>,
    /// Cost added for every cancelled customer the tour passes over.
    pub skip_cost: f64,
}

/// Everything a solver needs, validated once up front.
///
/// Built with [`SolveContext::builder`]. `max_cycles == 0` selects the
/// single-vehicle travelling-salesman variant; otherwise it bounds the
/// total number of non-empty cycles a solution may use.
///
/// # Examples
///
/// ```
/// use td_routing::duration::DurationMatrix;
/// use td_routing::models::{SolveContext, Vehicle};
///
/// let dm = DurationMatrix::from_static(
///     &[vec![0.0, 5.0, 7.0], vec![5.0, 0.0, 3.0], vec![7.0, 3.0, 0.0]],
///     12,
/// )
/// .unwrap();
/// let ctx = SolveContext::builder(dm, vec![0, 2, 3])
///     .vehicles(vec![Vehicle::new(0, 5)])
///     .max_cycles(2)
///     .build()
///     .unwrap();
/// assert_eq!(ctx.customers(), &[1, 2]);
/// assert_eq!(ctx.max_capacity(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct SolveContext {
    matrix: DurationMatrix,
    unit: TimeUnit,
    ignore_long_trip: bool,
    load: Vec<i64>,
    vehicles: Vec<Vehicle>,
    customers: Vec<usize>,
    max_cycles: usize,
    objective: Objective,
    service: ServiceTimes,
    tsp: TspOptions,
}

impl SolveContext {
    /// Starts building a context from a matrix and a demand vector.
    pub fn builder(matrix: DurationMatrix, load: Vec<i64>) -> ContextBuilder {
        ContextBuilder {
            matrix,
            load,
            vehicles: Vec::new(),
            customers: None,
            ignored: Vec::new(),
            max_cycles: None,
            objective: Objective::default(),
            unit: TimeUnit::default(),
            ignore_long_trip: false,
            service: ServiceTimes::default(),
            tsp: TspOptions::default(),
        }
    }

    /// Duration lookups under this context's unit and horizon policy.
    pub fn model(&self) -> DurationModel<'_> {
        DurationModel::new(&self.matrix, self.unit, self.ignore_long_trip)
    }

    /// The duration matrix.
    pub fn matrix(&self) -> &DurationMatrix {
        &self.matrix
    }

    /// Number of locations including the depot.
    pub fn n(&self) -> usize {
        self.matrix.size()
    }

    /// The operating horizon.
    pub fn horizon(&self) -> TimeHorizon {
        TimeHorizon::new(self.unit, self.matrix.zones())
    }

    /// Whether trips past the horizon are infeasible.
    pub fn ignore_long_trip(&self) -> bool {
        self.ignore_long_trip
    }

    /// Demand vector indexed by location id.
    pub fn load(&self) -> &[i64] {
        &self.load
    }

    /// Demand of one location.
    #[inline]
    pub fn demand(&self, node: usize) -> i64 {
        self.load[node]
    }

    /// The fleet.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Vehicle start times, by vehicle id.
    pub fn start_times(&self) -> Vec<f64> {
        self.vehicles.iter().map(|v| v.start_time()).collect()
    }

    /// Largest vehicle capacity.
    pub fn max_capacity(&self) -> i64 {
        self.vehicles.iter().map(|v| v.capacity()).max().unwrap_or(0)
    }

    /// Customers to visit (ignored ones removed, duplicates dropped).
    pub fn customers(&self) -> &[usize] {
        &self.customers
    }

    /// Cycle limit; 0 for the travelling-salesman variant.
    pub fn max_cycles(&self) -> usize {
        self.max_cycles
    }

    /// Returns `true` for the single-vehicle travelling-salesman variant.
    pub fn is_tsp(&self) -> bool {
        self.max_cycles == 0
    }

    /// What solvers minimise.
    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Loading and unloading times.
    pub fn service(&self) -> &ServiceTimes {
        &self.service
    }

    /// Travelling-salesman options.
    pub fn tsp(&self) -> &TspOptions {
        &self.tsp
    }

    /// Returns a copy with a different objective.
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }
}

/// Collects and validates the parts of a [`SolveContext`].
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    matrix: DurationMatrix,
    load: Vec<i64>,
    vehicles: Vec<Vehicle>,
    customers: Option<Vec<usize>>,
    ignored: Vec<usize>,
    max_cycles: Option<usize>,
    objective: Objective,
    unit: TimeUnit,
    ignore_long_trip: bool,
    service: ServiceTimes,
    tsp: TspOptions,
}

impl ContextBuilder {
    /// Sets the fleet. Vehicle ids must equal their positions.
    pub fn vehicles(mut self, vehicles: Vec<Vehicle>) -> Self {
        self.vehicles = vehicles;
        self
    }

    /// Sets the customers to visit; defaults to every non-depot location.
    pub fn customers(mut self, customers: Vec<usize>) -> Self {
        self.customers = Some(customers);
        self
    }

    /// Sets customers excluded from this solve.
    pub fn ignored(mut self, ignored: Vec<usize>) -> Self {
        self.ignored = ignored;
        self
    }

    /// Sets the cycle limit `k`; defaults to the fleet size.
    pub fn max_cycles(mut self, k: usize) -> Self {
        self.max_cycles = Some(k);
        self
    }

    /// Sets the objective.
    pub fn objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Sets the time unit of the matrix and start times.
    pub fn time_unit(mut self, unit: TimeUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Rejects trips past the horizon instead of clamping.
    pub fn ignore_long_trip(mut self, ignore: bool) -> Self {
        self.ignore_long_trip = ignore;
        self
    }

    /// Sets loading and unloading times.
    pub fn service_times(mut self, service: ServiceTimes) -> Self {
        self.service = service;
        self
    }

    /// Sets travelling-salesman options.
    pub fn tsp_options(mut self, tsp: TspOptions) -> Self {
        self.tsp = tsp;
        self
    }

    /// Validates and builds the context.
    pub fn build(self) -> Result<SolveContext, InvalidInput> {
        let n = self.matrix.size();
        if n == 0 {
            return Err(InvalidInput::MatrixShape {
                n,
                reason: "no locations".into(),
            });
        }
        if self.load.len() != n {
            return Err(InvalidInput::LoadLength {
                expected: n,
                found: self.load.len(),
            });
        }
        if self.load[DEPOT] != 0 {
            return Err(InvalidInput::DepotDemand(self.load[DEPOT]));
        }
        if let Some((customer, &demand)) = self.load.iter().enumerate().find(|(_, d)| **d < 0) {
            return Err(InvalidInput::NegativeDemand { customer, demand });
        }

        if self.vehicles.is_empty() {
            return Err(InvalidInput::NoVehicles);
        }
        for (i, v) in self.vehicles.iter().enumerate() {
            if v.id() != i {
                return Err(InvalidInput::Parameter {
                    name: "vehicles",
                    reason: format!("vehicle at position {i} has id {}", v.id()),
                });
            }
            if v.capacity() < 0 {
                return Err(InvalidInput::NegativeCapacity {
                    vehicle: i,
                    capacity: v.capacity(),
                });
            }
            if !v.start_time().is_finite() || v.start_time() < 0.0 {
                return Err(InvalidInput::InvalidStartTime {
                    vehicle: i,
                    time: v.start_time(),
                });
            }
        }

        let requested = self.customers.unwrap_or_else(|| (1..n).collect());
        let mut seen = vec![false; n];
        for &id in requested.iter().chain(&self.ignored) {
            if id == DEPOT || id >= n {
                return Err(InvalidInput::CustomerOutOfRange { id, n });
            }
        }
        for &id in &self.ignored {
            seen[id] = true;
        }
        let mut customers = Vec::with_capacity(requested.len());
        for id in requested {
            if !seen[id] {
                seen[id] = true;
                customers.push(id);
            }
        }

        let max_cycles = self.max_cycles.unwrap_or(self.vehicles.len());
        if max_cycles > 0 {
            let max_capacity = self.vehicles.iter().map(|v| v.capacity()).max().unwrap_or(0);
            if let Some(&c) = customers.iter().find(|&&c| self.load[c] > max_capacity) {
                return Err(InvalidInput::DemandExceedsFleet {
                    customer: c,
                    demand: self.load[c],
                    max_capacity,
                });
            }
        } else {
            if self.tsp.start_node >= n {
                return Err(InvalidInput::StartNodeOutOfRange {
                    node: self.tsp.start_node,
                    n,
                });
            }
            if let Some(&id) = self.tsp.cancelled.iter().find(|&&c| c == DEPOT || c >= n) {
                return Err(InvalidInput::CustomerOutOfRange { id, n });
            }
            if !self.tsp.skip_cost.is_finite() || self.tsp.skip_cost < 0.0 {
                return Err(InvalidInput::Parameter {
                    name: "skip_cost",
                    reason: format!("must be finite and >= 0, found {}", self.tsp.skip_cost),
                });
            }
            customers.retain(|&c| c != self.tsp.start_node);
        }

        Ok(SolveContext {
            matrix: self.matrix,
            unit: self.unit,
            ignore_long_trip: self.ignore_long_trip,
            load: self.load,
            vehicles: self.vehicles,
            customers,
            max_cycles,
            objective: self.objective,
            service: self.service,
            tsp: self.tsp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(n: usize) -> DurationMatrix {
        let grid: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| (i as f64 - j as f64).abs()).collect())
            .collect();
        DurationMatrix::from_static(&grid, 12).expect("valid")
    }

    #[test]
    fn test_build_defaults() {
        let ctx = SolveContext::builder(matrix(4), vec![0, 1, 1, 1])
            .vehicles(vec![Vehicle::new(0, 3), Vehicle::new(1, 3)])
            .build()
            .expect("valid");
        assert_eq!(ctx.customers(), &[1, 2, 3]);
        assert_eq!(ctx.max_cycles(), 2);
        assert!(!ctx.is_tsp());
        assert_eq!(ctx.start_times(), vec![0.0, 0.0]);
        assert_eq!(ctx.horizon().end(), 720.0);
    }

    #[test]
    fn test_ignored_and_duplicates_removed() {
        let ctx = SolveContext::builder(matrix(5), vec![0, 1, 1, 1, 1])
            .vehicles(vec![Vehicle::new(0, 10)])
            .customers(vec![4, 2, 2, 3, 1])
            .ignored(vec![3])
            .build()
            .expect("valid");
        assert_eq!(ctx.customers(), &[4, 2, 1]);
    }

    #[test]
    fn test_rejects_out_of_range_customer() {
        let err = SolveContext::builder(matrix(3), vec![0, 1, 1])
            .vehicles(vec![Vehicle::new(0, 10)])
            .customers(vec![1, 5])
            .build()
            .unwrap_err();
        assert_eq!(err, InvalidInput::CustomerOutOfRange { id: 5, n: 3 });
    }

    #[test]
    fn test_rejects_depot_as_customer() {
        let err = SolveContext::builder(matrix(3), vec![0, 1, 1])
            .vehicles(vec![Vehicle::new(0, 10)])
            .customers(vec![0, 1])
            .build()
            .unwrap_err();
        assert_eq!(err, InvalidInput::CustomerOutOfRange { id: 0, n: 3 });
    }

    #[test]
    fn test_rejects_load_mismatch() {
        let err = SolveContext::builder(matrix(3), vec![0, 1])
            .vehicles(vec![Vehicle::new(0, 10)])
            .build()
            .unwrap_err();
        assert_eq!(err, InvalidInput::LoadLength { expected: 3, found: 2 });
    }

    #[test]
    fn test_rejects_depot_demand() {
        let err = SolveContext::builder(matrix(2), vec![1, 1])
            .vehicles(vec![Vehicle::new(0, 10)])
            .build()
            .unwrap_err();
        assert_eq!(err, InvalidInput::DepotDemand(1));
    }

    #[test]
    fn test_rejects_oversized_demand() {
        let err = SolveContext::builder(matrix(3), vec![0, 4, 12])
            .vehicles(vec![Vehicle::new(0, 10), Vehicle::new(1, 8)])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            InvalidInput::DemandExceedsFleet {
                customer: 2,
                demand: 12,
                max_capacity: 10
            }
        );
    }

    #[test]
    fn test_oversized_demand_ignored_is_fine() {
        let ctx = SolveContext::builder(matrix(3), vec![0, 4, 12])
            .vehicles(vec![Vehicle::new(0, 10)])
            .ignored(vec![2])
            .build()
            .expect("valid");
        assert_eq!(ctx.customers(), &[1]);
    }

    #[test]
    fn test_rejects_empty_fleet() {
        let err = SolveContext::builder(matrix(2), vec![0, 1])
            .build()
            .unwrap_err();
        assert_eq!(err, InvalidInput::NoVehicles);
    }

    #[test]
    fn test_rejects_bad_start_time() {
        let err = SolveContext::builder(matrix(2), vec![0, 1])
            .vehicles(vec![Vehicle::new(0, 5).with_start_time(f64::NAN)])
            .build()
            .unwrap_err();
        assert!(matches!(err, InvalidInput::InvalidStartTime { vehicle: 0, .. }));
    }

    #[test]
    fn test_tsp_context() {
        let ctx = SolveContext::builder(matrix(4), vec![0, 50, 50, 50])
            .vehicles(vec![Vehicle::new(0, 1)])
            .max_cycles(0)
            .tsp_options(TspOptions {
                start_node: 2,
                cancelled: vec![3],
                skip_cost: 1.0,
            })
            .build()
            .expect("capacity is not checked for tsp");
        assert!(ctx.is_tsp());
        assert_eq!(ctx.customers(), &[1, 3]);
    }

    #[test]
    fn test_tsp_rejects_bad_start() {
        let err = SolveContext::builder(matrix(3), vec![0, 1, 1])
            .vehicles(vec![Vehicle::new(0, 1)])
            .max_cycles(0)
            .tsp_options(TspOptions {
                start_node: 7,
                ..TspOptions::default()
            })
            .build()
            .unwrap_err();
        assert_eq!(err, InvalidInput::StartNodeOutOfRange { node: 7, n: 3 });
    }
}
