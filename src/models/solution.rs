//! Solve results and objectives.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::route::{cycle_customers, Cycle};

/// What a solver minimises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Latest vehicle finish time.
    #[default]
    MinMaxTime,
    /// Sum of vehicle finish times.
    MinSumTime,
}

impl Objective {
    /// Picks the objective value out of `(max, sum)`.
    pub fn pick(self, max_time: f64, sum_time: f64) -> f64 {
        match self {
            Objective::MinMaxTime => max_time,
            Objective::MinSumTime => sum_time,
        }
    }
}

/// Outcome of one evaluation or one solve.
///
/// An infeasible result has `route_max_time == INFINITY` and no routes.
/// Results are never mutated after construction; solvers compare and
/// discard them.
///
/// # Examples
///
/// ```
/// use td_routing::models::{Objective, SolveResult};
///
/// let r = SolveResult::infeasible();
/// assert!(!r.is_feasible());
/// assert_eq!(r.cost(Objective::MinMaxTime), f64::INFINITY);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    /// Latest vehicle finish time.
    pub route_max_time: f64,
    /// Sum of vehicle finish times.
    pub route_sum_time: f64,
    /// Cycles driven by each vehicle, in driving order.
    pub vehicle_routes: Option<BTreeMap<usize, Vec<Cycle>>>,
    /// Finish time of each vehicle.
    pub vehicle_times: Option<BTreeMap<usize, f64>>,
}

impl SolveResult {
    /// Creates a feasible result.
    pub fn new(
        route_max_time: f64,
        route_sum_time: f64,
        vehicle_routes: BTreeMap<usize, Vec<Cycle>>,
        vehicle_times: BTreeMap<usize, f64>,
    ) -> Self {
        Self {
            route_max_time,
            route_sum_time,
            vehicle_routes: Some(vehicle_routes),
            vehicle_times: Some(vehicle_times),
        }
    }

    /// The infeasible sentinel.
    pub fn infeasible() -> Self {
        Self {
            route_max_time: f64::INFINITY,
            route_sum_time: f64::INFINITY,
            vehicle_routes: None,
            vehicle_times: None,
        }
    }

    /// Returns `true` unless this is the infeasible sentinel.
    pub fn is_feasible(&self) -> bool {
        self.route_max_time.is_finite() && self.vehicle_routes.is_some()
    }

    /// Objective value; infinite when infeasible.
    pub fn cost(&self, objective: Objective) -> f64 {
        objective.pick(self.route_max_time, self.route_sum_time)
    }

    /// Orders two results by objective, breaking ties on the other measure.
    pub fn compare(&self, other: &Self, objective: Objective) -> Ordering {
        let secondary = match objective {
            Objective::MinMaxTime => Objective::MinSumTime,
            Objective::MinSumTime => Objective::MinMaxTime,
        };
        self.cost(objective)
            .total_cmp(&other.cost(objective))
            .then_with(|| self.cost(secondary).total_cmp(&other.cost(secondary)))
    }

    /// Returns `true` if this result is strictly better than `other`.
    pub fn is_better_than(&self, other: &Self, objective: Objective) -> bool {
        self.compare(other, objective) == Ordering::Less
    }

    /// All non-empty cycles, in vehicle order.
    pub fn cycles(&self) -> Vec<&Cycle> {
        self.vehicle_routes
            .iter()
            .flat_map(|routes| routes.values())
            .flatten()
            .filter(|c| !cycle_customers(c).is_empty())
            .collect()
    }

    /// Customer ids visited, in vehicle then cycle order.
    pub fn visited_customers(&self) -> Vec<usize> {
        self.cycles()
            .into_iter()
            .flat_map(|c| cycle_customers(c).to_vec())
            .collect()
    }
}
