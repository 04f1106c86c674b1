//! Permutation chromosome with lazily cached evaluation.
//!
//! A chromosome carries its flat permutation and, once evaluated, the
//! decoded cycles, both time aggregates and the per-vehicle routes. The
//! evaluation fields are `None` until [`Chromosome::evaluate`] runs and are
//! never recomputed afterwards.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{Cycle, Objective, SolveResult};

use super::GaProblem;

/// A permutation and its cached evaluation.
///
/// `cost` is the latest vehicle finish time; it is `Some(INFINITY)` for an
/// evaluated but infeasible permutation. `fitness_range` is the slice of
/// the roulette wheel assigned during fitness-proportional selection.
///
/// # Examples
///
/// ```
/// use td_routing::ga::Chromosome;
/// use td_routing::models::Objective;
///
/// let c = Chromosome::new(vec![3, 1, 0, 2]);
/// assert!(!c.is_evaluated());
/// assert_eq!(c.fitness(Objective::MinMaxTime), f64::INFINITY);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    /// Customers interleaved with DEPOT separators (VRP) or a plain tour (TSP).
    pub permutation: Vec<usize>,
    /// Decoded non-empty cycles.
    pub route: Option<Vec<Cycle>>,
    /// Latest vehicle finish time.
    pub cost: Option<f64>,
    /// Sum of vehicle finish times.
    pub route_sum_time: Option<f64>,
    /// Cycles per vehicle.
    pub vehicle_routes: Option<BTreeMap<usize, Vec<Cycle>>>,
    /// Finish time per vehicle.
    pub vehicle_times: Option<BTreeMap<usize, f64>>,
    /// Roulette interval `[lo, hi)` from the last weighted selection.
    pub fitness_range: Option<(f64, f64)>,
}

impl Chromosome {
    /// Creates an unevaluated chromosome.
    pub fn new(permutation: Vec<usize>) -> Self {
        Self {
            permutation,
            route: None,
            cost: None,
            route_sum_time: None,
            vehicle_routes: None,
            vehicle_times: None,
            fitness_range: None,
        }
    }

    /// Returns `true` once the evaluation is cached.
    pub fn is_evaluated(&self) -> bool {
        self.cost.is_some()
    }

    /// Evaluates the permutation unless already cached and returns the
    /// fitness under the problem's objective.
    pub fn evaluate<P: GaProblem>(&mut self, problem: &P) -> f64 {
        if !self.is_evaluated() {
            let result = problem.evaluate(&self.permutation);
            self.route = result
                .is_feasible()
                .then(|| result.cycles().into_iter().cloned().collect());
            self.cost = Some(result.route_max_time);
            self.route_sum_time = Some(result.route_sum_time);
            self.vehicle_routes = result.vehicle_routes;
            self.vehicle_times = result.vehicle_times;
        }
        self.fitness(problem.objective())
    }

    /// Objective value; infinite when unevaluated or infeasible.
    pub fn fitness(&self, objective: Objective) -> f64 {
        match (self.cost, self.route_sum_time) {
            (Some(max), Some(sum)) => objective.pick(max, sum),
            _ => f64::INFINITY,
        }
    }

    /// Returns `true` if evaluated and feasible.
    pub fn is_feasible(&self) -> bool {
        self.cost.is_some_and(f64::is_finite) && self.vehicle_routes.is_some()
    }

    /// Orders by objective, breaking ties on the other time measure.
    pub fn compare(&self, other: &Self, objective: Objective) -> Ordering {
        let secondary = match objective {
            Objective::MinMaxTime => Objective::MinSumTime,
            Objective::MinSumTime => Objective::MinMaxTime,
        };
        self.fitness(objective)
            .total_cmp(&other.fitness(objective))
            .then_with(|| self.fitness(secondary).total_cmp(&other.fitness(secondary)))
    }

    /// Converts the cached evaluation into a result.
    pub fn into_result(self) -> SolveResult {
        if !self.is_feasible() {
            return SolveResult::infeasible();
        }
        match (self.cost, self.route_sum_time, self.vehicle_routes, self.vehicle_times) {
            (Some(max), Some(sum), Some(routes), Some(times)) => SolveResult::new(max, sum, routes, times),
            _ => SolveResult::infeasible(),
        }
    }

    #[cfg(test)]
    pub(crate) fn scored(permutation: Vec<usize>, max: f64, sum: f64) -> Self {
        let mut c = Self::new(permutation);
        c.cost = Some(max);
        c.route_sum_time = Some(sum);
        if max.is_finite() {
            c.vehicle_routes = Some(BTreeMap::new());
            c.vehicle_times = Some(BTreeMap::new());
        }
        c
    }
}
