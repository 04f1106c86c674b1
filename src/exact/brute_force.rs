//! Exhaustive enumeration.
//!
//! The reference solver: every other solver is checked against it on
//! small instances. Runtime grows factorially, and there is no timeout.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::evaluation::RouteEvaluator;
use crate::models::{SolveContext, SolveResult, DEPOT};

use super::{multiset_permutations, next_permutation};

/// Brute-force settings. There are none; the type exists so that unknown
/// `algorithm_params` keys are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BruteForceConfig {}

/// Enumerates every permutation of the customers interleaved with
/// `k - 1` DEPOT tokens and keeps the best decoded solution.
///
/// Permutations that differ only by swapping DEPOT tokens decode to the
/// same cycles, so only distinct arrangements of the multiset are
/// visited. More DEPOT tokens than `customers - 1` cannot produce more
/// non-empty cycles and are dropped. Ties keep the first arrangement in
/// lexicographic order.
///
/// # Examples
///
/// ```
/// use td_routing::duration::DurationMatrix;
/// use td_routing::exact::solve_vrp;
/// use td_routing::models::{SolveContext, Vehicle};
///
/// let grid: Vec<Vec<f64>> = (0..3)
///     .map(|i| (0..3).map(|j| 10.0 * (i as f64 - j as f64).abs()).collect())
///     .collect();
/// let ctx = SolveContext::builder(DurationMatrix::from_static(&grid, 12).unwrap(), vec![0, 1, 1])
///     .vehicles(vec![Vehicle::new(0, 2), Vehicle::new(1, 2)])
///     .build()
///     .unwrap();
/// let best = solve_vrp(&ctx);
/// assert_eq!(best.route_max_time, 40.0);
/// ```
#[instrument(level = "info", skip(ctx), fields(customers = ctx.customers().len()))]
pub fn solve_vrp(ctx: &SolveContext) -> SolveResult {
    let eval = RouteEvaluator::new(ctx);
    let objective = ctx.objective();
    let customers = ctx.customers();

    let depots = eval.depot_tokens();
    let mut tokens: Vec<usize> = customers.to_vec();
    tokens.extend(std::iter::repeat(DEPOT).take(depots));
    tokens.sort_unstable();

    let mut counts = vec![1; customers.len()];
    counts.push(depots);
    info!(
        depots,
        arrangements = %multiset_permutations(&counts),
        "brute force enumeration"
    );

    let mut best = SolveResult::infeasible();
    let mut visited: u64 = 0;
    loop {
        visited += 1;
        let candidate = eval.evaluate_permutation(&tokens);
        if candidate.is_better_than(&best, objective) {
            debug!(cost = candidate.cost(objective), visited, "new best");
            best = candidate;
        }
        if !next_permutation(&mut tokens) {
            break;
        }
    }

    info!(
        visited,
        feasible = best.is_feasible(),
        cost = best.cost(objective),
        "brute force finished"
    );
    best
}

/// Enumerates every visiting order of a single-vehicle tour.
#[instrument(level = "info", skip(ctx), fields(customers = ctx.customers().len()))]
pub fn solve_tsp(ctx: &SolveContext) -> SolveResult {
    let eval = RouteEvaluator::new(ctx);
    let mut tour: Vec<usize> = ctx.customers().to_vec();
    tour.sort_unstable();

    let mut best: Option<(f64, Vec<usize>)> = None;
    loop {
        if let Some(cost) = eval.tour_time(&tour) {
            if best.as_ref().map_or(true, |(b, _)| cost < *b) {
                best = Some((cost, tour.clone()));
            }
        }
        if !next_permutation(&mut tour) {
            break;
        }
    }

    let result = best.map_or_else(SolveResult::infeasible, |(_, t)| eval.evaluate_tour(&t));
    info!(
        feasible = result.is_feasible(),
        cost = result.route_max_time,
        "brute force tour finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::DurationMatrix;
    use crate::models::{Objective, TspOptions, Vehicle};

    fn line(n: usize, zones: usize) -> DurationMatrix {
        let grid: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| 10.0 * (i as f64 - j as f64).abs()).collect())
            .collect();
        DurationMatrix::from_static(&grid, zones).expect("valid")
    }

    fn context(capacity: i64, vehicles: usize, objective: Objective) -> SolveContext {
        SolveContext::builder(line(4, 12), vec![0, 1, 1, 1])
            .vehicles((0..vehicles).map(|i| Vehicle::new(i, capacity)).collect())
            .objective(objective)
            .build()
            .expect("valid")
    }

    #[test]
    fn test_single_vehicle_single_cycle() {
        let ctx = context(3, 1, Objective::MinMaxTime);
        let best = solve_vrp(&ctx);
        assert!((best.route_max_time - 60.0).abs() < 1e-10);
    }

    #[test]
    fn test_two_vehicles_min_max() {
        // Capacity 2 forces two cycles; {2, 3} and {1} ties the max of 60
        // with the smallest sum.
        let ctx = context(2, 2, Objective::MinMaxTime);
        let best = solve_vrp(&ctx);
        assert!((best.route_max_time - 60.0).abs() < 1e-10);
        assert!((best.route_sum_time - 80.0).abs() < 1e-10);
    }

    #[test]
    fn test_two_vehicles_min_sum() {
        // One cycle covering everything is cheapest in total.
        let ctx = context(3, 2, Objective::MinSumTime);
        let best = solve_vrp(&ctx);
        assert!((best.route_sum_time - 60.0).abs() < 1e-10);
    }

    #[test]
    fn test_capacity_forces_split() {
        let ctx = context(1, 3, Objective::MinMaxTime);
        let best = solve_vrp(&ctx);
        assert_eq!(best.cycles().len(), 3);
        assert!((best.route_max_time - 60.0).abs() < 1e-10);
    }

    #[test]
    fn test_infeasible_when_cycles_insufficient() {
        let ctx = SolveContext::builder(line(4, 12), vec![0, 1, 1, 1])
            .vehicles(vec![Vehicle::new(0, 1)])
            .max_cycles(2)
            .build()
            .expect("valid");
        assert!(!solve_vrp(&ctx).is_feasible());
    }

    #[test]
    fn test_horizon_infeasible() {
        let ctx = SolveContext::builder(line(4, 1), vec![0, 1, 1, 1])
            .vehicles(vec![Vehicle::new(0, 3)])
            .ignore_long_trip(true)
            .build()
            .expect("valid");
        let best = solve_vrp(&ctx);
        assert!(!best.is_feasible());
        assert!(best.vehicle_routes.is_none());
    }

    #[test]
    fn test_no_customers() {
        let ctx = SolveContext::builder(line(2, 12), vec![0, 1])
            .vehicles(vec![Vehicle::new(0, 3)])
            .customers(vec![])
            .build()
            .expect("valid");
        let best = solve_vrp(&ctx);
        assert!(best.is_feasible());
        assert_eq!(best.route_max_time, 0.0);
    }

    #[test]
    fn test_tsp_from_start_node() {
        let ctx = SolveContext::builder(line(4, 12), vec![0, 1, 1, 1])
            .vehicles(vec![Vehicle::new(0, 0)])
            .max_cycles(0)
            .tsp_options(TspOptions {
                start_node: 2,
                ..TspOptions::default()
            })
            .build()
            .expect("valid");
        let best = solve_tsp(&ctx);
        // 2 -> 3 -> 1 -> 0 = 10 + 20 + 10
        assert!((best.route_max_time - 40.0).abs() < 1e-10);
        assert_eq!(
            best.vehicle_routes.expect("feasible")[&0],
            vec![vec![2, 3, 1, 0]]
        );
    }
}
