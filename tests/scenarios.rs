use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use td_routing::aco::{self, AntColonyConfig, AntParams};
use td_routing::duration::{DurationMatrix, DurationSource, SyntheticDurations};
use td_routing::exact;
use td_routing::ga::{self, GaConfig, SelectionBudget};
use td_routing::models::{demands_of, Algorithm, Location, Objective, SolveContext, SolveResult, Vehicle, DEPOT};
use td_routing::sa::{self, AnnealingConfig};
use td_routing::solve::{solve_context, SolveOutcome};

/// Depot plus `customers` stops scattered around it, deterministic.
fn city(customers: usize) -> Vec<Location> {
    let mut locations = vec![Location::depot(37.5665, 126.9780)];
    for i in 1..=customers {
        let angle = i as f64 * 2.399_963;
        let radius = 0.01 + 0.004 * (i % 7) as f64;
        locations.push(Location::new(
            i,
            37.5665 + radius * angle.sin(),
            126.9780 + radius * angle.cos(),
            1 + (i % 3) as i64,
        ));
    }
    locations
}

fn congestion() -> Vec<f64> {
    // Non-decreasing through the first five hours so that leaving later
    // never arrives earlier on the short instances below.
    vec![1.0, 1.1, 1.2, 1.3, 1.3, 1.2, 1.1, 1.0, 1.2, 1.4, 1.2, 1.0]
}

fn context(locations: &[Location], capacity: i64, start_times: &[f64], k: usize) -> SolveContext {
    let matrix = SyntheticDurations::new(locations.to_vec(), 3.0, 12)
        .with_factors(congestion())
        .get_duration_matrix()
        .expect("synthetic matrix");
    let vehicles = start_times
        .iter()
        .enumerate()
        .map(|(id, &t)| Vehicle::new(id, capacity).with_start_time(t))
        .collect();
    SolveContext::builder(matrix, demands_of(locations))
        .vehicles(vehicles)
        .max_cycles(k)
        .build()
        .expect("valid instance")
}

/// Replays every vehicle's cycles straight from the duration lookup.
fn check_times(result: &SolveResult, ctx: &SolveContext) -> BTreeMap<usize, f64> {
    let model = ctx.model();
    let mut times = BTreeMap::new();
    let routes = result.vehicle_routes.as_ref().expect("feasible");
    for vehicle in ctx.vehicles() {
        let mut t = vehicle.start_time();
        for cycle in &routes[&vehicle.id()] {
            assert_eq!(cycle.first(), Some(&DEPOT));
            assert_eq!(cycle.last(), Some(&DEPOT));
            let load: i64 = cycle.iter().map(|&c| ctx.demand(c)).sum();
            assert!(load <= vehicle.capacity());
            for leg in cycle.windows(2) {
                t += model.duration_at(leg[0], leg[1], t).expect("clamped horizon");
            }
        }
        times.insert(vehicle.id(), t);
    }
    times
}

#[test]
fn test_check_times_n21_m3() {
    let locations = city(20);
    let ctx = context(&locations, 12, &[0.0, 0.0, 0.0], 6);
    let config = AntColonyConfig::default()
        .with_trials(2)
        .with_params(AntParams {
            n_iterations: 15,
            n_sub_iterations: 6,
            ..AntParams::default()
        })
        .with_seed(2024);
    let result = aco::solve_best(&ctx, &config).expect("valid config");
    assert!(result.is_feasible());

    let replayed = check_times(&result, &ctx);
    let reported = result.vehicle_times.as_ref().expect("feasible");
    for (vehicle, t) in &replayed {
        assert!((t - reported[vehicle]).abs() < 1e-6, "vehicle {vehicle}: {t} vs {}", reported[vehicle]);
    }
    let max = replayed.values().cloned().fold(0.0, f64::max);
    let sum: f64 = replayed.values().sum();
    assert!((max - result.route_max_time).abs() < 1e-6);
    assert!((sum - result.route_sum_time).abs() < 1e-6);

    let mut visited = result.visited_customers();
    visited.sort_unstable();
    assert_eq!(visited, (1..=20).collect::<Vec<_>>());
}

#[test]
fn test_check_times_for_every_heuristic() {
    let locations = city(8);
    let ctx = context(&locations, 6, &[0.0, 30.0], 4);
    let results = [
        sa::solve_vrp(&ctx, &AnnealingConfig::default().with_terminate_after(2_000).with_repeats(2)),
        ga::solve_vrp(
            &ctx,
            &GaConfig::default()
                .with_population_count(20)
                .with_iteration_count(30)
                .with_islands(2)
                .with_selection_budget(SelectionBudget::Draws(2_000)),
        ),
    ];
    for result in results {
        let result = result.expect("valid config");
        let replayed = check_times(&result, &ctx);
        let reported = result.vehicle_times.as_ref().expect("feasible");
        for (vehicle, t) in &replayed {
            assert!((t - reported[vehicle]).abs() < 1e-6);
        }
    }
}

#[test]
fn test_long_trips_are_infeasible() {
    let locations = city(3);
    let matrix = SyntheticDurations::new(locations.clone(), 400.0, 12)
        .get_duration_matrix()
        .expect("synthetic matrix");
    let ctx = SolveContext::builder(matrix, demands_of(&locations))
        .vehicles(vec![Vehicle::new(0, 10), Vehicle::new(1, 10)])
        .max_cycles(2)
        .ignore_long_trip(true)
        .build()
        .expect("valid instance");

    for (algorithm, params) in small_runs() {
        let params: Map<String, Value> = params.as_object().cloned().unwrap_or_default();
        let outcome = solve_context(&ctx, algorithm, &params).expect("valid");
        assert_eq!(outcome, SolveOutcome::NoFeasibleSolution, "{algorithm:?}");
    }
}

#[test]
fn test_later_start_never_finishes_earlier() {
    let locations = city(5);
    let early = exact::solve_vrp(&context(&locations, 6, &[0.0, 0.0], 3));
    let late = exact::solve_vrp(&context(&locations, 6, &[60.0, 120.0], 3));
    assert!(early.is_feasible() && late.is_feasible());
    assert!(late.route_max_time >= early.route_max_time);
    assert!(late.route_max_time >= 120.0);
}

#[test]
fn test_heuristics_against_exact() {
    let locations = city(6);
    for objective in [Objective::MinMaxTime, Objective::MinSumTime] {
        let ctx = context(&locations, 5, &[0.0, 20.0], 4).with_objective(objective);
        let exact = exact::solve_vrp(&ctx);
        let exact_cost = exact.cost(objective);

        let ant = aco::solve_best(&ctx, &AntColonyConfig::default().with_trials(3).with_seed(5))
            .expect("valid config");
        let annealed = sa::solve_vrp(
            &ctx,
            &AnnealingConfig::default().with_terminate_after(5_000).with_repeats(3),
        )
        .expect("valid config");
        let evolved = ga::solve_vrp(
            &ctx,
            &GaConfig::default()
                .with_population_count(30)
                .with_iteration_count(60)
                .with_islands(3)
                .with_selection_budget(SelectionBudget::Draws(5_000)),
        )
        .expect("valid config");

        for (name, result) in [("aco", ant), ("sa", annealed), ("ga", evolved)] {
            let cost = result.cost(objective);
            assert!(cost >= exact_cost - 1e-9, "{name} beat exact: {cost} < {exact_cost}");
            assert!(cost <= exact_cost * 1.1, "{name} too far: {cost} vs {exact_cost}");
        }
    }
}

fn small_runs() -> [(Algorithm, Value); 4] {
    [
        (Algorithm::BruteForce, json!({})),
        (Algorithm::AntColony, json!({"n_trials": 2})),
        (Algorithm::SimulatedAnnealing, json!({"terminate_after": 500, "repeat_annealing": 2})),
        (
            Algorithm::Genetic,
            json!({"population_count": 8, "iteration_count": 5, "islands": 1, "refinement_iterations": 0}),
        ),
    ]
}

#[test]
fn test_every_solver_agrees_with_heterogeneous_capacities() {
    // The small vehicle is free first, so it is handed the only cycle.
    let matrix = DurationMatrix::from_static(&[vec![0.0, 10.0], vec![10.0, 0.0]], 12).expect("valid grid");
    let ctx = SolveContext::builder(matrix, vec![0, 2])
        .vehicles(vec![Vehicle::new(0, 1), Vehicle::new(1, 3)])
        .build()
        .expect("valid instance");
    for (algorithm, params) in small_runs() {
        let params: Map<String, Value> = params.as_object().cloned().unwrap_or_default();
        let outcome = solve_context(&ctx, algorithm, &params).expect("valid");
        assert_eq!(outcome, SolveOutcome::NoFeasibleSolution, "{algorithm:?}");
    }
}

#[test]
fn test_heuristics_against_exact_with_mixed_fleet() {
    let locations = city(6);
    let matrix = SyntheticDurations::new(locations.clone(), 3.0, 12)
        .with_factors(congestion())
        .get_duration_matrix()
        .expect("synthetic matrix");
    let ctx = SolveContext::builder(matrix, demands_of(&locations))
        .vehicles(vec![Vehicle::new(0, 3), Vehicle::new(1, 7).with_start_time(15.0)])
        .max_cycles(4)
        .build()
        .expect("valid instance");
    let exact = exact::solve_vrp(&ctx);
    assert!(exact.is_feasible());
    let objective = ctx.objective();

    let ant = aco::solve_best(&ctx, &AntColonyConfig::default().with_trials(2).with_seed(3))
        .expect("valid config");
    let annealed = sa::solve_vrp(&ctx, &AnnealingConfig::default().with_terminate_after(3_000).with_repeats(2))
        .expect("valid config");
    let evolved = ga::solve_vrp(
        &ctx,
        &GaConfig::default()
            .with_population_count(20)
            .with_iteration_count(30)
            .with_islands(2)
            .with_selection_budget(SelectionBudget::Draws(2_000)),
    )
    .expect("valid config");

    for (name, result) in [("aco", ant), ("sa", annealed), ("ga", evolved)] {
        let cost = result.cost(objective);
        assert!(cost >= exact.cost(objective) - 1e-9, "{name} beat exact: {cost}");
        if result.is_feasible() {
            check_times(&result, &ctx);
        }
    }
}
