//! Top-level dispatch from a request to a solver.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::aco::{self, AntColonyConfig};
use crate::error::SolveError;
use crate::evaluation::annotate_arrivals;
use crate::exact::{self, BruteForceConfig};
use crate::ga::{self, GaConfig};
use crate::models::{Algorithm, Location, SolveContext, SolveRequest, SolveResult};
use crate::sa::{self, AnnealingConfig};
use crate::store::SolutionStore;

/// What a solve produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// The best solution found.
    Feasible(SolveResult),
    /// Every candidate the solver looked at was infeasible.
    NoFeasibleSolution,
}

impl SolveOutcome {
    /// The solution, if one was found.
    pub fn result(&self) -> Option<&SolveResult> {
        match self {
            SolveOutcome::Feasible(result) => Some(result),
            SolveOutcome::NoFeasibleSolution => None,
        }
    }
}

impl From<SolveResult> for SolveOutcome {
    fn from(result: SolveResult) -> Self {
        if result.is_feasible() {
            SolveOutcome::Feasible(result)
        } else {
            SolveOutcome::NoFeasibleSolution
        }
    }
}

/// Validates a request and runs the selected algorithm.
///
/// `k == 0` selects the travelling-salesman variant of the algorithm.
///
/// # Errors
///
/// [`SolveError::Invalid`] for a malformed request or out-of-domain
/// parameters, [`SolveError::Params`] when `algorithm_params` does not
/// match the algorithm's settings.
///
/// # Examples
///
/// ```
/// use td_routing::models::SolveRequest;
/// use td_routing::solve::{solve, SolveOutcome};
///
/// let request: SolveRequest = serde_json::from_str(r#"{
///     "n": 3, "m": 1, "k": 2, "q": 1,
///     "duration": [[[0.0], [5.0], [7.0]], [[5.0], [0.0], [2.0]], [[7.0], [2.0], [0.0]]],
///     "load": [0, 1, 1],
///     "customers": [1, 2],
///     "vehicle_start_times": [0.0],
///     "algorithm": "brute_force"
/// }"#).unwrap();
/// match solve(&request).unwrap() {
///     SolveOutcome::Feasible(result) => assert_eq!(result.route_max_time, 24.0),
///     SolveOutcome::NoFeasibleSolution => unreachable!(),
/// }
/// ```
#[instrument(level = "info", skip(request), fields(algorithm = ?request.algorithm, n = request.n, m = request.m, k = request.k))]
pub fn solve(request: &SolveRequest) -> Result<SolveOutcome, SolveError> {
    let ctx = request.validate()?;
    solve_context(&ctx, request.algorithm, &request.algorithm_params)
}

/// Runs `algorithm` on an already validated context.
///
/// # Errors
///
/// As [`solve`], minus request validation.
pub fn solve_context(
    ctx: &SolveContext,
    algorithm: Algorithm,
    params: &Map<String, Value>,
) -> Result<SolveOutcome, SolveError> {
    let tsp = ctx.is_tsp();
    let result = match algorithm {
        Algorithm::BruteForce => {
            let BruteForceConfig {} = parse(params)?;
            if tsp {
                exact::solve_tsp(ctx)
            } else {
                exact::solve_vrp(ctx)
            }
        }
        Algorithm::AntColony => {
            let config: AntColonyConfig = parse(params)?;
            aco::solve_best(ctx, &config)?
        }
        Algorithm::SimulatedAnnealing => {
            let config: AnnealingConfig = parse(params)?;
            if tsp {
                sa::solve_tsp(ctx, &config)?
            } else {
                sa::solve_vrp(ctx, &config)?
            }
        }
        Algorithm::Genetic => {
            let config: GaConfig = parse(params)?;
            if tsp {
                ga::solve_tsp(ctx, &config)?
            } else {
                ga::solve_vrp(ctx, &config)?
            }
        }
    };
    info!(
        ?algorithm,
        tsp,
        feasible = result.is_feasible(),
        route_max_time = result.route_max_time,
        route_sum_time = result.route_sum_time,
        "solve finished"
    );
    Ok(result.into())
}

/// Annotates a solution with arrival times and saves it.
///
/// # Errors
///
/// [`SolveError::Invalid`] if a routed node has no location,
/// [`SolveError::Store`] if the store rejects the solution.
pub fn save_solution<S: SolutionStore>(
    store: &mut S,
    name: &str,
    description: &str,
    result: &SolveResult,
    locations: &[Location],
    ctx: &SolveContext,
) -> Result<(), SolveError> {
    let schedules = annotate_arrivals(result, locations, ctx)?;
    store.save_solution(
        name,
        description,
        locations,
        &schedules,
        result.route_max_time,
        result.route_sum_time,
    )?;
    Ok(())
}

fn parse<T: DeserializeOwned>(params: &Map<String, Value>) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(params.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::{ServiceTimes, TimeUnit};
    use crate::error::{InvalidInput, StoreError};
    use crate::models::{Capacity, Objective, TspOptions};
    use crate::store::InMemoryStore;
    use serde_json::json;

    /// Five locations on a line, ten minutes apart, in every zone.
    fn request(algorithm: Algorithm, k: usize) -> SolveRequest {
        let n = 5;
        let duration = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| vec![10.0 * (i as f64 - j as f64).abs(); 12])
                    .collect()
            })
            .collect();
        SolveRequest {
            n,
            m: 2,
            k,
            q: Capacity::Uniform(2),
            duration,
            load: vec![0, 1, 1, 1, 1],
            customers: vec![1, 2, 3, 4],
            ignored_customers: vec![],
            vehicle_start_times: vec![0.0, 0.0],
            objective: Objective::MinMaxTime,
            ignore_long_trip: false,
            time_unit: TimeUnit::Minutes,
            service_times: ServiceTimes::default(),
            tsp: TspOptions::default(),
            algorithm,
            algorithm_params: Map::new(),
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_every_algorithm_matches_exact_on_tiny_vrp() {
        let exact = solve(&request(Algorithm::BruteForce, 3)).expect("solvable");
        let exact = exact.result().expect("feasible").route_max_time;
        let cases = [
            (Algorithm::AntColony, json!({"n_trials": 2, "seed": 1})),
            (Algorithm::SimulatedAnnealing, json!({"terminate_after": 3000, "repeat_annealing": 2})),
            (
                Algorithm::Genetic,
                json!({"population_count": 20, "iteration_count": 40, "islands": 2, "selection_budget": {"draws": 2000}}),
            ),
        ];
        for (algorithm, p) in cases {
            let mut r = request(algorithm, 3);
            r.algorithm_params = params(p);
            let outcome = solve(&r).expect("solvable");
            let cost = outcome.result().expect("feasible").route_max_time;
            assert!(cost >= exact - 1e-9, "{algorithm:?}");
            assert!(cost <= exact * 1.1, "{algorithm:?}");
        }
    }

    #[test]
    fn test_k_zero_runs_tour_variant() {
        let outcome = solve(&request(Algorithm::BruteForce, 0)).expect("solvable");
        let result = outcome.result().expect("feasible");
        // 0 -> 1 -> 2 -> 3 -> 4 -> 0 on a line.
        assert_eq!(result.route_max_time, 80.0);
        assert_eq!(result.vehicle_routes.as_ref().expect("routes")[&0], vec![vec![0, 1, 2, 3, 4, 0]]);
    }

    #[test]
    fn test_unknown_param_rejected() {
        let mut r = request(Algorithm::SimulatedAnnealing, 2);
        r.algorithm_params = params(json!({"temperature": 5.0}));
        assert!(matches!(solve(&r), Err(SolveError::Params(_))));
        let mut r = request(Algorithm::BruteForce, 2);
        r.algorithm_params = params(json!({"depth": 1}));
        assert!(matches!(solve(&r), Err(SolveError::Params(_))));
    }

    #[test]
    fn test_invalid_request_and_params() {
        let mut r = request(Algorithm::BruteForce, 2);
        r.load[0] = 1;
        assert!(matches!(solve(&r), Err(SolveError::Invalid(InvalidInput::DepotDemand(1)))));

        let mut r = request(Algorithm::Genetic, 2);
        r.algorithm_params = params(json!({"population_count": 1}));
        assert!(matches!(
            solve(&r),
            Err(SolveError::Invalid(InvalidInput::Parameter { name: "population_count", .. }))
        ));
    }

    #[test]
    fn test_no_feasible_solution() {
        let mut r = request(Algorithm::BruteForce, 2);
        r.duration = (0..r.n)
            .map(|i| (0..r.n).map(|j| vec![if i == j { 0.0 } else { 500.0 }; 12]).collect())
            .collect();
        r.ignore_long_trip = true;
        assert_eq!(solve(&r).expect("valid"), SolveOutcome::NoFeasibleSolution);
    }

    #[test]
    fn test_save_solution_round_trip() {
        let r = request(Algorithm::BruteForce, 3);
        let ctx = r.validate().expect("valid");
        let outcome = solve_context(&ctx, r.algorithm, &r.algorithm_params).expect("solvable");
        let result = outcome.result().expect("feasible");
        let locations: Vec<Location> = (0..5)
            .map(|i| Location::new(i, 37.5 + 0.01 * i as f64, 127.0, i64::from(i > 0)))
            .collect();

        let mut store = InMemoryStore::new();
        save_solution(&mut store, "line", "four stops", result, &locations, &ctx).expect("saved");
        let saved = &store.solutions()[0];
        assert_eq!(saved.duration_max, result.route_max_time);
        let stops: usize = saved.vehicles.iter().flat_map(|v| &v.cycles).map(|c| c.len() - 2).sum();
        assert_eq!(stops, 4);

        let err = save_solution(&mut store, "none", "", &SolveResult::infeasible(), &locations, &ctx);
        assert!(matches!(err, Err(SolveError::Store(StoreError::Backend(_)))));
    }
}
