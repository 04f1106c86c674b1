//! Simulated annealing over per-vehicle visiting lists.

use rand::Rng;
use tracing::{debug, info, instrument};
use u_metaheur::sa::SaProblem;

use crate::error::InvalidInput;
use crate::evaluation::RouteEvaluator;
use crate::models::{SolveContext, SolveResult};
use crate::parallel::best_result;

use super::schedule::{anneal, runner_cost};
use super::{AnnealingConfig, FleetPlan, PlanMove};

/// Fleet plans as an annealing problem.
struct FleetAnnealing<'a> {
    ctx: &'a SolveContext,
    eval: RouteEvaluator<'a>,
}

impl FleetAnnealing<'_> {
    fn score(&self, plan: &FleetPlan) -> SolveResult {
        self.eval.evaluate(&plan.to_sequence(&self.eval))
    }
}

impl SaProblem for FleetAnnealing<'_> {
    type Solution = FleetPlan;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> FleetPlan {
        FleetPlan::random(self.ctx, rng)
    }

    fn cost(&self, plan: &FleetPlan) -> f64 {
        runner_cost(self.score(plan).cost(self.ctx.objective()))
    }

    fn neighbor<R: Rng>(&self, plan: &FleetPlan, rng: &mut R) -> FleetPlan {
        let mut next = plan.clone();
        PlanMove::apply_random(&mut next, rng);
        next
    }
}

/// Anneals vehicle-routing plans and returns the best of
/// `repeat_annealing` independent runs.
///
/// Each run starts from a random [`FleetPlan`]. A plan is scored by
/// flattening it into one cycle sequence ordered by departure
/// ([`FleetPlan::to_sequence`]) and evaluating that like any other
/// solver's cycles; infeasible plans score infinity.
///
/// # Errors
///
/// Returns [`InvalidInput::Parameter`] for out-of-domain settings.
///
/// # Examples
///
/// ```
/// use td_routing::duration::DurationMatrix;
/// use td_routing::models::{SolveContext, Vehicle};
/// use td_routing::sa::{solve_vrp, AnnealingConfig};
///
/// let grid: Vec<Vec<f64>> = (0..4)
///     .map(|i| (0..4).map(|j| 10.0 * (i as f64 - j as f64).abs()).collect())
///     .collect();
/// let ctx = SolveContext::builder(DurationMatrix::from_static(&grid, 12).unwrap(), vec![0, 1, 1, 1])
///     .vehicles(vec![Vehicle::new(0, 3), Vehicle::new(1, 3)])
///     .build()
///     .unwrap();
/// let config = AnnealingConfig::default().with_terminate_after(2_000).with_repeats(2);
/// let best = solve_vrp(&ctx, &config).unwrap();
/// assert_eq!(best.route_max_time, 60.0);
/// ```
#[instrument(level = "info", skip(ctx, config), fields(customers = ctx.customers().len(), vehicles = ctx.vehicles().len()))]
pub fn solve_vrp(ctx: &SolveContext, config: &AnnealingConfig) -> Result<SolveResult, InvalidInput> {
    config.validate()?;
    let problem = FleetAnnealing {
        ctx,
        eval: RouteEvaluator::new(ctx),
    };
    let objective = ctx.objective();

    let best = best_result(config.repeat_annealing, objective, |run| {
        let outcome = anneal(&problem, config, run);
        debug!(run, cost = outcome.best_cost, "annealing run finished");
        problem.score(&outcome.best)
    });

    info!(
        feasible = best.is_feasible(),
        cost = best.cost(objective),
        "annealing finished"
    );
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::DurationMatrix;
    use crate::exact;
    use crate::models::{cycle_demand, Objective, Vehicle};

    fn context(objective: Objective) -> SolveContext {
        let grid: Vec<Vec<f64>> = (0..6)
            .map(|i| {
                (0..6)
                    .map(|j| 6.0 * (i as f64 - j as f64).abs() + if i == j { 0.0 } else { 2.0 })
                    .collect()
            })
            .collect();
        SolveContext::builder(DurationMatrix::from_static(&grid, 12).expect("valid"), vec![0, 2, 1, 2, 1, 2])
            .vehicles(vec![Vehicle::new(0, 4), Vehicle::new(1, 4).with_start_time(10.0)])
            .max_cycles(4)
            .objective(objective)
            .build()
            .expect("valid")
    }

    fn config() -> AnnealingConfig {
        AnnealingConfig::default()
            .with_terminate_after(3_000)
            .with_step_length(50)
            .with_repeats(3)
            .with_seed(5)
    }

    #[test]
    fn test_not_better_than_exact() {
        for objective in [Objective::MinMaxTime, Objective::MinSumTime] {
            let ctx = context(objective);
            let exact = exact::solve_vrp(&ctx);
            let best = solve_vrp(&ctx, &config()).expect("valid config");
            assert!(best.is_feasible());
            assert!(best.cost(objective) >= exact.cost(objective) - 1e-9);
        }
    }

    #[test]
    fn test_result_respects_capacity() {
        let ctx = context(Objective::MinMaxTime);
        let best = solve_vrp(&ctx, &config()).expect("valid config");
        let routes = best.vehicle_routes.clone().expect("feasible");
        for (&v, cycles) in &routes {
            for c in cycles {
                assert!(cycle_demand(c, ctx.load()) <= ctx.vehicles()[v].capacity());
            }
        }
        let mut visited = best.visited_customers();
        visited.sort_unstable();
        assert_eq!(visited, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let ctx = context(Objective::MinSumTime);
        let a = solve_vrp(&ctx, &config()).expect("valid config");
        let b = solve_vrp(&ctx, &config()).expect("valid config");
        assert_eq!(a, b);
    }

    #[test]
    fn test_heterogeneous_fleet_matches_exact_feasibility() {
        let grid = vec![vec![0.0, 10.0], vec![10.0, 0.0]];
        let ctx = SolveContext::builder(DurationMatrix::from_static(&grid, 12).expect("valid"), vec![0, 2])
            .vehicles(vec![Vehicle::new(0, 1), Vehicle::new(1, 3)])
            .build()
            .expect("valid");
        // Vehicle 0 is free first and cannot carry the only customer.
        assert!(!exact::solve_vrp(&ctx).is_feasible());
        let best = solve_vrp(&ctx, &config()).expect("valid config");
        assert!(!best.is_feasible());
    }

    #[test]
    fn test_rejects_bad_config() {
        let ctx = context(Objective::MinSumTime);
        assert!(solve_vrp(&ctx, &config().with_cooling_rate(0.0)).is_err());
    }
}
