//! Simulated annealing for the single-vehicle tour.

use rand::Rng;
use tracing::{debug, info, instrument};
use u_metaheur::sa::SaProblem;
use u_numflow::random::shuffle;

use crate::constructive::{nearest_neighbor_tour, successive_insertion_tour};
use crate::error::InvalidInput;
use crate::evaluation::RouteEvaluator;
use crate::models::{SolveContext, SolveResult};
use crate::parallel::best_result;

use super::schedule::{anneal, runner_cost};
use super::{AnnealingConfig, TourInit, TourMove};

/// Customer orders as an annealing problem.
struct TourAnnealing<'a> {
    ctx: &'a SolveContext,
    eval: RouteEvaluator<'a>,
    /// Deterministic starting tour; `None` shuffles per run.
    seeded: Option<Vec<usize>>,
}

impl SaProblem for TourAnnealing<'_> {
    type Solution = Vec<usize>;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        match &self.seeded {
            Some(tour) => tour.clone(),
            None => {
                let mut tour = self.ctx.customers().to_vec();
                shuffle(&mut tour, rng);
                tour
            }
        }
    }

    fn cost(&self, tour: &Vec<usize>) -> f64 {
        runner_cost(self.eval.tour_time(tour).unwrap_or(f64::INFINITY))
    }

    fn neighbor<R: Rng>(&self, tour: &Vec<usize>, rng: &mut R) -> Vec<usize> {
        let mut next = tour.clone();
        TourMove::apply_random(&mut next, rng);
        next
    }
}

/// Anneals a travelling-salesman tour with 2-opt and exchange moves.
///
/// Runs start from the configured [`TourInit`]; deterministic
/// initialisations still diverge across repeats because the moves are
/// random.
///
/// # Errors
///
/// Returns [`InvalidInput::Parameter`] for out-of-domain settings.
#[instrument(level = "info", skip(ctx, config), fields(customers = ctx.customers().len(), init = ?config.tour_init))]
pub fn solve_tsp(ctx: &SolveContext, config: &AnnealingConfig) -> Result<SolveResult, InvalidInput> {
    config.validate()?;
    let problem = TourAnnealing {
        ctx,
        eval: RouteEvaluator::new(ctx),
        seeded: match config.tour_init {
            TourInit::NearestNeighbor => Some(nearest_neighbor_tour(ctx)),
            TourInit::SuccessiveInsertion => Some(successive_insertion_tour(ctx)),
            TourInit::Random => None,
        },
    };

    let best = best_result(config.repeat_annealing, ctx.objective(), |run| {
        let outcome = anneal(&problem, config, run);
        debug!(run, cost = outcome.best_cost, "tour annealing run finished");
        problem.eval.evaluate_tour(&outcome.best)
    });

    info!(
        feasible = best.is_feasible(),
        cost = best.route_max_time,
        "tour annealing finished"
    );
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::DurationMatrix;
    use crate::exact;
    use crate::models::{TspOptions, Vehicle};

    /// Points on a ring; travel time grows by 20% in zone 1.
    fn context(start_node: usize) -> SolveContext {
        let n = 7;
        let mut dm = DurationMatrix::new(n, 3);
        for i in 0..n {
            for j in 0..n {
                let steps = (i as f64 - j as f64).abs();
                let ring = steps.min(n as f64 - steps) * 5.0;
                for zone in 0..3 {
                    let factor = if zone == 1 { 1.2 } else { 1.0 };
                    dm.set(i, j, zone, ring * factor);
                }
            }
        }
        SolveContext::builder(dm, vec![0; n])
            .vehicles(vec![Vehicle::new(0, 0).with_start_time(40.0)])
            .max_cycles(0)
            .tsp_options(TspOptions {
                start_node,
                cancelled: vec![3],
                skip_cost: 2.0,
            })
            .build()
            .expect("valid")
    }

    fn config(init: TourInit) -> AnnealingConfig {
        AnnealingConfig::default()
            .with_terminate_after(4_000)
            .with_step_length(40)
            .with_repeats(2)
            .with_tour_init(init)
            .with_seed(9)
    }

    #[test]
    fn test_all_inits_close_to_exact() {
        for start in [0, 4] {
            let ctx = context(start);
            let exact = exact::solve_tsp(&ctx);
            for init in [TourInit::NearestNeighbor, TourInit::SuccessiveInsertion, TourInit::Random] {
                let best = solve_tsp(&ctx, &config(init)).expect("valid config");
                assert!(best.route_max_time >= exact.route_max_time - 1e-9);
                assert!(best.route_max_time <= exact.route_max_time * 1.1);
            }
        }
    }

    #[test]
    fn test_min_temperature_termination() {
        let ctx = context(0);
        let best = solve_tsp(
            &ctx,
            &config(TourInit::Random)
                .with_initial_temperature(10.0)
                .with_min_temperature(0.01),
        )
        .expect("valid config");
        assert!(best.is_feasible());
        let routes = best.vehicle_routes.expect("feasible");
        let route = &routes[&0][0];
        assert_eq!(route.first(), Some(&0));
        assert_eq!(route.last(), Some(&0));
        assert!(!route.contains(&3));
    }
}
