//! Genetic algorithm for the single-vehicle tour.

use rand::Rng;
use tracing::{info, instrument};
use u_numflow::random::shuffle;

use crate::constructive::{nearest_neighbor_tour, successive_insertion_tour};
use crate::error::InvalidInput;
use crate::evaluation::RouteEvaluator;
use crate::models::{Objective, SolveContext, SolveResult};

use super::solver::evolve;
use super::{Chromosome, GaConfig, GaProblem};

/// Travelling-salesman tours: plain customer orders without separators,
/// scored by the shared tour evaluator (cancelled customers add their skip
/// cost instead of travel).
#[derive(Debug, Clone, Copy)]
pub struct TourProblem<'a> {
    eval: RouteEvaluator<'a>,
}

impl<'a> TourProblem<'a> {
    /// Creates the problem for a context.
    pub fn new(ctx: &'a SolveContext) -> Self {
        Self {
            eval: RouteEvaluator::new(ctx),
        }
    }
}

impl GaProblem for TourProblem<'_> {
    fn objective(&self) -> Objective {
        // A single vehicle: both aggregates coincide.
        Objective::MinMaxTime
    }

    fn random_permutation<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let mut tour = self.eval.context().customers().to_vec();
        shuffle(&mut tour, rng);
        tour
    }

    fn greedy_permutation<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let ctx = self.eval.context();
        if rng.random::<bool>() {
            nearest_neighbor_tour(ctx)
        } else {
            successive_insertion_tour(ctx)
        }
    }

    fn evaluate(&self, permutation: &[usize]) -> SolveResult {
        self.eval.evaluate_tour(permutation)
    }

    fn is_valid(&self, _permutation: &[usize]) -> bool {
        true
    }
}

/// Evolves travelling-salesman tours.
///
/// # Errors
///
/// Returns [`InvalidInput::Parameter`] for out-of-domain settings.
#[instrument(level = "info", skip(ctx, config), fields(customers = ctx.customers().len()))]
pub fn solve_tsp(ctx: &SolveContext, config: &GaConfig) -> Result<SolveResult, InvalidInput> {
    config.validate()?;
    let problem = TourProblem::new(ctx);
    let best = evolve(&problem, config).map_or_else(SolveResult::infeasible, Chromosome::into_result);
    info!(
        feasible = best.is_feasible(),
        cost = best.route_max_time,
        "tour evolution finished"
    );
    Ok(best)
}
