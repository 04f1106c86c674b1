//! Island-model driver and the vehicle-routing entry point.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::error::InvalidInput;
use crate::models::{SolveContext, SolveResult};
use crate::random::derive_seed;

use super::island::Island;
use super::{Chromosome, GaProblem, RoutingProblem, SelectionBudget};

/// Genetic algorithm settings.
///
/// # Examples
///
/// ```
/// use td_routing::ga::{GaConfig, SelectionBudget};
///
/// let config = GaConfig::default()
///     .with_population_count(30)
///     .with_iteration_count(100)
///     .with_selection_budget(SelectionBudget::Draws(10_000));
/// assert!(config.validate().is_ok());
///
/// let parsed: GaConfig = serde_json::from_str(r#"{"islands": 2, "patience": 5}"#).unwrap();
/// assert_eq!(parsed.islands, 2);
/// assert_eq!(parsed.population_count, GaConfig::default().population_count);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaConfig {
    /// Chromosomes per island after selection.
    pub population_count: usize,
    /// Generations in the main phase.
    pub iteration_count: usize,
    /// Populations evolved in parallel.
    pub islands: usize,
    /// Generations in the refinement phase; 0 skips it.
    pub refinement_iterations: usize,
    /// Refinement stops after this many generations without improvement.
    pub patience: usize,
    /// Limit on fitness-proportional selection.
    pub selection_budget: SelectionBudget,
    /// Base random seed.
    pub seed: u64,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_count: 50,
            iteration_count: 150,
            islands: 4,
            refinement_iterations: 60,
            patience: 15,
            selection_budget: SelectionBudget::default(),
            seed: 42,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_count(mut self, n: usize) -> Self {
        self.population_count = n;
        self
    }

    /// Sets the main-phase generations.
    pub fn with_iteration_count(mut self, n: usize) -> Self {
        self.iteration_count = n;
        self
    }

    /// Sets the number of islands.
    pub fn with_islands(mut self, n: usize) -> Self {
        self.islands = n;
        self
    }

    /// Sets the refinement generations and the early-stop patience.
    pub fn with_refinement(mut self, iterations: usize, patience: usize) -> Self {
        self.refinement_iterations = iterations;
        self.patience = patience;
        self
    }

    /// Sets the selection budget.
    pub fn with_selection_budget(mut self, budget: SelectionBudget) -> Self {
        self.selection_budget = budget;
        self
    }

    /// Sets the base random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generations between island re-seeds.
    pub fn injection_interval(&self) -> usize {
        (self.population_count / 3).max(1)
    }

    /// Checks value domains.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if self.population_count < 2 {
            return Err(InvalidInput::Parameter {
                name: "population_count",
                reason: format!("must be at least 2, found {}", self.population_count),
            });
        }
        if self.islands == 0 {
            return Err(InvalidInput::Parameter {
                name: "islands",
                reason: "must be at least 1".into(),
            });
        }
        if self.refinement_iterations > 0 && self.patience == 0 {
            return Err(InvalidInput::Parameter {
                name: "patience",
                reason: "must be at least 1 when refinement is enabled".into(),
            });
        }
        Ok(())
    }
}

/// Evolves `config.islands` populations and returns the fittest
/// chromosome seen.
///
/// Every [`GaConfig::injection_interval`] generations the island whose best
/// member is worst is replaced by a freshly seeded one. The refinement
/// phase restarts every island from the pooled elites of the main phase
/// and stops once the best fitness across islands has not improved for
/// `patience` generations.
pub(crate) fn evolve<P: GaProblem>(problem: &P, config: &GaConfig) -> Option<Chromosome> {
    let objective = problem.objective();
    let mut spawned = 0_u64;
    let mut next_seed = || {
        spawned += 1;
        derive_seed(config.seed, spawned - 1)
    };

    let seeds: Vec<u64> = (0..config.islands).map(|_| next_seed()).collect();
    let mut islands: Vec<Island> = seeds
        .into_par_iter()
        .map(|seed| Island::seeded(problem, config.population_count, seed))
        .collect();
    let mut best: Option<Chromosome> = None;
    record_best(&mut best, &islands, problem);

    let interval = config.injection_interval();
    for generation in 1..=config.iteration_count {
        islands.par_iter_mut().for_each(|island| island.step(problem, config));
        if record_best(&mut best, &islands, problem) {
            debug!(generation, cost = fitness(best.as_ref(), problem), "new best");
        }
        if islands.len() > 1 && generation % interval == 0 && generation < config.iteration_count {
            if let Some(worst) = worst_island(&islands, problem) {
                islands[worst] = Island::seeded(problem, config.population_count, next_seed());
                trace!(generation, island = worst, "island re-seeded");
            }
        }
    }

    if config.refinement_iterations > 0 {
        let share = (config.population_count / islands.len()).max(1);
        let mut pool: Vec<Chromosome> = islands
            .iter()
            .flat_map(|island| island.elite(share).iter().cloned())
            .collect();
        pool.extend(best.clone());
        let seeds: Vec<u64> = (0..config.islands).map(|_| next_seed()).collect();
        islands = seeds
            .into_iter()
            .map(|seed| Island::from_pool(problem, pool.clone(), seed))
            .collect();

        let mut stale = 0;
        for generation in 1..=config.refinement_iterations {
            islands.par_iter_mut().for_each(|island| island.step(problem, config));
            if record_best(&mut best, &islands, problem) {
                debug!(generation, cost = fitness(best.as_ref(), problem), "refinement improved");
                stale = 0;
            } else {
                stale += 1;
            }
            if stale >= config.patience {
                debug!(generation, "refinement stalled, stopping early");
                break;
            }
        }
    }

    trace!(islands_spawned = spawned, ?objective, "evolution finished");
    best
}

/// Replaces `best` with the fittest island leader if it is strictly
/// better; returns whether it changed.
fn record_best<P: GaProblem>(best: &mut Option<Chromosome>, islands: &[Island], problem: &P) -> bool {
    let objective = problem.objective();
    let leader = islands
        .iter()
        .filter_map(Island::best)
        .min_by(|a, b| a.compare(b, objective));
    let Some(leader) = leader else {
        return false;
    };
    let improved = best
        .as_ref()
        .map_or(true, |b| leader.compare(b, objective).is_lt());
    if improved {
        *best = Some(leader.clone());
    }
    improved
}

/// Index of the island with the worst leader; later islands win ties.
fn worst_island<P: GaProblem>(islands: &[Island], problem: &P) -> Option<usize> {
    let objective = problem.objective();
    islands
        .iter()
        .enumerate()
        .filter_map(|(i, island)| island.best().map(|b| (i, b)))
        .max_by(|(_, a), (_, b)| a.compare(b, objective))
        .map(|(i, _)| i)
}

fn fitness<P: GaProblem>(best: Option<&Chromosome>, problem: &P) -> f64 {
    best.map_or(f64::INFINITY, |c| c.fitness(problem.objective()))
}

/// Evolves DEPOT-delimited permutations for multi-vehicle routing.
///
/// # Errors
///
/// Returns [`InvalidInput::Parameter`] for out-of-domain settings.
///
/// # Examples
///
/// ```
/// use td_routing::duration::DurationMatrix;
/// use td_routing::ga::{solve_vrp, GaConfig, SelectionBudget};
/// use td_routing::models::{SolveContext, Vehicle};
///
/// let grid: Vec<Vec<f64>> = (0..4)
///     .map(|i| (0..4).map(|j| 10.0 * (i as f64 - j as f64).abs()).collect())
///     .collect();
/// let ctx = SolveContext::builder(DurationMatrix::from_static(&grid, 12).unwrap(), vec![0, 1, 1, 1])
///     .vehicles(vec![Vehicle::new(0, 3), Vehicle::new(1, 3)])
///     .build()
///     .unwrap();
/// let config = GaConfig::default()
///     .with_population_count(10)
///     .with_iteration_count(20)
///     .with_islands(2)
///     .with_selection_budget(SelectionBudget::Draws(1_000));
/// let best = solve_vrp(&ctx, &config).unwrap();
/// assert_eq!(best.route_max_time, 60.0);
/// ```
#[instrument(level = "info", skip(ctx, config), fields(customers = ctx.customers().len(), vehicles = ctx.vehicles().len()))]
pub fn solve_vrp(ctx: &SolveContext, config: &GaConfig) -> Result<SolveResult, InvalidInput> {
    config.validate()?;
    let problem = RoutingProblem::new(ctx);
    info!(
        population = config.population_count,
        islands = config.islands,
        depots = problem.depots(),
        "genetic algorithm started"
    );
    let best = evolve(&problem, config).map_or_else(SolveResult::infeasible, Chromosome::into_result);
    info!(
        feasible = best.is_feasible(),
        cost = best.cost(ctx.objective()),
        "genetic algorithm finished"
    );
    Ok(best)
}
