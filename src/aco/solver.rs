//! Ant colony driver: hyperparameter sampling and parallel colony trials.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use u_numflow::random::create_rng;

use crate::error::InvalidInput;
use crate::models::{SolveContext, SolveResult};
use crate::random::derive_seed;

use super::{AntParams, Colony, ParamRanges};

/// Ant colony settings.
///
/// # Examples
///
/// ```
/// use td_routing::aco::AntColonyConfig;
///
/// let config = AntColonyConfig::default()
///     .with_trials(2)
///     .with_best_results(3)
///     .with_seed(7);
/// assert_eq!(config.n_trials, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AntColonyConfig {
    /// Hyperparameter sets to sample; each is also run as its greedy mirror.
    pub n_trials: usize,
    /// How many ranked results to return.
    pub n_best_results: usize,
    /// Let ants return to the depot before the vehicle is full.
    pub consider_depot: bool,
    /// Sampling bounds.
    pub ranges: ParamRanges,
    /// Run exactly these parameters (and their mirror) instead of sampling.
    pub params: Option<AntParams>,
    /// Base random seed.
    pub seed: u64,
}

impl Default for AntColonyConfig {
    fn default() -> Self {
        Self {
            n_trials: 8,
            n_best_results: 1,
            consider_depot: true,
            ranges: ParamRanges::default(),
            params: None,
            seed: 42,
        }
    }
}

impl AntColonyConfig {
    /// Sets the number of sampled hyperparameter sets.
    pub fn with_trials(mut self, n: usize) -> Self {
        self.n_trials = n;
        self
    }

    /// Sets how many ranked results to keep.
    pub fn with_best_results(mut self, n: usize) -> Self {
        self.n_best_results = n;
        self
    }

    /// Enables or disables early depot returns.
    pub fn with_consider_depot(mut self, consider: bool) -> Self {
        self.consider_depot = consider;
        self
    }

    /// Sets the sampling bounds.
    pub fn with_ranges(mut self, ranges: ParamRanges) -> Self {
        self.ranges = ranges;
        self
    }

    /// Fixes the hyperparameters instead of sampling them.
    pub fn with_params(mut self, params: AntParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Sets the base random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks value domains.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if self.n_trials == 0 {
            return Err(InvalidInput::Parameter {
                name: "n_trials",
                reason: "must be at least 1".into(),
            });
        }
        if self.n_best_results == 0 {
            return Err(InvalidInput::Parameter {
                name: "n_best_results",
                reason: "must be at least 1".into(),
            });
        }
        match &self.params {
            Some(p) => p.validate(),
            None => self.ranges.validate(),
        }
    }
}

/// One ranked colony result.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    /// The solution.
    pub result: SolveResult,
    /// Hyperparameters of the colony that found it.
    pub params: AntParams,
    /// Index of the colony run.
    pub trial: usize,
    /// Outer iteration at which it was found.
    pub iteration: usize,
}

/// Runs the colony trials and returns the best results, best first.
///
/// Each sampled hyperparameter set runs twice: as sampled and as its
/// greedy mirror (`q = 0`, `rho = 1`). Trials run in parallel with seeds
/// derived from the base seed. Results are ranked by objective; ties go to
/// the earlier iteration, then the lower trial. Every colony contributes
/// each of its successive bests, so the list can hold a colony's earlier,
/// worse solutions. Empty when no trial finds a feasible solution.
///
/// Works for both problem variants; the context decides which.
///
/// # Errors
///
/// Returns [`InvalidInput::Parameter`] for out-of-domain settings.
#[instrument(level = "info", skip(ctx, config), fields(customers = ctx.customers().len(), tsp = ctx.is_tsp()))]
pub fn solve(ctx: &SolveContext, config: &AntColonyConfig) -> Result<Vec<RankedResult>, InvalidInput> {
    config.validate()?;
    let objective = ctx.objective();

    let sampled: Vec<AntParams> = match config.params {
        Some(p) => vec![p],
        None => {
            let mut rng = create_rng(config.seed);
            (0..config.n_trials)
                .map(|_| config.ranges.sample(&mut rng))
                .collect()
        }
    };
    let runs: Vec<AntParams> = sampled.iter().flat_map(|&p| [p, p.greedy()]).collect();
    info!(runs = runs.len(), "starting colony trials");

    let mut ranked: Vec<RankedResult> = runs
        .into_par_iter()
        .enumerate()
        .flat_map_iter(|(trial, params)| {
            let mut rng = create_rng(derive_seed(config.seed, trial as u64));
            let mut colony = Colony::new(ctx, params, config.consider_depot);
            let improvements = colony.run(&mut rng);
            debug!(
                trial,
                greedy = params.is_greedy(),
                best = improvements.last().map(|i| i.result.cost(objective)),
                "colony finished"
            );
            improvements.into_iter().map(move |i| RankedResult {
                result: i.result,
                params,
                trial,
                iteration: i.iteration,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.result
            .compare(&b.result, objective)
            .then(a.iteration.cmp(&b.iteration))
            .then(a.trial.cmp(&b.trial))
    });
    ranked.truncate(config.n_best_results);

    match ranked.first() {
        Some(best) => info!(
            cost = best.result.cost(objective),
            trial = best.trial,
            iteration = best.iteration,
            "colony search finished"
        ),
        None => info!("no colony found a feasible solution"),
    }
    Ok(ranked)
}

/// The single best colony result, or the infeasible sentinel.
pub fn solve_best(ctx: &SolveContext, config: &AntColonyConfig) -> Result<SolveResult, InvalidInput> {
    let ranked = solve(ctx, &AntColonyConfig {
        n_best_results: 1,
        ..config.clone()
    })?;
    Ok(ranked
        .into_iter()
        .next()
        .map_or_else(SolveResult::infeasible, |r| r.result))
}
