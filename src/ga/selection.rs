//! Survivor selection.
//!
//! After mutation the population holds parents and children. When it has
//! more than [`MIN_ENTRY_COUNT`] members, one strategy picked uniformly at
//! random decides who survives into the next generation.

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};
use u_numflow::random::{shuffle, weighted_choose};

use crate::models::Objective;

use super::Chromosome;

/// Populations of this size or smaller skip selection.
pub const MIN_ENTRY_COUNT: usize = 25;

/// How long fitness-proportional selection may keep drawing before it
/// fills the remaining slots uniformly at random.
///
/// # Examples
///
/// ```
/// use td_routing::ga::SelectionBudget;
///
/// let budget: SelectionBudget = serde_json::from_str(r#"{"draws": 5000}"#).unwrap();
/// assert_eq!(budget, SelectionBudget::Draws(5000));
/// assert_eq!(SelectionBudget::default(), SelectionBudget::WallClock { millis: 500 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionBudget {
    /// Stop drawing after this much wall-clock time.
    WallClock {
        /// Milliseconds.
        millis: u64,
    },
    /// Stop drawing after this many roulette spins. Reproducible.
    Draws(usize),
}

impl Default for SelectionBudget {
    fn default() -> Self {
        SelectionBudget::WallClock { millis: 500 }
    }
}

impl SelectionBudget {
    fn exhausted(&self, started: Instant, draws: usize) -> bool {
        match *self {
            SelectionBudget::WallClock { millis } => started.elapsed() >= Duration::from_millis(millis),
            SelectionBudget::Draws(limit) => draws >= limit,
        }
    }
}

/// A survivor selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Roulette wheel weighted by inverse fitness, without replacement.
    FitnessProportional,
    /// Keep the best `target`.
    BestN,
    /// Keep `target` members chosen uniformly.
    Random,
    /// Keep everyone.
    Keep,
}

impl Selection {
    const ALL: [Selection; 4] = [
        Selection::FitnessProportional,
        Selection::BestN,
        Selection::Random,
        Selection::Keep,
    ];

    /// Picks a strategy with equal probability.
    pub fn pick<R: Rng>(rng: &mut R) -> Self {
        let bin = (rng.random::<f64>() * Self::ALL.len() as f64) as usize;
        Self::ALL[bin.min(Self::ALL.len() - 1)]
    }

    /// Reduces `population` to at most `target` members (all of them for
    /// [`Selection::Keep`]).
    pub fn apply<R: Rng>(
        self,
        population: Vec<Chromosome>,
        target: usize,
        objective: Objective,
        budget: SelectionBudget,
        rng: &mut R,
    ) -> Vec<Chromosome> {
        trace!(strategy = ?self, size = population.len(), target, "selection");
        match self {
            Selection::FitnessProportional => fitness_proportional(population, target, objective, budget, rng),
            Selection::BestN => best_n(population, target, objective),
            Selection::Random => random_selection(population, target, rng),
            Selection::Keep => population,
        }
    }
}

/// Roulette-wheel selection without replacement.
///
/// Each feasible chromosome gets a slice of `[0, 1)` proportional to
/// `1 / (1 + fitness)`, recorded in its `fitness_range`; infeasible ones
/// get none. Every spin is one weighted draw over those slices. Spins continue until `target` distinct members are drawn or
/// the budget runs out, after which the remaining slots are filled
/// uniformly from the unselected members.
pub fn fitness_proportional<R: Rng>(
    mut population: Vec<Chromosome>,
    target: usize,
    objective: Objective,
    budget: SelectionBudget,
    rng: &mut R,
) -> Vec<Chromosome> {
    if population.len() <= target {
        return population;
    }
    let weights: Vec<f64> = population
        .iter()
        .map(|c| {
            let f = c.fitness(objective);
            if f.is_finite() {
                1.0 / (1.0 + f.max(0.0))
            } else {
                0.0
            }
        })
        .collect();
    let total: f64 = weights.iter().sum();
    let mut acc = 0.0;
    for (c, &w) in population.iter_mut().zip(&weights) {
        c.fitness_range = if w > 0.0 {
            let lo = acc / total;
            acc += w;
            Some((lo, acc / total))
        } else {
            None
        };
    }

    let mut chosen = vec![false; population.len()];
    let mut picked = 0;
    let weighted = weights.iter().filter(|&&w| w > 0.0).count();
    if weighted <= target {
        for (slot, &w) in chosen.iter_mut().zip(&weights) {
            if w > 0.0 {
                *slot = true;
                picked += 1;
            }
        }
    } else {
        let started = Instant::now();
        let mut draws = 0;
        while picked < target {
            if budget.exhausted(started, draws) {
                warn!(picked, target, draws, "selection budget exhausted, filling at random");
                break;
            }
            draws += 1;
            if let Some(i) = weighted_choose(&weights, rng) {
                if !chosen[i] {
                    chosen[i] = true;
                    picked += 1;
                }
            }
        }
    }

    let mut rest: Vec<usize> = (0..population.len()).filter(|&i| !chosen[i]).collect();
    shuffle(&mut rest, rng);
    for &i in rest.iter().take(target - picked) {
        chosen[i] = true;
    }
    population
        .into_iter()
        .zip(chosen)
        .filter_map(|(c, keep)| keep.then_some(c))
        .collect()
}

/// Keeps the best `target` members.
pub fn best_n(mut population: Vec<Chromosome>, target: usize, objective: Objective) -> Vec<Chromosome> {
    population.sort_by(|a, b| a.compare(b, objective));
    population.truncate(target);
    population
}

/// Keeps `target` members chosen uniformly at random.
pub fn random_selection<R: Rng>(mut population: Vec<Chromosome>, target: usize, rng: &mut R) -> Vec<Chromosome> {
    shuffle(&mut population, rng);
    population.truncate(target);
    population
}
