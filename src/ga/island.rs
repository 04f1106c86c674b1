//! One independently evolving population.

use rand::rngs::SmallRng;
use tracing::debug;
use u_numflow::random::create_rng;

use super::selection::{Selection, MIN_ENTRY_COUNT};
use super::{Chromosome, GaConfig, GaProblem, Mutation};

/// A population with its own random stream. Islands never share state,
/// so the driver can step them in parallel.
#[derive(Debug, Clone)]
pub(crate) struct Island {
    population: Vec<Chromosome>,
    rng: SmallRng,
}

impl Island {
    /// Draws `size` random permutations and sorts them by fitness.
    ///
    /// If more than a twelfth of them are infeasible, the worse half is
    /// replaced with greedy capacity-aware permutations.
    pub(crate) fn seeded<P: GaProblem>(problem: &P, size: usize, seed: u64) -> Self {
        let objective = problem.objective();
        let mut rng = create_rng(seed);
        let mut population: Vec<Chromosome> = (0..size)
            .map(|_| evaluated(problem, problem.random_permutation(&mut rng)))
            .collect();

        let infeasible = population.iter().filter(|c| !c.is_feasible()).count();
        if infeasible * 12 > size {
            population.sort_by(|a, b| a.compare(b, objective));
            let keep = size - size / 2;
            population.truncate(keep);
            population.extend((keep..size).map(|_| evaluated(problem, problem.greedy_permutation(&mut rng))));
            debug!(infeasible, size, "seeded worse half greedily");
        }
        population.sort_by(|a, b| a.compare(b, objective));
        Self { population, rng }
    }

    /// Starts from an existing pool of chromosomes.
    pub(crate) fn from_pool<P: GaProblem>(problem: &P, mut pool: Vec<Chromosome>, seed: u64) -> Self {
        for c in &mut pool {
            c.evaluate(problem);
        }
        pool.sort_by(|a, b| a.compare(b, problem.objective()));
        Self {
            population: pool,
            rng: create_rng(seed),
        }
    }

    /// Runs one generation: mutation, then selection when the population
    /// is large enough. The population stays sorted and is capped at twice
    /// `population_count`.
    pub(crate) fn step<P: GaProblem>(&mut self, problem: &P, config: &GaConfig) {
        let objective = problem.objective();
        let target = config.population_count;

        let mutation = Mutation::pick(&mut self.rng);
        let mut children = Vec::new();
        for parent in &self.population {
            if let Some(child) = mutation.apply(parent, problem, &mut self.rng) {
                children.push(child);
            }
        }
        for child in &mut children {
            child.evaluate(problem);
        }
        self.population.extend(children);

        if self.population.len() > MIN_ENTRY_COUNT {
            let selection = Selection::pick(&mut self.rng);
            let population = std::mem::take(&mut self.population);
            self.population = selection.apply(population, target, objective, config.selection_budget, &mut self.rng);
        }
        self.population.sort_by(|a, b| a.compare(b, objective));
        self.population.truncate(2 * target);
    }

    /// The fittest member.
    pub(crate) fn best(&self) -> Option<&Chromosome> {
        self.population.first()
    }

    /// The `n` fittest members.
    pub(crate) fn elite(&self, n: usize) -> &[Chromosome] {
        &self.population[..n.min(self.population.len())]
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.population.len()
    }
}

fn evaluated<P: GaProblem>(problem: &P, permutation: Vec<usize>) -> Chromosome {
    let mut c = Chromosome::new(permutation);
    c.evaluate(problem);
    c
}
