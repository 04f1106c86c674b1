//! Mutation operators.
//!
//! Each generation applies one operator, picked by a single uniform draw
//! split into three equal bins, to every chromosome of the population.
//! Children are new chromosomes; parents are never modified. The moves
//! themselves are the generic permutation operators of
//! [`u_metaheur::ga::operators`].

use rand::Rng;
use u_metaheur::ga::operators;
use u_numflow::random::shuffle;

use crate::models::DEPOT;

use super::{Chromosome, GaProblem};

/// Swaps tried per parent before giving up on an improvement.
pub const MAX_SWAP_TRIES: usize = 10;

/// Reshuffles tried when a scramble produces an invalid permutation.
pub const MAX_SCRAMBLE_RETRIES: usize = 3;

/// A mutation operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Swap two customers; the child survives only if it improves.
    Swap,
    /// Reverse a random slice.
    Inversion,
    /// Shuffle a random slice.
    Scramble,
}

impl Mutation {
    const ALL: [Mutation; 3] = [Mutation::Swap, Mutation::Inversion, Mutation::Scramble];

    /// Picks an operator with equal probability.
    pub fn pick<R: Rng>(rng: &mut R) -> Self {
        let bin = (rng.random::<f64>() * Self::ALL.len() as f64) as usize;
        Self::ALL[bin.min(Self::ALL.len() - 1)]
    }

    /// Produces a child of `parent`, or `None` when the operator does not
    /// apply or found nothing worth keeping.
    pub fn apply<P: GaProblem, R: Rng>(self, parent: &Chromosome, problem: &P, rng: &mut R) -> Option<Chromosome> {
        match self {
            Mutation::Swap => swap_mutation(parent, problem, rng),
            Mutation::Inversion => inversion_mutation(parent, rng),
            Mutation::Scramble => scramble_mutation(parent, problem, rng),
        }
    }
}

/// Swaps two customers up to [`MAX_SWAP_TRIES`] times and returns the first
/// evaluated child that beats its parent.
///
/// Only customer positions take part; DEPOT separators stay where they are.
pub fn swap_mutation<P: GaProblem, R: Rng>(parent: &Chromosome, problem: &P, rng: &mut R) -> Option<Chromosome> {
    let objective = problem.objective();
    let base = parent.fitness(objective);
    let positions: Vec<usize> = (0..parent.permutation.len())
        .filter(|&i| parent.permutation[i] != DEPOT)
        .collect();
    if positions.len() < 2 {
        return None;
    }
    let genes: Vec<usize> = positions.iter().map(|&i| parent.permutation[i]).collect();
    for _ in 0..MAX_SWAP_TRIES {
        let mut swapped = genes.clone();
        operators::swap_mutation(&mut swapped, rng);
        if swapped == genes {
            continue;
        }
        let mut perm = parent.permutation.clone();
        for (&pos, &gene) in positions.iter().zip(&swapped) {
            perm[pos] = gene;
        }
        let mut child = Chromosome::new(perm);
        if child.evaluate(problem) < base {
            return Some(child);
        }
    }
    None
}

/// Reverses a random slice. `None` when the drawn slice is a single
/// element.
pub fn inversion_mutation<R: Rng>(parent: &Chromosome, rng: &mut R) -> Option<Chromosome> {
    if parent.permutation.len() < 2 {
        return None;
    }
    let mut perm = parent.permutation.clone();
    operators::invert_mutation(&mut perm, rng);
    (perm != parent.permutation).then(|| Chromosome::new(perm))
}

/// Shuffles a random slice, retrying up to [`MAX_SCRAMBLE_RETRIES`] times
/// while the result is invalid.
pub fn scramble_mutation<P: GaProblem, R: Rng>(parent: &Chromosome, problem: &P, rng: &mut R) -> Option<Chromosome> {
    if parent.permutation.len() < 2 {
        return None;
    }
    for _ in 0..=MAX_SCRAMBLE_RETRIES {
        let (lo, hi) = distinct_pair(parent.permutation.len(), rng);
        let mut perm = parent.permutation.clone();
        shuffle(&mut perm[lo..=hi], rng);
        if problem.is_valid(&perm) {
            return Some(Chromosome::new(perm));
        }
    }
    None
}

/// Two distinct indices below `len`, ordered.
fn distinct_pair<R: Rng>(len: usize, rng: &mut R) -> (usize, usize) {
    let i = rng.random_range(0..len);
    let mut j = rng.random_range(0..len - 1);
    if j >= i {
        j += 1;
    }
    (i.min(j), i.max(j))
}
