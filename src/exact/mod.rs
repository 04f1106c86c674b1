//! Exact search by exhaustive enumeration.

mod brute_force;
mod permutations;

pub use brute_force::{solve_tsp, solve_vrp, BruteForceConfig};
pub use permutations::{multiset_permutations, next_permutation};
