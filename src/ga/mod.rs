//! Genetic algorithm over flat permutations.
//!
//! Vehicle routing evolves customers interleaved with DEPOT separators and
//! decodes them onto the next available vehicle; the travelling-salesman
//! variant evolves plain tours. Each generation applies one mutation
//! operator to the whole population and, once it is large enough, one
//! survivor selection strategy. Several islands evolve in parallel and the
//! weakest is periodically re-seeded.
//!
//! - [`Chromosome`]: permutation with cached evaluation
//! - [`GaProblem`]: what the driver evolves against
//! - [`Mutation`], [`Selection`]: the per-generation operators
//! - [`solve_vrp`], [`solve_tsp`]: entry points

mod chromosome;
mod island;
mod mutation;
mod problem;
mod selection;
mod solver;
mod tsp;

pub use chromosome::Chromosome;
pub use mutation::{
    inversion_mutation, scramble_mutation, swap_mutation, Mutation, MAX_SCRAMBLE_RETRIES,
    MAX_SWAP_TRIES,
};
pub use problem::{GaProblem, RoutingProblem};
pub use selection::{
    best_n, fitness_proportional, random_selection, Selection, SelectionBudget, MIN_ENTRY_COUNT,
};
pub use solver::{solve_vrp, GaConfig};
pub use tsp::{solve_tsp, TourProblem};
