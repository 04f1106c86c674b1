//! # td-routing
//!
//! Time-dependent vehicle routing. Travel times depend on the hour-zone of
//! departure; vehicles may drive several depot-to-depot cycles; the
//! objective is the latest or the summed vehicle finish time.
//!
//! ## Modules
//!
//! - [`duration`]: time-sliced duration matrix, horizon rules, service times
//! - [`models`]: locations, vehicles, cycles, results, the validated solve context
//! - [`evaluation`]: vehicle clock, route evaluator, arrival-time annotation
//! - [`constructive`]: time-dependent nearest neighbor and insertion heuristics
//! - [`exact`]: brute-force reference solver
//! - [`aco`]: ant colony with hyperparameter sampling
//! - [`sa`]: simulated annealing
//! - [`ga`]: island-model genetic algorithm
//! - [`parallel`]: fork-join over independent trials
//! - [`random`]: seeded random streams
//! - [`store`]: persistence collaborator
//! - [`solve`]: request dispatch
//! - [`error`]: error types

pub mod aco;
pub mod constructive;
pub mod duration;
pub mod error;
pub mod evaluation;
pub mod exact;
pub mod ga;
pub mod models;
pub mod parallel;
pub mod random;
pub mod sa;
pub mod solve;
pub mod store;
