//! Ant colony optimisation over time-dependent travel times.
//!
//! Each colony runs with one hyperparameter set; the driver samples sets,
//! pairs each with a greedy mirror and runs the colonies in parallel.
//!
//! - [`PheromoneMatrix`]: normalised trail levels
//! - [`AntParams`], [`ParamRanges`]: hyperparameters and their sampling
//! - [`Colony`]: ant construction and pheromone updates
//! - [`solve`]: ranked results over all colony runs

mod colony;
mod params;
mod pheromone;
mod solver;

pub use colony::{Colony, Improvement};
pub use params::{AntParams, ParamRanges, MAX_EXPONENT};
pub use pheromone::PheromoneMatrix;
pub use solver::{solve, solve_best, AntColonyConfig, RankedResult};
