//! Constructive heuristics for initial solutions.
//!
//! - [`nearest_neighbor_tour`]: time-dependent nearest neighbor, single vehicle, O(n²)
//! - [`successive_insertion_tour`]: cheapest insertion by completion time, O(n³)
//! - [`nearest_neighbor_cycles`]: capacity-aware greedy cycles over the fleet, O(n²)
//! - [`randomized_greedy_cycles`]: the same with a random first customer per cycle

mod insertion;
mod nearest_neighbor;

pub use insertion::successive_insertion_tour;
pub use nearest_neighbor::{nearest_neighbor_cycles, nearest_neighbor_tour, randomized_greedy_cycles};
