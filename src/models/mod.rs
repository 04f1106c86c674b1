//! Domain model types for time-dependent vehicle routing.
//!
//! Locations with demands, vehicles with capacity and availability,
//! depot-delimited cycles, solve results, and the validated
//! [`SolveContext`] every solver reads from.

mod location;
mod problem;
mod request;
mod route;
mod solution;
mod vehicle;

pub use location::{demands_of, Location, DEPOT};
pub use problem::{ContextBuilder, SolveContext, TspOptions};
pub use request::{Algorithm, Capacity, SolveRequest};
pub use route::{
    cycle_customers, cycle_demand, decode_permutation, encode_cycles, is_degenerate, wrap_cycle,
    Cycle,
};
pub use solution::{Objective, SolveResult};
pub use vehicle::{fleet, Vehicle};
