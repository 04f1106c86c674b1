//! Error types.
//!
//! Infeasibility is not an error: solvers report it through
//! [`SolveResult::infeasible`](crate::models::SolveResult::infeasible).
//! The types here cover malformed input, horizon overruns inside the
//! duration lookup, and collaborator failures.

use thiserror::Error;

/// A request that fails validation before any search work begins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    /// The fleet is empty.
    #[error("at least one vehicle is required")]
    NoVehicles,
    /// Capacity list length does not match the vehicle count.
    #[error("expected {expected} capacities, found {found}")]
    CapacityCount { expected: usize, found: usize },
    /// Start-time list length does not match the vehicle count.
    #[error("expected {expected} vehicle start times, found {found}")]
    StartTimeCount { expected: usize, found: usize },
    /// A vehicle start time is negative or not finite.
    #[error("vehicle {vehicle} has invalid start time {time}")]
    InvalidStartTime { vehicle: usize, time: f64 },
    /// A vehicle capacity is negative.
    #[error("vehicle {vehicle} has negative capacity {capacity}")]
    NegativeCapacity { vehicle: usize, capacity: i64 },
    /// The duration matrix is not `n × n × T` with `T ≥ 1`.
    #[error("duration matrix must be {n}x{n}xT with T >= 1: {reason}")]
    MatrixShape { n: usize, reason: String },
    /// A duration entry is negative or not finite.
    #[error("duration from {from} to {to} in zone {zone} is invalid: {value}")]
    InvalidDuration {
        from: usize,
        to: usize,
        zone: usize,
        value: f64,
    },
    /// Demand vector length does not match the location count.
    #[error("expected {expected} demands, found {found}")]
    LoadLength { expected: usize, found: usize },
    /// The depot carries demand.
    #[error("depot demand must be 0, found {0}")]
    DepotDemand(i64),
    /// A customer has negative demand.
    #[error("customer {customer} has negative demand {demand}")]
    NegativeDemand { customer: usize, demand: i64 },
    /// A customer id is the depot or lies outside the matrix.
    #[error("customer id {id} is out of range 1..{n}")]
    CustomerOutOfRange { id: usize, n: usize },
    /// A customer's demand does not fit into any vehicle.
    #[error("customer {customer} demand {demand} exceeds every vehicle capacity (max {max_capacity})")]
    DemandExceedsFleet {
        customer: usize,
        demand: i64,
        max_capacity: i64,
    },
    /// The travelling-salesman start node is outside the matrix.
    #[error("start node {node} is out of range 0..{n}")]
    StartNodeOutOfRange { node: usize, n: usize },
    /// A numeric configuration value is out of its domain.
    #[error("invalid parameter `{name}`: {reason}")]
    Parameter { name: &'static str, reason: String },
}

/// A departure whose hour-zone lies beyond the matrix horizon while long
/// trips are disallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("hour zone {hour} is beyond the {zones}-zone horizon")]
pub struct OutOfHorizon {
    /// The zone the departure falls into.
    pub hour: usize,
    /// Number of zones the matrix defines.
    pub zones: usize,
}

/// Failure reported by a persistence or data-source collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record with the given id.
    #[error("no record with id {0}")]
    NotFound(u64),
    /// Backend-specific failure.
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// Top-level error returned by [`solve`](crate::solve::solve).
#[derive(Debug, Error)]
pub enum SolveError {
    /// The request failed validation.
    #[error(transparent)]
    Invalid(#[from] InvalidInput),
    /// `algorithm_params` could not be parsed into the solver configuration.
    #[error("invalid algorithm parameters: {0}")]
    Params(#[from] serde_json::Error),
    /// A collaborator failed while loading or saving data.
    #[error(transparent)]
    Store(#[from] StoreError),
}
