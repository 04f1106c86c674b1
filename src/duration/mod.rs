//! Time-dependent travel durations.
//!
//! - [`DurationMatrix`]: dense `n × n × T` matrix indexed by hour-zone
//! - [`DurationModel`]: answers "how long from u to v departing at t"
//! - [`ServiceTimes`]: additive loading/unloading time at stops
//! - [`SyntheticDurations`]: distance-based matrix generator

mod matrix;
mod model;
mod service;
mod synthetic;

pub use matrix::{DurationMatrix, TimeHorizon, TimeUnit};
pub use model::DurationModel;
pub use service::ServiceTimes;
pub use synthetic::{haversine_km, DurationSource, SyntheticDurations};
