//! Route simulation and cost evaluation.
//!
//! - [`VehicleClock`]: earliest-available vehicle queue
//! - [`RouteEvaluator`]: cycle simulation shared by every solver, plus the
//!   single-vehicle tour used by the travelling-salesman variants
//! - [`annotate_arrivals`]: per-stop arrival times for a solved result

mod arrival;
mod clock;
mod evaluator;
mod tour;

pub use arrival::{annotate_arrivals, Stop, VehicleSchedule};
pub use clock::{ClockSummary, VehicleClock};
pub use evaluator::RouteEvaluator;
