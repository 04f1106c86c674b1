//! Simulated annealing.
//!
//! Vehicle routing anneals per-vehicle customer lists ([`FleetPlan`]) with
//! swap and relocate moves; the travelling-salesman variant anneals one
//! tour with 2-opt and exchange moves. Both are
//! [`SaProblem`](u_metaheur::sa::SaProblem)s driven by the geometric
//! schedule in [`AnnealingConfig`].

mod moves;
mod plan;
mod schedule;
mod solver;
mod tsp;

pub use moves::{PlanMove, TourMove};
pub use plan::FleetPlan;
pub use schedule::{AnnealingConfig, Termination, TourInit};
pub use solver::solve_vrp;
pub use tsp::solve_tsp;
