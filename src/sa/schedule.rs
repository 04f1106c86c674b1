//! Annealing configuration and the runner shared by both variants.
//!
//! The Metropolis loop itself is [`SaRunner`]; this module maps
//! [`AnnealingConfig`] onto its [`SaConfig`] and folds the infeasible
//! sentinel into a cost the runner can compare.

use serde::{Deserialize, Serialize};
use tracing::trace;
use u_metaheur::sa::{CoolingSchedule, SaConfig, SaProblem, SaResult, SaRunner};

use crate::error::InvalidInput;
use crate::random::derive_seed;

/// Runner cost of an infeasible state.
///
/// Finite so that two infeasible states differ by zero and the walk may
/// drift between them, while any feasible state compares strictly lower
/// and leaving one for an infeasible state is never accepted.
pub(crate) const INFEASIBLE_COST: f64 = f64::MAX;

/// Maps an objective value onto the runner's cost scale.
pub(crate) fn runner_cost(cost: f64) -> f64 {
    if cost.is_finite() {
        cost
    } else {
        INFEASIBLE_COST
    }
}

/// When an annealing run stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// After `terminate_after` moves, or once the temperature underflows.
    #[default]
    MaxSteps,
    /// Once the temperature drops below `min_temperature` (still capped at
    /// `terminate_after` moves).
    MinTemp,
}

/// How a travelling-salesman annealing run is initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourInit {
    /// Time-dependent nearest neighbor.
    #[default]
    NearestNeighbor,
    /// Successive cheapest insertion.
    SuccessiveInsertion,
    /// Random shuffle.
    Random,
}

/// Simulated annealing settings.
///
/// # Examples
///
/// ```
/// use td_routing::sa::{AnnealingConfig, Termination};
///
/// let config: AnnealingConfig = serde_json::from_str(
///     r#"{"initial_temperature": 50.0, "termination": "min_temp", "min_temperature": 0.5}"#,
/// ).unwrap();
/// assert_eq!(config.termination, Termination::MinTemp);
/// assert_eq!(config.step_length, AnnealingConfig::default().step_length);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnealingConfig {
    /// Starting temperature.
    pub initial_temperature: f64,
    /// Temperature multiplier applied every `step_length` moves.
    pub cooling_rate: f64,
    /// Moves between cooling steps.
    pub step_length: usize,
    /// Hard cap on moves per run.
    pub terminate_after: usize,
    /// Temperature floor for [`Termination::MinTemp`].
    pub min_temperature: f64,
    /// Stopping rule.
    pub termination: Termination,
    /// Independent runs from fresh starts; the best is kept.
    pub repeat_annealing: usize,
    /// Travelling-salesman initialisation.
    pub tour_init: TourInit,
    /// Base random seed.
    pub seed: u64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling_rate: 0.95,
            step_length: 100,
            terminate_after: 20_000,
            min_temperature: 1e-3,
            termination: Termination::MaxSteps,
            repeat_annealing: 4,
            tour_init: TourInit::NearestNeighbor,
            seed: 42,
        }
    }
}

impl AnnealingConfig {
    /// Sets the starting temperature.
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    /// Sets the cooling multiplier.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    /// Sets the moves between cooling steps.
    pub fn with_step_length(mut self, n: usize) -> Self {
        self.step_length = n;
        self
    }

    /// Sets the move cap.
    pub fn with_terminate_after(mut self, n: usize) -> Self {
        self.terminate_after = n;
        self
    }

    /// Stops at a temperature floor instead of the move cap.
    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self.termination = Termination::MinTemp;
        self
    }

    /// Sets the number of independent runs.
    pub fn with_repeats(mut self, n: usize) -> Self {
        self.repeat_annealing = n;
        self
    }

    /// Sets the tour initialisation.
    pub fn with_tour_init(mut self, init: TourInit) -> Self {
        self.tour_init = init;
        self
    }

    /// Sets the base random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks value domains.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if !(self.initial_temperature > 0.0 && self.initial_temperature.is_finite()) {
            return Err(InvalidInput::Parameter {
                name: "initial_temperature",
                reason: format!("must be finite and > 0, found {}", self.initial_temperature),
            });
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(InvalidInput::Parameter {
                name: "cooling_rate",
                reason: format!("must lie in (0, 1), found {}", self.cooling_rate),
            });
        }
        if self.step_length == 0 || self.repeat_annealing == 0 {
            return Err(InvalidInput::Parameter {
                name: "step_length",
                reason: "step_length and repeat_annealing must be at least 1".into(),
            });
        }
        self.runner_config(0)
            .validate()
            .map_err(|reason| InvalidInput::Parameter {
                name: "min_temperature",
                reason,
            })
    }

    /// Runner settings for annealing run `run`.
    ///
    /// [`Termination::MaxSteps`] runs down to the smallest positive
    /// temperature so that only the move cap stops them.
    pub fn runner_config(&self, run: usize) -> SaConfig {
        let floor = match self.termination {
            Termination::MaxSteps => f64::MIN_POSITIVE,
            Termination::MinTemp => self.min_temperature,
        };
        SaConfig::default()
            .with_initial_temperature(self.initial_temperature)
            .with_min_temperature(floor)
            .with_cooling(CoolingSchedule::Geometric {
                alpha: self.cooling_rate,
            })
            .with_iterations_per_temperature(self.step_length)
            .with_max_iterations(self.terminate_after)
            .with_seed(derive_seed(self.seed, run as u64))
    }
}

/// Runs annealing chain `run` of `problem`. The config must be validated.
pub(crate) fn anneal<P: SaProblem>(problem: &P, config: &AnnealingConfig, run: usize) -> SaResult<P::Solution> {
    let outcome = SaRunner::run(problem, &config.runner_config(run));
    trace!(
        run,
        iterations = outcome.iterations,
        accepted = outcome.accepted_moves,
        improving = outcome.improving_moves,
        temperature = outcome.final_temperature,
        "annealing chain finished"
    );
    outcome
}
