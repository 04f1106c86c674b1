//! Colony hyperparameters and their sampling ranges.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;
use crate::random::{log_uniform, log_uniform_usize};

/// Largest accepted `alpha` or `beta`. Both are used as integer powers of
/// pheromone levels and travel times.
pub const MAX_EXPONENT: u32 = 16;

/// One hyperparameter set for a colony run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AntParams {
    /// Pheromone updates (outer iterations).
    pub n_iterations: usize,
    /// Ants per outer iteration.
    pub n_sub_iterations: usize,
    /// Deposit scale: each feasible path adds `q / cost` per edge.
    pub q: f64,
    /// Pheromone exponent.
    pub alpha: u32,
    /// Travel-time exponent.
    pub beta: u32,
    /// Pheromone retained per update; `1.0` means no evaporation.
    pub rho: f64,
}

impl Default for AntParams {
    fn default() -> Self {
        Self {
            n_iterations: 50,
            n_sub_iterations: 10,
            q: 1.0,
            alpha: 1,
            beta: 2,
            rho: 0.9,
        }
    }
}

impl AntParams {
    /// The greedy mirror: no deposit and no evaporation, so the pheromone
    /// stays uniform and ants follow travel time alone.
    pub fn greedy(self) -> Self {
        Self {
            q: 0.0,
            rho: 1.0,
            ..self
        }
    }

    /// Returns `true` for a greedy mirror.
    pub fn is_greedy(&self) -> bool {
        self.q == 0.0 && self.rho == 1.0
    }

    /// Checks value domains.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if self.n_iterations == 0 || self.n_sub_iterations == 0 {
            return Err(InvalidInput::Parameter {
                name: "n_iterations",
                reason: "iteration counts must be positive".into(),
            });
        }
        if !(self.q >= 0.0 && self.q.is_finite()) {
            return Err(InvalidInput::Parameter {
                name: "q",
                reason: format!("must be finite and >= 0, found {}", self.q),
            });
        }
        if self.alpha > MAX_EXPONENT || self.beta > MAX_EXPONENT {
            return Err(InvalidInput::Parameter {
                name: "alpha",
                reason: format!(
                    "alpha and beta must be at most {MAX_EXPONENT}, found {} and {}",
                    self.alpha, self.beta
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.rho) {
            return Err(InvalidInput::Parameter {
                name: "rho",
                reason: format!("must lie in [0, 1], found {}", self.rho),
            });
        }
        Ok(())
    }
}

/// Bounds used when sampling [`AntParams`].
///
/// Iteration counts and `q` are sampled log-uniformly, `alpha` and `beta`
/// uniformly over integers, `rho` uniformly. All bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParamRanges {
    /// Outer iterations.
    pub n_iterations: (usize, usize),
    /// Ants per outer iteration.
    pub n_sub_iterations: (usize, usize),
    /// Deposit scale.
    pub q: (f64, f64),
    /// Pheromone exponent.
    pub alpha: (u32, u32),
    /// Travel-time exponent.
    pub beta: (u32, u32),
    /// Retention factor.
    pub rho: (f64, f64),
}

impl Default for ParamRanges {
    fn default() -> Self {
        Self {
            n_iterations: (10, 100),
            n_sub_iterations: (2, 20),
            q: (0.01, 100.0),
            alpha: (1, 3),
            beta: (1, 5),
            rho: (0.5, 0.99),
        }
    }
}

impl ParamRanges {
    /// Draws one parameter set.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> AntParams {
        AntParams {
            n_iterations: log_uniform_usize(rng, self.n_iterations.0, self.n_iterations.1),
            n_sub_iterations: log_uniform_usize(
                rng,
                self.n_sub_iterations.0,
                self.n_sub_iterations.1,
            ),
            q: log_uniform(rng, self.q.0, self.q.1),
            alpha: uniform_u32(rng, self.alpha),
            beta: uniform_u32(rng, self.beta),
            rho: if self.rho.1 > self.rho.0 {
                rng.random_range(self.rho.0..=self.rho.1)
            } else {
                self.rho.0
            },
        }
    }

    /// Checks that every range is ordered and within its domain.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        let ordered = self.n_iterations.0 <= self.n_iterations.1
            && self.n_sub_iterations.0 <= self.n_sub_iterations.1
            && self.q.0 <= self.q.1
            && self.alpha.0 <= self.alpha.1
            && self.beta.0 <= self.beta.1
            && self.rho.0 <= self.rho.1;
        if !ordered {
            return Err(InvalidInput::Parameter {
                name: "ranges",
                reason: "every range must be (low, high) with low <= high".into(),
            });
        }
        if self.n_iterations.0 == 0 || self.n_sub_iterations.0 == 0 || self.q.0 <= 0.0 {
            return Err(InvalidInput::Parameter {
                name: "ranges",
                reason: "iteration counts and q must be strictly positive".into(),
            });
        }
        if self.alpha.1 > MAX_EXPONENT || self.beta.1 > MAX_EXPONENT {
            return Err(InvalidInput::Parameter {
                name: "ranges",
                reason: format!("alpha and beta must be at most {MAX_EXPONENT}"),
            });
        }
        if self.rho.0 < 0.0 || self.rho.1 > 1.0 {
            return Err(InvalidInput::Parameter {
                name: "ranges",
                reason: format!("rho must lie in [0, 1], found {:?}", self.rho),
            });
        }
        Ok(())
    }
}

fn uniform_u32<R: Rng>(rng: &mut R, (lo, hi): (u32, u32)) -> u32 {
    if hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}
