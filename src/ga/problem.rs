//! Problem definitions the genetic algorithm evolves against.
//!
//! The driver only sees a [`GaProblem`]: how to draw a random or greedy
//! permutation, how to score one, and which permutations are well formed.
//! [`RoutingProblem`] interleaves customers with DEPOT separators;
//! the single-vehicle tour problem lives next to its solver.

use rand::Rng;
use u_numflow::random::shuffle;

use crate::constructive::randomized_greedy_cycles;
use crate::evaluation::RouteEvaluator;
use crate::models::{encode_cycles, is_degenerate, Objective, SolveContext, SolveResult, DEPOT};

/// Shuffles tried before accepting a permutation with misplaced DEPOT
/// separators.
pub(crate) const MAX_SHUFFLE_RETRIES: usize = 10;

/// A permutation problem the genetic algorithm can evolve.
pub trait GaProblem: Sync {
    /// What fitness measures.
    fn objective(&self) -> Objective;

    /// A uniformly random permutation.
    fn random_permutation<R: Rng>(&self, rng: &mut R) -> Vec<usize>;

    /// A permutation built by a feasibility-seeking heuristic.
    fn greedy_permutation<R: Rng>(&self, rng: &mut R) -> Vec<usize>;

    /// Scores a permutation.
    fn evaluate(&self, permutation: &[usize]) -> SolveResult;

    /// Returns `false` for permutations the operators should not produce.
    fn is_valid(&self, permutation: &[usize]) -> bool;
}

/// Multi-vehicle routing: customers interleaved with up to `k - 1` DEPOT
/// separators, decoded onto the next available vehicle.
///
/// # Examples
///
/// ```
/// use td_routing::duration::DurationMatrix;
/// use td_routing::ga::{GaProblem, RoutingProblem};
/// use td_routing::models::{SolveContext, Vehicle};
/// use u_numflow::random::create_rng;
///
/// let grid = vec![vec![0.0, 5.0, 5.0], vec![5.0, 0.0, 5.0], vec![5.0, 5.0, 0.0]];
/// let ctx = SolveContext::builder(DurationMatrix::from_static(&grid, 12).unwrap(), vec![0, 1, 1])
///     .vehicles(vec![Vehicle::new(0, 1)])
///     .max_cycles(2)
///     .build()
///     .unwrap();
/// let problem = RoutingProblem::new(&ctx);
/// let mut perm = problem.random_permutation(&mut create_rng(1));
/// perm.sort_unstable();
/// assert_eq!(perm, vec![0, 1, 2]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RoutingProblem<'a> {
    eval: RouteEvaluator<'a>,
    depots: usize,
}

impl<'a> RoutingProblem<'a> {
    /// Creates the problem for a context.
    pub fn new(ctx: &'a SolveContext) -> Self {
        let eval = RouteEvaluator::new(ctx);
        Self {
            eval,
            depots: eval.depot_tokens(),
        }
    }

    /// Number of DEPOT separators in every permutation drawn at random.
    pub fn depots(&self) -> usize {
        self.depots
    }
}

impl GaProblem for RoutingProblem<'_> {
    fn objective(&self) -> Objective {
        self.eval.context().objective()
    }

    fn random_permutation<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let mut tokens = self.eval.context().customers().to_vec();
        tokens.extend(std::iter::repeat(DEPOT).take(self.depots));
        for _ in 0..MAX_SHUFFLE_RETRIES {
            shuffle(&mut tokens, rng);
            if self.is_valid(&tokens) {
                break;
            }
        }
        tokens
    }

    fn greedy_permutation<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let ctx = self.eval.context();
        let perm = encode_cycles(&randomized_greedy_cycles(ctx, rng));
        let covered = perm.iter().filter(|&&c| c != DEPOT).count();
        if covered == ctx.customers().len() {
            perm
        } else {
            // Customers the heuristic could not reach would be lost.
            self.random_permutation(rng)
        }
    }

    fn evaluate(&self, permutation: &[usize]) -> SolveResult {
        self.eval.evaluate_permutation(permutation)
    }

    fn is_valid(&self, permutation: &[usize]) -> bool {
        !is_degenerate(permutation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::DurationMatrix;
    use crate::models::{cycle_demand, decode_permutation, ContextBuilder, Vehicle};
    use u_numflow::random::create_rng;

    fn builder(k: usize) -> ContextBuilder {
        let grid: Vec<Vec<f64>> = (0..6)
            .map(|i| (0..6).map(|j| 4.0 * (i as f64 - j as f64).abs()).collect())
            .collect();
        SolveContext::builder(DurationMatrix::from_static(&grid, 12).expect("valid"), vec![0, 2, 2, 1, 3, 1])
            .vehicles(vec![Vehicle::new(0, 3), Vehicle::new(1, 3)])
            .max_cycles(k)
    }

    fn context(k: usize) -> SolveContext {
        builder(k).build().expect("valid")
    }

    #[test]
    fn test_random_permutation_tokens() {
        let ctx = context(4);
        let problem = RoutingProblem::new(&ctx);
        assert_eq!(problem.depots(), 3);
        let mut rng = create_rng(3);
        for _ in 0..50 {
            let mut perm = problem.random_permutation(&mut rng);
            perm.sort_unstable();
            assert_eq!(perm, vec![0, 0, 0, 1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn test_random_permutation_mostly_valid() {
        let ctx = context(2);
        let problem = RoutingProblem::new(&ctx);
        let mut rng = create_rng(4);
        let valid = (0..100)
            .filter(|_| problem.is_valid(&problem.random_permutation(&mut rng)))
            .count();
        assert!(valid >= 99);
    }

    #[test]
    fn test_greedy_permutation_fits_capacity() {
        let ctx = context(6);
        let problem = RoutingProblem::new(&ctx);
        let mut rng = create_rng(5);
        for _ in 0..20 {
            let perm = problem.greedy_permutation(&mut rng);
            let cycles = decode_permutation(&perm);
            for cycle in &cycles {
                assert!(cycle_demand(cycle, ctx.load()) <= ctx.max_capacity());
            }
            assert_eq!(perm.iter().filter(|&&c| c != DEPOT).count(), 5);
            assert!(problem.evaluate(&perm).is_feasible());
        }
    }

    #[test]
    fn test_single_customer_has_no_separators() {
        let ctx = builder(5).customers(vec![3]).build().expect("valid");
        let problem = RoutingProblem::new(&ctx);
        assert_eq!(problem.depots(), 0);
        assert_eq!(problem.random_permutation(&mut create_rng(0)), vec![3]);
    }
}
