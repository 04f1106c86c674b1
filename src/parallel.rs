//! Fork-join over independent solver trials.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::models::{Objective, SolveResult};

/// Runs `trials` independent trials in parallel and keeps the best.
///
/// `run` receives the trial index and must not share mutable state with
/// other trials. Ties under `compare` go to the lower trial index, so the
/// outcome does not depend on thread scheduling. Returns `None` when
/// `trials == 0`.
///
/// # Examples
///
/// ```
/// use td_routing::parallel::best_of_trials;
///
/// let best = best_of_trials(8, |i| (i as i64 - 5).abs(), |a, b| a.cmp(b));
/// assert_eq!(best, Some(0));
/// ```
pub fn best_of_trials<T, F, C>(trials: usize, run: F, compare: C) -> Option<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
    C: Fn(&T, &T) -> Ordering + Sync + Send,
{
    (0..trials)
        .into_par_iter()
        .map(|i| (i, run(i)))
        .reduce_with(|a, b| match compare(&a.1, &b.1).then(a.0.cmp(&b.0)) {
            Ordering::Greater => b,
            _ => a,
        })
        .map(|(_, best)| best)
}

/// [`best_of_trials`] over solve results, ordered by `objective`.
///
/// Returns the infeasible sentinel when no trial runs.
pub fn best_result<F>(trials: usize, objective: Objective, run: F) -> SolveResult
where
    F: Fn(usize) -> SolveResult + Sync + Send,
{
    best_of_trials(trials, run, |a, b| a.compare(b, objective))
        .unwrap_or_else(SolveResult::infeasible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result(max: f64) -> SolveResult {
        SolveResult::new(max, max, BTreeMap::new(), BTreeMap::new())
    }

    #[test]
    fn test_best_result_picks_minimum() {
        let costs = [30.0, 10.0, 20.0, 10.0];
        let best = best_result(costs.len(), Objective::MinMaxTime, |i| result(costs[i]));
        assert_eq!(best.route_max_time, 10.0);
    }

    #[test]
    fn test_ties_go_to_lower_index() {
        let best = best_of_trials(16, |i| (i % 4, i), |a, b| a.0.cmp(&b.0));
        assert_eq!(best, Some((0, 0)));
    }

    #[test]
    fn test_no_trials() {
        assert!(!best_result(0, Objective::MinSumTime, |_| result(1.0)).is_feasible());
    }

    #[test]
    fn test_infeasible_never_wins() {
        let best = best_result(3, Objective::MinMaxTime, |i| {
            if i == 2 {
                result(99.0)
            } else {
                SolveResult::infeasible()
            }
        });
        assert_eq!(best.route_max_time, 99.0);
    }
}
