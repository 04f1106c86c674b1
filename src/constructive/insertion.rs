//! Successive cheapest-insertion tour construction.

use crate::evaluation::RouteEvaluator;
use crate::models::SolveContext;

/// Builds a single-vehicle tour by inserting customers one at a time.
///
/// Customers are taken in input order; each is placed at the position
/// that gives the earliest tour completion time under the time-dependent
/// durations. Positions that leave the horizon are skipped; if every
/// position does, the customer is appended.
///
/// # Complexity
///
/// O(n³): n insertions, each trying O(n) positions with an O(n) replay.
///
/// # Examples
///
/// ```
/// use td_routing::constructive::successive_insertion_tour;
/// use td_routing::duration::DurationMatrix;
/// use td_routing::models::{SolveContext, Vehicle};
///
/// let grid: Vec<Vec<f64>> = (0..4)
///     .map(|i| (0..4).map(|j| (i as f64 - j as f64).abs()).collect())
///     .collect();
/// let ctx = SolveContext::builder(DurationMatrix::from_static(&grid, 12).unwrap(), vec![0; 4])
///     .vehicles(vec![Vehicle::new(0, 0)])
///     .customers(vec![2, 3, 1])
///     .max_cycles(0)
///     .build()
///     .unwrap();
/// let tour = successive_insertion_tour(&ctx);
/// assert_eq!(tour.len(), 3);
/// ```
pub fn successive_insertion_tour(ctx: &SolveContext) -> Vec<usize> {
    let eval = RouteEvaluator::new(ctx);
    let mut tour: Vec<usize> = Vec::with_capacity(ctx.customers().len());

    for &customer in ctx.customers() {
        let mut best: Option<(usize, f64)> = None;
        for pos in 0..=tour.len() {
            tour.insert(pos, customer);
            if let Some(cost) = eval.tour_time(&tour) {
                if best.map_or(true, |(_, b)| cost < b) {
                    best = Some((pos, cost));
                }
            }
            tour.remove(pos);
        }
        let pos = best.map_or(tour.len(), |(pos, _)| pos);
        tour.insert(pos, customer);
    }
    tour
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::DurationMatrix;
    use crate::models::Vehicle;

    #[test]
    fn test_insertion_on_line_is_optimal() {
        let grid: Vec<Vec<f64>> = (0..5)
            .map(|i| (0..5).map(|j| 10.0 * (i as f64 - j as f64).abs()).collect())
            .collect();
        let ctx = SolveContext::builder(DurationMatrix::from_static(&grid, 12).expect("valid"), vec![0; 5])
            .vehicles(vec![Vehicle::new(0, 0)])
            .customers(vec![3, 1, 4, 2])
            .max_cycles(0)
            .build()
            .expect("valid");
        let tour = successive_insertion_tour(&ctx);
        let eval = RouteEvaluator::new(&ctx);
        // Any out-and-back sweep on a line costs twice the far end.
        assert_eq!(eval.tour_time(&tour), Some(80.0));
    }

    #[test]
    fn test_insertion_empty() {
        let grid = vec![vec![0.0]];
        let ctx = SolveContext::builder(DurationMatrix::from_static(&grid, 1).expect("valid"), vec![0])
            .vehicles(vec![Vehicle::new(0, 0)])
            .max_cycles(0)
            .build()
            .expect("valid");
        assert!(successive_insertion_tour(&ctx).is_empty());
    }
}
