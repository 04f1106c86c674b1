//! Single-vehicle tour evaluation for the travelling-salesman variant.

use std::collections::BTreeMap;

use crate::models::{SolveResult, DEPOT};

use super::RouteEvaluator;

impl<'a> RouteEvaluator<'a> {
    /// Drives vehicle 0 from the start node through `tour` and back to the
    /// depot, returning the finish time plus the skip cost of every
    /// cancelled customer passed over.
    ///
    /// `tour` lists customers only; the start node and the closing depot
    /// are implied. Cancelled customers keep their position but are not
    /// driven to. Capacity is not checked. Returns `None` if the tour
    /// leaves the horizon.
    pub fn tour_time(&self, tour: &[usize]) -> Option<f64> {
        self.drive_tour(tour).map(|(finish, skipped, _)| finish + skipped)
    }

    /// Full result for a tour: the driven route as a single cycle
    /// `[start, ..., DEPOT]` under vehicle 0.
    pub fn evaluate_tour(&self, tour: &[usize]) -> SolveResult {
        let Some((finish, skipped, route)) = self.drive_tour(tour) else {
            return SolveResult::infeasible();
        };
        let total = finish + skipped;
        let vehicle = self.context().vehicles().first().map_or(0, |v| v.id());
        let mut routes = BTreeMap::new();
        routes.insert(vehicle, vec![route]);
        let mut times = BTreeMap::new();
        times.insert(vehicle, total);
        SolveResult::new(total, total, routes, times)
    }

    fn drive_tour(&self, tour: &[usize]) -> Option<(f64, f64, Vec<usize>)> {
        let ctx = self.context();
        let tsp = ctx.tsp();
        let service = ctx.service();
        let start = tsp.start_node;
        let cancelled = |c: usize| tsp.cancelled.contains(&c);

        let mut t = ctx.vehicles().first().map_or(0.0, |v| v.start_time());
        if start == DEPOT && !service.is_zero() {
            let total: i64 = tour
                .iter()
                .filter(|&&c| !cancelled(c))
                .map(|&c| ctx.demand(c))
                .sum();
            t += service.loading(total);
        }

        let mut route = Vec::with_capacity(tour.len() + 2);
        route.push(start);
        let mut skipped = 0.0;
        let mut last = start;
        for &c in tour {
            if cancelled(c) {
                skipped += tsp.skip_cost;
                continue;
            }
            t = self.model().travel(last, c, t).ok()?;
            t += service.unloading(ctx.demand(c));
            route.push(c);
            last = c;
        }
        if last != DEPOT || route.len() > 1 {
            t = self.model().travel(last, DEPOT, t).ok()?;
        }
        route.push(DEPOT);
        Some((t, skipped, route))
    }
}

#[cfg(test)]
mod tests {
    use crate::duration::DurationMatrix;
    use crate::evaluation::RouteEvaluator;
    use crate::models::{SolveContext, TspOptions, Vehicle};

    fn context(tsp: TspOptions) -> SolveContext {
        let grid: Vec<Vec<f64>> = (0..4)
            .map(|i| (0..4).map(|j| 10.0 * (i as f64 - j as f64).abs()).collect())
            .collect();
        SolveContext::builder(DurationMatrix::from_static(&grid, 12).expect("valid"), vec![0, 5, 5, 5])
            .vehicles(vec![Vehicle::new(0, 1)])
            .max_cycles(0)
            .tsp_options(tsp)
            .build()
            .expect("valid")
    }

    #[test]
    fn test_tour_from_depot() {
        let ctx = context(TspOptions::default());
        let eval = RouteEvaluator::new(&ctx);
        assert_eq!(eval.tour_time(&[1, 2, 3]), Some(60.0));
        assert_eq!(eval.tour_time(&[3, 1, 2]), Some(80.0));
        let r = eval.evaluate_tour(&[1, 2, 3]);
        assert_eq!(r.vehicle_routes.expect("feasible")[&0], vec![vec![0, 1, 2, 3, 0]]);
    }

    #[test]
    fn test_tour_from_start_node() {
        let ctx = context(TspOptions {
            start_node: 3,
            ..TspOptions::default()
        });
        let eval = RouteEvaluator::new(&ctx);
        // 3 -> 2 -> 1 -> 0
        assert_eq!(eval.tour_time(&[2, 1]), Some(30.0));
        let r = eval.evaluate_tour(&[2, 1]);
        assert_eq!(r.vehicle_routes.expect("feasible")[&0], vec![vec![3, 2, 1, 0]]);
    }

    #[test]
    fn test_cancelled_customer_skipped() {
        let ctx = context(TspOptions {
            start_node: 0,
            cancelled: vec![3],
            skip_cost: 7.0,
        });
        let eval = RouteEvaluator::new(&ctx);
        // Drives 0 -> 1 -> 2 -> 0 (40) plus one skip.
        assert_eq!(eval.tour_time(&[1, 3, 2]), Some(47.0));
        let r = eval.evaluate_tour(&[1, 3, 2]);
        assert_eq!(r.route_max_time, 47.0);
        assert_eq!(r.vehicle_routes.expect("feasible")[&0], vec![vec![0, 1, 2, 0]]);
    }

    #[test]
    fn test_empty_tour_from_depot() {
        let ctx = context(TspOptions::default());
        assert_eq!(RouteEvaluator::new(&ctx).tour_time(&[]), Some(0.0));
    }
}
