//! Route evaluator: the single source of truth for feasibility and cost.

use std::collections::BTreeMap;

use crate::duration::DurationModel;
use crate::models::{
    cycle_customers, decode_permutation, wrap_cycle, Cycle, SolveContext, SolveResult, DEPOT,
};

use super::VehicleClock;

/// Simulates cycles against the time-dependent duration matrix.
///
/// Every solver routes its cost computations through this type so that
/// all of them agree on what "feasible" and "cost" mean. A cycle is
/// infeasible if its demand exceeds the driving vehicle's capacity, or,
/// when long trips are disallowed, if any departure or arrival falls past
/// the last hour-zone.
///
/// # Examples
///
/// ```
/// use td_routing::duration::DurationMatrix;
/// use td_routing::evaluation::RouteEvaluator;
/// use td_routing::models::{SolveContext, Vehicle};
///
/// let dm = DurationMatrix::from_static(
///     &[vec![0.0, 10.0, 20.0], vec![10.0, 0.0, 5.0], vec![20.0, 5.0, 0.0]],
///     12,
/// )
/// .unwrap();
/// let ctx = SolveContext::builder(dm, vec![0, 1, 1])
///     .vehicles(vec![Vehicle::new(0, 2), Vehicle::new(1, 2)])
///     .build()
///     .unwrap();
///
/// let eval = RouteEvaluator::new(&ctx);
/// let result = eval.evaluate(&[vec![0, 1, 2, 0]]);
/// assert_eq!(result.route_max_time, 35.0);
/// assert_eq!(result.route_sum_time, 35.0);
///
/// let split = eval.evaluate(&[vec![0, 1, 0], vec![0, 2, 0]]);
/// assert_eq!(split.route_max_time, 40.0);
/// assert_eq!(split.route_sum_time, 60.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteEvaluator<'a> {
    ctx: &'a SolveContext,
    model: DurationModel<'a>,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates an evaluator for the given context.
    pub fn new(ctx: &'a SolveContext) -> Self {
        Self {
            ctx,
            model: ctx.model(),
        }
    }

    /// The context being evaluated against.
    pub fn context(&self) -> &'a SolveContext {
        self.ctx
    }

    /// The duration model.
    pub fn model(&self) -> &DurationModel<'a> {
        &self.model
    }

    /// Maximum number of non-empty cycles in a solution.
    pub fn cycle_limit(&self) -> usize {
        self.ctx.max_cycles().max(1)
    }

    /// DEPOT separators a flat permutation needs to express up to
    /// [`cycle_limit`](Self::cycle_limit) cycles. Separators beyond
    /// `customers - 1` could only produce empty cycles and are not counted.
    pub fn depot_tokens(&self) -> usize {
        self.cycle_limit()
            .min(self.ctx.customers().len().max(1))
            .saturating_sub(1)
    }

    /// Load a vehicle of `capacity` can expect to take out when `open`
    /// customers are still waiting: all of it, or a full vehicle.
    ///
    /// Constructive builders charge the loading time for this load before
    /// the cycle's exact demand is known.
    pub fn planned_load(&self, open: &[usize], capacity: i64) -> i64 {
        let waiting: i64 = open.iter().map(|&c| self.ctx.demand(c)).sum();
        waiting.min(capacity)
    }

    /// Drives one cycle departing the depot at `start` with the given
    /// capacity and returns the time the vehicle is back at the depot.
    ///
    /// The depot endpoints of `cycle` are optional; the walk is always
    /// `DEPOT → customers → DEPOT`. An empty cycle costs nothing.
    /// Returns `None` if the cycle is infeasible.
    pub fn simulate_cycle(&self, cycle: &[usize], start: f64, capacity: i64) -> Option<f64> {
        let customers = cycle_customers(cycle);
        if customers.is_empty() {
            return Some(start);
        }

        let service = self.ctx.service();
        let mut remaining = capacity;
        let mut t = start;
        if !service.is_zero() {
            let total: i64 = customers.iter().map(|&c| self.ctx.demand(c)).sum();
            t += service.loading(total);
        }

        let mut last = DEPOT;
        for &next in customers.iter().chain(std::iter::once(&DEPOT)) {
            let demand = self.ctx.demand(next);
            remaining -= demand;
            if remaining < 0 {
                return None;
            }
            t = self.model.travel(last, next, t).ok()?;
            if next != DEPOT {
                t += service.unloading(demand);
            }
            last = next;
        }
        Some(t)
    }

    /// Evaluates cycles assigned greedily to the next available vehicle.
    ///
    /// Cycles are taken in order; each goes to the vehicle that is free
    /// first. Empty cycles are skipped. More non-empty cycles than the
    /// cycle limit is infeasible.
    pub fn evaluate(&self, cycles: &[Cycle]) -> SolveResult {
        let vehicles = self.ctx.vehicles();
        let mut clock = VehicleClock::new(&self.ctx.start_times());
        let mut routes: BTreeMap<usize, Vec<Cycle>> =
            vehicles.iter().map(|v| (v.id(), Vec::new())).collect();

        let mut used = 0;
        for cycle in cycles {
            let customers = cycle_customers(cycle);
            if customers.is_empty() {
                continue;
            }
            used += 1;
            if used > self.cycle_limit() {
                return SolveResult::infeasible();
            }
            let Some((t, id)) = clock.pop_earliest() else {
                return SolveResult::infeasible();
            };
            let Some(finish) = self.simulate_cycle(customers, t, vehicles[id].capacity()) else {
                return SolveResult::infeasible();
            };
            clock.push(finish, id);
            if let Some(list) = routes.get_mut(&id) {
                list.push(wrap_cycle(customers));
            }
        }

        let summary = clock.drain_summary();
        self.finish(summary.max_time, summary.sum_time, routes, summary.times)
    }

    /// Decodes a flat DEPOT-delimited permutation and evaluates it.
    pub fn evaluate_permutation(&self, permutation: &[usize]) -> SolveResult {
        self.evaluate(&decode_permutation(permutation))
    }

    fn finish(
        &self,
        max_time: f64,
        sum_time: f64,
        routes: BTreeMap<usize, Vec<Cycle>>,
        times: BTreeMap<usize, f64>,
    ) -> SolveResult {
        if !self.model.within_horizon(max_time) {
            return SolveResult::infeasible();
        }
        SolveResult::new(max_time, sum_time, routes, times)
    }
}
