//! A single colony run: ant construction and pheromone updates.

use rand::Rng;
use tracing::trace;
use u_numflow::random::weighted_choose;

use crate::evaluation::{RouteEvaluator, VehicleClock};
use crate::models::{Cycle, SolveContext, SolveResult, DEPOT};

use super::{AntParams, PheromoneMatrix};

/// Durations below this are treated as this value in the attractiveness.
const MIN_DURATION: f64 = 1e-6;

/// A new best solution found by a colony, and when.
#[derive(Debug, Clone, PartialEq)]
pub struct Improvement {
    /// Outer iteration that produced it.
    pub iteration: usize,
    /// The evaluated solution.
    pub result: SolveResult,
}

/// One colony with fixed hyperparameters.
///
/// Ants build complete solutions. A vehicle-routing ant fills cycles for
/// the vehicle that is free first, in the order the route evaluator hands
/// them out; a travelling-salesman ant walks one tour from the start node.
/// The next node is drawn with probability proportional to
/// `pheromone^alpha / duration^beta`, using the hour-zone of the ant's
/// current time.
///
/// # Examples
///
/// ```
/// use td_routing::aco::{AntParams, Colony};
/// use td_routing::duration::DurationMatrix;
/// use td_routing::models::{SolveContext, Vehicle};
/// use u_numflow::random::create_rng;
///
/// let grid: Vec<Vec<f64>> = (0..4)
///     .map(|i| (0..4).map(|j| 10.0 * (i as f64 - j as f64).abs()).collect())
///     .collect();
/// let ctx = SolveContext::builder(DurationMatrix::from_static(&grid, 12).unwrap(), vec![0, 1, 1, 1])
///     .vehicles(vec![Vehicle::new(0, 3)])
///     .build()
///     .unwrap();
/// let params = AntParams { n_iterations: 5, n_sub_iterations: 4, ..AntParams::default() };
/// let mut colony = Colony::new(&ctx, params, false);
/// let improvements = colony.run(&mut create_rng(1));
/// assert_eq!(improvements.last().unwrap().result.route_max_time, 60.0);
/// ```
#[derive(Debug, Clone)]
pub struct Colony<'a> {
    eval: RouteEvaluator<'a>,
    params: AntParams,
    consider_depot: bool,
    pheromone: PheromoneMatrix,
    duration_power: Vec<f64>,
    size: usize,
    zones: usize,
}

impl<'a> Colony<'a> {
    /// Creates a colony with uniform pheromone over the nodes in play.
    pub fn new(ctx: &'a SolveContext, params: AntParams, consider_depot: bool) -> Self {
        let matrix = ctx.matrix();
        let (size, zones) = (matrix.size(), matrix.zones());

        let mut nodes = vec![DEPOT];
        if ctx.is_tsp() {
            nodes.push(ctx.tsp().start_node);
        }
        nodes.extend_from_slice(ctx.customers());

        let mut duration_power = Vec::with_capacity(size * size * zones);
        for from in 0..size {
            for to in 0..size {
                for zone in 0..zones {
                    let d = matrix.get(from, to, zone).max(MIN_DURATION);
                    duration_power.push(d.powi(params.beta as i32));
                }
            }
        }

        Self {
            eval: RouteEvaluator::new(ctx),
            params,
            consider_depot,
            pheromone: PheromoneMatrix::new(size, &nodes),
            duration_power,
            size,
            zones,
        }
    }

    /// Current pheromone levels.
    pub fn pheromone(&self) -> &PheromoneMatrix {
        &self.pheromone
    }

    /// The hyperparameters of this colony.
    pub fn params(&self) -> &AntParams {
        &self.params
    }

    /// Runs every outer iteration and returns each new best in order.
    ///
    /// The last entry is the colony's best. Empty if no ant ever built a
    /// feasible solution.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> Vec<Improvement> {
        let objective = self.eval.context().objective();
        let mut improvements: Vec<Improvement> = Vec::new();

        for iteration in 0..self.params.n_iterations {
            let mut paths = Vec::with_capacity(self.params.n_sub_iterations);
            for _ in 0..self.params.n_sub_iterations {
                let Some((path, result)) = self.construct(rng) else {
                    continue;
                };
                if !result.is_feasible() {
                    continue;
                }
                let improved = improvements
                    .last()
                    .map_or(true, |best| result.is_better_than(&best.result, objective));
                paths.push((path, result.cost(objective)));
                if improved {
                    improvements.push(Improvement { iteration, result });
                }
            }
            if !paths.is_empty() {
                self.pheromone
                    .update(&paths, self.params.rho, self.params.q);
            }
            trace!(iteration, feasible_ants = paths.len(), "colony iteration");
        }
        improvements
    }

    /// Builds one solution and evaluates it.
    ///
    /// Returns the visited node sequence (for pheromone deposit) with the
    /// result, or `None` if the ant got stuck.
    pub fn construct<R: Rng>(&self, rng: &mut R) -> Option<(Vec<usize>, SolveResult)> {
        if self.eval.context().is_tsp() {
            self.construct_tour(rng)
        } else {
            self.construct_cycles(rng)
        }
    }

    fn construct_cycles<R: Rng>(&self, rng: &mut R) -> Option<(Vec<usize>, SolveResult)> {
        let ctx = self.eval.context();
        let model = self.eval.model();
        let service = ctx.service();
        let vehicles = ctx.vehicles();
        let mut open: Vec<usize> = ctx.customers().to_vec();
        let mut clock = VehicleClock::new(&ctx.start_times());
        let mut cycles: Vec<Cycle> = Vec::new();
        let mut path = vec![DEPOT];

        while !open.is_empty() {
            if cycles.len() == self.eval.cycle_limit() {
                return None;
            }
            let (start, id) = clock.pop_earliest()?;
            let capacity = vehicles[id].capacity();
            let mut remaining = capacity;
            let mut t = start + service.loading(self.eval.planned_load(&open, capacity));
            let mut current = DEPOT;
            let mut cycle = vec![DEPOT];

            loop {
                let hour = model.hour_at(t).ok()?;
                let mut candidates: Vec<usize> = open
                    .iter()
                    .copied()
                    .filter(|&c| ctx.demand(c) <= remaining)
                    .collect();
                if candidates.is_empty() {
                    break;
                }
                if self.consider_depot && current != DEPOT {
                    candidates.push(DEPOT);
                }
                let next = self.pick(rng, current, hour, &candidates);
                if next == DEPOT {
                    break;
                }
                t = model.travel(current, next, t).ok()? + service.unloading(ctx.demand(next));
                remaining -= ctx.demand(next);
                open.retain(|&c| c != next);
                cycle.push(next);
                path.push(next);
                current = next;
            }

            if current == DEPOT {
                // The free vehicle fits nothing that is left, and it would
                // be handed the next cycle all the same.
                return None;
            }
            cycle.push(DEPOT);
            path.push(DEPOT);
            let finish = self.eval.simulate_cycle(&cycle, start, capacity)?;
            clock.push(finish, id);
            cycles.push(cycle);
        }

        let result = self.eval.evaluate(&cycles);
        Some((path, result))
    }

    fn construct_tour<R: Rng>(&self, rng: &mut R) -> Option<(Vec<usize>, SolveResult)> {
        let ctx = self.eval.context();
        let model = self.eval.model();
        let service = ctx.service();
        let tsp = ctx.tsp();
        let (mut open, cancelled): (Vec<usize>, Vec<usize>) = ctx
            .customers()
            .iter()
            .copied()
            .partition(|c| !tsp.cancelled.contains(c));

        let mut t = ctx.vehicles().first().map_or(0.0, |v| v.start_time());
        if tsp.start_node == DEPOT {
            t += service.loading(open.iter().map(|&c| ctx.demand(c)).sum());
        }
        let mut current = tsp.start_node;
        let mut path = vec![current];
        let mut tour = Vec::with_capacity(ctx.customers().len());
        while !open.is_empty() {
            let hour = model.hour_at(t).ok()?;
            let next = self.pick(rng, current, hour, &open);
            t = model.travel(current, next, t).ok()? + service.unloading(ctx.demand(next));
            open.retain(|&c| c != next);
            tour.push(next);
            path.push(next);
            current = next;
        }
        path.push(DEPOT);
        tour.extend(cancelled);

        let result = self.eval.evaluate_tour(&tour);
        Some((path, result))
    }

    /// One roulette draw over `candidates`; uniform when every weight
    /// vanishes or the total overflows.
    fn pick<R: Rng>(&self, rng: &mut R, current: usize, hour: usize, candidates: &[usize]) -> usize {
        let weights: Vec<f64> = candidates
            .iter()
            .map(|&c| self.attractiveness(current, c, hour))
            .collect();
        let total: f64 = weights.iter().sum();
        if total.is_finite() {
            if let Some(i) = weighted_choose(&weights, rng) {
                return candidates[i];
            }
        }
        candidates[rng.random_range(0..candidates.len())]
    }

    #[inline]
    fn attractiveness(&self, from: usize, to: usize, hour: usize) -> f64 {
        let power = self.duration_power[(from * self.size + to) * self.zones + hour];
        self.pheromone.get(from, to).powi(self.params.alpha as i32) / power
    }
}
