//! Per-vehicle visiting lists and their decoding into cycles.

use rand::Rng;
use u_numflow::random::shuffle;

use crate::evaluation::RouteEvaluator;
use crate::models::{wrap_cycle, Cycle, SolveContext};

/// One customer list per vehicle, in visiting order.
///
/// The lists carry no depot tokens; [`to_cycles`](Self::to_cycles) inserts
/// a depot return whenever the next customer would overflow the vehicle.
///
/// # Examples
///
/// ```
/// use td_routing::duration::DurationMatrix;
/// use td_routing::models::{SolveContext, Vehicle};
/// use td_routing::sa::FleetPlan;
///
/// let dm = DurationMatrix::new(4, 1);
/// let ctx = SolveContext::builder(dm, vec![0, 2, 2, 1])
///     .vehicles(vec![Vehicle::new(0, 3), Vehicle::new(1, 3)])
///     .build()
///     .unwrap();
/// let plan = FleetPlan::from_lists(vec![vec![1, 2, 3], vec![]]);
/// assert_eq!(
///     plan.to_cycles(&ctx),
///     vec![vec![vec![0, 1, 0], vec![0, 2, 3, 0]], vec![]]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetPlan {
    lists: Vec<Vec<usize>>,
}

impl FleetPlan {
    /// Wraps explicit lists; list `i` belongs to vehicle `i`.
    pub fn from_lists(lists: Vec<Vec<usize>>) -> Self {
        Self { lists }
    }

    /// Deals a shuffled customer list out in slices of `⌈n/m⌉`, one
    /// slice per vehicle. A customer its slice's vehicle cannot carry goes
    /// to a random vehicle that can.
    pub fn random<R: Rng>(ctx: &SolveContext, rng: &mut R) -> Self {
        let vehicles = ctx.vehicles();
        let mut lists = vec![Vec::new(); vehicles.len()];
        if vehicles.is_empty() {
            return Self { lists };
        }
        let mut order = ctx.customers().to_vec();
        shuffle(&mut order, rng);
        let slice = order.len().div_ceil(vehicles.len()).max(1);
        for (slot, &c) in order.iter().enumerate() {
            let dealt = slot / slice;
            let demand = ctx.demand(c);
            if vehicles[dealt].capacity() >= demand {
                lists[dealt].push(c);
                continue;
            }
            let eligible: Vec<usize> = (0..vehicles.len())
                .filter(|&v| vehicles[v].capacity() >= demand)
                .collect();
            let v = if eligible.is_empty() {
                dealt
            } else {
                eligible[rng.random_range(0..eligible.len())]
            };
            lists[v].push(c);
        }
        Self { lists }
    }

    /// Customer lists by vehicle id.
    pub fn lists(&self) -> &[Vec<usize>] {
        &self.lists
    }

    pub(crate) fn lists_mut(&mut self) -> &mut [Vec<usize>] {
        &mut self.lists
    }

    /// Splits every list into capacity-feasible cycles.
    ///
    /// A customer that alone exceeds the vehicle's capacity still gets its
    /// own cycle; the evaluator rejects it.
    pub fn to_cycles(&self, ctx: &SolveContext) -> Vec<Vec<Cycle>> {
        self.lists
            .iter()
            .enumerate()
            .map(|(v, list)| {
                let capacity = ctx.vehicles().get(v).map_or(0, |veh| veh.capacity());
                let mut cycles = Vec::new();
                let mut current: Vec<usize> = Vec::new();
                let mut load = 0;
                for &c in list {
                    let demand = ctx.demand(c);
                    if !current.is_empty() && load + demand > capacity {
                        cycles.push(wrap_cycle(&current));
                        current.clear();
                        load = 0;
                    }
                    current.push(c);
                    load += demand;
                }
                if !current.is_empty() {
                    cycles.push(wrap_cycle(&current));
                }
                cycles
            })
            .collect()
    }

    /// Flattens the plan into one cycle sequence ordered by departure.
    ///
    /// Every vehicle drives its own cycles back to back from its start
    /// time. Cycles are sorted by the time they would leave the depot, ties
    /// going to the lower vehicle id; anything after an infeasible cycle
    /// departs at infinity. The sequence is scored with
    /// [`RouteEvaluator::evaluate`], which hands each cycle to the vehicle
    /// that is free first.
    pub fn to_sequence(&self, eval: &RouteEvaluator<'_>) -> Vec<Cycle> {
        let ctx = eval.context();
        let mut timed: Vec<(f64, usize, Cycle)> = Vec::new();
        for (v, cycles) in self.to_cycles(ctx).into_iter().enumerate() {
            let (mut t, capacity) = ctx
                .vehicles()
                .get(v)
                .map_or((f64::INFINITY, 0), |veh| (veh.start_time(), veh.capacity()));
            for cycle in cycles {
                let departure = t;
                t = eval.simulate_cycle(&cycle, t, capacity).unwrap_or(f64::INFINITY);
                timed.push((departure, v, cycle));
            }
        }
        timed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        timed.into_iter().map(|(_, _, cycle)| cycle).collect()
    }
}
