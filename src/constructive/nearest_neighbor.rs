//! Time-dependent nearest-neighbor heuristics.
//!
//! "Nearest" is measured in travel time departing at the current
//! simulated time, so the same pair of nodes can rank differently at
//! different hours.
//!
//! # Complexity
//!
//! O(n²) where n = number of customers.

use rand::Rng;

use crate::evaluation::{RouteEvaluator, VehicleClock};
use crate::models::{wrap_cycle, Cycle, SolveContext, DEPOT};

/// Builds a single-vehicle tour greedily from the start node.
///
/// Each step moves to the unvisited customer with the smallest travel
/// time from the current node at the current time. Cancelled customers
/// are appended at the end since they are never driven to.
///
/// # Examples
///
/// ```
/// use td_routing::constructive::nearest_neighbor_tour;
/// use td_routing::duration::DurationMatrix;
/// use td_routing::models::{SolveContext, Vehicle};
///
/// let grid: Vec<Vec<f64>> = (0..4)
///     .map(|i| (0..4).map(|j| (i as f64 - j as f64).abs()).collect())
///     .collect();
/// let ctx = SolveContext::builder(DurationMatrix::from_static(&grid, 12).unwrap(), vec![0; 4])
///     .vehicles(vec![Vehicle::new(0, 0)])
///     .customers(vec![3, 1, 2])
///     .max_cycles(0)
///     .build()
///     .unwrap();
/// assert_eq!(nearest_neighbor_tour(&ctx), vec![1, 2, 3]);
/// ```
pub fn nearest_neighbor_tour(ctx: &SolveContext) -> Vec<usize> {
    let model = ctx.model();
    let tsp = ctx.tsp();
    let service = ctx.service();
    let (mut open, cancelled): (Vec<usize>, Vec<usize>) = ctx
        .customers()
        .iter()
        .copied()
        .partition(|c| !tsp.cancelled.contains(c));

    let mut tour = Vec::with_capacity(ctx.customers().len());
    let mut current = tsp.start_node;
    let mut t = ctx.vehicles().first().map_or(0.0, |v| v.start_time());
    if current == DEPOT {
        t += service.loading(open.iter().map(|&c| ctx.demand(c)).sum());
    }
    while !open.is_empty() {
        let Some((pos, d)) = nearest(&open, |c| model.duration_at(current, c, t).ok()) else {
            break;
        };
        let next = open.swap_remove(pos);
        t += d + service.unloading(ctx.demand(next));
        tour.push(next);
        current = next;
    }
    // Unreachable customers (horizon exceeded) keep input order.
    tour.extend(open);
    tour.extend(cancelled);
    tour
}

/// Builds capacity-feasible cycles greedily with the vehicle clock.
///
/// The vehicle that is free first takes a new cycle; the cycle grows with
/// the nearest customer that still fits the vehicle's capacity and closes
/// when none fits. Loading is charged up front for the load the vehicle
/// can expect to take out.
pub fn nearest_neighbor_cycles(ctx: &SolveContext) -> Vec<Cycle> {
    greedy_cycles(ctx, None::<&mut rand::rngs::SmallRng>)
}

/// Like [`nearest_neighbor_cycles`], but the first customer of every cycle
/// is drawn at random among those that fit. Produces diverse
/// capacity-feasible starting points.
pub fn randomized_greedy_cycles<R: Rng>(ctx: &SolveContext, rng: &mut R) -> Vec<Cycle> {
    greedy_cycles(ctx, Some(rng))
}

fn greedy_cycles<R: Rng>(ctx: &SolveContext, mut rng: Option<&mut R>) -> Vec<Cycle> {
    let eval = RouteEvaluator::new(ctx);
    let model = ctx.model();
    let service = ctx.service();
    let vehicles = ctx.vehicles();
    let mut open: Vec<usize> = ctx.customers().to_vec();
    let mut clock = VehicleClock::new(&ctx.start_times());
    let mut cycles = Vec::new();

    while !open.is_empty() {
        let Some((start, id)) = clock.pop_earliest() else {
            break;
        };
        let capacity = vehicles[id].capacity();
        let mut remaining = capacity;
        let mut t = start + service.loading(eval.planned_load(&open, capacity));
        let mut current = DEPOT;
        let mut customers = Vec::new();

        loop {
            let fits: Vec<usize> = (0..open.len())
                .filter(|&i| ctx.demand(open[i]) <= remaining)
                .collect();
            if fits.is_empty() {
                break;
            }
            let picked = match rng.as_deref_mut() {
                Some(r) if customers.is_empty() => {
                    let i = fits[r.random_range(0..fits.len())];
                    model
                        .duration_at(current, open[i], t)
                        .ok()
                        .map(|d| (i, d))
                }
                _ => {
                    let candidates: Vec<usize> = fits.iter().map(|&i| open[i]).collect();
                    nearest(&candidates, |c| model.duration_at(current, c, t).ok())
                        .map(|(pos, d)| (fits[pos], d))
                }
            };
            let Some((i, d)) = picked else {
                break;
            };
            let next = open.swap_remove(i);
            remaining -= ctx.demand(next);
            t += d + service.unloading(ctx.demand(next));
            customers.push(next);
            current = next;
        }

        if customers.is_empty() {
            // This vehicle cannot take any remaining customer.
            continue;
        }
        let finish = eval
            .simulate_cycle(&customers, start, capacity)
            .unwrap_or(f64::INFINITY);
        clock.push(finish, id);
        cycles.push(wrap_cycle(&customers));
    }
    cycles
}

/// Position and travel time of the candidate with the smallest travel time.
fn nearest(candidates: &[usize], duration: impl Fn(usize) -> Option<f64>) -> Option<(usize, f64)> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(pos, &c)| duration(c).map(|d| (pos, d)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
