//! Arrival-time annotation of solved routes.

use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;
use crate::models::{cycle_customers, Location, SolveContext, SolveResult, DEPOT};

/// One visited location with the time the vehicle got there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Location id.
    pub id: usize,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Arrival time, in the context's time unit.
    #[serde(rename = "arrivalTime")]
    pub arrival_time: f64,
}

/// The annotated cycles of one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSchedule {
    /// Vehicle id.
    pub vehicle: usize,
    /// One stop list per cycle, in driving order.
    pub cycles: Vec<Vec<Stop>>,
}

/// Replays a result and attaches coordinates and arrival times to every
/// stop.
///
/// Uses the same duration lookups and service times as the evaluator, so
/// the last stop of each vehicle's last cycle arrives at that vehicle's
/// finish time (minus any skip cost in the travelling-salesman variant).
/// Infeasible results annotate to an empty list.
///
/// # Errors
///
/// Returns [`InvalidInput::CustomerOutOfRange`] if a routed node has no
/// matching location.
///
/// # Examples
///
/// ```
/// use td_routing::duration::{DurationSource, SyntheticDurations};
/// use td_routing::evaluation::{annotate_arrivals, RouteEvaluator};
/// use td_routing::models::{demands_of, Location, SolveContext, Vehicle};
///
/// let locations = vec![
///     Location::depot(37.50, 127.00),
///     Location::new(1, 37.52, 127.00, 1),
/// ];
/// let dm = SyntheticDurations::new(locations.clone(), 2.0, 12)
///     .get_duration_matrix()
///     .unwrap();
/// let ctx = SolveContext::builder(dm, demands_of(&locations))
///     .vehicles(vec![Vehicle::new(0, 5)])
///     .build()
///     .unwrap();
/// let result = RouteEvaluator::new(&ctx).evaluate(&[vec![0, 1, 0]]);
///
/// let schedules = annotate_arrivals(&result, &locations, &ctx).unwrap();
/// let stops = &schedules[0].cycles[0];
/// assert_eq!(stops.len(), 3);
/// assert_eq!(stops[0].arrival_time, 0.0);
/// assert!((stops[2].arrival_time - result.route_max_time).abs() < 1e-9);
/// ```
pub fn annotate_arrivals(
    result: &SolveResult,
    locations: &[Location],
    ctx: &SolveContext,
) -> Result<Vec<VehicleSchedule>, InvalidInput> {
    let Some(routes) = &result.vehicle_routes else {
        return Ok(Vec::new());
    };
    let model = ctx.model();
    let service = ctx.service();
    let lookup = |id: usize| {
        locations
            .iter()
            .find(|l| l.id() == id)
            .ok_or(InvalidInput::CustomerOutOfRange {
                id,
                n: locations.len(),
            })
    };

    let mut schedules = Vec::with_capacity(routes.len());
    for (&vehicle, cycles) in routes {
        let mut t = ctx
            .vehicles()
            .get(vehicle)
            .map_or(0.0, |v| v.start_time());
        let mut annotated = Vec::with_capacity(cycles.len());
        for cycle in cycles {
            let Some(&first) = cycle.first() else {
                continue;
            };
            let mut stops = Vec::with_capacity(cycle.len());
            let loc = lookup(first)?;
            stops.push(Stop {
                id: first,
                lat: loc.lat(),
                lng: loc.lng(),
                arrival_time: t,
            });
            if first == DEPOT && !service.is_zero() {
                let total: i64 = cycle_customers(cycle).iter().map(|&c| ctx.demand(c)).sum();
                t += service.loading(total);
            }
            for pair in cycle.windows(2) {
                let (from, to) = (pair[0], pair[1]);
                t = match model.travel(from, to, t) {
                    Ok(arrival) => arrival,
                    Err(_) => return Ok(Vec::new()),
                };
                let loc = lookup(to)?;
                stops.push(Stop {
                    id: to,
                    lat: loc.lat(),
                    lng: loc.lng(),
                    arrival_time: t,
                });
                if to != DEPOT {
                    t += service.unloading(ctx.demand(to));
                }
            }
            annotated.push(stops);
        }
        schedules.push(VehicleSchedule {
            vehicle,
            cycles: annotated,
        });
    }
    Ok(schedules)
}
