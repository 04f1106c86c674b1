//! Vehicle availability queue.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Slot {
    time: f64,
    vehicle: usize,
}

impl Eq for Slot {}

impl Ord for Slot {
    // Reversed so the max-heap pops the earliest time, then the lowest id.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.vehicle.cmp(&self.vehicle))
    }
}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Aggregate finish times after a full simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockSummary {
    /// Latest finish time.
    pub max_time: f64,
    /// Sum of finish times.
    pub sum_time: f64,
    /// Finish time per vehicle id.
    pub times: BTreeMap<usize, f64>,
}

/// Priority queue of vehicles keyed by the time they are next available.
///
/// Ties are broken by vehicle id, so the simulation is deterministic.
///
/// # Examples
///
/// ```
/// use td_routing::evaluation::VehicleClock;
///
/// let mut clock = VehicleClock::new(&[30.0, 0.0, 0.0]);
/// assert_eq!(clock.pop_earliest(), Some((0.0, 1)));
/// clock.push(50.0, 1);
/// assert_eq!(clock.pop_earliest(), Some((0.0, 2)));
/// clock.push(10.0, 2);
///
/// let summary = clock.drain_summary();
/// assert_eq!(summary.max_time, 50.0);
/// assert_eq!(summary.sum_time, 90.0);
/// assert_eq!(summary.times[&2], 10.0);
/// ```
#[derive(Debug, Clone)]
pub struct VehicleClock {
    heap: BinaryHeap<Slot>,
}

impl VehicleClock {
    /// Seeds one entry per vehicle; vehicle `i` becomes available at
    /// `start_times[i]`.
    pub fn new(start_times: &[f64]) -> Self {
        let heap = start_times
            .iter()
            .enumerate()
            .map(|(vehicle, &time)| Slot { time, vehicle })
            .collect();
        Self { heap }
    }

    /// Removes the vehicle that is available first.
    pub fn pop_earliest(&mut self) -> Option<(f64, usize)> {
        self.heap.pop().map(|s| (s.time, s.vehicle))
    }

    /// Returns the vehicle that is available first without removing it.
    pub fn peek_earliest(&self) -> Option<(f64, usize)> {
        self.heap.peek().map(|s| (s.time, s.vehicle))
    }

    /// Re-inserts a vehicle with updated availability.
    pub fn push(&mut self, time: f64, vehicle: usize) {
        self.heap.push(Slot { time, vehicle });
    }

    /// Number of vehicles currently queued.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if no vehicle is queued.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pops every vehicle and aggregates the finish times.
    pub fn drain_summary(mut self) -> ClockSummary {
        let mut max_time = 0.0_f64;
        let mut sum_time = 0.0;
        let mut times = BTreeMap::new();
        while let Some((time, vehicle)) = self.pop_earliest() {
            max_time = max_time.max(time);
            sum_time += time;
            times.insert(vehicle, time);
        }
        ClockSummary {
            max_time,
            sum_time,
            times,
        }
    }
}
