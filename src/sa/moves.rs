//! Neighbourhood moves for annealing.

use rand::Rng;

use super::FleetPlan;

/// Attempts per neighbour before giving up on finding a non-degenerate move.
const MAX_MOVE_RETRIES: usize = 10;

/// A vehicle-routing neighbourhood move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMove {
    /// Swap two customers within one vehicle's list.
    SwapIntra,
    /// Swap one customer of a vehicle with one of another vehicle.
    SwapInter,
    /// Move a customer from one vehicle to a random position of another.
    MoveInter,
}

impl PlanMove {
    const ALL: [PlanMove; 3] = [PlanMove::SwapIntra, PlanMove::SwapInter, PlanMove::MoveInter];

    /// Applies the move in place. Returns `false` without changing the plan
    /// when the move is degenerate for it (too few customers or vehicles).
    pub fn apply<R: Rng>(self, plan: &mut FleetPlan, rng: &mut R) -> bool {
        let lists = plan.lists_mut();
        match self {
            PlanMove::SwapIntra => {
                let Some(v) = pick_where(lists, rng, |l| l.len() >= 2) else {
                    return false;
                };
                let list = &mut lists[v];
                let i = rng.random_range(0..list.len());
                let mut j = rng.random_range(0..list.len() - 1);
                if j >= i {
                    j += 1;
                }
                list.swap(i, j);
                true
            }
            PlanMove::SwapInter => {
                let Some(a) = pick_where(lists, rng, |l| !l.is_empty()) else {
                    return false;
                };
                let others: Vec<usize> = (0..lists.len())
                    .filter(|&v| v != a && !lists[v].is_empty())
                    .collect();
                if others.is_empty() {
                    return false;
                }
                let b = others[rng.random_range(0..others.len())];
                let i = rng.random_range(0..lists[a].len());
                let j = rng.random_range(0..lists[b].len());
                let tmp = lists[a][i];
                lists[a][i] = lists[b][j];
                lists[b][j] = tmp;
                true
            }
            PlanMove::MoveInter => {
                if lists.len() < 2 {
                    return false;
                }
                let Some(from) = pick_where(lists, rng, |l| !l.is_empty()) else {
                    return false;
                };
                let mut to = rng.random_range(0..lists.len() - 1);
                if to >= from {
                    to += 1;
                }
                let i = rng.random_range(0..lists[from].len());
                let customer = lists[from].remove(i);
                let pos = rng.random_range(0..=lists[to].len());
                lists[to].insert(pos, customer);
                true
            }
        }
    }

    /// Applies a uniformly chosen move, retrying when the choice is
    /// degenerate. Returns `false` if every attempt was degenerate.
    pub fn apply_random<R: Rng>(plan: &mut FleetPlan, rng: &mut R) -> bool {
        (0..MAX_MOVE_RETRIES).any(|_| Self::ALL[rng.random_range(0..Self::ALL.len())].apply(plan, rng))
    }
}

/// A travelling-salesman neighbourhood move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourMove {
    /// Reverse the segment between two positions.
    TwoOpt,
    /// Swap two positions.
    Exchange,
}

impl TourMove {
    const ALL: [TourMove; 2] = [TourMove::TwoOpt, TourMove::Exchange];

    /// Applies the move in place; `false` for tours shorter than two.
    pub fn apply<R: Rng>(self, tour: &mut [usize], rng: &mut R) -> bool {
        if tour.len() < 2 {
            return false;
        }
        let i = rng.random_range(0..tour.len());
        let mut j = rng.random_range(0..tour.len() - 1);
        if j >= i {
            j += 1;
        }
        let (lo, hi) = (i.min(j), i.max(j));
        match self {
            TourMove::TwoOpt => tour[lo..=hi].reverse(),
            TourMove::Exchange => tour.swap(lo, hi),
        }
        true
    }

    /// Applies a uniformly chosen move.
    pub fn apply_random<R: Rng>(tour: &mut [usize], rng: &mut R) -> bool {
        Self::ALL[rng.random_range(0..Self::ALL.len())].apply(tour, rng)
    }
}

/// A random index among lists satisfying `pred`.
fn pick_where<R: Rng>(lists: &[Vec<usize>], rng: &mut R, pred: impl Fn(&Vec<usize>) -> bool) -> Option<usize> {
    let eligible: Vec<usize> = (0..lists.len()).filter(|&v| pred(&lists[v])).collect();
    if eligible.is_empty() {
        None
    } else {
        Some(eligible[rng.random_range(0..eligible.len())])
    }
}
