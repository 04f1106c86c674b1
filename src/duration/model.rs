//! Time-dependent duration lookups.

use crate::error::OutOfHorizon;

use super::{DurationMatrix, TimeHorizon, TimeUnit};

/// Answers "what is the travel time from `u` to `v` departing at `t`".
///
/// When `ignore_long_trip` is false, departures past the last zone reuse
/// the last zone's durations. When it is true they are rejected with
/// [`OutOfHorizon`].
///
/// # Examples
///
/// ```
/// use td_routing::duration::{DurationMatrix, DurationModel, TimeUnit};
///
/// let mut dm = DurationMatrix::new(2, 2);
/// dm.set(0, 1, 0, 10.0);
/// dm.set(0, 1, 1, 25.0);
///
/// let clamped = DurationModel::new(&dm, TimeUnit::Minutes, false);
/// assert_eq!(clamped.duration_at(0, 1, 30.0).unwrap(), 10.0);
/// assert_eq!(clamped.duration_at(0, 1, 90.0).unwrap(), 25.0);
/// assert_eq!(clamped.duration_at(0, 1, 500.0).unwrap(), 25.0);
///
/// let strict = DurationModel::new(&dm, TimeUnit::Minutes, true);
/// assert!(strict.duration_at(0, 1, 500.0).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DurationModel<'a> {
    matrix: &'a DurationMatrix,
    horizon: TimeHorizon,
    ignore_long_trip: bool,
}

impl<'a> DurationModel<'a> {
    /// Wraps a matrix; the horizon spans the matrix's zones.
    pub fn new(matrix: &'a DurationMatrix, unit: TimeUnit, ignore_long_trip: bool) -> Self {
        Self {
            matrix,
            horizon: TimeHorizon::new(unit, matrix.zones()),
            ignore_long_trip,
        }
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &'a DurationMatrix {
        self.matrix
    }

    /// The operating horizon.
    pub fn horizon(&self) -> TimeHorizon {
        self.horizon
    }

    /// Whether trips past the horizon are rejected.
    pub fn ignore_long_trip(&self) -> bool {
        self.ignore_long_trip
    }

    /// Hour-zone used for a departure at `t`.
    pub fn hour_at(&self, t: f64) -> Result<usize, OutOfHorizon> {
        let zones = self.horizon.zones();
        let hour = self.horizon.zone_of(t);
        if hour < zones {
            Ok(hour)
        } else if self.ignore_long_trip || zones == 0 {
            Err(OutOfHorizon { hour, zones })
        } else {
            Ok(zones - 1)
        }
    }

    /// Travel time from `from` to `to` departing at `t`.
    #[inline]
    pub fn duration_at(&self, from: usize, to: usize, t: f64) -> Result<f64, OutOfHorizon> {
        let hour = self.hour_at(t)?;
        Ok(self.matrix.get(from, to, hour))
    }

    /// Returns `true` if time `t` is acceptable as an arrival or finish time.
    ///
    /// Always true when long trips are clamped.
    pub fn within_horizon(&self, t: f64) -> bool {
        !self.ignore_long_trip || t < self.horizon.end()
    }

    /// Departs `from` at `t` and returns the arrival time at `to`, or an
    /// error if the departure or the arrival leaves the horizon.
    pub fn travel(&self, from: usize, to: usize, t: f64) -> Result<f64, OutOfHorizon> {
        let arrival = t + self.duration_at(from, to, t)?;
        if self.within_horizon(arrival) {
            Ok(arrival)
        } else {
            Err(OutOfHorizon {
                hour: self.horizon.zone_of(arrival),
                zones: self.horizon.zones(),
            })
        }
    }
}
