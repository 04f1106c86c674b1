//! Dense time-sliced duration matrix.

use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;

/// Width of one hour-zone, expressed in the unit the matrix values use.
///
/// A solve call uses one unit throughout: matrix entries, vehicle start
/// times and results are all in minutes or all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Durations in minutes; one zone spans 60.
    #[default]
    Minutes,
    /// Durations in seconds; one zone spans 3600.
    Seconds,
}

impl TimeUnit {
    /// Number of units in one hour-zone.
    pub fn zone_width(self) -> f64 {
        match self {
            TimeUnit::Minutes => 60.0,
            TimeUnit::Seconds => 3600.0,
        }
    }
}

/// The operating day covered by a duration matrix.
///
/// # Examples
///
/// ```
/// use td_routing::duration::{TimeHorizon, TimeUnit};
///
/// let h = TimeHorizon::new(TimeUnit::Minutes, 12);
/// assert_eq!(h.zone_of(0.0), 0);
/// assert_eq!(h.zone_of(59.9), 0);
/// assert_eq!(h.zone_of(60.0), 1);
/// assert_eq!(h.end(), 720.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeHorizon {
    unit: TimeUnit,
    zones: usize,
}

impl TimeHorizon {
    /// Creates a horizon of `zones` hour-zones.
    pub fn new(unit: TimeUnit, zones: usize) -> Self {
        Self { unit, zones }
    }

    /// The time unit.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Number of hour-zones.
    pub fn zones(&self) -> usize {
        self.zones
    }

    /// Unclamped zone index of time `t`; negative times map to zone 0.
    pub fn zone_of(&self, t: f64) -> usize {
        if t <= 0.0 {
            return 0;
        }
        let z = (t / self.unit.zone_width()).floor();
        if z >= usize::MAX as f64 {
            usize::MAX
        } else {
            z as usize
        }
    }

    /// First instant past the last zone (`T * zone_width`).
    pub fn end(&self) -> f64 {
        self.zones as f64 * self.unit.zone_width()
    }
}

/// A dense `n × n × T` duration matrix stored row-major, zone innermost.
///
/// `get(u, v, h)` is the travel time from `u` to `v` when departing in
/// hour-zone `h`. Symmetry is not assumed.
///
/// # Examples
///
/// ```
/// use td_routing::duration::DurationMatrix;
///
/// let mut dm = DurationMatrix::new(3, 2);
/// dm.set(0, 1, 1, 15.0);
/// assert_eq!(dm.get(0, 1, 1), 15.0);
/// assert_eq!(dm.get(1, 0, 1), 0.0);
/// assert_eq!(dm.size(), 3);
/// assert_eq!(dm.zones(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Vec<f64>>>", into = "Vec<Vec<Vec<f64>>>")]
pub struct DurationMatrix {
    data: Vec<f64>,
    size: usize,
    zones: usize,
}

impl DurationMatrix {
    /// Creates a zero matrix with `size` locations and `zones` hour-zones.
    pub fn new(size: usize, zones: usize) -> Self {
        Self {
            data: vec![0.0; size * size * zones],
            size,
            zones,
        }
    }

    /// Builds a matrix from nested `[from][to][zone]` vectors.
    ///
    /// Rejects ragged input, a zone count of zero, and negative or
    /// non-finite entries.
    pub fn from_nested(nested: Vec<Vec<Vec<f64>>>) -> Result<Self, InvalidInput> {
        let n = nested.len();
        let shape_err = |reason: String| InvalidInput::MatrixShape { n, reason };
        let zones = nested
            .first()
            .and_then(|row| row.first())
            .map(|cell| cell.len())
            .unwrap_or(0);
        if n > 0 && zones == 0 {
            return Err(shape_err("no hour zones".into()));
        }

        let mut dm = Self::new(n, zones);
        for (from, row) in nested.iter().enumerate() {
            if row.len() != n {
                return Err(shape_err(format!("row {from} has {} columns", row.len())));
            }
            for (to, cell) in row.iter().enumerate() {
                if cell.len() != zones {
                    return Err(shape_err(format!(
                        "cell ({from}, {to}) has {} zones",
                        cell.len()
                    )));
                }
                for (zone, &value) in cell.iter().enumerate() {
                    if !value.is_finite() || value < 0.0 {
                        return Err(InvalidInput::InvalidDuration {
                            from,
                            to,
                            zone,
                            value,
                        });
                    }
                    dm.set(from, to, zone, value);
                }
            }
        }
        Ok(dm)
    }

    /// Builds a matrix whose every zone repeats the given `n × n` grid.
    pub fn from_static(grid: &[Vec<f64>], zones: usize) -> Result<Self, InvalidInput> {
        let nested = grid
            .iter()
            .map(|row| row.iter().map(|&d| vec![d; zones]).collect())
            .collect();
        Self::from_nested(nested)
    }

    #[inline]
    fn index(&self, from: usize, to: usize, zone: usize) -> usize {
        (from * self.size + to) * self.zones + zone
    }

    /// Travel time from `from` to `to` departing in `zone`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize, zone: usize) -> f64 {
        self.data[self.index(from, to, zone)]
    }

    /// Sets the travel time from `from` to `to` in `zone`.
    pub fn set(&mut self, from: usize, to: usize, zone: usize, duration: f64) {
        let i = self.index(from, to, zone);
        self.data[i] = duration;
    }

    /// Number of locations.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of hour-zones.
    pub fn zones(&self) -> usize {
        self.zones
    }

    /// Returns a copy with every entry multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            data: self.data.iter().map(|d| d * factor).collect(),
            size: self.size,
            zones: self.zones,
        }
    }

    /// Converts back to nested `[from][to][zone]` vectors.
    pub fn to_nested(&self) -> Vec<Vec<Vec<f64>>> {
        (0..self.size)
            .map(|u| {
                (0..self.size)
                    .map(|v| (0..self.zones).map(|h| self.get(u, v, h)).collect())
                    .collect()
            })
            .collect()
    }
}

impl TryFrom<Vec<Vec<Vec<f64>>>> for DurationMatrix {
    type Error = InvalidInput;

    fn try_from(nested: Vec<Vec<Vec<f64>>>) -> Result<Self, Self::Error> {
        Self::from_nested(nested)
    }
}

impl From<DurationMatrix> for Vec<Vec<Vec<f64>>> {
    fn from(dm: DurationMatrix) -> Self {
        dm.to_nested()
    }
}
