//! Loading and unloading time at stops.

use serde::{Deserialize, Serialize};

/// Additive handling time spent at the depot and at customers.
///
/// Before leaving the depot a vehicle loads the whole cycle's demand,
/// taking `loading_init + loading_per_unit * total_load`. At each customer
/// it unloads that customer's demand, taking
/// `unloading_init + unloading_per_unit * demand`. All zero by default.
///
/// # Examples
///
/// ```
/// use td_routing::duration::ServiceTimes;
///
/// let st = ServiceTimes::default()
///     .with_loading(5.0, 0.5)
///     .with_unloading(2.0, 1.0);
/// assert_eq!(st.loading(10), 10.0);
/// assert_eq!(st.unloading(3), 5.0);
/// assert!(ServiceTimes::default().is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceTimes {
    /// Fixed loading time per depot departure.
    pub loading_init: f64,
    /// Loading time per demand unit.
    pub loading_per_unit: f64,
    /// Fixed unloading time per customer stop.
    pub unloading_init: f64,
    /// Unloading time per demand unit.
    pub unloading_per_unit: f64,
}

impl ServiceTimes {
    /// Sets the depot loading times.
    pub fn with_loading(mut self, init: f64, per_unit: f64) -> Self {
        self.loading_init = init;
        self.loading_per_unit = per_unit;
        self
    }

    /// Sets the customer unloading times.
    pub fn with_unloading(mut self, init: f64, per_unit: f64) -> Self {
        self.unloading_init = init;
        self.unloading_per_unit = per_unit;
        self
    }

    /// Time to load `total_load` units at the depot.
    pub fn loading(&self, total_load: i64) -> f64 {
        self.loading_init + self.loading_per_unit * total_load as f64
    }

    /// Time to unload `demand` units at a customer.
    pub fn unloading(&self, demand: i64) -> f64 {
        self.unloading_init + self.unloading_per_unit * demand as f64
    }

    /// Returns `true` if no handling time is configured.
    pub fn is_zero(&self) -> bool {
        self.loading_init == 0.0
            && self.loading_per_unit == 0.0
            && self.unloading_init == 0.0
            && self.unloading_per_unit == 0.0
    }
}
