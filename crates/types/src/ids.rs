//! Core identifier and time types for the market simulator.

use derive_more::{From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price scale factor: 10,000 means 4 decimal places.
/// - `10000` = $1.00
/// - `1` = $0.0001 (smallest price increment)
pub const PRICE_SCALE: i64 = 10_000;

/// Unique identifier for an order.
///
/// Ids are assigned monotonically by the engine at submission time, so
/// ordering two ids also orders the submissions they belong to. The order
/// book relies on this for its price-time tie-break.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
    From,
    Into,
)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order#{}", self.0)
    }
}

/// Simulation time in seconds since engine start.
///
/// The clock advances in fixed `dt` increments; orders carry the time of the
/// tick that produced them.
pub type SimTime = f64;

/// Simulation tick (discrete time step).
pub type Tick = u64;
