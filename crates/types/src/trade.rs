//! Trade type emitted by the matching engine.

use crate::ids::SimTime;
use crate::money::{Price, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single fill produced by the matching step.
///
/// Trades are ephemeral: the book emits them and never stores them. The
/// price is always the resting order's price; the timestamp is the incoming
/// order's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Execution price (the resting order's limit).
    pub price: Price,
    /// Number of shares exchanged.
    pub quantity: Quantity,
    /// Simulation time of the incoming order.
    pub timestamp: SimTime,
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} shares @ {}", self.quantity, self.price)
    }
}
