//! Order and side types.
//!
//! Orders are immutable once resting; the book only ever reduces their
//! remaining quantity on partial fills.

use crate::ids::{OrderId, SimTime};
use crate::money::{Price, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Order Side
// =============================================================================

/// Which side of the market the order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Returns the opposite side.
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Decode the wire representation used by the ORDER command (0=BUY, 1=SELL).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Check if this is the buy side.
    pub fn is_buy(self) -> bool {
        self == Side::Buy
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

// =============================================================================
// Order Struct
// =============================================================================

/// A limit order submitted by an agent or the external controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier (assigned by the engine, 0 as placeholder).
    pub id: OrderId,
    /// Simulation time at submission.
    pub timestamp: SimTime,
    /// Limit price, clamped to [`Price::FLOOR`] at construction.
    pub price: Price,
    /// Remaining quantity; always positive while the order is live.
    pub quantity: Quantity,
    /// Buy or Sell.
    pub side: Side,
}

impl Order {
    /// Create a new order with a placeholder id.
    ///
    /// The engine assigns the real id and timestamp when the order is
    /// submitted to the book. The price floor is enforced here so no order
    /// below $0.01 can ever exist.
    pub fn new(side: Side, price: Price, quantity: Quantity, timestamp: SimTime) -> Self {
        Self {
            id: OrderId(0),
            timestamp,
            price: price.max(Price::FLOOR),
            quantity,
            side,
        }
    }

    /// Check if this is a buy order.
    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_codes() {
        assert_eq!(Side::from_code(0), Some(Side::Buy));
        assert_eq!(Side::from_code(1), Some(Side::Sell));
        assert_eq!(Side::from_code(2), None);
        assert_eq!(Side::from_code(-1), None);
    }

    #[test]
    fn test_price_floor_applied() {
        let order = Order::new(Side::Sell, Price::from_float(0.0001), Quantity(10), 0.0);
        assert_eq!(order.price, Price::FLOOR);
    }

    #[test]
    fn test_normal_price_unchanged() {
        let order = Order::new(Side::Buy, Price::from_float(100.0), Quantity(10), 0.0);
        assert_eq!(order.price, Price::from_float(100.0));
    }
}
