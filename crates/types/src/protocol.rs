//! Wire protocol: inbound commands and outbound broadcast frames.
//!
//! Both directions are single UTF-8 text lines of whitespace-separated
//! tokens. The first token selects the kind. Malformed or unknown lines are
//! dropped silently by returning `None` from the parser; the engine never
//! halts on bad input.

use crate::money::Quantity;
use crate::order::Side;
use crate::scenario::Scenario;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Inbound Commands
// =============================================================================

/// Agent population sizes delivered with the `START` handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PopulationCounts {
    pub makers: usize,
    pub fundamentals: usize,
    pub momentum: usize,
    pub noise: usize,
}

impl PopulationCounts {
    /// Total number of agents across all classes.
    pub fn total(&self) -> usize {
        self.makers + self.fundamentals + self.momentum + self.noise
    }
}

/// An order injected by the external controller, attributed to "USER".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserOrder {
    pub side: Side,
    pub quantity: Quantity,
    pub price: f64,
}

/// A command received on the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// One-shot handshake; the engine blocks until it arrives.
    Start(PopulationCounts),
    /// Exit the loop cleanly.
    Stop,
    /// Suspend the clock; commands keep being processed.
    Pause,
    /// Resume the clock.
    Resume,
    /// Switch the market regime.
    Scenario(Scenario),
    /// Inject a user order.
    Order(UserOrder),
}

impl Command {
    /// Parse one command line.
    ///
    /// Returns `None` for malformed or unknown input. Trailing tokens beyond
    /// what a command consumes are ignored, matching lenient stream parsing
    /// on the controller side.
    pub fn parse(line: &str) -> Option<Command> {
        let mut tokens = line.split_whitespace();
        match tokens.next()? {
            "START" => {
                let makers = tokens.next()?.parse().ok()?;
                let fundamentals = tokens.next()?.parse().ok()?;
                let momentum = tokens.next()?.parse().ok()?;
                let noise = tokens.next()?.parse().ok()?;
                Some(Command::Start(PopulationCounts {
                    makers,
                    fundamentals,
                    momentum,
                    noise,
                }))
            }
            "STOP" => Some(Command::Stop),
            "PAUSE" => Some(Command::Pause),
            "RESUME" => Some(Command::Resume),
            "SCENARIO" => {
                let code: i64 = tokens.next()?.parse().ok()?;
                Scenario::from_code(code).map(Command::Scenario)
            }
            "ORDER" => {
                let side = Side::from_code(tokens.next()?.parse().ok()?)?;
                let quantity: i64 = tokens.next()?.parse().ok()?;
                let price: f64 = tokens.next()?.parse().ok()?;
                // Non-positive quantities are dropped here; price clamping is
                // left to order construction.
                if quantity <= 0 || quantity > u32::MAX as i64 {
                    return None;
                }
                Some(Command::Order(UserOrder {
                    side,
                    quantity: Quantity(quantity as u32),
                    price,
                }))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Outbound Frames
// =============================================================================

/// Buy/sell filled volume for one agent class within a broadcast window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClassVolume {
    pub buy: u64,
    pub sell: u64,
}

impl ClassVolume {
    /// Accumulate a fill.
    pub fn add(&mut self, side: Side, quantity: Quantity) {
        match side {
            Side::Buy => self.buy += quantity.raw() as u64,
            Side::Sell => self.sell += quantity.raw() as u64,
        }
    }

    /// Clear both counters.
    pub fn reset(&mut self) {
        *self = ClassVolume::default();
    }

    /// Total filled volume on both sides.
    pub fn total(&self) -> u64 {
        self.buy + self.sell
    }
}

/// A frame published on the data channel.
///
/// `Display` renders the exact token grammar the observer parses; the token
/// layout is part of the external contract and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Frame {
    /// Last price and volume accumulated since the previous DATA frame.
    Data { price: f64, volume: u64 },
    /// One per user order with non-zero fills; price is the size-weighted
    /// average fill price.
    Trade {
        agent: String,
        side: Side,
        quantity: u64,
        avg_price: f64,
    },
    /// Filled volume by class and side over the broadcast window.
    Sentiment {
        fundamental: ClassVolume,
        momentum: ClassVolume,
        maker: ClassVolume,
        noise: ClassVolume,
        user: ClassVolume,
    },
    /// Top-of-book spread and aggregated top-of-book quantity.
    Metrics { spread: f64, liquidity: u64 },
    /// Derived stress-regime metrics.
    ScenarioMetrics {
        hype: f64,
        bubble: f64,
        short_interest: i64,
        panic: f64,
    },
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Data { price, volume } => write!(f, "DATA {} {}", price, volume),
            Frame::Trade {
                agent,
                side,
                quantity,
                avg_price,
            } => write!(f, "TRADE {} {} {} {}", agent, side, quantity, avg_price),
            Frame::Sentiment {
                fundamental,
                momentum,
                maker,
                noise,
                user,
            } => write!(
                f,
                "SENTIMENT {} {} {} {} {} {} {} {} {} {}",
                fundamental.buy,
                fundamental.sell,
                momentum.buy,
                momentum.sell,
                maker.buy,
                maker.sell,
                noise.buy,
                noise.sell,
                user.buy,
                user.sell,
            ),
            Frame::Metrics { spread, liquidity } => {
                write!(f, "METRICS {} {}", spread, liquidity)
            }
            Frame::ScenarioMetrics {
                hype,
                bubble,
                short_interest,
                panic,
            } => write!(
                f,
                "SCENARIO_METRICS {} {} {} {}",
                hype, bubble, short_interest, panic
            ),
        }
    }
}
