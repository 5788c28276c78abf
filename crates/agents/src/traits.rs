//! Agent trait and the shared market observation record.

use types::{Order, Scenario};
use std::fmt;

/// The four trading-agent behaviors. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentClass {
    MarketMaker,
    Fundamental,
    Noise,
    Momentum,
}

impl fmt::Display for AgentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentClass::MarketMaker => write!(f, "MARKET_MAKER"),
            AgentClass::Fundamental => write!(f, "FUNDAMENTAL"),
            AgentClass::Noise => write!(f, "NOISE"),
            AgentClass::Momentum => write!(f, "MOMENTUM"),
        }
    }
}

/// Per-tick market snapshot handed to every agent.
///
/// Built once by the tick loop before agents act, so all agents within a tick
/// observe the same state regardless of the fills their predecessors cause.
/// The peak price is loop-owned: agents read it here instead of sharing a
/// mutable global.
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    /// Book mid, falling back to the last transaction price when a side is
    /// empty.
    pub mid: types::Price,
    /// Last observed transaction price.
    pub last_price: types::Price,
    /// The fundamental value process. Only fundamental traders look at it.
    pub true_value: types::Price,
    /// EWMA of absolute log returns.
    pub realized_vol: f64,
    /// Running peak of the mid, maintained by the loop for the Pump regime.
    pub peak_price: types::Price,
    /// Current simulation time in seconds.
    pub time: types::SimTime,
}

/// A trading agent.
///
/// Agents are polled every tick and gate themselves on an internal
/// exponentially-distributed wake schedule, which yields Poisson-like
/// independent activity without a global event queue. Returned orders carry a
/// placeholder id; the engine assigns the real id at submission.
pub trait Agent {
    /// Which behavior class this agent belongs to.
    fn class(&self) -> AgentClass;

    /// Switch the market regime. Called on every agent when the controller
    /// sends a SCENARIO command.
    fn set_scenario(&mut self, scenario: Scenario);

    /// Observe the market and possibly emit one order.
    fn act(&mut self, obs: &Observation) -> Option<Order>;
}
