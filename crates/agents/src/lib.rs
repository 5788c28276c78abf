//! Trading agents for the open-outcry simulator.
//!
//! Four closed behavior classes drive the market:
//! - [`MarketMaker`]: quotes one side around the mid, spread scaled by
//!   realized volatility
//! - [`FundamentalTrader`]: trades the gap between price and the latent
//!   true-value process
//! - [`NoiseTrader`]: uninformed lognormal-sized flow; herds under
//!   Pump-and-Dump
//! - [`MomentumTrader`]: EMA-crossover trend follower
//!
//! Every agent implements the [`Agent`] capability: observe the shared
//! [`Observation`] record, maybe emit one order. Each carries its own seeded
//! generator and an independent exponential wake schedule, and reacts to the
//! global [`types::Scenario`] regime.

mod fundamental;
mod market_maker;
mod momentum;
mod noise_trader;
mod population;
mod traits;

pub use fundamental::{FundamentalConfig, FundamentalTrader};
pub use market_maker::{MakerConfig, MarketMaker};
pub use momentum::{MomentumConfig, MomentumTrader};
pub use noise_trader::{NoiseConfig, NoiseTrader};
pub use population::{AgentPopulation, PopulationConfig};
pub use traits::{Agent, AgentClass, Observation};
