//! Simulation crate: the tick engine for the open-outcry simulator.
//!
//! Coordinates the per-tick pipeline around the order book and the agent
//! population:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                Engine.step()                 │
//! │                                              │
//! │  1. Execute queued user orders   (TRADE)     │
//! │  2. Advance clock + true value               │
//! │  3. Build the shared Observation             │
//! │  4. Agents act, orders match immediately     │
//! │  5. Update realized volatility               │
//! │  6. Every Nth tick: decay + broadcast        │
//! │     (SENTIMENT, SCENARIO_METRICS,            │
//! │      DATA, METRICS)                          │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The engine is confined to one thread; pacing and command polling belong
//! to the caller. [`Engine::apply`] folds controller commands into state and
//! returns [`EngineSignal::Stop`] on STOP.

mod config;
mod runner;
mod sentiment;
mod value;

pub use config::{EngineProfile, SimulationConfig};
pub use runner::{Engine, EngineSignal};
pub use sentiment::{SentimentBoard, scenario_metrics};
pub use value::{TRADING_SECONDS_PER_YEAR, TrueValueProcess, ValueProcessConfig};
