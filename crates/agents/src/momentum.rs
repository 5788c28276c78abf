//! Momentum trader - trades EMA crossovers of the mid.
//!
//! Keeps a short and a long exponential moving average of the mid. The EMAs
//! update on every observation, even when the wake gate suppresses trading,
//! so the signal never goes stale between actions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Exp1;
use types::{Order, Price, Quantity, Scenario, Side, SimTime};

use crate::{Agent, AgentClass, Observation};

/// Configuration for a MomentumTrader agent.
#[derive(Debug, Clone)]
pub struct MomentumConfig {
    /// Mean seconds between wake-ups in the normal regime.
    pub wake_mean: f64,
    /// Wake-rate multiplier outside the normal regime.
    pub stress_speedup: f64,
    /// Quiet period before the first possible action.
    pub initial_delay: f64,
    /// Fixed order size.
    pub order_size: u32,
    /// Signal threshold as a multiple of `realized_vol * mid`.
    pub vol_offset: f64,
    /// Signal threshold as a flat fraction of mid.
    pub price_offset: f64,
    /// Short EMA smoothing weight.
    pub short_alpha: f64,
    /// Long EMA smoothing weight.
    pub long_alpha: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            wake_mean: 3.0,
            stress_speedup: 3.0,
            initial_delay: 20.0,
            order_size: 50,
            vol_offset: 0.05,
            price_offset: 0.0,
            short_alpha: 0.05,
            long_alpha: 0.01,
        }
    }
}

impl MomentumConfig {
    /// Parameters for the minimal engine profile: flat threshold independent
    /// of realized volatility, and a shorter quiet period.
    pub fn minimal() -> Self {
        Self {
            initial_delay: 10.0,
            vol_offset: 0.0,
            price_offset: 0.0002,
            ..Default::default()
        }
    }
}

/// Trend follower on short/long EMA divergence.
pub struct MomentumTrader {
    config: MomentumConfig,
    scenario: Scenario,
    rng: StdRng,
    next_act: SimTime,
    ema_short: f64,
    ema_long: f64,
}

impl MomentumTrader {
    /// Create a trader with both EMAs seeded at the initial price.
    pub fn new(config: MomentumConfig, initial_price: Price, seed: u64) -> Self {
        let seed_price = initial_price.to_float();
        let next_act = config.initial_delay;
        Self {
            config,
            scenario: Scenario::Normal,
            rng: StdRng::seed_from_u64(seed),
            next_act,
            ema_short: seed_price,
            ema_long: seed_price,
        }
    }
}

impl Agent for MomentumTrader {
    fn class(&self) -> AgentClass {
        AgentClass::Momentum
    }

    fn set_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
    }

    fn act(&mut self, obs: &Observation) -> Option<Order> {
        // The EMAs track every observation, acting or not.
        let mid = obs.mid.to_float();
        self.ema_short = self.config.short_alpha * mid + (1.0 - self.config.short_alpha) * self.ema_short;
        self.ema_long = self.config.long_alpha * mid + (1.0 - self.config.long_alpha) * self.ema_long;

        if obs.time < self.next_act {
            return None;
        }
        let wake_mean = if self.scenario == Scenario::Normal {
            self.config.wake_mean
        } else {
            self.config.wake_mean / self.config.stress_speedup
        };
        let delay: f64 = self.rng.sample(Exp1);
        self.next_act = obs.time + delay * wake_mean;

        let offset =
            mid * (self.config.vol_offset * obs.realized_vol + self.config.price_offset);
        let signal = self.ema_short - self.ema_long;

        if signal > offset {
            Some(Order::new(
                Side::Buy,
                Price::from_float(mid + offset),
                Quantity(self.config.order_size),
                obs.time,
            ))
        } else if signal < -offset {
            Some(Order::new(
                Side::Sell,
                Price::from_float(mid - offset),
                Quantity(self.config.order_size),
                obs.time,
            ))
        } else {
            None
        }
    }
}
