//! Noise trader - uninformed flow with lognormal sizes.
//!
//! In the normal regime the trader flips a coin and displaces its price from
//! the mid by a volatility-scaled random impact. Short-Squeeze tilts the coin
//! toward selling. Pump-and-Dump replaces the coin with a herding rule: buy
//! probability starts at 90% and collapses as drawdown from the peak grows,
//! ending in outright panic selling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp1, LogNormal, StandardNormal};
use types::{Order, Price, Quantity, Scenario, Side, SimTime};

use crate::{Agent, AgentClass, Observation};

/// Configuration for a NoiseTrader agent.
#[derive(Debug, Clone)]
pub struct NoiseConfig {
    /// Mean seconds between wake-ups.
    pub wake_mean: f64,
    /// Wake-rate multiplier under Pump-and-Dump.
    pub pump_wake_speedup: f64,
    /// Lognormal size distribution parameters.
    pub size_mu: f64,
    pub size_sigma: f64,
    /// Price impact floor as a fraction of mid.
    pub base_impact: f64,
    /// Additional impact per unit of realized volatility.
    pub vol_impact: f64,
    /// Buy probability under Short-Squeeze.
    pub squeeze_buy_prob: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            wake_mean: 15.0,
            pump_wake_speedup: 5.0,
            size_mu: 4.0,
            size_sigma: 0.5,
            base_impact: 0.05,
            vol_impact: 0.5,
            squeeze_buy_prob: 0.35,
        }
    }
}

/// Uninformed trader supplying random order flow.
pub struct NoiseTrader {
    config: NoiseConfig,
    scenario: Scenario,
    rng: StdRng,
    next_act: SimTime,
    size_dist: LogNormal<f64>,
}

impl NoiseTrader {
    /// Create a trader with its own seeded generator.
    pub fn new(config: NoiseConfig, seed: u64) -> Self {
        let size_dist = LogNormal::new(config.size_mu, config.size_sigma)
            .expect("lognormal size parameters are valid");
        Self {
            config,
            scenario: Scenario::Normal,
            rng: StdRng::seed_from_u64(seed),
            next_act: 0.0,
            size_dist,
        }
    }

    /// Herding behavior under Pump-and-Dump: hype, wavering, then panic.
    fn pump_order(&mut self, obs: &Observation) -> Order {
        let mid = obs.mid.to_float();
        let peak = obs.peak_price.to_float();
        let drawdown = if peak > 0.0 {
            ((peak - mid) / peak).max(0.0)
        } else {
            0.0
        };
        let buy_prob = 0.9 - drawdown * 8.0;
        let size: f64 = self.rng.sample(self.size_dist);

        if buy_prob < 0.05 {
            // Full panic: dump well through the bid in size.
            let quantity = Quantity(((size * 8.0) as u32).clamp(100, 2000));
            return Order::new(
                Side::Sell,
                Price::from_float(mid * 0.85),
                quantity,
                obs.time,
            );
        }

        let side = if self.rng.random_bool(buy_prob) {
            Side::Buy
        } else {
            Side::Sell
        };
        let mult = if self.rng.random_bool(0.2) { 3.0 } else { 1.5 };
        let quantity = Quantity(((size * mult) as u32).clamp(1, 500));
        match side {
            Side::Buy => Order::new(Side::Buy, Price::from_float(mid * 1.05), quantity, obs.time),
            Side::Sell => Order::new(
                Side::Sell,
                Price::from_float(mid * 0.95),
                quantity,
                obs.time,
            ),
        }
    }

    /// Coin-flip flow with volatility-scaled displacement.
    fn displaced_order(&mut self, obs: &Observation, buy_prob: f64) -> Order {
        let mid = obs.mid.to_float();
        let side = if self.rng.random_bool(buy_prob) {
            Side::Buy
        } else {
            Side::Sell
        };
        let z: f64 = self.rng.sample(StandardNormal);
        let impact =
            z.abs() * (self.config.base_impact + self.config.vol_impact * obs.realized_vol) * mid;
        let price = match side {
            Side::Buy => mid + impact,
            Side::Sell => mid - impact,
        };
        let size: f64 = self.rng.sample(self.size_dist);
        let quantity = Quantity((size as u32).clamp(1, 200));
        Order::new(side, Price::from_float(price), quantity, obs.time)
    }
}

impl Agent for NoiseTrader {
    fn class(&self) -> AgentClass {
        AgentClass::Noise
    }

    fn set_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
    }

    fn act(&mut self, obs: &Observation) -> Option<Order> {
        if obs.time < self.next_act {
            return None;
        }
        let wake_mean = if self.scenario == Scenario::PumpDump {
            self.config.wake_mean / self.config.pump_wake_speedup
        } else {
            self.config.wake_mean
        };
        let delay: f64 = self.rng.sample(Exp1);
        self.next_act = obs.time + delay * wake_mean;

        let order = match self.scenario {
            Scenario::PumpDump => self.pump_order(obs),
            Scenario::ShortSqueeze => self.displaced_order(obs, self.config.squeeze_buy_prob),
            Scenario::Normal => self.displaced_order(obs, 0.5),
        };
        Some(order)
    }
}
