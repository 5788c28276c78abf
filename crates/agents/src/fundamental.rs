//! Fundamental trader - trades the gap between price and fundamental value.
//!
//! Each trader draws a private belief bias once at construction, computes its
//! own fair value from the latent true-value process, and trades toward fair
//! with size proportional to the mispricing. The stress regimes reshape the
//! response: Pump-and-Dump turns it into a laddered distribution seller,
//! Short-Squeeze into a trapped short that capitulates once the price runs
//! 15% past fair.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp1, StandardNormal};
use types::{Order, Price, Quantity, Scenario, Side, SimTime};

use crate::{Agent, AgentClass, Observation};

/// Configuration for a FundamentalTrader agent.
#[derive(Debug, Clone)]
pub struct FundamentalConfig {
    /// Mean seconds between wake-ups.
    pub wake_mean: f64,
    /// Accelerated wake mean under Pump-and-Dump.
    pub pump_wake_mean: f64,
    /// Standard deviation of the one-shot belief bias around 1.0.
    pub belief_sigma: f64,
    /// Fair-value haircut applied under Short-Squeeze.
    pub squeeze_discount: f64,
}

impl Default for FundamentalConfig {
    fn default() -> Self {
        Self {
            wake_mean: 5.0,
            pump_wake_mean: 0.5,
            belief_sigma: 0.005,
            squeeze_discount: 0.95,
        }
    }
}

/// Value investor anchored to the true-value process.
pub struct FundamentalTrader {
    config: FundamentalConfig,
    scenario: Scenario,
    rng: StdRng,
    next_act: SimTime,
    /// Multiplicative belief bias, drawn once at construction.
    belief: f64,
}

impl FundamentalTrader {
    /// Create a trader with its own seeded generator and belief draw.
    pub fn new(config: FundamentalConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let z: f64 = rng.sample(StandardNormal);
        let belief = 1.0 + config.belief_sigma * z;
        Self {
            config,
            scenario: Scenario::Normal,
            rng,
            next_act: 0.0,
            belief,
        }
    }

    fn pump_order(&mut self, market: f64, deviation: f64, time: SimTime) -> Option<Order> {
        if deviation.abs() < 0.005 {
            return None;
        }
        // Keep distributing in consistent size (60% of the normal response).
        let base = 50.0 + (deviation.abs() / 0.02 * 400.0).round();
        let quantity = Quantity(((base * 0.6) as u32).max(20));

        if deviation > 0.0 {
            if self.rng.random_bool(0.3) {
                // Passive exit just under the market.
                Some(Order::new(
                    Side::Sell,
                    Price::from_float(market * 0.99),
                    quantity,
                    time,
                ))
            } else {
                // Laddered offers above the market keep the hype fed.
                let ladder = self.rng.random_range(1.005..1.02);
                Some(Order::new(
                    Side::Sell,
                    Price::from_float(market * ladder),
                    quantity,
                    time,
                ))
            }
        } else {
            Some(Order::new(
                Side::Buy,
                Price::from_float(market * 0.99),
                quantity,
                time,
            ))
        }
    }

    fn squeeze_order(&mut self, market: f64, deviation: f64, time: SimTime) -> Option<Order> {
        if deviation > 0.15 {
            // Capitulation: cover the short aggressively through the offer.
            return Some(Order::new(
                Side::Buy,
                Price::from_float(market * 1.02),
                Quantity(5000),
                time,
            ));
        }
        if deviation > 0.0 {
            let base = 50.0 + ((deviation.abs() / 0.02).min(1.0) * 400.0).round();
            let quantity = Quantity(base as u32 * 3);
            return Some(Order::new(
                Side::Sell,
                Price::from_float(market * 0.995),
                quantity,
                time,
            ));
        }
        // The underpriced branch is inactive in this regime.
        None
    }

    fn normal_order(&mut self, fair: f64, market: f64, deviation: f64, time: SimTime) -> Option<Order> {
        if deviation.abs() < 0.01 {
            return None;
        }
        let aggressiveness = (deviation.abs() / 0.02).min(1.0);
        let quantity = Quantity(50 + (aggressiveness * 400.0).round() as u32);

        // Interpolate between own fair value (patient) and just inside the
        // market (aggressive).
        if deviation > 0.0 {
            let price = (1.0 - aggressiveness) * fair + aggressiveness * (market * 0.998);
            Some(Order::new(
                Side::Sell,
                Price::from_float(price),
                quantity,
                time,
            ))
        } else {
            let price = (1.0 - aggressiveness) * fair + aggressiveness * (market * 1.002);
            Some(Order::new(
                Side::Buy,
                Price::from_float(price),
                quantity,
                time,
            ))
        }
    }
}

impl Agent for FundamentalTrader {
    fn class(&self) -> AgentClass {
        AgentClass::Fundamental
    }

    fn set_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
    }

    fn act(&mut self, obs: &Observation) -> Option<Order> {
        if obs.time < self.next_act {
            return None;
        }
        let wake_mean = if self.scenario == Scenario::PumpDump {
            self.config.pump_wake_mean
        } else {
            self.config.wake_mean
        };
        let delay: f64 = self.rng.sample(Exp1);
        self.next_act = obs.time + delay * wake_mean;

        // Price discovery off the tape, not the quote.
        let market = obs.last_price.to_float();
        let mut fair = obs.true_value.to_float() * self.belief;
        if self.scenario == Scenario::ShortSqueeze {
            fair *= self.config.squeeze_discount;
        }
        let deviation = (market - fair) / fair;

        match self.scenario {
            Scenario::PumpDump => self.pump_order(market, deviation, obs.time),
            Scenario::ShortSqueeze => self.squeeze_order(market, deviation, obs.time),
            Scenario::Normal => self.normal_order(fair, market, deviation, obs.time),
        }
    }
}
