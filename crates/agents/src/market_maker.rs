//! Market maker - quotes one side of the book around the mid.
//!
//! Each wake-up the maker flips a coin for the side, prices a spread away
//! from the mid scaled by realized volatility, and posts a resting quote.
//! Under Pump-and-Dump the quoted spread widens 4x so the price can move
//! vertically without the maker pinning it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Exp1;
use types::{Order, Price, Quantity, Scenario, Side, SimTime};

use crate::{Agent, AgentClass, Observation};

/// Configuration for a MarketMaker agent.
#[derive(Debug, Clone)]
pub struct MakerConfig {
    /// Mean seconds between wake-ups.
    pub wake_mean: f64,
    /// Minimum quote size.
    pub min_size: u32,
    /// Maximum quote size.
    pub max_size: u32,
    /// Spread as a multiple of `realized_vol * mid`.
    pub vol_spread: f64,
    /// Absolute spread floor in dollars.
    pub min_spread: f64,
    /// Uniform jitter range applied to the spread.
    pub jitter_low: f64,
    pub jitter_high: f64,
    /// Spread multiplier under Pump-and-Dump.
    pub pump_spread_mult: f64,
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            wake_mean: 1.5,
            min_size: 100,
            max_size: 500,
            vol_spread: 0.2,
            min_spread: 0.01,
            jitter_low: 0.9,
            jitter_high: 1.1,
            pump_spread_mult: 4.0,
        }
    }
}

impl MakerConfig {
    /// Parameters for the minimal engine profile: slower quoting in smaller
    /// size.
    pub fn minimal() -> Self {
        Self {
            wake_mean: 10.0,
            min_size: 10,
            max_size: 100,
            ..Default::default()
        }
    }
}

/// Liquidity provider quoting one side at a time.
pub struct MarketMaker {
    config: MakerConfig,
    scenario: Scenario,
    rng: StdRng,
    next_act: SimTime,
}

impl MarketMaker {
    /// Create a maker with its own seeded generator.
    pub fn new(config: MakerConfig, seed: u64) -> Self {
        Self {
            config,
            scenario: Scenario::Normal,
            rng: StdRng::seed_from_u64(seed),
            next_act: 0.0,
        }
    }
}

impl Agent for MarketMaker {
    fn class(&self) -> AgentClass {
        AgentClass::MarketMaker
    }

    fn set_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
    }

    fn act(&mut self, obs: &Observation) -> Option<Order> {
        if obs.time < self.next_act {
            return None;
        }
        let delay: f64 = self.rng.sample(Exp1);
        self.next_act = obs.time + delay * self.config.wake_mean;

        let side = if self.rng.random_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        };

        let mid = obs.mid.to_float();
        let jitter = self
            .rng
            .random_range(self.config.jitter_low..self.config.jitter_high);
        let mut spread = (self.config.vol_spread * obs.realized_vol * mid)
            .max(self.config.min_spread)
            * jitter;
        if self.scenario == Scenario::PumpDump {
            spread *= self.config.pump_spread_mult;
        }

        let price = match side {
            Side::Buy => mid - spread,
            Side::Sell => mid + spread,
        };
        let size = self
            .rng
            .random_range(self.config.min_size..=self.config.max_size);

        Some(Order::new(
            side,
            Price::from_float(price),
            Quantity(size),
            obs.time,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(mid: f64, vol: f64, time: f64) -> Observation {
        Observation {
            mid: Price::from_float(mid),
            last_price: Price::from_float(mid),
            true_value: Price::from_float(mid),
            realized_vol: vol,
            peak_price: Price::from_float(mid),
            time,
        }
    }

    #[test]
    fn test_quote_brackets_the_mid() {
        for seed in 0..20 {
            let mut maker = MarketMaker::new(MakerConfig::default(), seed);
            let order = maker.act(&obs(100.0, 0.05, 60.0)).unwrap();

            // spread = max(0.01, 0.2 * 0.05 * 100) * jitter in [0.9, 1.1)
            let offset = (order.price.to_float() - 100.0).abs();
            assert!(offset >= 0.899 && offset <= 1.101, "offset = {offset}");
            match order.side {
                Side::Buy => assert!(order.price < Price::from_float(100.0)),
                Side::Sell => assert!(order.price > Price::from_float(100.0)),
            }
            assert!((100..=500).contains(&order.quantity.raw()));
        }
    }

    #[test]
    fn test_spread_floor_applies_in_calm_markets() {
        let mut maker = MarketMaker::new(MakerConfig::default(), 3);
        let order = maker.act(&obs(100.0, 0.0, 60.0)).unwrap();

        let offset = (order.price.to_float() - 100.0).abs();
        assert!(offset <= 0.011 + 1e-9, "offset = {offset}");
    }

    #[test]
    fn test_pump_widens_spread_fourfold() {
        for seed in 0..20 {
            let mut maker = MarketMaker::new(MakerConfig::default(), seed);
            maker.set_scenario(Scenario::PumpDump);
            let order = maker.act(&obs(100.0, 0.05, 60.0)).unwrap();

            let offset = (order.price.to_float() - 100.0).abs();
            assert!(offset >= 3.59 && offset <= 4.41, "offset = {offset}");
        }
    }

    #[test]
    fn test_wake_schedule_gates_activity() {
        let mut maker = MarketMaker::new(MakerConfig::default(), 11);
        let mut acted = 0;
        // Poll far more often than the 1.5s wake mean; the gate must skip
        // most polls while still allowing some activity.
        for i in 0..1000 {
            let time = i as f64 * 0.01;
            if maker.act(&obs(100.0, 0.01, time)).is_some() {
                acted += 1;
            }
        }
        assert!(acted > 0);
        assert!(acted < 100, "acted = {acted}");
    }

    #[test]
    fn test_minimal_profile_sizes() {
        let mut maker = MarketMaker::new(MakerConfig::minimal(), 5);
        let order = maker.act(&obs(100.0, 0.01, 60.0)).unwrap();
        assert!((10..=100).contains(&order.quantity.raw()));
    }
}
