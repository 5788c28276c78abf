//! Agent population assembly and fixed-order iteration.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use types::{PopulationCounts, Price, Scenario};

use crate::{
    Agent, FundamentalConfig, FundamentalTrader, MakerConfig, MarketMaker, MomentumConfig,
    MomentumTrader, NoiseConfig, NoiseTrader,
};

/// Parameter sets for each agent class plus the shared initial price.
#[derive(Debug, Clone)]
pub struct PopulationConfig {
    pub maker: MakerConfig,
    pub fundamental: FundamentalConfig,
    pub noise: NoiseConfig,
    pub momentum: MomentumConfig,
    /// Seeds the momentum EMAs.
    pub initial_price: Price,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            maker: MakerConfig::default(),
            fundamental: FundamentalConfig::default(),
            noise: NoiseConfig::default(),
            momentum: MomentumConfig::default(),
            initial_price: Price::from_float(100.0),
        }
    }
}

/// The heterogeneous agent ecosystem.
///
/// Agents act in a fixed order every tick: makers, fundamentals, noise,
/// momentum; within a class, construction order. Per-agent generators are
/// derived from a single master seed so a run is reproducible end to end.
pub struct AgentPopulation {
    makers: Vec<MarketMaker>,
    fundamentals: Vec<FundamentalTrader>,
    noise: Vec<NoiseTrader>,
    momentum: Vec<MomentumTrader>,
}

impl AgentPopulation {
    /// Build the population from controller-provided counts.
    pub fn new(counts: PopulationCounts, config: &PopulationConfig, seed: u64) -> Self {
        let mut seeder = StdRng::seed_from_u64(seed);
        let makers = (0..counts.makers)
            .map(|_| MarketMaker::new(config.maker.clone(), seeder.random()))
            .collect();
        let fundamentals = (0..counts.fundamentals)
            .map(|_| FundamentalTrader::new(config.fundamental.clone(), seeder.random()))
            .collect();
        let noise = (0..counts.noise)
            .map(|_| NoiseTrader::new(config.noise.clone(), seeder.random()))
            .collect();
        let momentum = (0..counts.momentum)
            .map(|_| {
                MomentumTrader::new(
                    config.momentum.clone(),
                    config.initial_price,
                    seeder.random(),
                )
            })
            .collect();
        Self {
            makers,
            fundamentals,
            noise,
            momentum,
        }
    }

    /// Number of agents across all classes.
    pub fn len(&self) -> usize {
        self.makers.len() + self.fundamentals.len() + self.noise.len() + self.momentum.len()
    }

    /// Check if the population is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Propagate a regime switch to every agent.
    pub fn set_scenario(&mut self, scenario: Scenario) {
        for agent in self.iter_mut() {
            agent.set_scenario(scenario);
        }
    }

    /// Iterate all agents in their fixed acting order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut dyn Agent> + '_ {
        self.makers
            .iter_mut()
            .map(|a| a as &mut dyn Agent)
            .chain(self.fundamentals.iter_mut().map(|a| a as &mut dyn Agent))
            .chain(self.noise.iter_mut().map(|a| a as &mut dyn Agent))
            .chain(self.momentum.iter_mut().map(|a| a as &mut dyn Agent))
    }
}
