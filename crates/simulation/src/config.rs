//! Engine configuration and profiles.

use agents::{MakerConfig, MomentumConfig, PopulationConfig};
use types::Price;

use crate::value::ValueProcessConfig;

/// Selectable engine profile.
///
/// Both profiles share the command grammar and the core loop; they differ
/// only in maker cadence/size, the momentum threshold, the true-value step,
/// and the broadcast frame set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineProfile {
    /// Scenario-capable engine: calibrated GBM, volatility-scaled momentum
    /// threshold, all four broadcast frames.
    Full,
    /// Pared-down engine: slower small-size makers, flat momentum threshold,
    /// raw value steps, DATA + SENTIMENT frames only.
    Minimal,
}

impl EngineProfile {
    /// Parse a profile name as given on the command line or environment.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "full" => Some(EngineProfile::Full),
            "minimal" => Some(EngineProfile::Minimal),
            _ => None,
        }
    }
}

/// Configuration for the simulation engine.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Engine profile.
    pub profile: EngineProfile,
    /// Seed for the last-traded price and the momentum EMAs.
    pub initial_price: Price,
    /// Starting point of the true-value process.
    pub initial_true_value: f64,
    /// Simulation seconds per tick.
    pub dt: f64,
    /// Broadcast (and decay) every Nth tick.
    pub broadcast_interval: u64,
    /// Per-order removal probability at each decay pass.
    pub decay_probability: f64,
    /// EWMA weight of the realized-volatility estimate.
    pub vol_alpha: f64,
    /// Realized-volatility seed.
    pub initial_vol: f64,
    /// Master seed; derives every per-agent generator and the loop generator.
    pub seed: u64,
    /// Agent parameter sets.
    pub population: PopulationConfig,
    /// True-value process parameters.
    pub value: ValueProcessConfig,
}

impl SimulationConfig {
    /// The scenario-capable full profile.
    pub fn full() -> Self {
        let dt = 60.0;
        Self {
            profile: EngineProfile::Full,
            initial_price: Price::from_float(100.0),
            initial_true_value: 100.0,
            dt,
            broadcast_interval: 10,
            decay_probability: 0.05,
            vol_alpha: 0.01,
            initial_vol: 0.005,
            seed: rand::random(),
            population: PopulationConfig::default(),
            value: ValueProcessConfig::calibrated(0.28, 1.50, dt),
        }
    }

    /// The pared-down minimal profile.
    pub fn minimal() -> Self {
        let mut config = Self::full();
        config.profile = EngineProfile::Minimal;
        config.population.maker = MakerConfig::minimal();
        config.population.momentum = MomentumConfig::minimal();
        config.value = ValueProcessConfig::raw(0.01);
        config
    }

    /// Build the configuration for a named profile.
    pub fn for_profile(profile: EngineProfile) -> Self {
        match profile {
            EngineProfile::Full => Self::full(),
            EngineProfile::Minimal => Self::minimal(),
        }
    }

    /// Set the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the initial price (book seed and momentum EMA anchor).
    pub fn with_initial_price(mut self, price: Price) -> Self {
        self.initial_price = price;
        self.population.initial_price = price;
        self
    }

    /// Replace the true-value process parameters.
    pub fn with_value_process(mut self, value: ValueProcessConfig) -> Self {
        self.value = value;
        self
    }

    /// Set the broadcast interval in ticks.
    pub fn with_broadcast_interval(mut self, interval: u64) -> Self {
        self.broadcast_interval = interval;
        self
    }

    /// Set the per-pass decay probability.
    pub fn with_decay_probability(mut self, probability: f64) -> Self {
        self.decay_probability = probability;
        self
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::full()
    }
}
