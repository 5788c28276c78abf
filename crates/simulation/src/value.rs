//! The latent true-value process.
//!
//! Fundamental traders anchor on a geometric Brownian motion that only they
//! can observe. The full profile calibrates drift and volatility to a
//! trading-year clock; the minimal profile applies a raw lognormal step.

use rand::Rng;
use rand_distr::StandardNormal;

/// Seconds in a trading year: 252 sessions of 6.5 hours.
pub const TRADING_SECONDS_PER_YEAR: f64 = 252.0 * 6.5 * 3600.0;

/// Per-tick parameters of the value process.
#[derive(Debug, Clone, Copy)]
pub struct ValueProcessConfig {
    /// Deterministic log-drift applied each tick.
    pub drift_per_tick: f64,
    /// Standard deviation of the log-shock applied each tick.
    pub shock_scale: f64,
}

impl ValueProcessConfig {
    /// GBM calibrated from annualized drift and volatility over `dt`
    /// simulation seconds per tick.
    pub fn calibrated(annual_drift: f64, annual_vol: f64, dt: f64) -> Self {
        let dt_year = dt / TRADING_SECONDS_PER_YEAR;
        Self {
            drift_per_tick: (annual_drift - 0.5 * annual_vol * annual_vol) * dt_year,
            shock_scale: annual_vol * dt_year.sqrt(),
        }
    }

    /// Driftless lognormal step with a fixed per-tick sigma.
    pub fn raw(step_sigma: f64) -> Self {
        Self {
            drift_per_tick: 0.0,
            shock_scale: step_sigma,
        }
    }

    /// A constant value process. Useful in tests.
    pub fn frozen() -> Self {
        Self {
            drift_per_tick: 0.0,
            shock_scale: 0.0,
        }
    }
}

/// Evolving fundamental value.
#[derive(Debug, Clone)]
pub struct TrueValueProcess {
    value: f64,
    config: ValueProcessConfig,
}

impl TrueValueProcess {
    /// Start the process at an initial value.
    pub fn new(initial: f64, config: ValueProcessConfig) -> Self {
        Self {
            value: initial,
            config,
        }
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Advance one tick and return the new value.
    pub fn step(&mut self, rng: &mut impl Rng) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        self.value *= (self.config.drift_per_tick + self.config.shock_scale * z).exp();
        self.value
    }
}
