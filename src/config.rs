//! Binary configuration, read from the environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `OUTCRY_PUBLISH_ADDR` | `127.0.0.1:5555` | frame publisher bind address |
//! | `OUTCRY_COMMAND_ADDR` | `127.0.0.1:5556` | command listener bind address |
//! | `OUTCRY_PROFILE` | `full` | engine profile (`full` / `minimal`) |
//! | `OUTCRY_SEED` | random | master seed for a reproducible run |

use simulation::EngineProfile;

/// Runtime options for the engine binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub publish_addr: String,
    pub command_addr: String,
    pub profile: EngineProfile,
    pub seed: Option<u64>,
    /// Wall-clock tick period in milliseconds (50 Hz).
    pub tick_interval_ms: u64,
    /// Polling sleep while paused.
    pub pause_poll_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            publish_addr: "127.0.0.1:5555".to_string(),
            command_addr: "127.0.0.1:5556".to_string(),
            profile: EngineProfile::Full,
            seed: None,
            tick_interval_ms: 20,
            pause_poll_ms: 50,
        }
    }
}

impl AppConfig {
    /// Read options from the environment, falling back to defaults.
    ///
    /// Unparseable values fall back silently; a bad profile name falls back
    /// to the full profile.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("OUTCRY_PUBLISH_ADDR") {
            config.publish_addr = addr;
        }
        if let Ok(addr) = std::env::var("OUTCRY_COMMAND_ADDR") {
            config.command_addr = addr;
        }
        if let Ok(name) = std::env::var("OUTCRY_PROFILE")
            && let Some(profile) = EngineProfile::from_name(&name)
        {
            config.profile = profile;
        }
        if let Ok(seed) = std::env::var("OUTCRY_SEED")
            && let Ok(seed) = seed.parse()
        {
            config.seed = Some(seed);
        }
        config
    }
}
