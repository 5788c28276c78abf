//! Market stress-regime selector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Global market regime that modulates agent behavior and derived metrics.
///
/// The regime is switched by the external controller via the `SCENARIO`
/// command and propagated to every agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Scenario {
    /// Baseline behavior.
    #[default]
    Normal,
    /// Coordinated hype followed by a cascading panic once price falls from
    /// its peak.
    PumpDump,
    /// Fundamental traders lean short and chase the price upward once it runs
    /// away from fair value.
    ShortSqueeze,
}

impl Scenario {
    /// Decode the wire representation used by the `SCENARIO` command.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Scenario::Normal),
            1 => Some(Scenario::PumpDump),
            2 => Some(Scenario::ShortSqueeze),
            _ => None,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Normal => write!(f, "NORMAL"),
            Scenario::PumpDump => write!(f, "PUMP_DUMP"),
            Scenario::ShortSqueeze => write!(f, "SHORT_SQUEEZE"),
        }
    }
}
