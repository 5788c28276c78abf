//! Per-window sentiment aggregation and derived scenario metrics.

use agents::AgentClass;
use types::{ClassVolume, Frame, Quantity, Scenario, Side};

/// Filled volume by agent class and side, accumulated over one broadcast
/// window and reset after every SENTIMENT frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentBoard {
    fundamental: ClassVolume,
    momentum: ClassVolume,
    maker: ClassVolume,
    noise: ClassVolume,
    user: ClassVolume,
}

impl SentimentBoard {
    /// Accumulate an agent fill.
    pub fn record(&mut self, class: AgentClass, side: Side, quantity: Quantity) {
        let slot = match class {
            AgentClass::Fundamental => &mut self.fundamental,
            AgentClass::Momentum => &mut self.momentum,
            AgentClass::MarketMaker => &mut self.maker,
            AgentClass::Noise => &mut self.noise,
        };
        slot.add(side, quantity);
    }

    /// Accumulate a user fill.
    pub fn record_user(&mut self, side: Side, quantity: Quantity) {
        self.user.add(side, quantity);
    }

    /// Total filled volume across all classes this window.
    pub fn total(&self) -> u64 {
        self.fundamental.total()
            + self.momentum.total()
            + self.maker.total()
            + self.noise.total()
            + self.user.total()
    }

    /// Render the SENTIMENT frame for this window.
    pub fn frame(&self) -> Frame {
        Frame::Sentiment {
            fundamental: self.fundamental,
            momentum: self.momentum,
            maker: self.maker,
            noise: self.noise,
            user: self.user,
        }
    }

    /// Clear all accumulators for the next window.
    pub fn reset(&mut self) {
        *self = SentimentBoard::default();
    }
}

/// Derive the SCENARIO_METRICS frame from current engine state.
///
/// - `hype`: remaining buy appetite under Pump-and-Dump, decaying with
///   drawdown from the peak
/// - `bubble`: percentage premium of price over true value
/// - `panic`: squeeze pressure, saturating at 100
pub fn scenario_metrics(
    scenario: Scenario,
    price: f64,
    true_value: f64,
    peak: f64,
    short_interest: i64,
) -> Frame {
    let drawdown = if peak > 0.0 { (peak - price) / peak } else { 0.0 };
    let hype = if scenario == Scenario::PumpDump {
        ((0.9 - drawdown * 8.0) * 100.0).max(0.0)
    } else {
        0.0
    };
    let bubble = if price > true_value {
        (price - true_value) / true_value * 100.0
    } else {
        0.0
    };
    let panic = if scenario == Scenario::ShortSqueeze {
        (bubble * 3.0).min(100.0)
    } else {
        0.0
    };
    Frame::ScenarioMetrics {
        hype,
        bubble,
        short_interest,
        panic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_accumulates_and_resets() {
        let mut board = SentimentBoard::default();
        board.record(AgentClass::Fundamental, Side::Sell, Quantity(450));
        board.record(AgentClass::Noise, Side::Buy, Quantity(30));
        board.record_user(Side::Buy, Quantity(10));

        assert_eq!(board.total(), 490);
        match board.frame() {
            Frame::Sentiment {
                fundamental,
                noise,
                user,
                ..
            } => {
                assert_eq!(fundamental.sell, 450);
                assert_eq!(noise.buy, 30);
                assert_eq!(user.buy, 10);
            }
            other => panic!("unexpected frame {other:?}"),
        }

        board.reset();
        assert_eq!(board.total(), 0);
    }

    #[test]
    fn test_hype_only_under_pump() {
        let frame = scenario_metrics(Scenario::Normal, 100.0, 100.0, 100.0, 0);
        let Frame::ScenarioMetrics { hype, .. } = frame else {
            panic!("wrong frame");
        };
        assert_eq!(hype, 0.0);

        let frame = scenario_metrics(Scenario::PumpDump, 100.0, 100.0, 100.0, 0);
        let Frame::ScenarioMetrics { hype, .. } = frame else {
            panic!("wrong frame");
        };
        assert!((hype - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_hype_decays_with_drawdown_and_floors_at_zero() {
        // 10% off the peak: 0.9 - 0.8 = 0.1 -> 10
        let Frame::ScenarioMetrics { hype, .. } =
            scenario_metrics(Scenario::PumpDump, 90.0, 100.0, 100.0, 0)
        else {
            panic!("wrong frame");
        };
        assert!((hype - 10.0).abs() < 1e-6);

        // 50% off the peak: deeply negative, clamped to 0
        let Frame::ScenarioMetrics { hype, .. } =
            scenario_metrics(Scenario::PumpDump, 50.0, 100.0, 100.0, 0)
        else {
            panic!("wrong frame");
        };
        assert_eq!(hype, 0.0);
    }

    #[test]
    fn test_bubble_and_panic() {
        let Frame::ScenarioMetrics { bubble, panic, .. } =
            scenario_metrics(Scenario::ShortSqueeze, 120.0, 100.0, 120.0, 0)
        else {
            panic!("wrong frame");
        };
        assert!((bubble - 20.0).abs() < 1e-9);
        assert!((panic - 60.0).abs() < 1e-9);

        // Saturation at 100
        let Frame::ScenarioMetrics { panic, .. } =
            scenario_metrics(Scenario::ShortSqueeze, 200.0, 100.0, 200.0, 0)
        else {
            panic!("wrong frame");
        };
        assert_eq!(panic, 100.0);
    }

    #[test]
    fn test_no_bubble_below_true_value() {
        let Frame::ScenarioMetrics { bubble, panic, .. } =
            scenario_metrics(Scenario::ShortSqueeze, 90.0, 100.0, 100.0, -500)
        else {
            panic!("wrong frame");
        };
        assert_eq!(bubble, 0.0);
        assert_eq!(panic, 0.0);
    }
}
