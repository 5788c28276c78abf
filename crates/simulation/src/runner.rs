//! The simulation engine: command application and the per-tick pipeline.
//!
//! The engine runs on a single thread. The caller owns pacing and command
//! polling; [`Engine::apply`] folds commands into engine state and
//! [`Engine::step`] advances one tick, returning the frames to publish.
//!
//! Per tick, in order:
//! 1. Execute queued user orders against the book (TRADE frames)
//! 2. Advance the clock and the true-value process
//! 3. Build the shared observation (mid, vol, peak, true value)
//! 4. Let every agent act, matching each order immediately
//! 5. Update realized volatility from the last transaction price
//! 6. Every Nth tick: decay the book and emit the broadcast frames

use agents::{AgentClass, AgentPopulation, Observation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sim_core::OrderBook;
use types::{
    Command, Frame, Order, OrderId, PopulationCounts, Price, Scenario, Side, SimTime, Tick,
    UserOrder,
};

use crate::config::{EngineProfile, SimulationConfig};
use crate::sentiment::{SentimentBoard, scenario_metrics};
use crate::value::TrueValueProcess;

/// Whether the loop should keep running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSignal {
    Continue,
    Stop,
}

/// The market simulation engine.
pub struct Engine {
    config: SimulationConfig,
    book: OrderBook,
    population: AgentPopulation,
    value: TrueValueProcess,
    sentiment: SentimentBoard,
    /// Loop generator: true-value shocks and order decay.
    rng: StdRng,
    time: SimTime,
    tick: Tick,
    /// Last observed transaction price.
    price: Price,
    /// Previous tick's transaction price, for the vol estimate.
    last_price: Price,
    realized_vol: f64,
    /// Running peak of the mid. Loop-owned; reset on scenario switches away
    /// from Pump-and-Dump.
    peak: Price,
    /// Signed fundamental-trader flow: +qty on sells, -qty on buys.
    short_interest: i64,
    scenario: Scenario,
    paused: bool,
    /// Volume filled since the previous DATA frame.
    window_volume: u64,
    next_order_id: u64,
    /// User orders received but not yet executed (accumulates while paused).
    pending_user_orders: Vec<UserOrder>,
}

impl Engine {
    /// Build an engine for a controller-provided population.
    pub fn new(config: SimulationConfig, counts: PopulationCounts) -> Self {
        let mut master = StdRng::seed_from_u64(config.seed);
        let population = AgentPopulation::new(counts, &config.population, master.random());
        let rng = StdRng::seed_from_u64(master.random());
        Self {
            book: OrderBook::with_last_price(config.initial_price),
            population,
            value: TrueValueProcess::new(config.initial_true_value, config.value),
            sentiment: SentimentBoard::default(),
            rng,
            time: 0.0,
            tick: 0,
            price: config.initial_price,
            last_price: config.initial_price,
            realized_vol: config.initial_vol,
            peak: config.initial_price,
            short_interest: 0,
            scenario: Scenario::Normal,
            paused: false,
            window_volume: 0,
            next_order_id: 1,
            pending_user_orders: Vec::new(),
            config,
        }
    }

    /// Fold one command into engine state.
    pub fn apply(&mut self, command: Command) -> EngineSignal {
        match command {
            // The handshake already happened; repeats are accepted and
            // ignored.
            Command::Start(_) => {}
            Command::Stop => return EngineSignal::Stop,
            Command::Pause => self.paused = true,
            Command::Resume => self.paused = false,
            Command::Scenario(scenario) => self.set_scenario(scenario),
            Command::Order(user_order) => self.pending_user_orders.push(user_order),
        }
        EngineSignal::Continue
    }

    /// Switch the regime, propagate to agents, and clear the peak whenever
    /// the market is not (or no longer) pumping.
    fn set_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
        self.population.set_scenario(scenario);
        if scenario != Scenario::PumpDump {
            self.peak = Price::ZERO;
        }
    }

    /// Advance one tick. Returns the frames to publish, in order.
    pub fn step(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();

        // 1. User orders execute before any agent flow this tick.
        let pending = std::mem::take(&mut self.pending_user_orders);
        for user_order in pending {
            self.execute_user_order(user_order, &mut frames);
        }

        // 2. Clock and fundamental value.
        self.time += self.config.dt;
        self.value.step(&mut self.rng);

        // 3. One observation per tick; every agent sees the same snapshot.
        let mid = self.book.mid(self.price);
        self.peak = self.peak.max(mid);
        let obs = Observation {
            mid,
            last_price: self.price,
            true_value: Price::from_float(self.value.value()),
            realized_vol: self.realized_vol,
            peak_price: self.peak,
            time: self.time,
        };

        // 4. Agent fan-out in fixed class order.
        self.agent_phase(&obs);

        // 5. Realized volatility from the tick's closing transaction price.
        let log_return = (self.price.to_float() / self.last_price.to_float()).ln();
        self.realized_vol = (1.0 - self.config.vol_alpha) * self.realized_vol
            + self.config.vol_alpha * log_return.abs();
        self.last_price = self.price;

        // 6. Throttled broadcast and order decay.
        self.tick += 1;
        if self.tick.is_multiple_of(self.config.broadcast_interval) {
            self.book
                .decay(self.config.decay_probability, &mut self.rng);
            self.broadcast(&mut frames);
        }

        frames
    }

    /// Execute one user order, emitting a TRADE frame when anything fills.
    fn execute_user_order(&mut self, user_order: UserOrder, frames: &mut Vec<Frame>) {
        if user_order.quantity.is_zero() {
            return;
        }
        let order = self.admit(Order::new(
            user_order.side,
            Price::from_float(user_order.price),
            user_order.quantity,
            self.time,
        ));
        let trades = self.book.add_order(order);

        let mut filled: u64 = 0;
        let mut notional = 0.0;
        for trade in &trades {
            let quantity = trade.quantity.raw() as u64;
            self.window_volume += quantity;
            self.price = trade.price;
            self.sentiment.record_user(user_order.side, trade.quantity);
            filled += quantity;
            notional += trade.price.to_float() * quantity as f64;
        }
        if filled > 0 {
            frames.push(Frame::Trade {
                agent: "USER".to_string(),
                side: user_order.side,
                quantity: filled,
                avg_price: notional / filled as f64,
            });
        }
    }

    /// Poll every agent once and match returned orders immediately, so each
    /// agent trades against the book state its predecessors left behind.
    fn agent_phase(&mut self, obs: &Observation) {
        let Engine {
            population,
            book,
            sentiment,
            price,
            window_volume,
            short_interest,
            next_order_id,
            ..
        } = self;

        for agent in population.iter_mut() {
            let class = agent.class();
            let Some(mut order) = agent.act(obs) else {
                continue;
            };
            order.id = OrderId(*next_order_id);
            *next_order_id += 1;
            let side = order.side;

            for trade in book.add_order(order) {
                *window_volume += trade.quantity.raw() as u64;
                *price = trade.price;
                sentiment.record(class, side, trade.quantity);
                if class == AgentClass::Fundamental {
                    match side {
                        Side::Sell => *short_interest += trade.quantity.raw() as i64,
                        Side::Buy => *short_interest -= trade.quantity.raw() as i64,
                    }
                }
            }
        }
    }

    /// Emit the broadcast set for this window and reset the accumulators.
    fn broadcast(&mut self, frames: &mut Vec<Frame>) {
        frames.push(self.sentiment.frame());
        if self.config.profile == EngineProfile::Full {
            frames.push(scenario_metrics(
                self.scenario,
                self.price.to_float(),
                self.value.value(),
                self.peak.to_float(),
                self.short_interest,
            ));
        }
        frames.push(Frame::Data {
            price: self.price.to_float(),
            volume: self.window_volume,
        });
        if self.config.profile == EngineProfile::Full {
            let metrics = self.book.metrics();
            frames.push(Frame::Metrics {
                spread: metrics.spread.to_float(),
                liquidity: metrics.liquidity,
            });
        }
        self.sentiment.reset();
        self.window_volume = 0;
    }

    /// Assign the next monotone order id.
    fn admit(&mut self, mut order: Order) -> Order {
        order.id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        order
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current tick count.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Current simulation time in seconds.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Whether the clock is suspended.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current market regime.
    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Signed cumulative fundamental flow.
    pub fn short_interest(&self) -> i64 {
        self.short_interest
    }

    /// Last observed transaction price.
    pub fn price(&self) -> Price {
        self.price
    }

    /// Running peak of the mid.
    pub fn peak_price(&self) -> Price {
        self.peak
    }

    /// Current realized-volatility estimate.
    pub fn realized_vol(&self) -> f64 {
        self.realized_vol
    }

    /// The order book.
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Mutable book access, used by tests to probe the top of book.
    pub fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    /// Number of live agents.
    pub fn agent_count(&self) -> usize {
        self.population.len()
    }
}
