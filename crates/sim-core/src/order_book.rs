//! Two-heap limit order book with price-time priority and lazy cancellation.
//!
//! The book keeps an *active set* (id → resting order) as the authoritative
//! source of truth, plus one binary heap per side holding queue entries.
//! Heap entries are never removed eagerly: cancellation (decay) deletes from
//! the active set only, and partial fills rewrite the active record under a
//! bumped version. An entry is live only while the active set holds its id at
//! the same version; stale entries are reclaimed when they surface at the top
//! of a heap.
//!
//! This indirection makes cancellation and partial-fill rewrites O(log n)
//! without rebuilding a heap.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use rand::Rng;
use types::{Order, OrderId, Price, Quantity, Side, Trade};

/// A queue entry. Valid only while the active set maps `id` to a resting
/// order with the same `version`.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    price: Price,
    id: OrderId,
    version: u32,
    quantity: Quantity,
}

/// Bid ordering: highest price first, earlier submission wins ties.
#[derive(Debug, Clone, Copy)]
struct BidEntry(QueueEntry);

impl Ord for BidEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .price
            .cmp(&other.0.price)
            .then_with(|| other.0.id.cmp(&self.0.id))
    }
}

impl PartialOrd for BidEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for BidEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BidEntry {}

/// Ask ordering: lowest price first, earlier submission wins ties.
#[derive(Debug, Clone, Copy)]
struct AskEntry(QueueEntry);

impl Ord for AskEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .price
            .cmp(&self.0.price)
            .then_with(|| other.0.id.cmp(&self.0.id))
    }
}

impl PartialOrd for AskEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for AskEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AskEntry {}

/// A resting order plus the version its current queue entry must carry.
#[derive(Debug, Clone, Copy)]
struct Resting {
    order: Order,
    version: u32,
}

/// Top-of-book quote statistics.
///
/// Both fields are zero when either side of the book is empty.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuoteMetrics {
    /// `best_ask - best_bid`.
    pub spread: Price,
    /// Combined quantity of the best bid and best ask.
    pub liquidity: u64,
}

/// Price-time priority limit order book for a single instrument.
#[derive(Debug, Clone)]
pub struct OrderBook {
    active: HashMap<OrderId, Resting>,
    bids: BinaryHeap<BidEntry>,
    asks: BinaryHeap<AskEntry>,
    last_price: Price,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Create an empty book with the last-traded price seeded to $100.
    pub fn new() -> Self {
        Self::with_last_price(Price::from_float(100.0))
    }

    /// Create an empty book with an explicit initial last-traded price.
    pub fn with_last_price(last_price: Price) -> Self {
        Self {
            active: HashMap::new(),
            bids: BinaryHeap::new(),
            asks: BinaryHeap::new(),
            last_price,
        }
    }

    /// Last traded price (seed value until the first fill).
    pub fn last_price(&self) -> Price {
        self.last_price
    }

    /// Number of live (active) orders.
    pub fn active_orders(&self) -> usize {
        self.active.len()
    }

    /// Check if no live orders remain.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Cross an incoming order against the opposite side, resting any
    /// residual quantity. Returns the fills in execution order.
    ///
    /// Fills execute at the resting order's price; each fill carries the
    /// incoming order's timestamp. The opposite side is never mutated beyond
    /// popping stale heads and consuming matched quantity.
    pub fn add_order(&mut self, mut order: Order) -> Vec<Trade> {
        let mut trades = Vec::new();

        match order.side {
            Side::Sell => {
                while !order.quantity.is_zero() {
                    let Some(top) = self.bids.peek().map(|e| e.0) else {
                        break;
                    };
                    if !self.entry_is_live(&top) {
                        self.bids.pop();
                        continue;
                    }
                    if top.price < order.price {
                        break;
                    }
                    let fill = top.quantity.min(order.quantity);
                    trades.push(Trade {
                        price: top.price,
                        quantity: fill,
                        timestamp: order.timestamp,
                    });
                    self.last_price = top.price;
                    self.bids.pop();
                    if let Some(remainder) = self.consume(top, fill) {
                        self.bids.push(BidEntry(remainder));
                    }
                    order.quantity = order.quantity.saturating_sub(fill);
                }
                if !order.quantity.is_zero() {
                    let entry = self.rest(order);
                    self.asks.push(AskEntry(entry));
                }
            }
            Side::Buy => {
                while !order.quantity.is_zero() {
                    let Some(top) = self.asks.peek().map(|e| e.0) else {
                        break;
                    };
                    if !self.entry_is_live(&top) {
                        self.asks.pop();
                        continue;
                    }
                    if top.price > order.price {
                        break;
                    }
                    let fill = top.quantity.min(order.quantity);
                    trades.push(Trade {
                        price: top.price,
                        quantity: fill,
                        timestamp: order.timestamp,
                    });
                    self.last_price = top.price;
                    self.asks.pop();
                    if let Some(remainder) = self.consume(top, fill) {
                        self.asks.push(AskEntry(remainder));
                    }
                    order.quantity = order.quantity.saturating_sub(fill);
                }
                if !order.quantity.is_zero() {
                    let entry = self.rest(order);
                    self.bids.push(BidEntry(entry));
                }
            }
        }

        trades
    }

    /// Independently remove each live order with the given probability.
    ///
    /// Deletes from the active set only; queue entries go stale and are
    /// reclaimed the next time they reach the top of their heap.
    pub fn decay(&mut self, probability: f64, rng: &mut impl Rng) {
        if self.active.is_empty() {
            return;
        }
        let doomed: Vec<OrderId> = self
            .active
            .keys()
            .copied()
            .filter(|_| rng.random::<f64>() < probability)
            .collect();
        for id in doomed {
            self.active.remove(&id);
        }
    }

    /// Mid price after cleaning stale heads, or `fallback` if either side is
    /// empty.
    pub fn mid(&mut self, fallback: Price) -> Price {
        self.clean_heads();
        match (self.bids.peek(), self.asks.peek()) {
            (Some(bid), Some(ask)) => Price((bid.0.price.raw() + ask.0.price.raw()) / 2),
            _ => fallback,
        }
    }

    /// Top-of-book spread and combined quantity after cleaning stale heads.
    pub fn metrics(&mut self) -> QuoteMetrics {
        self.clean_heads();
        match (self.bids.peek(), self.asks.peek()) {
            (Some(bid), Some(ask)) => QuoteMetrics {
                spread: ask.0.price - bid.0.price,
                liquidity: bid.0.quantity.raw() as u64 + ask.0.quantity.raw() as u64,
            },
            _ => QuoteMetrics::default(),
        }
    }

    /// Best live bid, if any.
    pub fn best_bid(&mut self) -> Option<Order> {
        self.clean_heads();
        self.bids
            .peek()
            .and_then(|e| self.active.get(&e.0.id))
            .map(|r| r.order)
    }

    /// Best live ask, if any.
    pub fn best_ask(&mut self) -> Option<Order> {
        self.clean_heads();
        self.asks
            .peek()
            .and_then(|e| self.active.get(&e.0.id))
            .map(|r| r.order)
    }

    /// A queue entry is authoritative only if its id resolves to a live order
    /// at the same version.
    fn entry_is_live(&self, entry: &QueueEntry) -> bool {
        self.active
            .get(&entry.id)
            .is_some_and(|resting| resting.version == entry.version)
    }

    /// Apply a fill to a resting order. Returns the replacement queue entry
    /// when quantity remains, having bumped the version so the old entry can
    /// never match again.
    fn consume(&mut self, entry: QueueEntry, fill: Quantity) -> Option<QueueEntry> {
        if entry.quantity > fill {
            let resting = self.active.get_mut(&entry.id)?;
            resting.order.quantity = entry.quantity.saturating_sub(fill);
            resting.version += 1;
            Some(QueueEntry {
                price: entry.price,
                id: entry.id,
                version: resting.version,
                quantity: resting.order.quantity,
            })
        } else {
            self.active.remove(&entry.id);
            None
        }
    }

    /// Enter a residual order into the active set and produce its queue entry.
    fn rest(&mut self, order: Order) -> QueueEntry {
        let entry = QueueEntry {
            price: order.price,
            id: order.id,
            version: 0,
            quantity: order.quantity,
        };
        self.active.insert(order.id, Resting { order, version: 0 });
        entry
    }

    /// Pop stale entries off both heap tops.
    fn clean_heads(&mut self) {
        while let Some(top) = self.bids.peek().map(|e| e.0) {
            if self.entry_is_live(&top) {
                break;
            }
            self.bids.pop();
        }
        while let Some(top) = self.asks.peek().map(|e| e.0) {
            if self.entry_is_live(&top) {
                break;
            }
            self.asks.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use types::Side;

    fn make_order(id: u64, side: Side, price: f64, quantity: u32, timestamp: f64) -> Order {
        let mut order = Order::new(side, Price::from_float(price), Quantity(quantity), timestamp);
        order.id = OrderId(id);
        order
    }

    #[test]
    fn test_order_rests_on_empty_book() {
        let mut book = OrderBook::new();
        let trades = book.add_order(make_order(1, Side::Buy, 100.0, 10, 0.0));

        assert!(trades.is_empty());
        let bid = book.best_bid().unwrap();
        assert_eq!(bid.id, OrderId(1));
        assert_eq!(bid.quantity, Quantity(10));
        assert_eq!(bid.price, Price::from_float(100.0));
        assert!(book.best_ask().is_none());
    }

    #[test]
    fn test_partial_fill_rests_residual() {
        let mut book = OrderBook::new();
        book.add_order(make_order(1, Side::Sell, 100.0, 5, 0.0));

        let trades = book.add_order(make_order(2, Side::Buy, 101.0, 8, 1.0));

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, Price::from_float(100.0));
        assert_eq!(trades[0].quantity, Quantity(5));
        assert_eq!(trades[0].timestamp, 1.0);

        // Seller fully consumed; buyer's residual rests at its own limit.
        assert!(book.best_ask().is_none());
        let bid = book.best_bid().unwrap();
        assert_eq!(bid.quantity, Quantity(3));
        assert_eq!(bid.price, Price::from_float(101.0));
    }

    #[test]
    fn test_time_priority_at_equal_price() {
        let mut book = OrderBook::new();
        book.add_order(make_order(1, Side::Sell, 100.0, 5, 0.0));
        book.add_order(make_order(2, Side::Sell, 100.0, 5, 1.0));

        let trades = book.add_order(make_order(3, Side::Buy, 100.0, 7, 2.0));

        // The earlier order fills entirely before the later one is touched.
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].quantity, Quantity(5));
        assert_eq!(trades[1].quantity, Quantity(2));

        let ask = book.best_ask().unwrap();
        assert_eq!(ask.id, OrderId(2));
        assert_eq!(ask.quantity, Quantity(3));
    }

    #[test]
    fn test_price_priority() {
        let mut book = OrderBook::new();
        book.add_order(make_order(1, Side::Buy, 99.0, 10, 0.0));
        book.add_order(make_order(2, Side::Buy, 100.0, 10, 1.0));
        book.add_order(make_order(3, Side::Buy, 98.0, 10, 2.0));

        let trades = book.add_order(make_order(4, Side::Sell, 0.01, 25, 3.0));

        assert_eq!(trades.len(), 3);
        assert_eq!(trades[0].price, Price::from_float(100.0));
        assert_eq!(trades[1].price, Price::from_float(99.0));
        assert_eq!(trades[2].price, Price::from_float(98.0));
        assert_eq!(trades[2].quantity, Quantity(5));
    }

    #[test]
    fn test_limit_price_respected() {
        let mut book = OrderBook::new();
        book.add_order(make_order(1, Side::Sell, 100.0, 10, 0.0));
        book.add_order(make_order(2, Side::Sell, 105.0, 10, 1.0));

        let trades = book.add_order(make_order(3, Side::Buy, 102.0, 20, 2.0));

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, Price::from_float(100.0));

        // Residual 10 rests at 102, below the remaining 105 ask.
        let bid = book.best_bid().unwrap();
        assert_eq!(bid.quantity, Quantity(10));
        let ask = book.best_ask().unwrap();
        assert_eq!(ask.price, Price::from_float(105.0));
        assert!(bid.price < ask.price);
    }

    #[test]
    fn test_book_never_crossed_after_matching() {
        let mut book = OrderBook::new();
        book.add_order(make_order(1, Side::Sell, 101.0, 50, 0.0));
        book.add_order(make_order(2, Side::Buy, 99.0, 50, 1.0));
        book.add_order(make_order(3, Side::Buy, 100.5, 30, 2.0));
        book.add_order(make_order(4, Side::Sell, 99.5, 100, 3.0));

        if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
            assert!(bid.price <= ask.price);
        }
    }

    #[test]
    fn test_executed_volume_balances() {
        let mut book = OrderBook::new();
        book.add_order(make_order(1, Side::Sell, 100.0, 30, 0.0));
        book.add_order(make_order(2, Side::Sell, 101.0, 30, 1.0));
        book.add_order(make_order(3, Side::Sell, 102.0, 30, 2.0));

        let trades = book.add_order(make_order(4, Side::Buy, 102.0, 75, 3.0));

        // Every fill debits one side and credits the other by construction;
        // total crossing quantity is bounded by available supply.
        let filled: u32 = trades.iter().map(|t| t.quantity.raw()).sum();
        assert_eq!(filled, 75);
        let ask = book.best_ask().unwrap();
        assert_eq!(ask.quantity, Quantity(15));
    }

    #[test]
    fn test_last_price_seeded_and_updated() {
        let mut book = OrderBook::new();
        assert_eq!(book.last_price(), Price::from_float(100.0));

        book.add_order(make_order(1, Side::Sell, 98.0, 10, 0.0));
        book.add_order(make_order(2, Side::Buy, 98.0, 10, 1.0));
        assert_eq!(book.last_price(), Price::from_float(98.0));
    }

    #[test]
    fn test_mid_and_fallback() {
        let mut book = OrderBook::new();
        let fallback = Price::from_float(55.0);
        assert_eq!(book.mid(fallback), fallback);

        book.add_order(make_order(1, Side::Buy, 99.0, 10, 0.0));
        assert_eq!(book.mid(fallback), fallback);

        book.add_order(make_order(2, Side::Sell, 101.0, 10, 1.0));
        assert_eq!(book.mid(fallback), Price::from_float(100.0));
    }

    #[test]
    fn test_metrics() {
        let mut book = OrderBook::new();
        assert_eq!(book.metrics(), QuoteMetrics::default());

        book.add_order(make_order(1, Side::Buy, 99.5, 200, 0.0));
        book.add_order(make_order(2, Side::Sell, 100.0, 400, 1.0));

        let metrics = book.metrics();
        assert_eq!(metrics.spread, Price::from_float(0.5));
        assert_eq!(metrics.liquidity, 600);
    }

    #[test]
    fn test_metrics_reflect_partial_fill() {
        let mut book = OrderBook::new();
        book.add_order(make_order(1, Side::Sell, 100.0, 10, 0.0));
        book.add_order(make_order(2, Side::Buy, 99.0, 10, 1.0));
        book.add_order(make_order(3, Side::Buy, 100.0, 4, 2.0));

        // The stale full-size entry must not be counted after the rewrite.
        let metrics = book.metrics();
        assert_eq!(metrics.liquidity, 10 + 6);
    }

    #[test]
    fn test_decay_removes_all_at_probability_one() {
        let mut book = OrderBook::new();
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..20 {
            book.add_order(make_order(i, Side::Buy, 99.0, 10, i as f64));
        }
        assert_eq!(book.active_orders(), 20);

        book.decay(1.0, &mut rng);
        assert!(book.is_empty());

        // All queue entries are stale now; the mid falls back.
        assert_eq!(book.mid(Price::from_float(100.0)), Price::from_float(100.0));
    }

    #[test]
    fn test_decay_removes_none_at_probability_zero() {
        let mut book = OrderBook::new();
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..20 {
            book.add_order(make_order(i, Side::Buy, 99.0, 10, i as f64));
        }
        book.decay(0.0, &mut rng);
        assert_eq!(book.active_orders(), 20);
    }

    #[test]
    fn test_decay_rate_is_statistically_plausible() {
        let mut book = OrderBook::new();
        let mut rng = StdRng::seed_from_u64(42);
        for i in 0..1000 {
            book.add_order(make_order(i, Side::Buy, 99.0, 10, i as f64));
        }

        book.decay(0.5, &mut rng);
        let survivors = book.active_orders();
        // Binomial(1000, 0.5): staying within ±100 of the mean is > 6 sigma.
        assert!((400..=600).contains(&survivors), "survivors = {survivors}");
    }

    #[test]
    fn test_decayed_order_cannot_fill() {
        let mut book = OrderBook::new();
        let mut rng = StdRng::seed_from_u64(1);
        book.add_order(make_order(1, Side::Sell, 100.0, 10, 0.0));
        book.decay(1.0, &mut rng);

        // The crossing buy finds only a stale head and rests instead.
        let trades = book.add_order(make_order(2, Side::Buy, 100.0, 10, 1.0));
        assert!(trades.is_empty());
        let bid = book.best_bid().unwrap();
        assert_eq!(bid.id, OrderId(2));
    }

    #[test]
    fn test_incoming_order_sweeps_stale_then_fills_live() {
        let mut book = OrderBook::new();
        let mut rng = StdRng::seed_from_u64(1);
        book.add_order(make_order(1, Side::Sell, 100.0, 10, 0.0));
        book.decay(1.0, &mut rng);
        book.add_order(make_order(2, Side::Sell, 100.5, 10, 1.0));

        let trades = book.add_order(make_order(3, Side::Buy, 101.0, 10, 2.0));
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, Price::from_float(100.5));
    }
}
