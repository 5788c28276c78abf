//! Sim-core: matching mechanics for the open-outcry simulator.
//!
//! This crate provides the limit order book: a two-heap, price-time
//! priority matching engine with lazy cancellation, probabilistic order
//! decay, and top-of-book quote metrics. The book is in-process and
//! infallible by contract: invalid orders cannot be constructed (see
//! `types::Order`), and unexpected states are absorbed by the
//! lazy-cancellation invariant.

mod order_book;

pub use order_book::{OrderBook, QuoteMetrics};
