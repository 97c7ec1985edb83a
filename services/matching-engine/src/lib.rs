//! In-memory multi-symbol matching engine
//!
//! Continuous double auction over central limit order books with strict
//! price-time priority. Client orders are admitted per symbol, crossed
//! orders trade at the resting side's price, and every trade and order
//! status transition is pushed to subscribed event sinks.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced, FIFO on price ties
//! - An order rests whole or matches against counterparties, never torn
//! - No residual cross: best bid < best ask at every commit point
//! - Terminal order states are absorbing

pub mod book;
pub mod clock;
pub mod engine;
pub mod events;
pub mod matching;

pub use book::OrderBook;
pub use engine::MatchingEngine;
pub use events::EventSink;
