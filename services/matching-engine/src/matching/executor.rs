//! Trade construction
//!
//! Stamps every trade with a globally monotonic sequence number and an
//! execution time from the shared clock. Trades are produced under per-book
//! locks on many threads, hence the atomic counter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::trade::Trade;

use crate::clock::MonotonicClock;

/// Builds immutable trade records with engine-wide sequencing
#[derive(Debug)]
pub struct TradeExecutor {
    sequence: AtomicU64,
    clock: Arc<MonotonicClock>,
}

impl TradeExecutor {
    pub fn new(starting_sequence: u64, clock: Arc<MonotonicClock>) -> Self {
        Self {
            sequence: AtomicU64::new(starting_sequence),
            clock,
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    /// Record one match between a resting buy and a resting sell
    pub fn execute(
        &self,
        symbol: Symbol,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        quantity: Quantity,
        price: Price,
    ) -> Trade {
        Trade::new(
            self.next_sequence(),
            symbol,
            buy_order_id,
            sell_order_id,
            quantity,
            price,
            self.clock.now_nanos(),
        )
    }
}
