//! Price level with FIFO order queue
//!
//! A price level holds every resting order at one price point. FIFO order
//! within the level is the arrival-time tie-break of price-time priority.

use std::collections::VecDeque;
use types::ids::OrderId;
use types::order::OrderHandle;

/// Orders resting at a single price point, earliest arrival first
#[derive(Debug, Default)]
pub(crate) struct PriceLevel {
    orders: VecDeque<OrderHandle>,
}

impl PriceLevel {
    pub(crate) fn new() -> Self {
        Self {
            orders: VecDeque::new(),
        }
    }

    /// Enqueue at the back (latest arrival, lowest priority)
    pub(crate) fn push_back(&mut self, handle: OrderHandle) {
        self.orders.push_back(handle);
    }

    /// The highest-priority order at this level
    pub(crate) fn front(&self) -> Option<&OrderHandle> {
        self.orders.front()
    }

    /// Dequeue the highest-priority order
    pub(crate) fn pop_front(&mut self) -> Option<OrderHandle> {
        self.orders.pop_front()
    }

    /// Remove an order by id, scanning the level
    pub(crate) fn remove(&mut self, order_id: &OrderId) -> Option<OrderHandle> {
        let position = self
            .orders
            .iter()
            .position(|h| h.read().order_id == *order_id)?;
        self.orders.remove(position)
    }

    /// Sum of unfilled units at this level
    pub(crate) fn total_remaining(&self) -> u64 {
        self.orders
            .iter()
            .map(|h| h.read().remaining().as_u64())
            .sum()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &OrderHandle> {
        self.orders.iter()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.orders.len()
    }
}
