//! Bid (buy-side) queue
//!
//! Buy orders sorted best-first: a market buy outranks every limit, limits
//! rank by price descending, FIFO within a level. BTreeMap keys give
//! deterministic iteration.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::Price;
use types::order::{OrderHandle, OrderKind};

use super::price_level::PriceLevel;

/// Sort key for a resting buy
///
/// `Market` sorts above every `Limit`, so a market buy behaves as an
/// infinitely aggressive bid. Derived `Ord` puts `Limit(p)` below `Market`
/// and orders limits ascending; the best bid is therefore the *last* key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum BidKey {
    Limit(Price),
    Market,
}

impl BidKey {
    pub(crate) fn for_kind(kind: &OrderKind) -> Self {
        match kind.limit_price() {
            Some(price) => BidKey::Limit(price),
            None => BidKey::Market,
        }
    }
}

/// Buy side of a book: price levels keyed best-last
#[derive(Debug, Default)]
pub(crate) struct BidBook {
    levels: BTreeMap<BidKey, PriceLevel>,
}

impl BidBook {
    pub(crate) fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Enqueue a buy at the back of its price level
    pub(crate) fn insert(&mut self, handle: OrderHandle) {
        let key = BidKey::for_kind(&handle.read().kind);
        self.levels.entry(key).or_default().push_back(handle);
    }

    /// Remove a buy by id from the level the caller observed it at
    pub(crate) fn remove(&mut self, key: &BidKey, order_id: &OrderId) -> Option<OrderHandle> {
        let level = self.levels.get_mut(key)?;
        let removed = level.remove(order_id)?;
        if level.is_empty() {
            self.levels.remove(key);
        }
        Some(removed)
    }

    /// Highest-priority resting buy
    pub(crate) fn best_order(&self) -> Option<OrderHandle> {
        self.levels
            .values()
            .next_back()
            .and_then(|level| level.front().cloned())
    }

    /// Dequeue the highest-priority resting buy
    pub(crate) fn pop_best(&mut self) -> Option<OrderHandle> {
        let (key, level) = self.levels.iter_mut().next_back()?;
        let key = *key;
        let handle = level.pop_front();
        if level.is_empty() {
            self.levels.remove(&key);
        }
        handle
    }

    /// Best resting limit price; a transient market buy has no quotable price
    pub(crate) fn best_limit_price(&self) -> Option<Price> {
        self.levels.keys().rev().find_map(|key| match key {
            BidKey::Limit(price) => Some(*price),
            BidKey::Market => None,
        })
    }

    /// Units an incoming sell at `limit` could consume from this side
    /// (`None` = market sell, every bid is acceptable)
    pub(crate) fn matchable_quantity(&self, limit: Option<Price>) -> u64 {
        let mut total = 0;
        for (key, level) in self.levels.iter().rev() {
            match (key, limit) {
                (BidKey::Market, _) | (BidKey::Limit(_), None) => {}
                (BidKey::Limit(bid), Some(limit)) if *bid >= limit => {}
                _ => break,
            }
            total += level.total_remaining();
        }
        total
    }

    /// All resting buys in priority order
    pub(crate) fn snapshot(&self) -> Vec<OrderHandle> {
        self.levels
            .values()
            .rev()
            .flat_map(|level| level.iter().cloned())
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub(crate) fn order_count(&self) -> usize {
        self.levels.values().map(PriceLevel::len).sum()
    }
}
