//! Ask (sell-side) queue
//!
//! Sell orders sorted best-first: a market sell outranks every limit, limits
//! rank by price ascending, FIFO within a level.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::Price;
use types::order::{OrderHandle, OrderKind};

use super::price_level::PriceLevel;

/// Sort key for a resting sell
///
/// `Market` sorts below every `Limit`, so a market sell behaves as an
/// infinitely aggressive ask. The best ask is the *first* key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum AskKey {
    Market,
    Limit(Price),
}

impl AskKey {
    pub(crate) fn for_kind(kind: &OrderKind) -> Self {
        match kind.limit_price() {
            Some(price) => AskKey::Limit(price),
            None => AskKey::Market,
        }
    }
}

/// Sell side of a book: price levels keyed best-first
#[derive(Debug, Default)]
pub(crate) struct AskBook {
    levels: BTreeMap<AskKey, PriceLevel>,
}

impl AskBook {
    pub(crate) fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Enqueue a sell at the back of its price level
    pub(crate) fn insert(&mut self, handle: OrderHandle) {
        let key = AskKey::for_kind(&handle.read().kind);
        self.levels.entry(key).or_default().push_back(handle);
    }

    /// Remove a sell by id from the level the caller observed it at
    pub(crate) fn remove(&mut self, key: &AskKey, order_id: &OrderId) -> Option<OrderHandle> {
        let level = self.levels.get_mut(key)?;
        let removed = level.remove(order_id)?;
        if level.is_empty() {
            self.levels.remove(key);
        }
        Some(removed)
    }

    /// Highest-priority resting sell
    pub(crate) fn best_order(&self) -> Option<OrderHandle> {
        self.levels
            .values()
            .next()
            .and_then(|level| level.front().cloned())
    }

    /// Dequeue the highest-priority resting sell
    pub(crate) fn pop_best(&mut self) -> Option<OrderHandle> {
        let (key, level) = self.levels.iter_mut().next()?;
        let key = *key;
        let handle = level.pop_front();
        if level.is_empty() {
            self.levels.remove(&key);
        }
        handle
    }

    /// Best resting limit price; a transient market sell has no quotable price
    pub(crate) fn best_limit_price(&self) -> Option<Price> {
        self.levels.keys().find_map(|key| match key {
            AskKey::Limit(price) => Some(*price),
            AskKey::Market => None,
        })
    }

    /// Units an incoming buy at `limit` could consume from this side
    /// (`None` = market buy, every ask is acceptable)
    pub(crate) fn matchable_quantity(&self, limit: Option<Price>) -> u64 {
        let mut total = 0;
        for (key, level) in self.levels.iter() {
            match (key, limit) {
                (AskKey::Market, _) | (AskKey::Limit(_), None) => {}
                (AskKey::Limit(ask), Some(limit)) if *ask <= limit => {}
                _ => break,
            }
            total += level.total_remaining();
        }
        total
    }

    /// All resting sells in priority order
    pub(crate) fn snapshot(&self) -> Vec<OrderHandle> {
        self.levels
            .values()
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
