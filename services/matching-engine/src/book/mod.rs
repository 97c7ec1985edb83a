//! Per-symbol order book
//!
//! Two price-ordered sides plus an id index, all guarded by one
//! reader-writer lock. Queries take the shared lock; insert, remove, modify
//! and the matching loop take the exclusive lock. Lock order across the
//! system is engine, then book, then individual order.

mod ask_book;
mod bid_book;
mod price_level;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, trace};
use types::errors::{BookError, OrderError};
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderHandle, OrderStatus, Side, TimeInForce};

use crate::clock::MonotonicClock;
use crate::matching::{Execution, TradeExecutor, crossing};
use ask_book::{AskBook, AskKey};
use bid_book::{BidBook, BidKey};

/// Order book for a single symbol
pub struct OrderBook {
    symbol: Symbol,
    inner: RwLock<BookInner>,
    clock: Arc<MonotonicClock>,
    executor: Arc<TradeExecutor>,
}

/// Book state behind the lock
///
/// The id index is in one-to-one correspondence with the union of the two
/// sides; every queued order has remaining > 0 and a live status.
struct BookInner {
    bids: BidBook,
    asks: AskBook,
    index: HashMap<OrderId, OrderHandle>,
}

impl OrderBook {
    pub fn new(symbol: Symbol, clock: Arc<MonotonicClock>, executor: Arc<TradeExecutor>) -> Self {
        Self {
            symbol,
            inner: RwLock::new(BookInner {
                bids: BidBook::new(),
                asks: AskBook::new(),
                index: HashMap::new(),
            }),
            clock,
            executor,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Admit a pending order into the book
    ///
    /// Checks symbol, validity, duplicate id and admission status; for
    /// fill-or-kill orders, pre-scans the opposite side for enough liquidity
    /// at acceptable prices and rejects the order on shortfall. On success
    /// the order becomes ACCEPTED and is enqueued at the back of its price
    /// level.
    pub fn insert(&self, handle: &OrderHandle) -> Result<(), BookError> {
        let mut inner = self.inner.write();

        let (order_id, side) = {
            let order = handle.read();

            if order.symbol != self.symbol {
                return Err(BookError::SymbolMismatch {
                    expected: self.symbol.clone(),
                    found: order.symbol.clone(),
                });
            }
            order.validate()?;
            if order.status != OrderStatus::Pending {
                return Err(BookError::NotPending {
                    order_id: order.order_id,
                    status: order.status,
                });
            }
            if inner.index.contains_key(&order.order_id) {
                return Err(BookError::DuplicateOrder {
                    order_id: order.order_id,
                });
            }

            if order.time_in_force == TimeInForce::Fok {
                let available = match order.side {
                    Side::Buy => inner.asks.matchable_quantity(order.limit_price()),
                    Side::Sell => inner.bids.matchable_quantity(order.limit_price()),
                };
                let requested = order.remaining().as_u64();
                if available < requested {
                    drop(order);
                    handle.write().reject();
                    debug!(symbol = %self.symbol, available, requested, "fill-or-kill rejected");
                    return Err(BookError::FokUnfillable {
                        requested,
                        available,
                    });
                }
            }

            (order.order_id, order.side)
        };

        handle.write().accept();
        match side {
            Side::Buy => inner.bids.insert(handle.clone()),
            Side::Sell => inner.asks.insert(handle.clone()),
        }
        inner.index.insert(order_id, handle.clone());
        debug!(symbol = %self.symbol, %order_id, %side, "order accepted");
        Ok(())
    }

    /// Cancel an order and drop it from the book
    pub fn remove(&self, order_id: &OrderId) -> Result<OrderHandle, BookError> {
        let mut inner = self.inner.write();

        let handle = inner
            .index
            .get(order_id)
            .cloned()
            .ok_or(BookError::OrderNotFound {
                order_id: *order_id,
            })?;

        let (side, kind, status, cancellable) = {
            let order = handle.read();
            (order.side, order.kind, order.status, order.can_cancel())
        };
        if !cancellable {
            return Err(BookError::NotCancellable {
                order_id: *order_id,
                status,
            });
        }

        let removed = match side {
            Side::Buy => inner.bids.remove(&BidKey::for_kind(&kind), order_id),
            Side::Sell => inner.asks.remove(&AskKey::for_kind(&kind), order_id),
        };
        assert!(removed.is_some(), "indexed order missing from its side");
        inner.index.remove(order_id);

        handle.write().cancel();
        debug!(symbol = %self.symbol, %order_id, "order cancelled");
        Ok(handle)
    }

    /// Replace quantity and price of a resting order
    ///
    /// The order keeps its id but is re-enqueued at the back of the target
    /// price level with a fresh arrival stamp; time priority is lost on
    /// purpose. Validation runs first under the shared lock, then again
    /// under the exclusive lock because the order may have been cancelled or
    /// filled in between.
    pub fn modify(
        &self,
        order_id: &OrderId,
        new_quantity: Quantity,
        new_price: Price,
    ) -> Result<OrderHandle, BookError> {
        {
            let inner = self.inner.read();
            let handle = inner
                .index
                .get(order_id)
                .cloned()
                .ok_or(BookError::OrderNotFound {
                    order_id: *order_id,
                })?;
            let order = handle.read();
            Self::validate_modify(&order, new_quantity, new_price)?;
        }

        let mut inner = self.inner.write();
        let handle = inner
            .index
            .get(order_id)
            .cloned()
            .ok_or(BookError::OrderNotFound {
                order_id: *order_id,
            })?;

        let (side, old_kind) = {
            let order = handle.read();
            Self::validate_modify(&order, new_quantity, new_price)?;
            (order.side, order.kind)
        };

        {
            let mut order = handle.write();
            order.set_quantity(new_quantity)?;
            order.set_price(new_price)?;
            order.refresh_arrival(self.clock.now_nanos());
        }

        match side {
            Side::Buy => {
                let removed = inner.bids.remove(&BidKey::for_kind(&old_kind), order_id);
                assert!(removed.is_some(), "indexed order missing from its side");
                inner.bids.insert(handle.clone());
            }
            Side::Sell => {
                let removed = inner.asks.remove(&AskKey::for_kind(&old_kind), order_id);
                assert!(removed.is_some(), "indexed order missing from its side");
                inner.asks.insert(handle.clone());
            }
        }

        debug!(
            symbol = %self.symbol, %order_id,
            quantity = new_quantity.as_u64(), price = %new_price,
            "order modified"
        );
        Ok(handle)
    }

    fn validate_modify(
        order: &Order,
        new_quantity: Quantity,
        new_price: Price,
    ) -> Result<(), BookError> {
        if !order.can_modify() {
            return Err(OrderError::NotModifiable {
                status: order.status,
            }
            .into());
        }
        if order.is_market() {
            return Err(OrderError::MarketPriceImmutable.into());
        }
        if !new_quantity.in_order_band() {
            return Err(OrderError::InvalidQuantity {
                quantity: new_quantity.as_u64(),
            }
            .into());
        }
        if !new_price.in_limit_band() {
            return Err(OrderError::PriceOutOfRange {
                price: new_price.as_decimal(),
            }
            .into());
        }
        Ok(())
    }

    /// Look up a resting order by id
    pub fn get(&self, order_id: &OrderId) -> Option<OrderHandle> {
        self.inner.read().index.get(order_id).cloned()
    }

    /// Point-in-time copy of the resting buys, best first
    pub fn snapshot_bids(&self) -> Vec<Order> {
        let inner = self.inner.read();
        inner
            .bids
            .snapshot()
            .iter()
            .map(|h| h.read().clone())
            .collect()
    }

    /// Point-in-time copy of the resting sells, best first
    pub fn snapshot_asks(&self) -> Vec<Order> {
        let inner = self.inner.read();
        inner
            .asks
            .snapshot()
            .iter()
            .map(|h| h.read().clone())
            .collect()
    }

    /// Best resting limit bid, if any
    pub fn best_bid(&self) -> Option<Price> {
        self.inner.read().bids.best_limit_price()
    }

    /// Best resting limit ask, if any
    pub fn best_ask(&self) -> Option<Price> {
        self.inner.read().asks.best_limit_price()
    }

    /// Best ask minus best bid; quoted only when both sides quote
    pub fn spread(&self) -> Option<Decimal> {
        let inner = self.inner.read();
        match (inner.asks.best_limit_price(), inner.bids.best_limit_price()) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Number of resting orders across both sides
    pub fn order_count(&self) -> usize {
        let inner = self.inner.read();
        inner.bids.order_count() + inner.asks.order_count()
    }

    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read();
        inner.bids.is_empty() && inner.asks.is_empty()
    }

    /// Run the price-time priority matching loop until the book uncrosses
    ///
    /// While both sides are non-empty: take the best bid and best ask, stop
    /// unless they cross, trade `min(remaining, remaining)` units at the
    /// resting ask's price (the maker sets the price), fill both orders and
    /// dequeue whichever reached zero. Each iteration removes an order or
    /// strictly shrinks one, so the loop terminates. Trades are returned in
    /// execution order together with post-fill order snapshots.
    pub fn match_orders(&self) -> Vec<Execution> {
        let mut inner = self.inner.write();
        let mut executions = Vec::new();

        loop {
            let Some(buy) = inner.bids.best_order() else {
                break;
            };
            let Some(sell) = inner.asks.best_order() else {
                break;
            };

            let (buy_id, buy_kind, buy_remaining) = {
                let order = buy.read();
                (order.order_id, order.kind, order.remaining())
            };
            let (sell_id, sell_kind, sell_remaining) = {
                let order = sell.read();
                (order.order_id, order.kind, order.remaining())
            };

            if !crossing::crosses(&buy_kind, &sell_kind) {
                break;
            }
            // two market orders cannot discover a price
            let Some(price) = crossing::execution_price(&buy_kind, &sell_kind) else {
                break;
            };

            let quantity = buy_remaining.min(sell_remaining);
            let trade =
                self.executor
                    .execute(self.symbol.clone(), buy_id, sell_id, quantity, price);

            buy.write().fill(quantity);
            sell.write().fill(quantity);

            let buy_order = buy.read().clone();
            let sell_order = sell.read().clone();

            if buy_order.is_filled() {
                inner.bids.pop_best();
                inner.index.remove(&buy_id);
            }
            if sell_order.is_filled() {
                inner.asks.pop_best();
                inner.index.remove(&sell_id);
            }

            trace!(
                symbol = %self.symbol,
                sequence = trade.sequence,
                quantity = quantity.as_u64(),
                price = %price,
                "trade executed"
            );
            executions.push(Execution {
                trade,
                buy_order,
                sell_order,
            });
        }

        executions
    }
}
