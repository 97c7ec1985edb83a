//! Engine front-end
//!
//! Multiplexes order books by symbol, validates client requests against the
//! user registry, and fans trade and status events out to subscribers.
//!
//! Locking: the engine lock protects the book map, the user registry, the
//! all-orders registry and the observer list. It is never held across a call
//! into a book; handles are copied out first, then the lock is released.
//! Observers run with no lock held at all.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use types::errors::{EngineError, OrderError};
use types::ids::{OrderId, Symbol, UserId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderHandle, OrderKind, Side, TimeInForce};
use types::user::User;

use crate::book::OrderBook;
use crate::clock::MonotonicClock;
use crate::events::EventSink;
use crate::matching::{Execution, TradeExecutor};

/// Multi-symbol matching engine
pub struct MatchingEngine {
    inner: RwLock<EngineInner>,
    clock: Arc<MonotonicClock>,
    executor: Arc<TradeExecutor>,
}

struct EngineInner {
    books: HashMap<Symbol, Arc<OrderBook>>,
    users: HashMap<UserId, User>,
    /// Every order ever placed, kept for status queries after it leaves its book
    all_orders: HashMap<OrderId, OrderHandle>,
    observers: Vec<Arc<dyn EventSink>>,
}

impl MatchingEngine {
    pub fn new() -> Self {
        let clock = Arc::new(MonotonicClock::new());
        let executor = Arc::new(TradeExecutor::new(0, Arc::clone(&clock)));
        Self {
            inner: RwLock::new(EngineInner {
                books: HashMap::new(),
                users: HashMap::new(),
                all_orders: HashMap::new(),
                observers: Vec::new(),
            }),
            clock,
            executor,
        }
    }

    /// Add a user to the registry
    pub fn register_user(&self, user: User) -> Result<(), EngineError> {
        if !user.is_valid() {
            return Err(EngineError::InvalidUser);
        }
        let mut inner = self.inner.write();
        if inner.users.contains_key(&user.user_id) {
            return Err(EngineError::DuplicateUser {
                user_id: user.user_id,
            });
        }
        debug!(user_id = %user.user_id, "user registered");
        inner.users.insert(user.user_id, user);
        Ok(())
    }

    pub fn get_user(&self, user_id: &UserId) -> Option<User> {
        self.inner.read().users.get(user_id).cloned()
    }

    /// Place an order
    ///
    /// A positive price makes a limit order, zero a market order, negative
    /// is rejected. Validation happens before any registry is touched, so a
    /// bad request leaves the engine unchanged. On success the order is
    /// admitted, the book is uncrossed, and any market or immediate-or-cancel
    /// remainder is cancelled; every status transition and trade is published
    /// in order.
    pub fn place_order(
        &self,
        user_id: UserId,
        side: Side,
        symbol: &str,
        quantity: u64,
        price: Decimal,
        time_in_force: TimeInForce,
    ) -> Result<OrderHandle, EngineError> {
        self.require_user(&user_id)?;

        let symbol = Symbol::try_new(symbol).ok_or(OrderError::EmptySymbol)?;
        let quantity = Quantity::try_new(quantity)
            .ok_or(OrderError::InvalidQuantity { quantity })?;
        if price < Decimal::ZERO {
            return Err(EngineError::NegativePrice { price });
        }
        let kind = match Price::try_new(price) {
            Some(limit) => OrderKind::Limit(limit),
            None => OrderKind::Market,
        };

        let order = Order::new(
            user_id,
            symbol.clone(),
            side,
            kind,
            quantity,
            time_in_force,
            self.clock.now_nanos(),
        );
        order.validate()?;

        let order_id = order.order_id;
        let handle = order.into_handle();

        let book = {
            let mut inner = self.inner.write();
            inner.all_orders.insert(order_id, handle.clone());
            Arc::clone(inner.books.entry(symbol.clone()).or_insert_with(|| {
                debug!(%symbol, "order book created");
                Arc::new(OrderBook::new(
                    symbol.clone(),
                    Arc::clone(&self.clock),
                    Arc::clone(&self.executor),
                ))
            }))
        };

        if let Err(err) = book.insert(&handle) {
            if matches!(err, types::errors::BookError::FokUnfillable { .. }) {
                // rejection is a real status transition; publish it
                self.publish_status(&handle);
            }
            return Err(err.into());
        }
        self.publish_status(&handle);

        let executions = book.match_orders();
        self.publish_executions(&executions);

        let leftover = {
            let order = handle.read();
            (order.is_market() || order.time_in_force == TimeInForce::Ioc)
                && !order.status.is_terminal()
                && !order.remaining().is_zero()
        };
        if leftover && book.remove(&order_id).is_ok() {
            self.publish_status(&handle);
        }

        Ok(handle)
    }

    /// Cancel a live order owned by the caller
    pub fn cancel_order(&self, user_id: UserId, order_id: OrderId) -> Result<(), EngineError> {
        self.require_user(&user_id)?;

        let (handle, book) = self.locate(&user_id, &order_id)?;
        book.remove(&order_id)?;
        self.publish_status(&handle);
        Ok(())
    }

    /// Replace quantity and price of a live order owned by the caller
    ///
    /// The modified order loses time priority and may now cross, so the
    /// book is uncrossed again afterwards.
    pub fn modify_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
        new_quantity: u64,
        new_price: Decimal,
    ) -> Result<(), EngineError> {
        self.require_user(&user_id)?;

        if new_price < Decimal::ZERO {
            return Err(EngineError::NegativePrice { price: new_price });
        }
        let new_quantity = Quantity::try_new(new_quantity).ok_or(OrderError::InvalidQuantity {
            quantity: new_quantity,
        })?;
        let new_price =
            Price::try_new(new_price).ok_or(OrderError::PriceOutOfRange { price: new_price })?;

        let (handle, book) = self.locate(&user_id, &order_id)?;
        book.modify(&order_id, new_quantity, new_price)?;
        self.publish_status(&handle);

        let executions = book.match_orders();
        self.publish_executions(&executions);
        Ok(())
    }

    /// Current handle of an order owned by the caller, terminal or live
    pub fn get_order_status(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<OrderHandle, EngineError> {
        self.require_user(&user_id)?;

        let inner = self.inner.read();
        let handle = inner
            .all_orders
            .get(&order_id)
            .cloned()
            .filter(|h| h.read().user_id == user_id)
            .ok_or(EngineError::NotOrderOwner { order_id })?;
        Ok(handle)
    }

    /// Every order the user ever placed, oldest first
    pub fn list_user_orders(&self, user_id: UserId) -> Result<Vec<OrderHandle>, EngineError> {
        self.require_user(&user_id)?;

        let inner = self.inner.read();
        let mut orders: Vec<OrderHandle> = inner
            .all_orders
            .values()
            .filter(|h| h.read().user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|h| h.read().arrival_time);
        Ok(orders)
    }

    /// The book for a symbol, if any order was ever placed on it
    pub fn book(&self, symbol: &Symbol) -> Option<Arc<OrderBook>> {
        self.inner.read().books.get(symbol).cloned()
    }

    pub fn subscribe(&self, sink: Arc<dyn EventSink>) {
        self.inner.write().observers.push(sink);
    }

    pub fn unsubscribe(&self, sink: &Arc<dyn EventSink>) {
        self.inner
            .write()
            .observers
            .retain(|existing| !Arc::ptr_eq(existing, sink));
    }

    fn require_user(&self, user_id: &UserId) -> Result<(), EngineError> {
        if self.inner.read().users.contains_key(user_id) {
            Ok(())
        } else {
            Err(EngineError::UnknownUser { user_id: *user_id })
        }
    }

    /// Copy out the order handle and its book under the engine read lock
    fn locate(
        &self,
        user_id: &UserId,
        order_id: &OrderId,
    ) -> Result<(OrderHandle, Arc<OrderBook>), EngineError> {
        let inner = self.inner.read();
        let handle = inner
            .all_orders
            .get(order_id)
            .cloned()
            .filter(|h| h.read().user_id == *user_id)
            .ok_or(EngineError::NotOrderOwner {
                order_id: *order_id,
            })?;
        let symbol = handle.read().symbol.clone();
        let book = inner
            .books
            .get(&symbol)
            .cloned()
            .expect("every placed order has a book");
        Ok((handle, book))
    }

    /// Observer list copied under the shared lock, iterated lock-free
    fn observers(&self) -> Vec<Arc<dyn EventSink>> {
        self.inner.read().observers.clone()
    }

    fn publish_status(&self, handle: &OrderHandle) {
        let snapshot = handle.read().clone();
        for sink in self.observers() {
            Self::guard("order status callback", || {
                sink.on_order_status_changed(&snapshot)
            });
        }
    }

    /// Publish one place/modify call's executions: per trade, the trade
    /// event first, then the two fill status transitions it caused
    fn publish_executions(&self, executions: &[Execution]) {
        if executions.is_empty() {
            return;
        }
        let sinks = self.observers();
        for execution in executions {
            for sink in &sinks {
                Self::guard("trade callback", || {
                    sink.on_trade_executed(&execution.trade)
                });
            }
            for sink in &sinks {
                Self::guard("order status callback", || {
                    sink.on_order_status_changed(&execution.buy_order)
                });
                Self::guard("order status callback", || {
                    sink.on_order_status_changed(&execution.sell_order)
                });
            }
        }
    }

    /// One bad sink must not break the others
    fn guard<F: FnOnce()>(what: &str, f: F) {
        if catch_unwind(AssertUnwindSafe(f)).is_err() {
            warn!("event sink panicked during {what}");
        }
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}
