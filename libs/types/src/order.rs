//! Order lifecycle types
//!
//! An order progresses PENDING → ACCEPTED → (PARTIALLY_FILLED)* → FILLED, or
//! from any live state to CANCELLED; PENDING orders may be REJECTED. The
//! three terminal states are absorbing.

use crate::errors::OrderError;
use crate::ids::{OrderId, Symbol, UserId};
use crate::numeric::{Price, Quantity};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order kind as a tagged variant
///
/// The limit price lives in the variant, so a market order has no
/// client-controlled price at all. For matching, a market buy behaves as
/// +infinity and a market sell as -infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "price", rename_all = "UPPERCASE")]
pub enum OrderKind {
    /// Rests at a stated limit price
    Limit(Price),
    /// Executes against the best opposite levels; never rests
    Market,
}

impl OrderKind {
    /// The stated limit price, if any
    pub fn limit_price(&self) -> Option<Price> {
        match self {
            OrderKind::Limit(price) => Some(*price),
            OrderKind::Market => None,
        }
    }

    pub fn is_market(&self) -> bool {
        matches!(self, OrderKind::Market)
    }
}

/// Time-in-force policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good-Till-Cancel: rests until filled or explicitly cancelled
    Gtc,
    /// Immediate-Or-Cancel: match immediately, cancel the remainder
    Ioc,
    /// Fill-Or-Kill: full match against current liquidity or reject
    Fok,
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created, not yet admitted to a book
    Pending,
    /// Admitted and resting (or about to match)
    Accepted,
    /// Some fills, remainder still live
    PartiallyFilled,
    /// Completely matched (terminal)
    Filled,
    /// Cancelled by user or policy (terminal)
    Cancelled,
    /// Failed admission (terminal)
    Rejected,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

/// Shared, reference-counted order handle
///
/// The owning book, the engine registry and observer callbacks all hold the
/// same handle; field mutation happens under the book's write lock.
pub type OrderHandle = Arc<RwLock<Order>>;

/// A client order with immutable identity and mutable execution progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub symbol: Symbol,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Quantity,
    pub filled_quantity: Quantity,
    pub time_in_force: TimeInForce,
    pub status: OrderStatus,
    /// Monotonic arrival stamp (nanos); refreshed when the order is modified
    pub arrival_time: i64,
}

impl Order {
    /// Create a new pending order with a fresh id
    pub fn new(
        user_id: UserId,
        symbol: Symbol,
        side: Side,
        kind: OrderKind,
        quantity: Quantity,
        time_in_force: TimeInForce,
        arrival_time: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            user_id,
            symbol,
            side,
            kind,
            quantity,
            filled_quantity: Quantity::zero(),
            time_in_force,
            status: OrderStatus::Pending,
            arrival_time,
        }
    }

    /// Wrap into the shared handle form
    pub fn into_handle(self) -> OrderHandle {
        Arc::new(RwLock::new(self))
    }

    /// Unfilled units: quantity - filled
    pub fn remaining(&self) -> Quantity {
        self.quantity - self.filled_quantity
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled_quantity == self.quantity
    }

    /// Check if order has any fills
    pub fn has_fills(&self) -> bool {
        !self.filled_quantity.is_zero()
    }

    /// The stated limit price, if any
    pub fn limit_price(&self) -> Option<Price> {
        self.kind.limit_price()
    }

    /// Price as stored: the limit price, or zero for a market order
    pub fn display_price(&self) -> Decimal {
        self.limit_price()
            .map(|p| p.as_decimal())
            .unwrap_or(Decimal::ZERO)
    }

    pub fn is_market(&self) -> bool {
        self.kind.is_market()
    }

    /// Quantity and price may change only before any fill
    pub fn can_modify(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Accepted)
    }

    /// Live orders can be cancelled, including partially filled ones
    pub fn can_cancel(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Pending | OrderStatus::Accepted | OrderStatus::PartiallyFilled
        )
    }

    /// Validate ranges: quantity band, and the limit-price band for limit
    /// orders (a market order carries no price to check)
    pub fn validate(&self) -> Result<(), OrderError> {
        if !self.quantity.in_order_band() {
            return Err(OrderError::InvalidQuantity {
                quantity: self.quantity.as_u64(),
            });
        }
        if let OrderKind::Limit(price) = self.kind {
            if !price.in_limit_band() {
                return Err(OrderError::PriceOutOfRange {
                    price: price.as_decimal(),
                });
            }
        }
        Ok(())
    }

    /// Replace the total quantity
    ///
    /// Fails without state change unless the order is still modifiable and
    /// the new quantity is inside the order band.
    pub fn set_quantity(&mut self, new_quantity: Quantity) -> Result<(), OrderError> {
        if !self.can_modify() {
            return Err(OrderError::NotModifiable {
                status: self.status,
            });
        }
        if !new_quantity.in_order_band() {
            return Err(OrderError::InvalidQuantity {
                quantity: new_quantity.as_u64(),
            });
        }
        self.quantity = new_quantity;
        Ok(())
    }

    /// Replace the limit price
    ///
    /// Always fails for market orders; their execution price is not a client
    /// field.
    pub fn set_price(&mut self, new_price: Price) -> Result<(), OrderError> {
        if self.is_market() {
            return Err(OrderError::MarketPriceImmutable);
        }
        if !self.can_modify() {
            return Err(OrderError::NotModifiable {
                status: self.status,
            });
        }
        if !new_price.in_limit_band() {
            return Err(OrderError::PriceOutOfRange {
                price: new_price.as_decimal(),
            });
        }
        self.kind = OrderKind::Limit(new_price);
        Ok(())
    }

    /// Apply a fill and advance the status
    ///
    /// # Panics
    /// Panics if the fill is zero, exceeds the remaining quantity, or the
    /// order is not live in a book — all internal invariant violations.
    pub fn fill(&mut self, fill_quantity: Quantity) {
        assert!(!fill_quantity.is_zero(), "Fill must be positive");
        assert!(
            fill_quantity <= self.remaining(),
            "Fill would exceed order quantity"
        );
        assert!(
            matches!(
                self.status,
                OrderStatus::Accepted | OrderStatus::PartiallyFilled
            ),
            "Fill on an order that is not live in a book"
        );

        self.filled_quantity = self.filled_quantity + fill_quantity;
        if self.is_filled() {
            self.status = OrderStatus::Filled;
        } else {
            self.status = OrderStatus::PartiallyFilled;
        }
    }

    /// Admit the order into a book
    ///
    /// # Panics
    /// Panics unless the order is PENDING.
    pub fn accept(&mut self) {
        assert_eq!(
            self.status,
            OrderStatus::Pending,
            "Only a pending order can be accepted"
        );
        self.status = OrderStatus::Accepted;
    }

    /// Cancel the order
    ///
    /// # Panics
    /// Panics if the order is already terminal.
    pub fn cancel(&mut self) {
        assert!(self.can_cancel(), "Cannot cancel order in terminal state");
        self.status = OrderStatus::Cancelled;
    }

    /// Reject the order at admission
    ///
    /// # Panics
    /// Panics unless the order is PENDING.
    pub fn reject(&mut self) {
        assert_eq!(
            self.status,
            OrderStatus::Pending,
            "Only a pending order can be rejected"
        );
        self.status = OrderStatus::Rejected;
    }

    /// Refresh the arrival stamp (modify loses time priority)
    pub fn refresh_arrival(&mut self, now: i64) {
        self.arrival_time = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_order(kind: OrderKind, qty: u64) -> Order {
        Order::new(
            UserId::new(),
            Symbol::new("WIPRO"),
            Side::Buy,
            kind,
            Quantity::new(qty),
            TimeInForce::Gtc,
            1,
        )
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_order_creation() {
        let order = test_order(OrderKind::Limit(Price::from_u64(500)), 100);

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.remaining(), Quantity::new(100));
        assert!(!order.has_fills());
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_market_order_has_no_price() {
        let order = test_order(OrderKind::Market, 100);
        assert!(order.is_market());
        assert_eq!(order.limit_price(), None);
        assert_eq!(order.display_price(), Decimal::ZERO);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_order_fill_progression() {
        let mut order = test_order(OrderKind::Limit(Price::from_u64(600)), 1000);
        order.accept();

        order.fill(Quantity::new(300));
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.filled_quantity, Quantity::new(300));
        assert_eq!(order.remaining(), Quantity::new(700));

        order.fill(Quantity::new(700));
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.is_filled());
        assert!(order.status.is_terminal());
    }

    #[test]
    #[should_panic(expected = "Fill would exceed order quantity")]
    fn test_order_overfill_panics() {
        let mut order = test_order(OrderKind::Limit(Price::from_u64(500)), 100);
        order.accept();
        order.fill(Quantity::new(101));
    }

    #[test]
    #[should_panic(expected = "not live in a book")]
    fn test_fill_pending_panics() {
        let mut order = test_order(OrderKind::Limit(Price::from_u64(500)), 100);
        order.fill(Quantity::new(10));
    }

    #[test]
    fn test_order_cancel() {
        let mut order = test_order(OrderKind::Limit(Price::from_u64(3200)), 50);
        order.accept();
        assert!(order.can_cancel());

        order.cancel();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(!order.can_cancel());
    }

    #[test]
    #[should_panic(expected = "Cannot cancel order in terminal state")]
    fn test_cancel_terminal_panics() {
        let mut order = test_order(OrderKind::Limit(Price::from_u64(500)), 100);
        order.accept();
        order.fill(Quantity::new(100));
        order.cancel();
    }

    #[test]
    fn test_partially_filled_can_cancel_not_modify() {
        let mut order = test_order(OrderKind::Limit(Price::from_u64(500)), 100);
        order.accept();
        order.fill(Quantity::new(40));

        assert!(order.can_cancel());
        assert!(!order.can_modify());
        assert!(order.set_quantity(Quantity::new(200)).is_err());
    }

    #[test]
    fn test_set_quantity_bounds() {
        let mut order = test_order(OrderKind::Limit(Price::from_u64(1500)), 100);
        order.accept();

        assert!(order.set_quantity(Quantity::new(150)).is_ok());
        assert_eq!(order.quantity, Quantity::new(150));

        assert!(
            order
                .set_quantity(Quantity::new(MAX_QTY_PLUS_ONE))
                .is_err()
        );
        assert_eq!(order.quantity, Quantity::new(150));
    }

    const MAX_QTY_PLUS_ONE: u64 = crate::numeric::MAX_ORDER_QUANTITY + 1;

    #[test]
    fn test_set_price_limit() {
        let mut order = test_order(OrderKind::Limit(Price::from_u64(1500)), 100);
        order.accept();

        assert!(order.set_price(Price::from_u64(1600)).is_ok());
        assert_eq!(order.limit_price(), Some(Price::from_u64(1600)));

        assert!(order.set_price(Price::from_u64(2_000_000)).is_err());
        assert_eq!(order.limit_price(), Some(Price::from_u64(1600)));
    }

    #[test]
    fn test_set_price_market_fails() {
        let mut order = test_order(OrderKind::Market, 100);
        assert_eq!(
            order.set_price(Price::from_u64(500)),
            Err(OrderError::MarketPriceImmutable)
        );
    }

    #[test]
    fn test_validate_rejects_out_of_band() {
        let too_big = test_order(OrderKind::Limit(Price::from_u64(500)), 10_000_000);
        assert!(too_big.validate().is_err());

        let bad_price = test_order(OrderKind::Limit(Price::from_str("0.001").unwrap()), 10);
        assert!(bad_price.validate().is_err());
    }

    #[test]
    fn test_order_serialization() {
        let order = test_order(OrderKind::Limit(Price::from_str("1800.50").unwrap()), 25);

        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(order, deserialized);
    }
}
