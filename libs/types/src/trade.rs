//! Trade record types
//!
//! A trade is the immutable record of one match between a resting buy and a
//! resting sell; it references the two orders by id only.

use crate::ids::{OrderId, Symbol, TradeId};
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One executed match between two resting orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    /// Global monotonic sequence across all books
    pub sequence: u64,
    pub symbol: Symbol,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub quantity: Quantity,
    pub price: Price,
    /// Execution time, Unix nanos
    pub executed_at: i64,
}

impl Trade {
    pub fn new(
        sequence: u64,
        symbol: Symbol,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        quantity: Quantity,
        price: Price,
        executed_at: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            sequence,
            symbol,
            buy_order_id,
            sell_order_id,
            quantity,
            price,
            executed_at,
        }
    }

    /// Traded value: price x quantity
    pub fn notional(&self) -> Decimal {
        self.price.as_decimal() * Decimal::from(self.quantity.as_u64())
    }
}
