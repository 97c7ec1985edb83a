//! Error taxonomy for the matching engine
//!
//! Every failure is an explicit result; nothing panics across the public
//! boundary. Asserts inside the core guard internal invariants only.

use crate::ids::{OrderId, Symbol, UserId};
use crate::order::OrderStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Validation and state failures on a single order
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("quantity {quantity} outside the admissible band")]
    InvalidQuantity { quantity: u64 },

    #[error("price {price} outside the admissible limit band")]
    PriceOutOfRange { price: Decimal },

    #[error("market orders have no client-controlled price")]
    MarketPriceImmutable,

    #[error("empty symbol")]
    EmptySymbol,

    #[error("order not modifiable in status {status}")]
    NotModifiable { status: OrderStatus },
}

/// Failures of order-book operations; the book is left untouched
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    #[error("order symbol {found} does not match book symbol {expected}")]
    SymbolMismatch { expected: Symbol, found: Symbol },

    #[error("duplicate order id {order_id}")]
    DuplicateOrder { order_id: OrderId },

    #[error("invalid order: {0}")]
    InvalidOrder(#[from] OrderError),

    #[error("order {order_id} is not pending admission (status {status})")]
    NotPending {
        order_id: OrderId,
        status: OrderStatus,
    },

    #[error("order {order_id} not found in book")]
    OrderNotFound { order_id: OrderId },

    #[error("order {order_id} not cancellable in status {status}")]
    NotCancellable {
        order_id: OrderId,
        status: OrderStatus,
    },

    #[error("fill-or-kill unfillable: requested {requested}, available {available}")]
    FokUnfillable { requested: u64, available: u64 },
}

/// Top-level engine failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown user {user_id}")]
    UnknownUser { user_id: UserId },

    #[error("user record has empty identity fields")]
    InvalidUser,

    #[error("user {user_id} already registered")]
    DuplicateUser { user_id: UserId },

    #[error("order {order_id} does not belong to the caller")]
    NotOrderOwner { order_id: OrderId },

    #[error("negative price {price}")]
    NegativePrice { price: Decimal },

    #[error("order error: {0}")]
    Order(#[from] OrderError),

    #[error("book error: {0}")]
    Book(#[from] BookError),
}
