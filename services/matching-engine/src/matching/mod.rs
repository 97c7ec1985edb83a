//! Matching support: crossing predicates and trade construction

pub mod crossing;
pub mod executor;

pub use executor::TradeExecutor;

use types::order::Order;
use types::trade::Trade;

/// One trade together with post-fill snapshots of both orders
///
/// The snapshots are taken at fill time, so status events can be published
/// per trade even when a later trade in the same uncross advances the same
/// order further.
#[derive(Debug, Clone)]
pub struct Execution {
    pub trade: Trade,
    pub buy_order: Order,
    pub sell_order: Order,
}
