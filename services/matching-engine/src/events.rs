//! Event sink interface
//!
//! Subscribers receive trade executions and order status transitions. The
//! engine invokes callbacks on the thread that produced the event, after
//! releasing every engine and book lock.

use types::order::Order;
use types::trade::Trade;

/// Receiver for trade and order-status notifications
///
/// Callbacks get immutable snapshots. Sinks must return quickly and must not
/// call back into mutating engine APIs from inside a callback; the engine
/// may be mid-operation on an adjacent book. A panicking sink is caught and
/// logged without disturbing other sinks.
pub trait EventSink: Send + Sync {
    fn on_trade_executed(&self, trade: &Trade);
    fn on_order_status_changed(&self, order: &Order);
}
