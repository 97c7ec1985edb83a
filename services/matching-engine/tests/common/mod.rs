//! Shared helpers for the integration suites

use matching_engine::events::EventSink;
use parking_lot::Mutex;
use types::order::Order;
use types::trade::Trade;

/// Records every event in arrival order for assertions
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RecordedEvent>>,
}

#[derive(Debug, Clone)]
pub enum RecordedEvent {
    Trade(Trade),
    Status(Order),
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    pub fn trades(&self) -> Vec<Trade> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Trade(trade) => Some(trade.clone()),
                RecordedEvent::Status(_) => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<Order> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Status(order) => Some(order.clone()),
                RecordedEvent::Trade(_) => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn on_trade_executed(&self, trade: &Trade) {
        self.events.lock().push(RecordedEvent::Trade(trade.clone()));
    }

    fn on_order_status_changed(&self, order: &Order) {
        self.events
            .lock()
            .push(RecordedEvent::Status(order.clone()));
    }
}

/// Every book invariant that must hold after any engine operation
pub fn assert_book_invariants(book: &matching_engine::OrderBook) {
    use std::collections::HashSet;
    use types::order::OrderStatus;

    let bids = book.snapshot_bids();
    let asks = book.snapshot_asks();

    for window in bids.windows(2) {
        let (x, y) = (&window[0], &window[1]);
        match (x.limit_price(), y.limit_price()) {
            (Some(px), Some(py)) => {
                assert!(
                    px > py || (px.approx_eq(&py) && x.arrival_time < y.arrival_time),
                    "bid ordering violated: {px}@{} before {py}@{}",
                    x.arrival_time,
                    y.arrival_time
                );
            }
            // market bids outrank limits and queue FIFO among themselves
            (None, None) => assert!(x.arrival_time < y.arrival_time),
            (Some(_), None) => panic!("limit bid ahead of market bid"),
            (None, Some(_)) => {}
        }
    }
    for window in asks.windows(2) {
        let (x, y) = (&window[0], &window[1]);
        match (x.limit_price(), y.limit_price()) {
            (Some(px), Some(py)) => {
                assert!(
                    px < py || (px.approx_eq(&py) && x.arrival_time < y.arrival_time),
                    "ask ordering violated: {px}@{} before {py}@{}",
                    x.arrival_time,
                    y.arrival_time
                );
            }
            (None, None) => assert!(x.arrival_time < y.arrival_time),
            (Some(_), None) => panic!("limit ask ahead of market ask"),
            (None, Some(_)) => {}
        }
    }

    if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
        assert!(bid < ask, "residual cross: bid {bid} >= ask {ask}");
    }

    let mut seen = HashSet::new();
    for order in bids.iter().chain(asks.iter()) {
        assert!(
            seen.insert(order.order_id),
            "order {} appears twice in the book",
            order.order_id
        );
        assert!(!order.remaining().is_zero(), "queued order with nothing left");
        assert!(
            matches!(
                order.status,
                OrderStatus::Accepted | OrderStatus::PartiallyFilled
            ),
            "queued order in status {}",
            order.status
        );
        assert_eq!(
            order.filled_quantity + order.remaining(),
            order.quantity,
            "quantity conservation violated"
        );
    }
}
