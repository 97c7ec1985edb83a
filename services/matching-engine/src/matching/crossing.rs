//! Crossing detection
//!
//! Determines when the best bid and best ask can trade, and at what price.
//! Market orders carry no limit: a market buy crosses as +infinity, a market
//! sell as -infinity.

use types::numeric::Price;
use types::order::OrderKind;

/// Check whether a resting bid and a resting ask cross
///
/// Two limits cross when bid >= ask; a market order on either side crosses
/// anything on the other.
pub fn crosses(bid: &OrderKind, ask: &OrderKind) -> bool {
    match (bid.limit_price(), ask.limit_price()) {
        (Some(bid), Some(ask)) => bid >= ask,
        _ => true,
    }
}

/// Execution price for a crossed pair: the resting ask's limit, or the bid's
/// limit when the ask is a market order
///
/// Returns `None` when both sides are market orders; no price is
/// discoverable and the pair must not trade.
pub fn execution_price(bid: &OrderKind, ask: &OrderKind) -> Option<Price> {
    match (ask.limit_price(), bid.limit_price()) {
        (Some(ask), _) => Some(ask),
        (None, Some(bid)) => Some(bid),
        (None, None) => None,
    }
}
