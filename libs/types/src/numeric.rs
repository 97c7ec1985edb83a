//! Numeric types for prices and quantities
//!
//! Prices use rust_decimal for deterministic arithmetic (no floating-point
//! errors); quantities are whole units. Both carry the system-wide bounds as
//! constants.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Largest quantity a single order may carry
pub const MAX_ORDER_QUANTITY: u64 = 1_000_000;

/// Smallest admissible limit price (0.01)
pub const MIN_ORDER_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest admissible limit price (1,000,000.00)
pub const MAX_ORDER_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Tolerance for price equality (1e-9)
///
/// Decimal comparison is exact, so two prices closer than the tolerance but
/// unequal cannot arise from admissible inputs; the constant documents the
/// contract and backs `Price::approx_eq`.
pub const PRICE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Price with fixed-point decimal representation
///
/// Always strictly positive. Ordered, so it can key a sorted book side.
/// Serialized as string to prevent JSON number precision loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Create a new Price from a Decimal
    ///
    /// # Panics
    /// Panics if the price is not strictly positive
    pub fn new(value: Decimal) -> Self {
        assert!(value > Decimal::ZERO, "Price must be positive");
        Self(value)
    }

    /// Try to create a Price, returning None if not strictly positive
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create from integer (for testing/convenience)
    pub fn from_u64(value: u64) -> Self {
        Self::new(Decimal::from(value))
    }

    /// Create from string
    pub fn from_str(s: &str) -> Result<Self, rust_decimal::Error> {
        let decimal = Decimal::from_str(s)?;
        Ok(Self::new(decimal))
    }

    /// Get the inner decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Equality within `PRICE_EPSILON`
    pub fn approx_eq(&self, other: &Price) -> bool {
        (self.0 - other.0).abs() < PRICE_EPSILON
    }

    /// True if this price is inside the admissible limit band
    pub fn in_limit_band(&self) -> bool {
        self.0 >= MIN_ORDER_PRICE && self.0 <= MAX_ORDER_PRICE
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Decimal;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0 - rhs.0
    }
}

// Custom serialization to preserve precision
impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let decimal = Decimal::from_str(&s).map_err(serde::de::Error::custom)?;
        Self::try_new(decimal).ok_or_else(|| serde::de::Error::custom("Price must be positive"))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order quantity in whole units
///
/// Zero is representable (filled quantity of a fresh order); order creation
/// requires at least one unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    /// Create a new Quantity
    ///
    /// # Panics
    /// Panics if the quantity is zero
    pub fn new(value: u64) -> Self {
        assert!(value > 0, "Quantity must be positive");
        Self(value)
    }

    /// Try to create a Quantity, returning None if zero
    pub fn try_new(value: u64) -> Option<Self> {
        if value > 0 { Some(Self(value)) } else { None }
    }

    /// Zero quantity
    pub fn zero() -> Self {
        Self(0)
    }

    /// Get the raw unit count
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Check if the quantity is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// True if this quantity is inside the admissible order band
    pub fn in_order_band(&self) -> bool {
        self.0 >= 1 && self.0 <= MAX_ORDER_QUANTITY
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.checked_add(rhs.0).expect("Quantity overflow"))
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        assert!(self.0 >= rhs.0, "Quantity subtraction would go negative");
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_creation() {
        let price = Price::from_u64(500);
        assert_eq!(price.as_decimal(), Decimal::from(500));
    }

    #[test]
    #[should_panic(expected = "Price must be positive")]
    fn test_price_negative_panics() {
        Price::new(Decimal::from(-100));
    }

    #[test]
    fn test_price_try_new() {
        assert!(Price::try_new(Decimal::ZERO).is_none());
        assert!(Price::try_new(Decimal::from(1)).is_some());
    }

    #[test]
    fn test_price_ordering() {
        let p1 = Price::from_str("499.99").unwrap();
        let p2 = Price::from_u64(500);
        assert!(p1 < p2);
    }

    #[test]
    fn test_price_scale_insensitive_equality() {
        // 500.0 and 500.00 are the same price level
        let p1 = Price::from_str("500.0").unwrap();
        let p2 = Price::from_str("500.00").unwrap();
        assert_eq!(p1, p2);
        assert!(p1.approx_eq(&p2));
    }

    #[test]
    fn test_price_limit_band() {
        assert!(Price::from_str("0.01").unwrap().in_limit_band());
        assert!(Price::from_u64(1_000_000).in_limit_band());
        assert!(!Price::from_str("0.001").unwrap().in_limit_band());
        assert!(!Price::from_u64(1_000_001).in_limit_band());
    }

    #[test]
    fn test_price_serialization() {
        let price = Price::from_str("1800.25").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"1800.25\"");

        let deserialized: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(price, deserialized);
    }

    #[test]
    fn test_quantity_creation() {
        let qty = Quantity::new(100);
        assert_eq!(qty.as_u64(), 100);
    }

    #[test]
    fn test_quantity_zero() {
        let qty = Quantity::zero();
        assert!(qty.is_zero());
        assert!(Quantity::try_new(0).is_none());
    }

    #[test]
    fn test_quantity_arithmetic() {
        let q1 = Quantity::new(700);
        let q2 = Quantity::new(300);

        assert_eq!(q1 + q2, Quantity::new(1000));
        assert_eq!(q1 - q2, Quantity::new(400));
    }

    #[test]
    #[should_panic(expected = "Quantity subtraction would go negative")]
    fn test_quantity_underflow_panics() {
        let _ = Quantity::new(1) - Quantity::new(2);
    }

    #[test]
    fn test_quantity_order_band() {
        assert!(Quantity::new(1).in_order_band());
        assert!(Quantity::new(MAX_ORDER_QUANTITY).in_order_band());
        assert!(!Quantity::new(MAX_ORDER_QUANTITY + 1).in_order_band());
    }

    #[test]
    fn test_constants() {
        assert_eq!(MIN_ORDER_PRICE, Decimal::from_str("0.01").unwrap());
        assert_eq!(MAX_ORDER_PRICE, Decimal::from(1_000_000));
        assert_eq!(PRICE_EPSILON, Decimal::from_str("0.000000001").unwrap());
    }
}
