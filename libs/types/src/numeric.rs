//! Fixed-point decimal types for prices and quantities
//!
//! Uses rust_decimal for exact arithmetic. Exchange feeds deliver prices and
//! quantities as decimal strings, so parsing them straight into `Decimal`
//! keeps sums exact and makes `filled == requested` a safe comparison.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::NumericError;

/// Parse an `f64` through its shortest round-trip representation.
///
/// `0.1_f64` becomes exactly `0.1`, not the binary expansion.
fn decimal_from_f64(value: f64) -> Result<Decimal, NumericError> {
    if !value.is_finite() {
        return Err(NumericError::NonFinite(value.to_string()));
    }
    Decimal::from_str(&value.to_string()).map_err(|e| NumericError::Parse {
        input: value.to_string(),
        reason: e.to_string(),
    })
}

fn decimal_from_str(s: &str) -> Result<Decimal, NumericError> {
    Decimal::from_str(s.trim()).map_err(|e| NumericError::Parse {
        input: s.to_string(),
        reason: e.to_string(),
    })
}

/// A price level. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value < Decimal::ZERO {
            return Err(NumericError::Negative(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_f64(value: f64) -> Result<Self, NumericError> {
        Self::try_new(decimal_from_f64(value)?)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for Price {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(decimal_from_str(s)?)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An amount of the base asset. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value < Decimal::ZERO {
            return Err(NumericError::Negative(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_f64(value: f64) -> Result<Self, NumericError> {
        Self::try_new(decimal_from_f64(value)?)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtract, flooring the result at zero.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if rhs.0 >= self.0 {
            Self::zero()
        } else {
            Self(self.0 - rhs.0)
        }
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Quantity> for Quantity {
    fn sum<I: Iterator<Item = &'a Quantity>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Quantity {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(decimal_from_str(s)?)
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
    fn test_quantity_sum_is_exact() {
        let parts = ["0.1", "0.2", "0.3", "0.4"];
        let total: Quantity = parts
            .iter()
            .map(|p| Quantity::from_str(p).unwrap())
            .sum();
        assert_eq!(total, Quantity::from_u64(1));
    }

    #[test]
    fn test_from_f64_uses_shortest_repr() {
        let qty = Quantity::from_f64(0.1).unwrap();
        assert_eq!(qty, Quantity::from_str("0.1").unwrap());

        let price = Price::from_f64(100.25).unwrap();
        assert_eq!(price.to_string(), "100.25");
    }

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            Quantity::from_str("-1"),
            Err(NumericError::Negative(_))
        ));
        assert!(Price::from_f64(-0.5).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(matches!(
            Quantity::from_f64(f64::NAN),
            Err(NumericError::NonFinite(_))
        ));
        assert!(Price::from_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            Price::from_str("abc"),
            Err(NumericError::Parse { .. })
        ));
    }

    #[test]
    fn test_saturating_sub() {
        let a = Quantity::from_str("0.4").unwrap();
        let b = Quantity::from_str("0.6").unwrap();
        assert_eq!(b.saturating_sub(a), Quantity::from_str("0.2").unwrap());
        assert_eq!(a.saturating_sub(b), Quantity::zero());
    }

    #[test]
    fn test_serializes_as_string() {
        let price = Price::from_str("101.50").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"101.50\"");

        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn qty(units: u64, scale: u32) -> Quantity {
            Quantity::try_new(Decimal::new(units as i64, scale)).unwrap()
        }

        proptest! {
            #[test]
            fn add_then_saturating_sub_is_identity(
                a in 0u64..1_000_000_000,
                b in 0u64..1_000_000_000,
                scale in 0u32..9,
            ) {
                let (a, b) = (qty(a, scale), qty(b, scale));
                prop_assert_eq!((a + b).saturating_sub(b), a);
            }

            #[test]
            fn saturating_sub_never_negative(a in 0u64..1_000_000, b in 0u64..1_000_000) {
                let diff = qty(a, 4).saturating_sub(qty(b, 4));
                prop_assert!(diff.as_decimal() >= Decimal::ZERO);
            }
        }
    }
}
