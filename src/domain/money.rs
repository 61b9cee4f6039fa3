use crate::error::WorkflowError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::iter::Sum;
use std::ops::Add;

/// A non-negative monetary value (room prices, booking totals).
///
/// Wraps `rust_decimal::Decimal` so arithmetic stays exact. Serialized as a
/// decimal string so no digits are lost on the wire or in storage; numbers
/// and strings are both accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct Price(Decimal);

/// A strictly positive amount, the only kind a payment may be created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Amount(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, WorkflowError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(WorkflowError::validation("Price must be non-negative"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, WorkflowError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(WorkflowError::validation(
                "Payment amount must be greater than 0",
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = WorkflowError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<Price> for Amount {
    type Error = WorkflowError;

    fn try_from(price: Price) -> Result<Self, Self::Error> {
        Self::new(price.0)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Add for Price {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + p)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Price::new(value).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Amount::new(value).map_err(serde::de::Error::custom)
    }
}
