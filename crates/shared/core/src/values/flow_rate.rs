use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Largest magnitude a flow rate may take: the ledger stores rates as
/// 96-bit signed integers, so |rate| <= 2^95 - 1.
const MAX_MAGNITUDE: Decimal = Decimal::from_parts(u32::MAX, u32::MAX, 0x7FFF_FFFF, false, 0);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowRateError {
    #[error("Flow rate must be an integer, got {0}")]
    Fractional(Decimal),

    #[error("Flow rate {0} exceeds the 96-bit signed range")]
    OutOfRange(Decimal),

    #[error("Invalid flow rate literal: {0}")]
    Parse(String),
}

/// Signed, integer-valued rate in token units per second
///
/// Zero means "no flow". Always held at scale 0 so that `Display` and
/// serialization produce the canonical integer string (`"385802469135802"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct FlowRate(Decimal);

impl FlowRate {
    pub const ZERO: FlowRate = FlowRate(Decimal::ZERO);

    /// Largest representable rate
    pub const MAX: FlowRate = FlowRate(MAX_MAGNITUDE);

    /// Build a rate from an arbitrary decimal, rejecting fractional or
    /// out-of-range values.
    pub fn new(value: Decimal) -> Result<Self, FlowRateError> {
        if !value.fract().is_zero() {
            return Err(FlowRateError::Fractional(value));
        }
        if value.abs() > MAX_MAGNITUDE {
            return Err(FlowRateError::OutOfRange(value));
        }
        Ok(Self(value.normalize()))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Sum of two rates, `None` if the result leaves the ledger's range
    pub fn checked_add(self, other: FlowRate) -> Option<FlowRate> {
        self.0.checked_add(other.0).and_then(|v| FlowRate::new(v).ok())
    }

    /// Difference of two rates, `None` if the result leaves the ledger's range
    pub fn checked_sub(self, other: FlowRate) -> Option<FlowRate> {
        self.0.checked_sub(other.0).and_then(|v| FlowRate::new(v).ok())
    }
}

impl std::fmt::Display for FlowRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FlowRate {
    type Err = FlowRateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|e| FlowRateError::Parse(e.to_string()))?;
        FlowRate::new(value)
    }
}

impl TryFrom<Decimal> for FlowRate {
    type Error = FlowRateError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        FlowRate::new(value)
    }
}

impl From<FlowRate> for Decimal {
    fn from(rate: FlowRate) -> Self {
        rate.0
    }
}

impl From<i64> for FlowRate {
    fn from(value: i64) -> Self {
        FlowRate::from_i64(value)
    }
}
