use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

mod flow_rate;
mod ids;

pub use flow_rate::{FlowRate, FlowRateError};
pub use ids::{AccountId, TokenId};

/// Non-negative token amount (deposits) - integer-valued Decimal
pub type Amount = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;
