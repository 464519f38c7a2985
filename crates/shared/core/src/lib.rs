//! Flowledger Core Domain
//!
//! Pure domain types for the Flowledger streaming-payment client.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    EventPosition, FlowDirection, FlowEntry, FlowKey, FlowRecord, FlowUpdateEvent, FlowView,
};
pub use values::{AccountId, Amount, FlowRate, FlowRateError, Timestamp, TokenId};
