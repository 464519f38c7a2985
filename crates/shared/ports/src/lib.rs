//! Flowledger Ports
//!
//! Port definitions (traits) for the ledger that Flowledger drives.
//! These define the boundary between client logic and whatever actually
//! talks to a ledger node (RPC adapter, simulator, test double).

mod error;
mod gateway;
mod types;

pub use error::{GatewayError, GatewayResult};
pub use gateway::{AgreementExecutor, EventLogSource, FlowReader, LedgerGateway};
pub use types::{
    AgreementCall, BlockTag, CallOptions, EventQuery, RawFlowRecord, TxHandle,
    FLOW_UPDATED_EVENT,
};
