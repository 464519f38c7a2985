//! Flowledger Client
//!
//! Client layer for streaming-payment flows on an external ledger.
//!
//! - **Lifecycle** ([`FlowLifecycleClient`]): open, update and close flows.
//!   Each intent is exactly one `call_agreement` round trip.
//! - **Point queries** ([`FlowStateQuery`]): current record of one flow and
//!   an account's net flow, straight from the ledger.
//! - **Listing** ([`FlowListing`]): active inbound/outbound flows of an
//!   account, rebuilt from the `FlowUpdated` log on every call.
//! - **Incremental listing** ([`FlowIndexer`]): same view, fetching only
//!   events newer than the last sync.
//!
//! ## Architecture
//!
//! ```text
//!            ┌────────────────────── FlowClient ──────────────────────┐
//!            │ FlowLifecycleClient   FlowStateQuery   FlowListing      │
//!            └────────┬──────────────────┬───────────────┬────────────┘
//!                     │ call_agreement   │ get_flow      │ get_past_events
//!                     │                  │ get_net_flow  │        │
//!                     ▼                  ▼               ▼        ▼
//!                 ┌──────────── LedgerGateway ───────┐   FlowLedgerReconciler
//!                 │ (RPC adapter, simulator, ...)    │
//!                 └──────────────────────────────────┘
//! ```
//!
//! Nothing here retries, caches or times out: gateway failures come back
//! unchanged as [`ClientError::Upstream`].

pub mod client;
pub mod config;
pub mod error;
pub mod indexer;
pub mod lifecycle;
pub mod listing;
pub mod query;

pub use client::FlowClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, Result};
pub use indexer::FlowIndexer;
pub use lifecycle::{CloseFlowRequest, FlowLifecycleClient, OpenFlowRequest, UpdateFlowRequest};
pub use listing::{FlowListing, ListFlowsRequest};
pub use query::FlowStateQuery;
