//! Flowledger Reconciler
//!
//! The ledger has no "list open flows" query. The only way to know which
//! flows are active is to replay the `FlowUpdated` log and keep the last
//! write per (sender, receiver) key, much like compacting a log-structured
//! key-value store.
//!
//! ## Pipeline
//!
//! ```text
//! events ──► group by FlowKey ──► keep greatest EventPosition ──► drop rate == 0 ──► FlowEntry
//! ```
//!
//! Two entry points share those semantics:
//!
//! - [`FlowLedgerReconciler`]: pure, batch. Rebuilds the view from a full
//!   history on every call.
//! - [`FlowIndex`]: incremental. Keeps the winning event per key and folds
//!   in new events as they are observed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flowledger_core::FlowDirection;
//! use flowledger_reconciler::FlowLedgerReconciler;
//!
//! let reconciler = FlowLedgerReconciler::new(token, account);
//! let view = reconciler.reconcile(FlowDirection::Both, &inbound, &outbound)?;
//! ```

pub mod error;
pub mod index;
pub mod reconcile;

pub use error::{AccountRole, ReconcileError, Result};
pub use index::FlowIndex;
pub use reconcile::{FlowLedgerReconciler, latest_by_key};
