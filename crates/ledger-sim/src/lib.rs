//! Flowledger Ledger Simulator
//!
//! A single-process stand-in for a ledger node running the constant-flow
//! agreement. It keeps authoritative flow state, produces one block per
//! accepted call and appends a `FlowUpdated` event to an in-memory log.
//!
//! - [`FlowLedgerSimulator`]: the ledger state machine (sync, `&mut self`)
//! - [`SimulatedLedgerGateway`]: adapter implementing every port in
//!   `flowledger-ports`, with failure injection for tests
//!
//! Deposit and liquidation rules are deliberately coarse: a flow locks
//! `rate * liquidation_period_secs` as deposit, and third-party closes are
//! only accepted for senders marked critical.

pub mod adapter;
pub mod config;
pub mod simulator;

pub use adapter::SimulatedLedgerGateway;
pub use config::{ConfigError, EventOrder, SimulatorConfig};
pub use simulator::{FlowLedgerSimulator, SimulatorError};
