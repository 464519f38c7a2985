//! Client errors

use flowledger_ports::GatewayError;
use flowledger_reconciler::ReconcileError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The ledger gateway failed; passed through untouched
    #[error("Ledger gateway error: {0}")]
    Upstream(#[from] GatewayError),

    /// The fetched log broke the reconciler's input contract
    #[error("Event log contract violation: {0}")]
    ContractViolation(#[from] ReconcileError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
