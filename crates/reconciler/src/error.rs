//! Reconciliation errors
//!
//! Every variant is a broken input contract (bad total order, wrong batch),
//! not a runtime condition a caller can recover from.

use flowledger_core::{AccountId, EventPosition, FlowKey, TokenId};
use thiserror::Error;

/// Side of a flow an account sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountRole {
    Sender,
    Receiver,
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountRole::Sender => write!(f, "sender"),
            AccountRole::Receiver => write!(f, "receiver"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Two different events share position {position}: {first} and {second}")]
    ConflictingPosition {
        position: EventPosition,
        first: FlowKey,
        second: FlowKey,
    },

    #[error("Event for token {found} in a batch for token {expected}")]
    TokenMismatch { expected: TokenId, found: TokenId },

    #[error("Event {key} does not have {account} as {role}")]
    RoleMismatch {
        account: AccountId,
        role: AccountRole,
        key: FlowKey,
    },
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
