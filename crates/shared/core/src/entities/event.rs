use serde::{Deserialize, Serialize};

use super::FlowKey;
use crate::values::{AccountId, FlowRate, TokenId};

/// Position of an event in the ledger's total order
///
/// Ordered by block first, then by log index within the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventPosition {
    pub block_number: u64,
    pub log_index: u32,
}

impl EventPosition {
    pub fn new(block_number: u64, log_index: u32) -> Self {
        Self {
            block_number,
            log_index,
        }
    }
}

impl std::fmt::Display for EventPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.block_number, self.log_index)
    }
}

/// One `FlowUpdated` entry from the ledger's event log
///
/// Immutable once observed. A zero `flow_rate` records closure of the
/// (sender, receiver) flow, not a separate flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowUpdateEvent {
    pub token: TokenId,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub flow_rate: FlowRate,
    pub position: EventPosition,
}

impl FlowUpdateEvent {
    pub fn new(
        token: impl Into<TokenId>,
        sender: impl Into<AccountId>,
        receiver: impl Into<AccountId>,
        flow_rate: FlowRate,
        position: EventPosition,
    ) -> Self {
        Self {
            token: token.into(),
            sender: sender.into(),
            receiver: receiver.into(),
            flow_rate,
            position,
        }
    }

    pub fn key(&self) -> FlowKey {
        FlowKey {
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
        }
    }

    /// True when this event closes the flow
    pub fn is_closure(&self) -> bool {
        self.flow_rate.is_zero()
    }
}
