use serde::{Deserialize, Serialize};

use crate::values::AccountId;

/// Ordered (sender, receiver) pair identifying a flow within one token
///
/// Direction matters: `(A, B)` and `(B, A)` are distinct flows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlowKey {
    pub sender: AccountId,
    pub receiver: AccountId,
}

impl FlowKey {
    pub fn new(sender: impl Into<AccountId>, receiver: impl Into<AccountId>) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
        }
    }
}

impl std::fmt::Display for FlowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.sender, self.receiver)
    }
}
