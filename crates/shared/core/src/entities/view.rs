use serde::{Deserialize, Serialize};

use crate::values::{AccountId, FlowRate};

/// Which side(s) of an account's flows a listing should include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    /// Flows where the account is the receiver
    Inbound,
    /// Flows where the account is the sender
    Outbound,
    #[default]
    Both,
}

impl FlowDirection {
    pub fn includes_inbound(&self) -> bool {
        matches!(self, FlowDirection::Inbound | FlowDirection::Both)
    }

    pub fn includes_outbound(&self) -> bool {
        matches!(self, FlowDirection::Outbound | FlowDirection::Both)
    }
}

/// An active flow as projected from its latest event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEntry {
    pub sender: AccountId,
    pub receiver: AccountId,
    /// Always nonzero
    pub flow_rate: FlowRate,
}

/// Active flows of one account, partitioned by direction
///
/// `None` means the direction was not requested; `Some(vec![])` means it was
/// requested and the account has no active flows on that side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_flows: Option<Vec<FlowEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_flows: Option<Vec<FlowEntry>>,
}
