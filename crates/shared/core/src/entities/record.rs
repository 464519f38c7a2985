use serde::{Deserialize, Serialize};

use crate::values::{Amount, FlowRate, Timestamp};

/// Authoritative state of one flow as reported by the ledger
///
/// Fetched live on every query and never derived client-side. A pair with
/// no flow comes back with a zero rate and an epoch timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Instant of the last update to this flow
    pub timestamp: Timestamp,
    pub flow_rate: FlowRate,
    /// Deposit locked by the sender for this flow
    pub deposit: Amount,
    /// Part of the deposit owed to the protocol
    pub owed_deposit: Amount,
}

impl FlowRecord {
    pub fn is_active(&self) -> bool {
        !self.flow_rate.is_zero()
    }
}
