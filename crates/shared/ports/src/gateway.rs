//! Ledger gateway ports.
//!
//! Split by capability so that each client component depends only on the
//! calls it makes: the lifecycle client never reads logs, the listing never
//! writes.

use async_trait::async_trait;
use flowledger_core::{AccountId, FlowRate, FlowUpdateEvent, TokenId};

use crate::error::GatewayResult;
use crate::types::{AgreementCall, CallOptions, EventQuery, RawFlowRecord, TxHandle};

// ============================================================================
// STATE-CHANGING CALLS
// ============================================================================

/// Port for submitting calls to a ledger agreement contract.
#[async_trait]
pub trait AgreementExecutor: Send + Sync {
    /// Execute `call` against the agreement at `agreement`, acting as
    /// `options.from`. One call, one transaction.
    async fn call_agreement(
        &self,
        agreement: &AccountId,
        call: AgreementCall,
        options: CallOptions,
    ) -> GatewayResult<TxHandle>;
}

// ============================================================================
// POINT QUERIES
// ============================================================================

/// Port for authoritative point reads of current flow state.
#[async_trait]
pub trait FlowReader: Send + Sync {
    /// Current state of the (sender, receiver) flow for `token`.
    async fn get_flow(
        &self,
        token: &TokenId,
        sender: &AccountId,
        receiver: &AccountId,
    ) -> GatewayResult<RawFlowRecord>;

    /// Inbound minus outbound rate of `account` for `token`.
    async fn get_net_flow(&self, token: &TokenId, account: &AccountId) -> GatewayResult<FlowRate>;
}

// ============================================================================
// EVENT LOG
// ============================================================================

/// Port for reading the historical event log.
#[async_trait]
pub trait EventLogSource: Send + Sync {
    /// Every event matching `query`, in no guaranteed order.
    async fn get_past_events(&self, query: EventQuery) -> GatewayResult<Vec<FlowUpdateEvent>>;
}

// ============================================================================
// COMBINED TRAIT
// ============================================================================

/// Full ledger gateway: everything the Flowledger client needs.
pub trait LedgerGateway: AgreementExecutor + FlowReader + EventLogSource {}

// Blanket implementation
impl<T> LedgerGateway for T where T: AgreementExecutor + FlowReader + EventLogSource {}
