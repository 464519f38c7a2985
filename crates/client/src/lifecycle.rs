//! Flow lifecycle: open, update and close.
//!
//! Each operation issues exactly one `call_agreement` and returns the
//! gateway's transaction handle. No domain validation, no retries: an
//! invalid rate or a missing flow is for the ledger to reject.

use std::sync::Arc;

use flowledger_core::{AccountId, FlowRate, TokenId};
use flowledger_ports::{AgreementCall, AgreementExecutor, CallOptions, TxHandle};
use log::{debug, info};

use crate::config::ClientConfig;
use crate::error::Result;

// ============================================================================
// COMMANDS
// ============================================================================

/// Start a flow from `sender` to `receiver`, signed by `sender`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFlowRequest {
    pub token: TokenId,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub flow_rate: FlowRate,
    pub user_data: Option<Vec<u8>>,
}

impl OpenFlowRequest {
    pub fn new(token: TokenId, sender: AccountId, receiver: AccountId, flow_rate: FlowRate) -> Self {
        Self {
            token,
            sender,
            receiver,
            flow_rate,
            user_data: None,
        }
    }

    pub fn with_user_data(mut self, user_data: Vec<u8>) -> Self {
        self.user_data = Some(user_data);
        self
    }
}

/// Change the rate of an existing flow, signed by `sender`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFlowRequest {
    pub token: TokenId,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub flow_rate: FlowRate,
    pub user_data: Option<Vec<u8>>,
}

impl UpdateFlowRequest {
    pub fn new(token: TokenId, sender: AccountId, receiver: AccountId, flow_rate: FlowRate) -> Self {
        Self {
            token,
            sender,
            receiver,
            flow_rate,
            user_data: None,
        }
    }

    pub fn with_user_data(mut self, user_data: Vec<u8>) -> Self {
        self.user_data = Some(user_data);
        self
    }
}

/// Close a flow
///
/// Signed by `sender` unless `acting_as` names someone else: the receiver,
/// or a third party closing an insolvent sender's flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFlowRequest {
    pub token: TokenId,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub acting_as: Option<AccountId>,
    pub user_data: Option<Vec<u8>>,
}

impl CloseFlowRequest {
    pub fn new(token: TokenId, sender: AccountId, receiver: AccountId) -> Self {
        Self {
            token,
            sender,
            receiver,
            acting_as: None,
            user_data: None,
        }
    }

    pub fn acting_as(mut self, account: AccountId) -> Self {
        self.acting_as = Some(account);
        self
    }

    pub fn with_user_data(mut self, user_data: Vec<u8>) -> Self {
        self.user_data = Some(user_data);
        self
    }

    /// Identity the close is submitted as
    pub fn acting_identity(&self) -> &AccountId {
        self.acting_as.as_ref().unwrap_or(&self.sender)
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// Issues flow lifecycle intents against the agreement contract.
///
/// ## Type Parameters
///
/// - `G`: gateway able to submit agreement calls
pub struct FlowLifecycleClient<G>
where
    G: AgreementExecutor,
{
    gateway: Arc<G>,
    agreement: AccountId,
}

impl<G> FlowLifecycleClient<G>
where
    G: AgreementExecutor,
{
    pub fn new(gateway: Arc<G>, config: &ClientConfig) -> Self {
        Self {
            gateway,
            agreement: config.agreement.clone(),
        }
    }

    pub async fn open_flow(&self, request: OpenFlowRequest) -> Result<TxHandle> {
        let options = CallOptions::new(request.sender.clone()).with_user_data(request.user_data);
        let call = AgreementCall::CreateFlow {
            token: request.token,
            sender: request.sender,
            receiver: request.receiver,
            flow_rate: request.flow_rate,
        };
        self.submit(call, options).await
    }

    pub async fn update_flow(&self, request: UpdateFlowRequest) -> Result<TxHandle> {
        let options = CallOptions::new(request.sender.clone()).with_user_data(request.user_data);
        let call = AgreementCall::UpdateFlow {
            token: request.token,
            sender: request.sender,
            receiver: request.receiver,
            flow_rate: request.flow_rate,
        };
        self.submit(call, options).await
    }

    pub async fn close_flow(&self, request: CloseFlowRequest) -> Result<TxHandle> {
        let options =
            CallOptions::new(request.acting_identity().clone()).with_user_data(request.user_data);
        let call = AgreementCall::DeleteFlow {
            token: request.token,
            sender: request.sender,
            receiver: request.receiver,
        };
        self.submit(call, options).await
    }

    async fn submit(&self, call: AgreementCall, options: CallOptions) -> Result<TxHandle> {
        info!(
            "{} on {} for token {} as {}",
            call.name(),
            self.agreement,
            call.token(),
            options.from
        );
        let name = call.name();
        let tx = self
            .gateway
            .call_agreement(&self.agreement, call, options)
            .await?;
        debug!("{} included as {} in block {}", name, tx.tx_hash, tx.block_number);
        Ok(tx)
    }
}
