use flowledger_core::{AccountId, EventPosition, FlowRate, TokenId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Name of the log event emitted on every flow-rate change
pub const FLOW_UPDATED_EVENT: &str = "FlowUpdated";

/// State-changing call against the flow agreement
///
/// Encoding into contract call data is the gateway's job; the client only
/// states the intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgreementCall {
    CreateFlow {
        token: TokenId,
        sender: AccountId,
        receiver: AccountId,
        flow_rate: FlowRate,
    },
    UpdateFlow {
        token: TokenId,
        sender: AccountId,
        receiver: AccountId,
        flow_rate: FlowRate,
    },
    DeleteFlow {
        token: TokenId,
        sender: AccountId,
        receiver: AccountId,
    },
}

impl AgreementCall {
    pub fn name(&self) -> &'static str {
        match self {
            AgreementCall::CreateFlow { .. } => "createFlow",
            AgreementCall::UpdateFlow { .. } => "updateFlow",
            AgreementCall::DeleteFlow { .. } => "deleteFlow",
        }
    }

    pub fn token(&self) -> &TokenId {
        match self {
            AgreementCall::CreateFlow { token, .. }
            | AgreementCall::UpdateFlow { token, .. }
            | AgreementCall::DeleteFlow { token, .. } => token,
        }
    }
}

/// Per-call options: the acting identity and opaque user data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOptions {
    pub from: AccountId,
    pub user_data: Option<Vec<u8>>,
}

impl CallOptions {
    /// Options acting as `from`, without user data
    pub fn new(from: AccountId) -> Self {
        Self {
            from,
            user_data: None,
        }
    }

    pub fn with_user_data(mut self, user_data: Option<Vec<u8>>) -> Self {
        self.user_data = user_data;
        self
    }
}

impl From<AccountId> for CallOptions {
    fn from(from: AccountId) -> Self {
        CallOptions::new(from)
    }
}

/// Opaque handle to a submitted ledger transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHandle {
    pub tx_hash: String,
    pub block_number: u64,
}

/// Flow state exactly as the ledger returns it
///
/// `timestamp` is unix seconds; shaping into a `FlowRecord` happens in
/// the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFlowRecord {
    pub timestamp: u64,
    pub flow_rate: FlowRate,
    pub deposit: Decimal,
    pub owed_deposit: Decimal,
}

/// Upper bound of a log query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    #[default]
    Latest,
    Number(u64),
}

impl BlockTag {
    pub fn includes(&self, block_number: u64) -> bool {
        match self {
            BlockTag::Latest => true,
            BlockTag::Number(n) => block_number <= *n,
        }
    }
}

/// Filtered historical log query
///
/// `sender` / `receiver` narrow the log to one side of an account's flows;
/// `None` means "any".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub event: String,
    pub token: TokenId,
    pub sender: Option<AccountId>,
    pub receiver: Option<AccountId>,
    pub from_block: u64,
    pub to_block: BlockTag,
}

impl EventQuery {
    /// All `FlowUpdated` events of a token over the full history
    pub fn flow_updates(token: TokenId) -> Self {
        Self {
            event: FLOW_UPDATED_EVENT.to_string(),
            token,
            sender: None,
            receiver: None,
            from_block: 0,
            to_block: BlockTag::Latest,
        }
    }

    pub fn with_sender(mut self, sender: AccountId) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_receiver(mut self, receiver: AccountId) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn with_range(mut self, from_block: u64, to_block: BlockTag) -> Self {
        self.from_block = from_block;
        self.to_block = to_block;
        self
    }

    /// Whether an event at `position` with the given parties matches this query
    pub fn matches(
        &self,
        token: &TokenId,
        sender: &AccountId,
        receiver: &AccountId,
        position: EventPosition,
    ) -> bool {
        &self.token == token
            && self.sender.as_ref().is_none_or(|s| s == sender)
            && self.receiver.as_ref().is_none_or(|r| r == receiver)
            && position.block_number >= self.from_block
            && self.to_block.includes(position.block_number)
    }
}
