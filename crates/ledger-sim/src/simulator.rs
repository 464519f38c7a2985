//! Constant-flow agreement ledger simulator.
//!
//! Keeps the authoritative flow table and the append-only `FlowUpdated`
//! log. Every accepted call mines its own block and emits exactly one
//! event at log index 0 of that block.

use std::collections::{HashMap, HashSet};

use flowledger_core::{
    AccountId, EventPosition, FlowKey, FlowRate, FlowUpdateEvent, Timestamp, TokenId,
};
use flowledger_ports::{
    AgreementCall, CallOptions, EventQuery, FLOW_UPDATED_EVENT, RawFlowRecord, TxHandle,
};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{EventOrder, SimulatorConfig};

// ============================================================================
// ERRORS
// ============================================================================

/// Reasons the simulated agreement reverts a call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulatorError {
    #[error("Unknown agreement: {0}")]
    UnknownAgreement(AccountId),

    #[error("Flow already exists: {0}")]
    FlowExists(FlowKey),

    #[error("Flow does not exist: {0}")]
    FlowNotFound(FlowKey),

    #[error("Invalid flow rate: {0}")]
    InvalidFlowRate(FlowRate),

    #[error("Sender and receiver are the same account: {0}")]
    SelfFlow(AccountId),

    #[error("{actor} may not {action} flow {key}")]
    Unauthorized {
        actor: AccountId,
        action: &'static str,
        key: FlowKey,
    },

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),
}

// ============================================================================
// FLOW STATE
// ============================================================================

#[derive(Debug, Clone)]
struct FlowState {
    flow_rate: FlowRate,
    updated_at: Timestamp,
    deposit: Decimal,
}

// ============================================================================
// SIMULATOR
// ============================================================================

#[derive(Debug)]
pub struct FlowLedgerSimulator {
    config: SimulatorConfig,
    current_block: u64,
    last_block_time: Timestamp,
    /// Open flows only; a closed flow is removed
    flows: HashMap<(TokenId, FlowKey), FlowState>,
    log: Vec<FlowUpdateEvent>,
    /// Senders whose flows anyone may close
    critical: HashSet<(TokenId, AccountId)>,
}

impl FlowLedgerSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            current_block: config.start_block,
            last_block_time: config.genesis_time,
            config,
            flows: HashMap::new(),
            log: Vec::new(),
            critical: HashSet::new(),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn current_block(&self) -> u64 {
        self.current_block
    }

    pub fn last_block_time(&self) -> Timestamp {
        self.last_block_time
    }

    /// Full event log in append order
    pub fn log(&self) -> &[FlowUpdateEvent] {
        &self.log
    }

    /// Mine one block and return its number
    ///
    /// The block clock stands still if the configured block time cannot be
    /// added to it.
    pub fn produce_block(&mut self) -> u64 {
        self.current_block += 1;
        match self
            .config
            .block_time()
            .and_then(|step| self.last_block_time.checked_add_signed(step))
        {
            Some(next) => self.last_block_time = next,
            None => warn!(
                "Block {}: block time {}s overflows the clock, keeping {}",
                self.current_block, self.config.block_time_secs, self.last_block_time
            ),
        }
        self.current_block
    }

    /// Mine `count` empty blocks
    pub fn advance_blocks(&mut self, count: u64) {
        for _ in 0..count {
            self.produce_block();
        }
    }

    /// Allow third parties to close `account`'s outgoing flows of `token`
    pub fn mark_critical(&mut self, token: &TokenId, account: &AccountId) {
        self.critical.insert((token.clone(), account.clone()));
    }

    pub fn clear_critical(&mut self, token: &TokenId, account: &AccountId) {
        self.critical.remove(&(token.clone(), account.clone()));
    }

    /// Apply one agreement call as a transaction in its own block
    pub fn execute(
        &mut self,
        agreement: &AccountId,
        call: AgreementCall,
        options: &CallOptions,
    ) -> Result<TxHandle, SimulatorError> {
        let result = self.try_execute(agreement, call, options);
        if let Err(e) = &result {
            warn!("Call from {} reverted: {}", options.from, e);
        }
        result
    }

    fn try_execute(
        &mut self,
        agreement: &AccountId,
        call: AgreementCall,
        options: &CallOptions,
    ) -> Result<TxHandle, SimulatorError> {
        if agreement != &self.config.agreement {
            return Err(SimulatorError::UnknownAgreement(agreement.clone()));
        }
        if let Some(data) = &options.user_data {
            debug!("{} carries {} bytes of user data", call.name(), data.len());
        }

        let from = &options.from;
        match call {
            AgreementCall::CreateFlow {
                token,
                sender,
                receiver,
                flow_rate,
            } => {
                let key = FlowKey { sender, receiver };
                Self::require_actor(from == &key.sender, from, "create", &key)?;
                if key.sender == key.receiver {
                    return Err(SimulatorError::SelfFlow(key.sender));
                }
                if !flow_rate.is_positive() {
                    return Err(SimulatorError::InvalidFlowRate(flow_rate));
                }
                if self.flows.contains_key(&(token.clone(), key.clone())) {
                    return Err(SimulatorError::FlowExists(key));
                }
                self.commit(token, key, flow_rate)
            }
            AgreementCall::UpdateFlow {
                token,
                sender,
                receiver,
                flow_rate,
            } => {
                let key = FlowKey { sender, receiver };
                Self::require_actor(from == &key.sender, from, "update", &key)?;
                if !flow_rate.is_positive() {
                    return Err(SimulatorError::InvalidFlowRate(flow_rate));
                }
                if !self.flows.contains_key(&(token.clone(), key.clone())) {
                    return Err(SimulatorError::FlowNotFound(key));
                }
                self.commit(token, key, flow_rate)
            }
            AgreementCall::DeleteFlow {
                token,
                sender,
                receiver,
            } => {
                let key = FlowKey { sender, receiver };
                if !self.flows.contains_key(&(token.clone(), key.clone())) {
                    return Err(SimulatorError::FlowNotFound(key));
                }
                let allowed = from == &key.sender
                    || from == &key.receiver
                    || self.critical.contains(&(token.clone(), key.sender.clone()));
                Self::require_actor(allowed, from, "delete", &key)?;
                self.commit(token, key, FlowRate::ZERO)
            }
        }
    }

    fn require_actor(
        allowed: bool,
        actor: &AccountId,
        action: &'static str,
        key: &FlowKey,
    ) -> Result<(), SimulatorError> {
        if allowed {
            Ok(())
        } else {
            Err(SimulatorError::Unauthorized {
                actor: actor.clone(),
                action,
                key: key.clone(),
            })
        }
    }

    fn commit(
        &mut self,
        token: TokenId,
        key: FlowKey,
        flow_rate: FlowRate,
    ) -> Result<TxHandle, SimulatorError> {
        let deposit = flow_rate
            .as_decimal()
            .checked_mul(Decimal::from(self.config.liquidation_period_secs))
            .ok_or_else(|| SimulatorError::Overflow(format!("deposit for rate {}", flow_rate)))?;

        let block_number = self.produce_block();
        let position = EventPosition::new(block_number, 0);

        if flow_rate.is_zero() {
            self.flows.remove(&(token.clone(), key.clone()));
        } else {
            self.flows.insert(
                (token.clone(), key.clone()),
                FlowState {
                    flow_rate,
                    updated_at: self.last_block_time,
                    deposit,
                },
            );
        }

        info!(
            "Block {}: {} {} rate={}",
            block_number, token, key, flow_rate
        );
        self.log.push(FlowUpdateEvent {
            token,
            sender: key.sender,
            receiver: key.receiver,
            flow_rate,
            position,
        });

        Ok(TxHandle {
            tx_hash: generate_tx_hash(),
            block_number,
        })
    }

    /// Current record of a flow; zeros when the pair has no open flow
    pub fn flow(&self, token: &TokenId, sender: &AccountId, receiver: &AccountId) -> RawFlowRecord {
        let key = (token.clone(), FlowKey::new(sender.clone(), receiver.clone()));
        match self.flows.get(&key) {
            Some(state) => RawFlowRecord {
                timestamp: state.updated_at.timestamp().max(0) as u64,
                flow_rate: state.flow_rate,
                deposit: state.deposit,
                owed_deposit: Decimal::ZERO,
            },
            None => RawFlowRecord {
                timestamp: 0,
                flow_rate: FlowRate::ZERO,
                deposit: Decimal::ZERO,
                owed_deposit: Decimal::ZERO,
            },
        }
    }

    /// Inbound minus outbound rate of `account` for `token`
    pub fn net_flow(&self, token: &TokenId, account: &AccountId) -> Result<FlowRate, SimulatorError> {
        let mut net = FlowRate::ZERO;
        for ((flow_token, key), state) in &self.flows {
            if flow_token != token {
                continue;
            }
            if &key.receiver == account {
                net = net
                    .checked_add(state.flow_rate)
                    .ok_or_else(|| SimulatorError::Overflow(format!("net flow of {}", account)))?;
            }
            if &key.sender == account {
                net = net
                    .checked_sub(state.flow_rate)
                    .ok_or_else(|| SimulatorError::Overflow(format!("net flow of {}", account)))?;
            }
        }
        Ok(net)
    }

    /// Log entries matching `query`, in the configured order
    pub fn events(&self, query: &EventQuery) -> Result<Vec<FlowUpdateEvent>, SimulatorError> {
        if query.event != FLOW_UPDATED_EVENT {
            return Err(SimulatorError::UnknownEvent(query.event.clone()));
        }

        let mut matching: Vec<FlowUpdateEvent> = self
            .log
            .iter()
            .filter(|e| query.matches(&e.token, &e.sender, &e.receiver, e.position))
            .cloned()
            .collect();

        if self.config.event_order == EventOrder::Reversed {
            matching.reverse();
        }
        Ok(matching)
    }
}

/// 32-byte hex transaction hash
fn generate_tx_hash() -> String {
    format!("0x{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
