//! Infrastructure adapter for the ledger ports.
//!
//! Wraps the FlowLedgerSimulator to implement the port traits, the way a
//! JSON-RPC adapter would wrap a real node. Reverts surface as
//! `GatewayError::Rejected`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use flowledger_core::{AccountId, FlowRate, FlowUpdateEvent, TokenId};
use flowledger_ports::{
    AgreementCall, AgreementExecutor, CallOptions, EventLogSource, EventQuery, FlowReader,
    GatewayError, GatewayResult, RawFlowRecord, TxHandle,
};
use log::debug;
use tokio::sync::{Mutex, RwLock};

use crate::config::SimulatorConfig;
use crate::simulator::{FlowLedgerSimulator, SimulatorError};

// ============================================================================
// SIMULATED GATEWAY
// ============================================================================

/// Adapter that implements the ledger ports by wrapping FlowLedgerSimulator.
#[derive(Clone)]
pub struct SimulatedLedgerGateway {
    simulator: Arc<RwLock<FlowLedgerSimulator>>,
    /// Failures returned, in order, by the next port calls
    injected: Arc<Mutex<VecDeque<GatewayError>>>,
    requests: Arc<AtomicUsize>,
}

impl SimulatedLedgerGateway {
    pub fn new(simulator: Arc<RwLock<FlowLedgerSimulator>>) -> Self {
        Self {
            simulator,
            injected: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Adapter over a fresh simulator
    pub fn with_config(config: SimulatorConfig) -> Self {
        Self::new(Arc::new(RwLock::new(FlowLedgerSimulator::new(config))))
    }

    /// Get direct access to the underlying simulator (for tests/setup)
    pub fn simulator(&self) -> &Arc<RwLock<FlowLedgerSimulator>> {
        &self.simulator
    }

    /// Make the next port call fail with `error` instead of reaching the
    /// simulator
    pub async fn fail_next(&self, error: GatewayError) {
        self.injected.lock().await.push_back(error);
    }

    /// Number of port calls received, failed ones included
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    async fn begin(&self, method: &str) -> GatewayResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        debug!("ledger request: {}", method);
        match self.injected.lock().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for SimulatedLedgerGateway {
    fn default() -> Self {
        Self::with_config(SimulatorConfig::default())
    }
}

fn rejected(e: SimulatorError) -> GatewayError {
    GatewayError::Rejected(e.to_string())
}

#[async_trait]
impl AgreementExecutor for SimulatedLedgerGateway {
    async fn call_agreement(
        &self,
        agreement: &AccountId,
        call: AgreementCall,
        options: CallOptions,
    ) -> GatewayResult<TxHandle> {
        self.begin("callAgreement").await?;
        let mut sim = self.simulator.write().await;
        sim.execute(agreement, call, &options).map_err(rejected)
    }
}

#[async_trait]
impl FlowReader for SimulatedLedgerGateway {
    async fn get_flow(
        &self,
        token: &TokenId,
        sender: &AccountId,
        receiver: &AccountId,
    ) -> GatewayResult<RawFlowRecord> {
        self.begin("getFlow").await?;
        let sim = self.simulator.read().await;
        Ok(sim.flow(token, sender, receiver))
    }

    async fn get_net_flow(&self, token: &TokenId, account: &AccountId) -> GatewayResult<FlowRate> {
        self.begin("getNetFlow").await?;
        let sim = self.simulator.read().await;
        sim.net_flow(token, account).map_err(rejected)
    }
}

#[async_trait]
impl EventLogSource for SimulatedLedgerGateway {
    async fn get_past_events(&self, query: EventQuery) -> GatewayResult<Vec<FlowUpdateEvent>> {
        self.begin("getPastEvents").await?;
        let sim = self.simulator.read().await;
        sim.events(&query).map_err(rejected)
    }
}

// ============================================================================
// TESTS
// ============================================================================
