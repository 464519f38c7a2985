//! Single entry point over one ledger gateway.

use std::sync::Arc;

use flowledger_core::{AccountId, FlowRate, FlowRecord, FlowView, TokenId};
use flowledger_ports::{LedgerGateway, TxHandle};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::indexer::FlowIndexer;
use crate::lifecycle::{CloseFlowRequest, FlowLifecycleClient, OpenFlowRequest, UpdateFlowRequest};
use crate::listing::{FlowListing, ListFlowsRequest};
use crate::query::FlowStateQuery;

/// Flow client: lifecycle, point queries and listings sharing one gateway.
///
/// ```ignore
/// let client = FlowClient::new(gateway, ClientConfig::new(agreement));
/// client.create_flow(OpenFlowRequest::new(token.clone(), alice, bob, rate)).await?;
/// let view = client.list_flows(&ListFlowsRequest::new(token, bob)).await?;
/// ```
pub struct FlowClient<G>
where
    G: LedgerGateway,
{
    gateway: Arc<G>,
    config: ClientConfig,
    lifecycle: FlowLifecycleClient<G>,
    query: FlowStateQuery<G>,
    listing: FlowListing<G>,
}

impl<G> FlowClient<G>
where
    G: LedgerGateway,
{
    pub fn new(gateway: Arc<G>, config: ClientConfig) -> Self {
        Self {
            lifecycle: FlowLifecycleClient::new(Arc::clone(&gateway), &config),
            query: FlowStateQuery::new(Arc::clone(&gateway)),
            listing: FlowListing::new(Arc::clone(&gateway), config.clone()),
            gateway,
            config,
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn create_flow(&self, request: OpenFlowRequest) -> Result<TxHandle> {
        self.lifecycle.open_flow(request).await
    }

    pub async fn update_flow(&self, request: UpdateFlowRequest) -> Result<TxHandle> {
        self.lifecycle.update_flow(request).await
    }

    pub async fn delete_flow(&self, request: CloseFlowRequest) -> Result<TxHandle> {
        self.lifecycle.close_flow(request).await
    }

    pub async fn get_flow(
        &self,
        token: &TokenId,
        sender: &AccountId,
        receiver: &AccountId,
    ) -> Result<FlowRecord> {
        self.query.get_flow(token, sender, receiver).await
    }

    pub async fn get_net_flow(&self, token: &TokenId, account: &AccountId) -> Result<FlowRate> {
        self.query.get_net_flow(token, account).await
    }

    pub async fn list_flows(&self, request: &ListFlowsRequest) -> Result<FlowView> {
        self.listing.list_flows(request).await
    }

    /// Incremental listing for one account, sharing this client's gateway
    /// and block range. Starts empty; call `sync` to populate.
    pub fn indexer(&self, token: TokenId, account: AccountId) -> FlowIndexer<G> {
        FlowIndexer::new(Arc::clone(&self.gateway), self.config.clone(), token, account)
    }
}
