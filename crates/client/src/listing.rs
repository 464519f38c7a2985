//! Active-flow listing from the `FlowUpdated` log.
//!
//! Every call replays the configured block range; there is no cache
//! between calls. See [`crate::FlowIndexer`] for the incremental variant.

use std::sync::Arc;

use flowledger_core::{AccountId, FlowDirection, FlowUpdateEvent, FlowView, TokenId};
use flowledger_ports::{EventLogSource, GatewayResult};
use flowledger_reconciler::FlowLedgerReconciler;
use log::{debug, info};

use crate::config::ClientConfig;
use crate::error::Result;

// ============================================================================
// REQUEST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFlowsRequest {
    pub token: TokenId,
    pub account: AccountId,
    pub direction: FlowDirection,
}

impl ListFlowsRequest {
    /// Both directions
    pub fn new(token: TokenId, account: AccountId) -> Self {
        Self {
            token,
            account,
            direction: FlowDirection::Both,
        }
    }

    pub fn only_inbound(self) -> Self {
        self.with_direction(FlowDirection::Inbound)
    }

    pub fn only_outbound(self) -> Self {
        self.with_direction(FlowDirection::Outbound)
    }

    pub fn with_direction(mut self, direction: FlowDirection) -> Self {
        self.direction = direction;
        self
    }
}

// ============================================================================
// LISTING
// ============================================================================

pub struct FlowListing<G>
where
    G: EventLogSource,
{
    gateway: Arc<G>,
    config: ClientConfig,
}

impl<G> FlowListing<G>
where
    G: EventLogSource,
{
    pub fn new(gateway: Arc<G>, config: ClientConfig) -> Self {
        Self { gateway, config }
    }

    /// Active flows of `request.account`, partitioned by direction.
    ///
    /// Issues one log query per requested direction, concurrently. The
    /// first failing query aborts the listing.
    pub async fn list_flows(&self, request: &ListFlowsRequest) -> Result<FlowView> {
        info!(
            "Listing {:?} flows of {} on {}",
            request.direction, request.account, request.token
        );

        let inbound = async {
            if request.direction.includes_inbound() {
                let query = self
                    .config
                    .event_query(&request.token)
                    .with_receiver(request.account.clone());
                self.gateway.get_past_events(query).await
            } else {
                GatewayResult::Ok(Vec::new())
            }
        };
        let outbound = async {
            if request.direction.includes_outbound() {
                let query = self
                    .config
                    .event_query(&request.token)
                    .with_sender(request.account.clone());
                self.gateway.get_past_events(query).await
            } else {
                GatewayResult::Ok(Vec::new())
            }
        };
        let (inbound, outbound): (Vec<FlowUpdateEvent>, Vec<FlowUpdateEvent>) =
            tokio::try_join!(inbound, outbound)?;

        debug!(
            "Fetched {} inbound and {} outbound events for {}",
            inbound.len(),
            outbound.len(),
            request.account
        );

        let reconciler = FlowLedgerReconciler::new(request.token.clone(), request.account.clone());
        Ok(reconciler.reconcile(request.direction, &inbound, &outbound)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use async_trait::async_trait;
    use flowledger_core::{EventPosition, FlowRate};
    use flowledger_ports::{EventQuery, GatewayError};
    use std::sync::Mutex;

    /// Serves a fixed log, filtered by the query's parties
    #[derive(Default)]
    struct StaticLog {
        events: Vec<FlowUpdateEvent>,
        queries: Mutex<Vec<EventQuery>>,
        fail: Option<GatewayError>,
    }

    #[async_trait]
    impl EventLogSource for StaticLog {
        async fn get_past_events(&self, query: EventQuery) -> GatewayResult<Vec<FlowUpdateEvent>> {
            self.queries.lock().unwrap().push(query.clone());
            if let Some(err) = &self.fail {
                return Err(err.clone());
            }
            Ok(self
                .events
                .iter()
                .filter(|e| query.matches(&e.token, &e.sender, &e.receiver, e.position))
                .cloned()
                .collect())
        }
    }

    fn event(sender: &str, receiver: &str, rate: i64, block: u64) -> FlowUpdateEvent {
        FlowUpdateEvent::new(
            TokenId::new("fDAIx"),
            AccountId::new(sender),
            AccountId::new(receiver),
            FlowRate::from_i64(rate),
            EventPosition::new(block, 0),
        )
    }

    fn listing(log: Arc<StaticLog>) -> FlowListing<StaticLog> {
        FlowListing::new(log, ClientConfig::new(AccountId::new("0xcfa")))
    }

    fn request() -> ListFlowsRequest {
        ListFlowsRequest::new(TokenId::new("fDAIx"), AccountId::new("0xbob"))
    }

    #[tokio::test]
    async fn test_lists_both_sides() {
        let log = Arc::new(StaticLog {
            events: vec![
                event("0xalice", "0xbob", 10, 1),
                event("0xbob", "0xcarol", 20, 2),
                event("0xalice", "0xbob", 15, 3),
                event("0xdave", "0xbob", 5, 4),
                event("0xdave", "0xbob", 0, 5),
            ],
            ..Default::default()
        });

        let view = listing(Arc::clone(&log)).list_flows(&request()).await.unwrap();

        let in_flows = view.in_flows.unwrap();
        assert_eq!(in_flows.len(), 1);
        assert_eq!(in_flows[0].sender, AccountId::new("0xalice"));
        assert_eq!(in_flows[0].flow_rate, FlowRate::from_i64(15));
        let out_flows = view.out_flows.unwrap();
        assert_eq!(out_flows.len(), 1);
        assert_eq!(out_flows[0].receiver, AccountId::new("0xcarol"));
        assert_eq!(log.queries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unrequested_side_is_not_fetched() {
        let log = Arc::new(StaticLog {
            events: vec![event("0xalice", "0xbob", 10, 1)],
            ..Default::default()
        });

        let view = listing(Arc::clone(&log))
            .list_flows(&request().only_outbound())
            .await
            .unwrap();

        assert_eq!(view.in_flows, None);
        assert_eq!(view.out_flows, Some(Vec::new()));
        let queries = log.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].sender, Some(AccountId::new("0xbob")));
        assert_eq!(queries[0].receiver, None);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_listing() {
        let log = Arc::new(StaticLog {
            fail: Some(GatewayError::Unavailable("node down".to_string())),
            ..Default::default()
        });

        let err = listing(log).list_flows(&request()).await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Upstream(GatewayError::Unavailable("node down".to_string()))
        );
    }

    #[tokio::test]
    async fn test_misrouted_event_is_contract_violation() {
        let log = Arc::new(StaticLog {
            events: vec![event("0xalice", "0xbob", 10, 1)],
            ..Default::default()
        });
        // The log ignores the sender filter, so bob's outbound batch gets
        // alice's flow.
        struct Unfiltered(Arc<StaticLog>);
        #[async_trait]
        impl EventLogSource for Unfiltered {
            async fn get_past_events(
                &self,
                _query: EventQuery,
            ) -> GatewayResult<Vec<FlowUpdateEvent>> {
                Ok(self.0.events.clone())
            }
        }

        let err = FlowListing::new(
            Arc::new(Unfiltered(log)),
            ClientConfig::new(AccountId::new("0xcfa")),
        )
        .list_flows(&request())
        .await
        .unwrap_err();
        assert!(matches!(err, ClientError::ContractViolation(_)));
    }
}
