//! Incremental active-flow listing.

use std::sync::Arc;

use flowledger_core::{AccountId, FlowDirection, FlowUpdateEvent, FlowView, TokenId};
use flowledger_ports::EventLogSource;
use flowledger_reconciler::FlowIndex;
use log::{debug, info};

use crate::config::ClientConfig;
use crate::error::Result;

/// Keeps a [`FlowIndex`] of one account's flows and tops it up from the log.
///
/// The first `sync` replays from the configured `from_block`. After that
/// each side resumes at the block of the newest event its own query
/// returned: the two queries are separate reads, so the ledger may have
/// grown between them. The resume block is fetched again since it may have
/// gained logs; the index drops the duplicates.
pub struct FlowIndexer<G>
where
    G: EventLogSource,
{
    gateway: Arc<G>,
    config: ClientConfig,
    account: AccountId,
    index: FlowIndex,
    inbound_from: u64,
    outbound_from: u64,
}

impl<G> FlowIndexer<G>
where
    G: EventLogSource,
{
    pub fn new(gateway: Arc<G>, config: ClientConfig, token: TokenId, account: AccountId) -> Self {
        Self {
            gateway,
            inbound_from: config.from_block,
            outbound_from: config.from_block,
            config,
            account,
            index: FlowIndex::new(token),
        }
    }

    pub fn token(&self) -> &TokenId {
        self.index.token()
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn index(&self) -> &FlowIndex {
        &self.index
    }

    /// Fetch events newer than the last sync and fold them in.
    ///
    /// Returns how many events changed the index. On error the index keeps
    /// whatever the failed sync had already applied; the next sync resumes
    /// from there.
    pub async fn sync(&mut self) -> Result<usize> {
        let base = self.config.event_query(self.index.token());
        let inbound_query = base
            .clone()
            .with_range(self.inbound_from, self.config.to_block)
            .with_receiver(self.account.clone());
        let outbound_query = base
            .with_range(self.outbound_from, self.config.to_block)
            .with_sender(self.account.clone());

        let inbound = self.gateway.get_past_events(inbound_query);
        let outbound = self.gateway.get_past_events(outbound_query);
        let (inbound, outbound) = tokio::try_join!(inbound, outbound)?;
        debug!(
            "Indexer for {} fetched {} inbound events from block {} and {} outbound from block {}",
            self.account,
            inbound.len(),
            self.inbound_from,
            outbound.len(),
            self.outbound_from
        );

        let inbound_next = newest_block(&inbound).unwrap_or(self.inbound_from);
        let outbound_next = newest_block(&outbound).unwrap_or(self.outbound_from);
        let applied = self.index.observe_all(inbound.into_iter().chain(outbound))?;
        self.inbound_from = self.inbound_from.max(inbound_next);
        self.outbound_from = self.outbound_from.max(outbound_next);

        info!(
            "Indexer for {} on {}: {} events applied, {} active flows",
            self.account,
            self.index.token(),
            applied,
            self.index.active_count()
        );
        Ok(applied)
    }

    /// Current view, as of the last sync
    pub fn view(&self, direction: FlowDirection) -> FlowView {
        self.index.view(&self.account, direction)
    }
}

fn newest_block(events: &[FlowUpdateEvent]) -> Option<u64> {
    events.iter().map(|e| e.position.block_number).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{FlowListing, ListFlowsRequest};
    use async_trait::async_trait;
    use flowledger_core::{EventPosition, FlowRate, FlowUpdateEvent};
    use flowledger_ports::{EventQuery, GatewayResult};
    use std::sync::Mutex;

    #[derive(Default)]
    struct GrowingLog {
        events: Mutex<Vec<FlowUpdateEvent>>,
        queries: Mutex<Vec<EventQuery>>,
        /// Appended to the log right after the next query is answered
        mined_after_next_read: Mutex<Vec<FlowUpdateEvent>>,
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

    impl GrowingLog {
        fn push(&self, sender: &str, receiver: &str, rate: i64, block: u64) {
            self.events
                .lock()
                .unwrap()
                .push(event(sender, receiver, rate, block));
        }

        fn mine_after_next_read(&self, sender: &str, receiver: &str, rate: i64, block: u64) {
            self.mined_after_next_read
                .lock()
                .unwrap()
                .push(event(sender, receiver, rate, block));
        }

        fn query_for_receiver(&self, index: usize) -> EventQuery {
            self.queries
                .lock()
                .unwrap()
                .iter()
                .filter(|q| q.receiver.is_some())
                .nth(index)
                .cloned()
                .unwrap()
        }

        fn query_for_sender(&self, index: usize) -> EventQuery {
            self.queries
                .lock()
                .unwrap()
                .iter()
                .filter(|q| q.sender.is_some())
                .nth(index)
                .cloned()
                .unwrap()
        }
    }

    #[async_trait]
    impl EventLogSource for GrowingLog {
        async fn get_past_events(&self, query: EventQuery) -> GatewayResult<Vec<FlowUpdateEvent>> {
            self.queries.lock().unwrap().push(query.clone());
            let mut events = self.events.lock().unwrap();
            let served = events
                .iter()
                .filter(|e| query.matches(&e.token, &e.sender, &e.receiver, e.position))
                .cloned()
                .collect();
            events.append(&mut self.mined_after_next_read.lock().unwrap());
            Ok(served)
        }
    }

    fn indexer(log: Arc<GrowingLog>) -> FlowIndexer<GrowingLog> {
        FlowIndexer::new(
            log,
            ClientConfig::new(AccountId::new("0xcfa")),
            TokenId::new("fDAIx"),
            AccountId::new("0xbob"),
        )
    }

    #[tokio::test]
    async fn test_sync_resumes_from_last_seen_block() {
        let log = Arc::new(GrowingLog::default());
        log.push("0xalice", "0xbob", 10, 3);
        log.push("0xbob", "0xcarol", 4, 5);
        let mut indexer = indexer(Arc::clone(&log));

        assert_eq!(indexer.sync().await.unwrap(), 2);
        assert_eq!(indexer.view(FlowDirection::Both).in_flows.unwrap().len(), 1);

        log.push("0xbob", "0xcarol", 0, 8);
        assert_eq!(indexer.sync().await.unwrap(), 1);

        assert_eq!(log.query_for_receiver(0).from_block, 0);
        assert_eq!(log.query_for_sender(0).from_block, 0);
        assert_eq!(log.query_for_receiver(1).from_block, 3);
        assert_eq!(log.query_for_sender(1).from_block, 5);

        let view = indexer.view(FlowDirection::Both);
        assert_eq!(view.in_flows.unwrap().len(), 1);
        assert_eq!(view.out_flows, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_resync_without_new_events_changes_nothing() {
        let log = Arc::new(GrowingLog::default());
        log.push("0xalice", "0xbob", 10, 3);
        let mut indexer = indexer(log);

        indexer.sync().await.unwrap();
        let before = indexer.view(FlowDirection::Both);
        assert_eq!(indexer.sync().await.unwrap(), 0);
        assert_eq!(indexer.view(FlowDirection::Both), before);
    }

    #[tokio::test]
    async fn test_blocks_mined_between_the_two_reads_are_not_lost() {
        let log = Arc::new(GrowingLog::default());
        log.push("0xalice", "0xbob", 10, 3);
        log.push("0xbob", "0xerin", 2, 10);
        // Whichever read is served first misses these; the other sees its
        // own side of them.
        log.mine_after_next_read("0xcarol", "0xbob", 6, 11);
        log.mine_after_next_read("0xbob", "0xdave", 1, 12);
        let mut indexer = indexer(Arc::clone(&log));

        for _ in 0..3 {
            indexer.sync().await.unwrap();
        }

        let listing = FlowListing::new(
            Arc::clone(&log),
            ClientConfig::new(AccountId::new("0xcfa")),
        );
        let listed = listing
            .list_flows(&ListFlowsRequest::new(
                TokenId::new("fDAIx"),
                AccountId::new("0xbob"),
            ))
            .await
            .unwrap();
        let viewed = indexer.view(FlowDirection::Both);

        assert_eq!(viewed, listed);
        let senders: Vec<&str> = viewed
            .in_flows
            .as_ref()
            .unwrap()
            .iter()
            .map(|f| f.sender.as_str())
            .collect();
        assert_eq!(senders, vec!["0xalice", "0xcarol"]);
        assert_eq!(viewed.out_flows.unwrap().len(), 2);
    }
}
