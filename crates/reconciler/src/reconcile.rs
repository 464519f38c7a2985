//! Batch reconciliation of the `FlowUpdated` log.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use flowledger_core::{
    AccountId, EventPosition, FlowDirection, FlowEntry, FlowKey, FlowUpdateEvent, FlowView,
    TokenId,
};
use log::debug;

use crate::error::{AccountRole, ReconcileError, Result};

/// Reduce a batch to the winning event per FlowKey.
///
/// The winner is the event with the greatest `EventPosition`, whatever the
/// input order. A position identifies exactly one fact: the same event
/// delivered twice is collapsed, two different events at one position are
/// a `ConflictingPosition` error.
pub fn latest_by_key<'a, I>(events: I) -> Result<HashMap<FlowKey, &'a FlowUpdateEvent>>
where
    I: IntoIterator<Item = &'a FlowUpdateEvent>,
{
    let mut seen: HashMap<EventPosition, &'a FlowUpdateEvent> = HashMap::new();
    let mut latest: HashMap<FlowKey, &'a FlowUpdateEvent> = HashMap::new();

    for event in events {
        match seen.entry(event.position) {
            Entry::Occupied(slot) => {
                let existing = *slot.get();
                if existing != event {
                    return Err(ReconcileError::ConflictingPosition {
                        position: event.position,
                        first: existing.key(),
                        second: event.key(),
                    });
                }
                continue;
            }
            Entry::Vacant(slot) => {
                slot.insert(event);
            }
        }

        match latest.entry(event.key()) {
            Entry::Occupied(mut slot) => {
                if event.position > slot.get().position {
                    slot.insert(event);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(event);
            }
        }
    }

    Ok(latest)
}

pub(crate) fn project(event: &FlowUpdateEvent) -> FlowEntry {
    FlowEntry {
        sender: event.sender.clone(),
        receiver: event.receiver.clone(),
        flow_rate: event.flow_rate,
    }
}

/// Derives one account's active flows for one token from full-history
/// batches.
///
/// Stateless: the same batches always produce the same view.
#[derive(Debug, Clone)]
pub struct FlowLedgerReconciler {
    token: TokenId,
    account: AccountId,
}

impl FlowLedgerReconciler {
    pub fn new(token: TokenId, account: AccountId) -> Self {
        Self { token, account }
    }

    pub fn token(&self) -> &TokenId {
        &self.token
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Active flows in a batch where the account plays `role`.
    ///
    /// Entries are ordered by the position of their latest update, oldest
    /// first. Closed keys are absent.
    pub fn active_flows(
        &self,
        role: AccountRole,
        events: &[FlowUpdateEvent],
    ) -> Result<Vec<FlowEntry>> {
        for event in events {
            self.check(role, event)?;
        }

        let latest = latest_by_key(events)?;
        let mut winners: Vec<&FlowUpdateEvent> = latest
            .into_values()
            .filter(|event| !event.is_closure())
            .collect();
        winners.sort_by_key(|event| event.position);

        Ok(winners.into_iter().map(project).collect())
    }

    /// Build the direction-partitioned view.
    ///
    /// `inbound` must hold the account's events as receiver, `outbound` as
    /// sender. A batch for a direction that was not requested is ignored
    /// and its side of the view is `None`.
    pub fn reconcile(
        &self,
        direction: FlowDirection,
        inbound: &[FlowUpdateEvent],
        outbound: &[FlowUpdateEvent],
    ) -> Result<FlowView> {
        let in_flows = if direction.includes_inbound() {
            Some(self.active_flows(AccountRole::Receiver, inbound)?)
        } else {
            None
        };
        let out_flows = if direction.includes_outbound() {
            Some(self.active_flows(AccountRole::Sender, outbound)?)
        } else {
            None
        };

        debug!(
            "Reconciled {} for {}: {} inbound events -> {:?} active, {} outbound events -> {:?} active",
            self.token,
            self.account,
            inbound.len(),
            in_flows.as_ref().map(Vec::len),
            outbound.len(),
            out_flows.as_ref().map(Vec::len),
        );

        Ok(FlowView {
            in_flows,
            out_flows,
        })
    }

    fn check(&self, role: AccountRole, event: &FlowUpdateEvent) -> Result<()> {
        if event.token != self.token {
            return Err(ReconcileError::TokenMismatch {
                expected: self.token.clone(),
                found: event.token.clone(),
            });
        }
        let party = match role {
            AccountRole::Sender => &event.sender,
            AccountRole::Receiver => &event.receiver,
        };
        if party != &self.account {
            return Err(ReconcileError::RoleMismatch {
                account: self.account.clone(),
                role,
                key: event.key(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowledger_core::FlowRate;

    const TOKEN: &str = "fDAIx";

    fn event(sender: &str, receiver: &str, rate: i64, block: u64) -> FlowUpdateEvent {
        FlowUpdateEvent::new(
            TOKEN,
            sender,
            receiver,
            FlowRate::from_i64(rate),
            EventPosition::new(block, 0),
        )
    }

    fn reconciler(account: &str) -> FlowLedgerReconciler {
        FlowLedgerReconciler::new(TokenId::new(TOKEN), AccountId::new(account))
    }

    fn entry(sender: &str, receiver: &str, rate: i64) -> FlowEntry {
        FlowEntry {
            sender: AccountId::new(sender),
            receiver: AccountId::new(receiver),
            flow_rate: FlowRate::from_i64(rate),
        }
    }

    #[test]
    fn test_latest_write_wins_after_reopen() {
        let events = vec![event("A", "B", 5, 1), event("A", "B", 0, 2), event("A", "B", 3, 3)];
        let flows = reconciler("B")
            .active_flows(AccountRole::Receiver, &events)
            .unwrap();
        assert_eq!(flows, vec![entry("A", "B", 3)]);
    }

    #[test]
    fn test_closed_flow_is_absent() {
        let events = vec![event("A", "B", 5, 1), event("A", "B", 0, 2)];
        let flows = reconciler("A")
            .active_flows(AccountRole::Sender, &events)
            .unwrap();
        assert!(flows.is_empty());
    }

    #[test]
    fn test_stale_event_does_not_override() {
        // closure arrives first in the batch but is the newest fact
        let events = vec![event("A", "B", 0, 9), event("A", "B", 7, 4), event("A", "B", 8, 6)];
        let flows = reconciler("A")
            .active_flows(AccountRole::Sender, &events)
            .unwrap();
        assert!(flows.is_empty());
    }

    #[test]
    fn test_log_index_breaks_ties_within_block() {
        let mut first = event("A", "B", 5, 7);
        let mut second = event("A", "B", 9, 7);
        first.position.log_index = 2;
        second.position.log_index = 1;
        let flows = reconciler("B")
            .active_flows(AccountRole::Receiver, &[second, first])
            .unwrap();
        assert_eq!(flows, vec![entry("A", "B", 5)]);
    }

    #[test]
    fn test_entries_ordered_by_latest_update() {
        let events = vec![event("C", "A", 2, 5), event("B", "A", 1, 3), event("D", "A", 4, 1)];
        let flows = reconciler("A")
            .active_flows(AccountRole::Receiver, &events)
            .unwrap();
        assert_eq!(
            flows,
            vec![entry("D", "A", 4), entry("B", "A", 1), entry("C", "A", 2)]
        );
    }

    #[test]
    fn test_empty_batch_gives_empty_requested_side() {
        let view = reconciler("A")
            .reconcile(FlowDirection::Both, &[], &[])
            .unwrap();
        assert_eq!(view.in_flows, Some(Vec::new()));
        assert_eq!(view.out_flows, Some(Vec::new()));
    }

    #[test]
    fn test_unrequested_side_is_none() {
        let inbound = vec![event("B", "A", 1, 1)];
        let outbound = vec![event("A", "C", 2, 2)];

        let view = reconciler("A")
            .reconcile(FlowDirection::Inbound, &inbound, &outbound)
            .unwrap();
        assert_eq!(view.in_flows, Some(vec![entry("B", "A", 1)]));
        assert_eq!(view.out_flows, None);

        let view = reconciler("A")
            .reconcile(FlowDirection::Outbound, &inbound, &outbound)
            .unwrap();
        assert_eq!(view.in_flows, None);
        assert_eq!(view.out_flows, Some(vec![entry("A", "C", 2)]));
    }

    #[test]
    fn test_self_flow_listed_on_both_sides() {
        let batch = vec![event("A", "A", 6, 1)];
        let view = reconciler("A")
            .reconcile(FlowDirection::Both, &batch, &batch)
            .unwrap();
        assert_eq!(view.in_flows, Some(vec![entry("A", "A", 6)]));
        assert_eq!(view.out_flows, Some(vec![entry("A", "A", 6)]));
    }

    #[test]
    fn test_identical_duplicate_is_collapsed() {
        let events = vec![event("A", "B", 5, 1), event("A", "B", 5, 1)];
        let flows = reconciler("B")
            .active_flows(AccountRole::Receiver, &events)
            .unwrap();
        assert_eq!(flows, vec![entry("A", "B", 5)]);
    }

    #[test]
    fn test_conflicting_position_is_rejected() {
        let events = vec![event("A", "B", 5, 1), event("A", "B", 6, 1)];
        let err = reconciler("B")
            .active_flows(AccountRole::Receiver, &events)
            .unwrap_err();
        assert_eq!(
            err,
            ReconcileError::ConflictingPosition {
                position: EventPosition::new(1, 0),
                first: FlowKey::new("A", "B"),
                second: FlowKey::new("A", "B"),
            }
        );
    }

    #[test]
    fn test_wrong_token_is_rejected() {
        let mut foreign = event("A", "B", 5, 1);
        foreign.token = TokenId::new("USDCx");
        let err = reconciler("B")
            .active_flows(AccountRole::Receiver, &[foreign])
            .unwrap_err();
        assert!(matches!(err, ReconcileError::TokenMismatch { .. }));
    }

    #[test]
    fn test_event_in_wrong_batch_is_rejected() {
        let outbound_event = event("A", "B", 5, 1);
        let err = reconciler("A")
            .reconcile(FlowDirection::Inbound, &[outbound_event], &[])
            .unwrap_err();
        assert_eq!(
            err,
            ReconcileError::RoleMismatch {
                account: AccountId::new("A"),
                role: AccountRole::Receiver,
                key: FlowKey::new("A", "B"),
            }
        );
    }
}
