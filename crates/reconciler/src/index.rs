//! Incremental flow index.
//!
//! Holds the winning event per FlowKey for one token and folds new events
//! in as they arrive, so a listing does not need to replay the whole log.
//! Closure events are kept: a late, older "open" must not resurrect a flow
//! that was closed after it.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use flowledger_core::{
    AccountId, EventPosition, FlowDirection, FlowEntry, FlowKey, FlowUpdateEvent, FlowView,
    TokenId,
};

use crate::error::{ReconcileError, Result};
use crate::reconcile::project;

#[derive(Debug, Clone)]
pub struct FlowIndex {
    token: TokenId,
    latest: HashMap<FlowKey, FlowUpdateEvent>,
    /// Event seen at every observed position, stale ones included
    seen: HashMap<EventPosition, FlowUpdateEvent>,
    high_water: Option<EventPosition>,
}

impl FlowIndex {
    pub fn new(token: TokenId) -> Self {
        Self {
            token,
            latest: HashMap::new(),
            seen: HashMap::new(),
            high_water: None,
        }
    }

    pub fn token(&self) -> &TokenId {
        &self.token
    }

    /// Greatest position observed so far
    pub fn high_water(&self) -> Option<EventPosition> {
        self.high_water
    }

    /// Fold one event into the index.
    ///
    /// Returns `true` if the event became the latest state of its key,
    /// `false` if it was stale or an exact duplicate.
    pub fn observe(&mut self, event: FlowUpdateEvent) -> Result<bool> {
        if event.token != self.token {
            return Err(ReconcileError::TokenMismatch {
                expected: self.token.clone(),
                found: event.token,
            });
        }

        let position = event.position;
        match self.seen.entry(position) {
            Entry::Occupied(slot) => {
                let existing = slot.get();
                if existing != &event {
                    return Err(ReconcileError::ConflictingPosition {
                        position,
                        first: existing.key(),
                        second: event.key(),
                    });
                }
                return Ok(false);
            }
            Entry::Vacant(slot) => {
                slot.insert(event.clone());
            }
        }

        let applied = match self.latest.entry(event.key()) {
            Entry::Vacant(slot) => {
                slot.insert(event);
                true
            }
            Entry::Occupied(mut slot) => {
                if position > slot.get().position {
                    slot.insert(event);
                    true
                } else {
                    false
                }
            }
        };

        if self.high_water.is_none_or(|hw| position > hw) {
            self.high_water = Some(position);
        }
        Ok(applied)
    }

    /// Fold a batch of events, in any order. Returns how many were applied.
    pub fn observe_all<I>(&mut self, events: I) -> Result<usize>
    where
        I: IntoIterator<Item = FlowUpdateEvent>,
    {
        let mut applied = 0;
        for event in events {
            if self.observe(event)? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Latest event recorded for a key, closures included
    pub fn latest(&self, key: &FlowKey) -> Option<&FlowUpdateEvent> {
        self.latest.get(key)
    }

    /// Number of keys whose latest state is an open flow
    pub fn active_count(&self) -> usize {
        self.latest.values().filter(|e| !e.is_closure()).count()
    }

    /// Same view the batch reconciler would build from the observed events.
    pub fn view(&self, account: &AccountId, direction: FlowDirection) -> FlowView {
        FlowView {
            in_flows: direction
                .includes_inbound()
                .then(|| self.active_where(|e| &e.receiver == account)),
            out_flows: direction
                .includes_outbound()
                .then(|| self.active_where(|e| &e.sender == account)),
        }
    }

    fn active_where<F>(&self, side: F) -> Vec<FlowEntry>
    where
        F: Fn(&FlowUpdateEvent) -> bool,
    {
        let mut winners: Vec<&FlowUpdateEvent> = self
            .latest
            .values()
            .filter(|e| !e.is_closure() && side(e))
            .collect();
        winners.sort_by_key(|e| e.position);
        winners.into_iter().map(project).collect()
    }
}
