use crate::{AnchorStatus, Error, Result};
use did_anchor_core::GraphAddress;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// What the writer remembers about an anchor between submission and commit.
#[derive(Clone, Debug)]
pub(crate) struct PendingAnchor {
    /// Every DID in the batch, mapped to the latest anchor address it was built against
    /// (None for DIDs being created).
    pub expected_m: BTreeMap<String, Option<GraphAddress>>,
    pub submitted_at: tokio::time::Instant,
}

/// Tracks submitted anchors by credential id, and the last known status of each anchor.
/// Only the `status_retention` most recent terminal statuses are kept.
#[derive(Debug)]
pub(crate) struct AnchorTracker {
    pending_anchor_m: HashMap<String, PendingAnchor>,
    anchor_status_m: HashMap<String, AnchorStatus>,
    /// Ids with a terminal status, oldest first.
    terminal_id_vd: VecDeque<String>,
    status_retention: usize,
}

impl AnchorTracker {
    pub fn new(status_retention: usize) -> Self {
        Self {
            pending_anchor_m: HashMap::new(),
            anchor_status_m: HashMap::new(),
            terminal_id_vd: VecDeque::new(),
            status_retention,
        }
    }
    pub fn register(&mut self, id: &str, pending_anchor: PendingAnchor) -> Result<()> {
        if self.pending_anchor_m.contains_key(id) {
            return Err(Error::Submission(
                format!("anchor credential {} is already pending", id).into(),
            ));
        }
        self.pending_anchor_m.insert(id.to_string(), pending_anchor);
        self.anchor_status_m
            .insert(id.to_string(), AnchorStatus::Submitted);
        Ok(())
    }
    /// Forget an anchor whose submission was rejected.
    pub fn cancel(&mut self, id: &str) {
        self.pending_anchor_m.remove(id);
        self.anchor_status_m.remove(id);
    }
    pub fn take_pending(&mut self, id: &str) -> Option<PendingAnchor> {
        self.pending_anchor_m.remove(id)
    }
    pub fn set_status(&mut self, id: &str, anchor_status: AnchorStatus) {
        let becomes_terminal = anchor_status.is_terminal();
        let previous_status_o = self.anchor_status_m.insert(id.to_string(), anchor_status);
        let was_terminal = previous_status_o.map_or(false, |status| status.is_terminal());
        if becomes_terminal && !was_terminal {
            self.terminal_id_vd.push_back(id.to_string());
            self.evict_terminal_statuses();
        }
    }
    fn evict_terminal_statuses(&mut self) {
        while self.terminal_id_vd.len() > self.status_retention {
            let Some(id) = self.terminal_id_vd.pop_front() else {
                break;
            };
            if self
                .anchor_status_m
                .get(&id)
                .map_or(false, AnchorStatus::is_terminal)
            {
                self.anchor_status_m.remove(&id);
            }
        }
    }
    pub fn status(&self, id: &str) -> Option<AnchorStatus> {
        self.anchor_status_m.get(id).cloned()
    }
    pub fn pending_count(&self) -> usize {
        self.pending_anchor_m.len()
    }
    /// Move every anchor pending for at least `witness_timeout` to the Abandoned state,
    /// returning their ids.
    pub fn abandon_expired(
        &mut self,
        now: tokio::time::Instant,
        witness_timeout: std::time::Duration,
    ) -> Vec<String> {
        let expired_id_v = self
            .pending_anchor_m
            .iter()
            .filter(|(_, pending_anchor)| {
                now.saturating_duration_since(pending_anchor.submitted_at) >= witness_timeout
            })
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        for id in expired_id_v.iter() {
            self.pending_anchor_m.remove(id);
            self.set_status(id, AnchorStatus::Abandoned);
        }
        expired_id_v
    }
}
