//! Waiting queue — insertion-ordered identities awaiting a match.

use std::collections::VecDeque;

use tandem_core::ConnId;

use crate::registry::{Profile, SessionRegistry};

/// Ordered set of unmatched identities. Entries are unique; an identity
/// is queued iff it has a profile and no pairing.
#[derive(Debug, Default)]
pub struct WaitingQueue {
    entries: VecDeque<ConnId>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append. No-op if already present.
    pub fn enqueue(&mut self, id: ConnId) {
        if !self.contains(&id) {
            self.entries.push_back(id);
        }
    }

    /// Remove by identity. No-op if absent.
    pub fn dequeue(&mut self, id: &ConnId) {
        if let Some(pos) = self.entries.iter().position(|e| e == id) {
            self.entries.remove(pos);
        }
    }

    pub fn contains(&self, id: &ConnId) -> bool {
        self.entries.iter().any(|e| e == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Members passing `predicate`, in queue order.
    ///
    /// Entries whose profile is gone, whose connection died, or who
    /// already hold a pairing are skipped silently — the queue tolerates
    /// stale entries rather than erroring on them.
    pub fn eligible<F>(&self, registry: &SessionRegistry, predicate: F) -> Vec<ConnId>
    where
        F: Fn(&ConnId, &Profile) -> bool,
    {
        self.entries
            .iter()
            .filter(|id| match registry.get(id) {
                Some(p) => p.connected && p.pairing.is_none() && predicate(id, p),
                None => false,
            })
            .cloned()
            .collect()
    }
}
