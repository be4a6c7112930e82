//! Lifecycle controller — departure handling.
//!
//! `leave` must be honorable from any state (queued, paired, or neither)
//! and must never fail. Pairings are torn down for both members as a
//! unit; the remaining partner is notified.

use tandem_core::{ConnId, ServerEvent};

use crate::engine::{EngineState, Outbound};

/// How an identity is leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveMode {
    /// Connection is gone. The profile is forgotten entirely.
    Disconnect,
    /// "Next" request. The profile stays registered; the caller is
    /// expected to re-join the queue, possibly with updated filters.
    Next,
}

impl EngineState {
    pub(crate) fn leave(&mut self, id: &ConnId, mode: LeaveMode) -> Vec<Outbound> {
        let mut out = Vec::new();

        if let Some(partner) = self.registry.partner_of(id).cloned() {
            self.registry.clear_pairing(id);
            self.registry.clear_pairing(&partner);
            out.push(Outbound::new(
                partner.clone(),
                ServerEvent::PartnerDisconnected,
            ));
            tracing::info!(
                conn = id.short(),
                partner = partner.short(),
                "pairing torn down"
            );
        }

        self.queue.dequeue(id);

        if mode == LeaveMode::Disconnect && self.registry.remove(id).is_some() {
            tracing::debug!(conn = id.short(), "identity forgotten");
        }

        out
    }
}
