//! Relay — forwards handshake payloads and chat between paired identities.
//!
//! A forward to anything other than the sender's recorded partner is a
//! silent no-op. Surfacing an error there would leak pairing state to a
//! probing client, and a dropped stale message must never desync a
//! session.

use tandem_core::{ConnId, ServerEvent};

use crate::engine::{now_millis, EngineState, Outbound};

/// The handshake event kinds that flow through unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

impl SignalKind {
    fn wrap(self, payload: serde_json::Value, sender: &ConnId) -> ServerEvent {
        let sender = sender.to_string();
        match self {
            SignalKind::Offer => ServerEvent::Offer {
                offer: payload,
                sender,
            },
            SignalKind::Answer => ServerEvent::Answer {
                answer: payload,
                sender,
            },
            SignalKind::IceCandidate => ServerEvent::IceCandidate {
                candidate: payload,
                sender,
            },
        }
    }
}

impl EngineState {
    /// Forward a handshake payload verbatim, tagged with the sender.
    /// No-op unless `target` is the sender's current partner.
    pub(crate) fn forward_signal(
        &self,
        sender: &ConnId,
        kind: SignalKind,
        payload: serde_json::Value,
        target: &str,
    ) -> Vec<Outbound> {
        let Some(partner) = self.registry.partner_of(sender) else {
            tracing::trace!(conn = sender.short(), "signal from unpaired identity dropped");
            return Vec::new();
        };
        if partner.as_str() != target {
            tracing::trace!(
                conn = sender.short(),
                target,
                "signal target is not the current partner, dropped"
            );
            return Vec::new();
        }
        vec![Outbound::new(partner.clone(), kind.wrap(payload, sender))]
    }

    /// Forward an already-transformed chat message to the partner.
    pub(crate) fn forward_chat(&self, sender: &ConnId, message: String) -> Vec<Outbound> {
        let Some(partner) = self.registry.partner_of(sender) else {
            return Vec::new();
        };
        vec![Outbound::new(
            partner.clone(),
            ServerEvent::ChatMessage {
                message,
                sender: sender.to_string(),
                timestamp: now_millis(),
            },
        )]
    }
}
