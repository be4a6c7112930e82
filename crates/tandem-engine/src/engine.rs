//! The engine — registry + queue behind one lock, operations on top.
//!
//! Every operation that reads-then-writes the queue or registry runs as a
//! single critical section under `state`. Operations return the outbound
//! events they produced; the transport pushes them after the lock is
//! released, so a slow recipient never stalls matching for others.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use tandem_core::config::TandemConfig;
use tandem_core::{ConnId, JoinRequest, ServerEvent};

use crate::filter::ChatFilter;
use crate::lifecycle::LeaveMode;
use crate::queue::WaitingQueue;
use crate::registry::SessionRegistry;
use crate::relay::SignalKind;

/// One event addressed to one identity. The transport owns delivery.
#[derive(Debug)]
pub struct Outbound {
    pub to: ConnId,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn new(to: ConnId, event: ServerEvent) -> Self {
        Self { to, event }
    }
}

/// Registry and queue, mutated together. Only ever touched while the
/// engine lock is held.
#[derive(Debug, Default)]
pub struct EngineState {
    pub(crate) registry: SessionRegistry,
    pub(crate) queue: WaitingQueue,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Read-only counts for the ops surface.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EngineSnapshot {
    pub registered: usize,
    pub queued: usize,
    pub paired: usize,
}

/// The matchmaking engine, shared across all connection tasks.
pub struct Engine {
    state: Mutex<EngineState>,
    filter: ChatFilter,
    email_suffix: String,
}

pub type SharedEngine = Arc<Engine>;

impl Engine {
    pub fn new(config: &TandemConfig) -> SharedEngine {
        Arc::new(Self {
            state: Mutex::new(EngineState::new()),
            filter: ChatFilter::new(&config.chat.flagged_words),
            email_suffix: config.matching.email_suffix.clone(),
        })
    }

    /// Register a profile and match or enqueue. A validation failure
    /// mutates nothing and surfaces as `join-rejected` to the caller.
    pub async fn join_queue(
        &self,
        id: &ConnId,
        req: JoinRequest,
        remote_addr: Option<std::net::SocketAddr>,
    ) -> Vec<Outbound> {
        let mut state = self.state.lock().await;
        match state.join_queue(id, req, remote_addr, &self.email_suffix) {
            Ok(out) => out,
            Err(e) => {
                tracing::debug!(conn = id.short(), error = %e, "join rejected");
                vec![Outbound::new(
                    id.clone(),
                    ServerEvent::JoinRejected {
                        reason: e.to_string(),
                    },
                )]
            }
        }
    }

    /// Forward a handshake payload to `target` if it is the sender's
    /// current partner. Anything else is a silent no-op.
    pub async fn forward_signal(
        &self,
        sender: &ConnId,
        kind: SignalKind,
        payload: serde_json::Value,
        target: &str,
    ) -> Vec<Outbound> {
        let state = self.state.lock().await;
        state.forward_signal(sender, kind, payload, target)
    }

    /// Run the chat text transform and forward to the sender's partner.
    pub async fn forward_chat(&self, sender: &ConnId, message: &str) -> Vec<Outbound> {
        let filtered = self.filter.apply(message);
        let state = self.state.lock().await;
        state.forward_chat(sender, filtered)
    }

    /// Tear down any pairing, dequeue, and on `Disconnect` forget the
    /// identity entirely. Idempotent; never fails.
    pub async fn leave(&self, id: &ConnId, mode: LeaveMode) -> Vec<Outbound> {
        let mut state = self.state.lock().await;
        state.leave(id, mode)
    }

    /// Flag an identity's transport liveness. Dead entries are skipped
    /// by the waiting queue until their disconnect is processed.
    pub async fn set_connected(&self, id: &ConnId, connected: bool) {
        let mut state = self.state.lock().await;
        state.registry.set_connected(id, connected);
    }

    /// The sender's current partner, if any. Used by the report sink.
    pub async fn partner_of(&self, id: &ConnId) -> Option<ConnId> {
        let state = self.state.lock().await;
        state.registry.partner_of(id).cloned()
    }

    pub async fn snapshot(&self) -> EngineSnapshot {
        let state = self.state.lock().await;
        EngineSnapshot {
            registered: state.registry.len(),
            queued: state.queue.len(),
            paired: state.registry.count_paired(),
        }
    }
}

pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
