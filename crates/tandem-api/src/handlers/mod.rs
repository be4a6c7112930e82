//! HTTP + WebSocket handlers — the transport adapter around the engine.

pub mod socket;
pub mod status;

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;

use tandem_core::{ConnId, ServerEvent};
use tandem_engine::{ReportStore, SharedEngine};

/// Outbound channel per live connection. Shared between the ws tasks and
/// anything that needs to push events.
pub type ConnectionMap = Arc<DashMap<ConnId, UnboundedSender<ServerEvent>>>;

/// Create a new empty connection map.
pub fn new_connection_map() -> ConnectionMap {
    Arc::new(DashMap::new())
}

#[derive(Clone)]
pub struct ApiState {
    pub engine: SharedEngine,
    pub connections: ConnectionMap,
    pub reports: ReportStore,
    pub started_at: Instant,
}

// Re-export handler functions for use in router setup.
pub use socket::handle_ws;
pub use status::{handle_reports, handle_status};
