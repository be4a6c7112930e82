//! tandem-engine — matchmaking engine and signaling relay.
//!
//! The registry and waiting queue are owned by [`Engine`] behind a single
//! lock; matchmaker, relay, and lifecycle operations run as critical
//! sections over that pair and hand their outbound events back to the
//! transport for delivery.

pub mod engine;
pub mod filter;
pub mod lifecycle;
pub mod matchmaker;
pub mod queue;
pub mod registry;
pub mod relay;
pub mod report;

pub use engine::{Engine, EngineSnapshot, Outbound, SharedEngine};
pub use filter::ChatFilter;
pub use lifecycle::LeaveMode;
pub use matchmaker::JoinError;
pub use registry::{Pairing, Profile, SessionRegistry};
pub use relay::SignalKind;
pub use report::{ReportRecord, ReportStore};
