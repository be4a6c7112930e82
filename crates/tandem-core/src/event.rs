//! Wire events — the JSON protocol between clients and the server.
//!
//! Every frame is an adjacently tagged envelope: `{"event": "...", "data":
//! {...}}`. Event names are kebab-case, payload fields camelCase. WebRTC
//! handshake payloads (offer/answer/candidate) are opaque values — the
//! server forwards them without interpretation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-user match constraints. A disabled filter never rejects anyone.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchFilters {
    pub same_institution: bool,
    pub same_program: bool,
    pub same_year: bool,
}

/// Registration data submitted with `join-queue`.
///
/// The required strings default to empty when absent so a sparse request
/// still reaches validation (and gets a proper rejection) instead of
/// failing to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinRequest {
    pub email: String,
    pub name: String,
    pub institution: String,
    pub program: Option<String>,
    pub year: Option<String>,
    pub filters: Option<MatchFilters>,
}

impl Default for JoinRequest {
    fn default() -> Self {
        Self {
            email: String::new(),
            name: String::new(),
            institution: String::new(),
            program: None,
            year: None,
            filters: None,
        }
    }
}

/// What a user is allowed to learn about their partner.
/// Email and network address never cross to the other side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedProfile {
    pub name: String,
    pub institution: String,
    pub program: String,
    pub year: String,
}

/// Events the server consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinQueue(JoinRequest),
    Offer { offer: Value, target: String },
    Answer { answer: Value, target: String },
    IceCandidate { candidate: Value, target: String },
    ChatMessage { message: String },
    NextConnection,
    ReportUser(Value),
}

/// Events the server pushes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    WaitingForMatch {
        position: usize,
    },
    #[serde(rename_all = "camelCase")]
    MatchFound {
        partner_id: String,
        partner_info: SanitizedProfile,
    },
    Offer {
        offer: Value,
        sender: String,
    },
    Answer {
        answer: Value,
        sender: String,
    },
    IceCandidate {
        candidate: Value,
        sender: String,
    },
    ChatMessage {
        message: String,
        sender: String,
        timestamp: u64,
    },
    PartnerDisconnected,
    JoinRejected {
        reason: String,
    },
}
