//! Session registry — keyed store of connected identities.
//!
//! A pure data store: no validation, no matching logic. Every operation
//! is total; lookups on absent identities are no-ops. Access is serialized
//! by the engine lock (see [`crate::Engine`]).

use std::collections::HashMap;
use std::net::SocketAddr;

use tandem_core::{ConnId, MatchFilters, SanitizedProfile};

/// Registration data for one connected identity.
/// Created at queue-join, destroyed at disconnect.
#[derive(Debug, Clone)]
pub struct Profile {
    pub email: String,
    pub name: String,
    pub institution: String,
    pub program: Option<String>,
    pub year: Option<String>,
    pub filters: MatchFilters,
    /// Unix millis at queue-join.
    pub joined_at: u64,
    /// Originating address, when the transport knows it.
    pub remote_addr: Option<SocketAddr>,
    /// Transport liveness. Flipped off when the outbound channel dies so
    /// the waiting queue skips stale entries without consulting the
    /// transport layer.
    pub connected: bool,
    pub pairing: Option<Pairing>,
}

impl Profile {
    /// The view exposed to this profile's partner.
    /// Email and address stay on this side.
    pub fn sanitized(&self) -> SanitizedProfile {
        SanitizedProfile {
            name: self.name.clone(),
            institution: self.institution.clone(),
            program: self
                .program
                .clone()
                .unwrap_or_else(|| "Undeclared".to_string()),
            year: self.year.clone().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// One side of an active pairing. Created and destroyed for both
/// members as a unit — see the symmetry invariant on [`SessionRegistry`].
#[derive(Debug, Clone)]
pub struct Pairing {
    pub partner: ConnId,
    /// Institution of record at match time, kept for display.
    pub institution: String,
    /// Unix millis at match time.
    pub established_at: u64,
}

/// The keyed store. Invariant maintained by the engine: if A's pairing
/// references B then B's pairing references A, and neither member of a
/// pairing is in the waiting queue.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    profiles: HashMap<ConnId, Profile>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, id: ConnId, profile: Profile) {
        self.profiles.insert(id, profile);
    }

    pub fn get(&self, id: &ConnId) -> Option<&Profile> {
        self.profiles.get(id)
    }

    pub fn remove(&mut self, id: &ConnId) -> Option<Profile> {
        self.profiles.remove(id)
    }

    pub fn set_pairing(&mut self, id: &ConnId, pairing: Pairing) {
        if let Some(profile) = self.profiles.get_mut(id) {
            profile.pairing = Some(pairing);
        }
    }

    pub fn clear_pairing(&mut self, id: &ConnId) {
        if let Some(profile) = self.profiles.get_mut(id) {
            profile.pairing = None;
        }
    }

    pub fn set_connected(&mut self, id: &ConnId, connected: bool) {
        if let Some(profile) = self.profiles.get_mut(id) {
            profile.connected = connected;
        }
    }

    pub fn partner_of(&self, id: &ConnId) -> Option<&ConnId> {
        self.profiles
            .get(id)
            .and_then(|p| p.pairing.as_ref())
            .map(|pairing| &pairing.partner)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Identities currently holding a pairing.
    pub fn count_paired(&self) -> usize {
        self.profiles
            .values()
            .filter(|p| p.pairing.is_some())
            .count()
    }
}
