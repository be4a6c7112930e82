//! Matchmaker — validates joins, pairs compatible identities, or enqueues.
//!
//! Filters are directional: only the joining user's enabled filters gate
//! candidates. A candidate's own filters are not consulted for the match
//! attempt that pairs them — they applied when the candidate joined and
//! will apply again on their next join.

use rand::seq::SliceRandom;

use tandem_core::{ConnId, JoinRequest, ServerEvent};

use crate::engine::{now_millis, EngineState, Outbound};
use crate::lifecycle::LeaveMode;
use crate::registry::{Pairing, Profile};

/// Why a join request was refused. Reported to the requester only;
/// nothing is mutated on the way out.
#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error("email must end with {0}")]
    BadEmail(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

fn validate(req: &JoinRequest, email_suffix: &str) -> Result<(), JoinError> {
    if !req
        .email
        .trim()
        .to_lowercase()
        .ends_with(&email_suffix.to_lowercase())
    {
        return Err(JoinError::BadEmail(email_suffix.to_string()));
    }
    if req.name.trim().is_empty() {
        return Err(JoinError::MissingField("name"));
    }
    if req.institution.trim().is_empty() {
        return Err(JoinError::MissingField("institution"));
    }
    Ok(())
}

/// Does `candidate` pass the joiner's enabled filters?
/// Optional attributes absent on either side skip that comparison.
fn filters_accept(joiner: &Profile, candidate: &Profile) -> bool {
    let f = joiner.filters;
    if f.same_institution && joiner.institution != candidate.institution {
        return false;
    }
    if f.same_program {
        if let (Some(a), Some(b)) = (&joiner.program, &candidate.program) {
            if a != b {
                return false;
            }
        }
    }
    if f.same_year {
        if let (Some(a), Some(b)) = (&joiner.year, &candidate.year) {
            if a != b {
                return false;
            }
        }
    }
    true
}

impl EngineState {
    pub(crate) fn join_queue(
        &mut self,
        id: &ConnId,
        req: JoinRequest,
        remote_addr: Option<std::net::SocketAddr>,
        email_suffix: &str,
    ) -> Result<Vec<Outbound>, JoinError> {
        validate(&req, email_suffix)?;

        // A join while paired is an implicit "next": the old pairing is
        // torn down first so pairing symmetry holds for any client
        // behavior. Also dequeues a re-joining identity.
        let mut out = self.leave(id, LeaveMode::Next);

        let profile = Profile {
            email: req.email,
            name: req.name,
            institution: req.institution,
            program: req.program,
            year: req.year,
            filters: req.filters.unwrap_or_default(),
            joined_at: now_millis(),
            remote_addr,
            connected: true,
            pairing: None,
        };

        // Candidates are gated by the joiner's filters only. The joiner
        // itself is excluded here and dequeued below, so a re-join can
        // never self-match.
        let candidates = self
            .queue
            .eligible(&self.registry, |cid, c| {
                cid != id && filters_accept(&profile, c)
            });

        self.registry.put(id.clone(), profile);

        let partner_id = candidates.choose(&mut rand::thread_rng()).cloned();

        match partner_id {
            Some(partner_id) => {
                self.queue.dequeue(&partner_id);
                out.extend(self.establish_pairing(id, &partner_id));
            }
            None => {
                self.queue.enqueue(id.clone());
                let position = self.queue.len();
                tracing::debug!(conn = id.short(), position, "queued, no eligible partner");
                out.push(Outbound::new(
                    id.clone(),
                    ServerEvent::WaitingForMatch { position },
                ));
            }
        }
        Ok(out)
    }

    /// Create the pairing on both sides and build the two match
    /// notifications. Both identities are registered and dequeued by the
    /// time this runs.
    fn establish_pairing(&mut self, joiner: &ConnId, partner: &ConnId) -> Vec<Outbound> {
        let established_at = now_millis();

        let (joiner_view, joiner_institution) = match self.registry.get(joiner) {
            Some(p) => (p.sanitized(), p.institution.clone()),
            None => return Vec::new(),
        };
        let (partner_view, partner_institution) = match self.registry.get(partner) {
            Some(p) => (p.sanitized(), p.institution.clone()),
            None => return Vec::new(),
        };

        self.registry.set_pairing(
            joiner,
            Pairing {
                partner: partner.clone(),
                institution: joiner_institution,
                established_at,
            },
        );
        self.registry.set_pairing(
            partner,
            Pairing {
                partner: joiner.clone(),
                institution: partner_institution,
                established_at,
            },
        );

        tracing::info!(
            conn = joiner.short(),
            partner = partner.short(),
            "pairing established"
        );

        vec![
            Outbound::new(
                joiner.clone(),
                ServerEvent::MatchFound {
                    partner_id: partner.to_string(),
                    partner_info: partner_view,
                },
            ),
            Outbound::new(
                partner.clone(),
                ServerEvent::MatchFound {
                    partner_id: joiner.to_string(),
                    partner_info: joiner_view,
                },
            ),
        ]
    }
}
